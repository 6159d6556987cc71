use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use newsdesk_core::{
    FeedConfig, FeedEntry, FetchConfig, Pipeline, PipelineConfig, PipelineOutcome, RawDocument, build_client,
    fetch_feed, fetch_file, fetch_stdin,
};
use owo_colors::OwoColorize;
use serde_json::json;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod echo;

use echo::{
    format_size, print_article_details, print_banner, print_error, print_info, print_step, print_success,
    print_timing_summary, print_warning,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Json,
    Text,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" | "txt" => Ok(Self::Text),
            _ => Err(format!("Invalid format: {}. Valid options: json, text", s)),
        }
    }
}

/// Fetch news articles and print their clean text
#[derive(Parser, Debug)]
#[command(name = "newsdesk")]
#[command(version)]
#[command(about = "Clean article text from news pages", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract the text of one article
    Extract(ExtractArgs),
    /// List current articles from the news sitemap
    Feed(FeedArgs),
    /// Extract every article listed in the news sitemap, one JSON line each
    Batch(BatchArgs),
}

#[derive(Args, Debug)]
struct ExtractArgs {
    /// URL to fetch, local HTML file, or "-" for stdin
    #[arg(value_name = "INPUT")]
    input: String,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output format (json, text)
    #[arg(short, long, default_value = "json", value_name = "FORMAT")]
    format: OutputFormat,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "30", value_name = "SECS")]
    timeout: u64,

    /// Custom User-Agent for HTTP requests
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Reject articles shorter than this many characters
    #[arg(long, default_value = "0", value_name = "NUM")]
    min_length: usize,
}

#[derive(Args, Debug)]
struct FeedArgs {
    /// Maximum number of articles
    #[arg(short, long, default_value = "15", value_name = "NUM")]
    limit: usize,

    /// News sitemap to read
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Output format (json, text)
    #[arg(short, long, default_value = "json", value_name = "FORMAT")]
    format: OutputFormat,
}

impl FeedArgs {
    fn config(&self) -> FeedConfig {
        let defaults = FeedConfig::default();
        FeedConfig { url: self.url.clone().unwrap_or(defaults.url), limit: self.limit }
    }
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// Maximum number of articles
    #[arg(short, long, default_value = "15", value_name = "NUM")]
    limit: usize,

    /// News sitemap to read
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Articles fetched at the same time
    #[arg(short, long, default_value = "4", value_name = "NUM")]
    concurrency: usize,

    /// Reject articles shorter than this many characters
    #[arg(long, default_value = "0", value_name = "NUM")]
    min_length: usize,
}

/// Log filter used when `RUST_LOG` is not set.
fn default_filter(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "info" }
}

fn init_tracing(verbose: bool) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(verbose).into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        print_banner();
        print_info("Debug logging enabled");
        eprintln!();
    }

    match cli.command {
        Command::Extract(args) => extract(args, cli.verbose).await,
        Command::Feed(args) => feed(args).await,
        Command::Batch(args) => batch(args).await,
    }
}

async fn extract(args: ExtractArgs, verbose: bool) -> anyhow::Result<ExitCode> {
    let fetch = FetchConfig {
        timeout: args.timeout,
        user_agent: args.user_agent.clone().unwrap_or_else(|| FetchConfig::default().user_agent),
        ..Default::default()
    };
    let pipeline = Pipeline::new(PipelineConfig { min_length: args.min_length, fetch })
        .context("Failed to build HTTP client")?;

    let start = Instant::now();
    let loaded = if args.input == "-" {
        if verbose {
            print_step(1, 3, "Reading from stdin");
        }
        RawDocument { html: fetch_stdin().context("Failed to read from stdin")?, url: None }
    } else if args.input.starts_with("http://") || args.input.starts_with("https://") {
        if verbose {
            print_step(1, 3, &format!("Fetching from {}", args.input.bright_white().underline()));
        }
        match pipeline.fetch_document(&args.input).await {
            Ok(raw) => raw,
            Err(err) => return finish(&args, PipelineOutcome::from_error(&err)),
        }
    } else {
        if verbose {
            print_step(1, 3, &format!("Reading from file {}", args.input.bright_white()));
        }
        let html = fetch_file(&args.input).with_context(|| format!("Failed to read file: {}", args.input))?;
        RawDocument { html, url: None }
    };
    let load_time = start.elapsed();

    if verbose {
        eprintln!("  {} {}\n", "Size:".dimmed(), format_size(loaded.html.len()).bright_white());
        print_step(2, 3, "Pruning, extracting and cleaning");
    }

    let process_start = Instant::now();
    let outcome = pipeline.process(&loaded);
    let process_time = process_start.elapsed();

    if verbose {
        if let PipelineOutcome::Success(article) = &outcome {
            print_article_details(article);
        }
        print_step(3, 3, "Writing output");
        eprintln!();
        print_timing_summary(start.elapsed(), &[("Load", load_time), ("Process", process_time)]);
    }

    finish(&args, outcome)
}

/// Write the outcome and map it onto the exit status.
fn finish(args: &ExtractArgs, outcome: PipelineOutcome) -> anyhow::Result<ExitCode> {
    let output = match (&outcome, args.format) {
        (PipelineOutcome::Success(article), OutputFormat::Text) => format!("{}\n", article.text),
        (_, OutputFormat::Text) => String::new(),
        (_, OutputFormat::Json) => format!("{}\n", serde_json::to_string_pretty(&outcome.to_json())?),
    };

    if !output.is_empty() {
        match &args.output {
            Some(path) => {
                fs::write(path, &output).with_context(|| format!("Failed to write to file: {}", path.display()))?;
                print_success(&format!("Output written to {}", path.display().bright_white()));
            }
            None => print!("{}", output),
        }
    }

    match &outcome {
        PipelineOutcome::Success(_) => Ok(ExitCode::SUCCESS),
        PipelineOutcome::FetchFailure { status, message } => {
            print_error(&format!("{} ({})", message, status));
            Ok(ExitCode::FAILURE)
        }
        PipelineOutcome::ExtractionFailure { message } => {
            print_error(message);
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn feed(args: FeedArgs) -> anyhow::Result<ExitCode> {
    let fetch = FetchConfig::default();
    let client = build_client(&fetch).context("Failed to build HTTP client")?;
    let config = args.config();
    let articles = fetch_feed(&client, &config, &fetch)
        .await
        .with_context(|| format!("Failed to load news sitemap {}", config.url))?;

    if articles.is_empty() {
        print_warning("The sitemap lists no articles");
    }

    match args.format {
        OutputFormat::Json => {
            let body = json!({ "articles": articles, "count": articles.len() });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        OutputFormat::Text => {
            for entry in &articles {
                println!("{}\n  {} {}", entry.title.bold(), entry.url, entry.date.dimmed());
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

async fn batch(args: BatchArgs) -> anyhow::Result<ExitCode> {
    let fetch = FetchConfig::default();
    let pipeline = Arc::new(
        Pipeline::new(PipelineConfig { min_length: args.min_length, fetch: fetch.clone() })
            .context("Failed to build HTTP client")?,
    );

    let defaults = FeedConfig::default();
    let config = FeedConfig { url: args.url.clone().unwrap_or(defaults.url), limit: args.limit };
    let entries = fetch_feed(pipeline.client(), &config, &fetch)
        .await
        .with_context(|| format!("Failed to load news sitemap {}", config.url))?;

    let semaphore = Arc::new(Semaphore::new(args.concurrency.max(1)));
    let mut tasks = JoinSet::new();
    for (index, entry) in entries.iter().cloned().enumerate() {
        let pipeline = Arc::clone(&pipeline);
        let semaphore = Arc::clone(&semaphore);
        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await;
            let outcome = pipeline.extract_article(&entry.url).await;
            (index, entry, outcome)
        });
    }

    let mut results: Vec<Option<(FeedEntry, PipelineOutcome)>> = vec![None; entries.len()];
    while let Some(joined) = tasks.join_next().await {
        let (index, entry, outcome) = joined.context("Extraction task failed")?;
        results[index] = Some((entry, outcome));
    }

    let mut extracted = 0;
    for (entry, outcome) in results.into_iter().flatten() {
        if outcome.is_success() {
            extracted += 1;
        }
        let mut line = outcome.to_json();
        line["url"] = json!(entry.url);
        line["status"] = json!(outcome.status_code());
        println!("{}", serde_json::to_string(&line)?);
    }

    print_info(&format!("{}/{} articles extracted", extracted, entries.len()));
    Ok(ExitCode::SUCCESS)
}
