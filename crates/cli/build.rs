use std::{env, fs, path::PathBuf};

fn format_arg() -> clap::Arg {
    clap::arg!(-f --format <FORMAT> "Output format (json, text)")
        .value_name("FORMAT")
        .default_value("json")
        .value_parser(["json", "text"])
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let extract = clap::Command::new("extract")
        .about("Extract the text of one article")
        .arg(clap::arg!(<INPUT> "URL to fetch, local HTML file, or '-' for stdin"))
        .arg(
            clap::arg!(-o --output <FILE> "Output file (default: stdout)")
                .value_name("FILE")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(format_arg())
        .arg(clap::arg!(--timeout <SECS> "HTTP timeout in seconds").default_value("30"))
        .arg(clap::arg!(--"user-agent" <UA> "Custom User-Agent for HTTP requests").value_name("UA"))
        .arg(clap::arg!(--"min-length" <NUM> "Reject articles shorter than this many characters").default_value("0"));

    let feed = clap::Command::new("feed")
        .about("List current articles from the news sitemap")
        .arg(clap::arg!(-l --limit <NUM> "Maximum number of articles").default_value("15"))
        .arg(clap::arg!(--url <URL> "News sitemap to read"))
        .arg(format_arg());

    let batch = clap::Command::new("batch")
        .about("Extract every article listed in the news sitemap, one JSON line each")
        .arg(clap::arg!(-l --limit <NUM> "Maximum number of articles").default_value("15"))
        .arg(clap::arg!(--url <URL> "News sitemap to read"))
        .arg(clap::arg!(-c --concurrency <NUM> "Articles fetched at the same time").default_value("4"))
        .arg(clap::arg!(--"min-length" <NUM> "Reject articles shorter than this many characters").default_value("0"));

    let mut cmd = clap::Command::new("newsdesk")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Clean article text from news pages")
        .arg(clap::arg!(-v --verbose "Enable debug logging").global(true))
        .subcommand_required(true)
        .subcommands([extract, feed, batch]);

    for shell in [
        clap_complete::Shell::Bash,
        clap_complete::Shell::Zsh,
        clap_complete::Shell::Fish,
        clap_complete::Shell::PowerShell,
    ] {
        clap_complete::generate_to(shell, &mut cmd, "newsdesk", &completions_dir).unwrap();
    }

    println!("cargo:warning=Shell completions generated in: {}", completions_dir.display());
}
