pub mod app;
pub mod config;
pub mod routes;

pub use app::{AppState, build_app};
pub use config::Config;
