//! Mars dashboard: a NASA proxy server and the dashboard client that renders
//! the Astronomy Picture of the Day and Mars rover photos through it.
pub mod clients;
pub mod config;
pub mod dashboard;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod routes;
pub mod services;
pub mod utils;

use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Install the global `tracing` subscriber, filtered by `RUST_LOG`
pub fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
