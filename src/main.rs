/// Proxy server entry point
use mars_dashboard::clients::NasaClient;
use mars_dashboard::config::ServerConfig;
use mars_dashboard::errors::ErrorResponder;
use mars_dashboard::handlers::AppState;
use mars_dashboard::routes::build_router;
use mars_dashboard::services::ProxyService;
use std::sync::Arc;
use tokio::signal;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    mars_dashboard::init_logging();

    // Load configuration
    let config = ServerConfig::from_env()?;
    info!(
        "Configuration loaded (environment: {:?}, sol: {})",
        config.environment, config.rover_sol
    );
    if config.nasa_api_key.is_empty() {
        info!("No NASA API key configured, upstream requests are sent without one");
    }

    // Initialize clients and services
    let nasa_client = NasaClient::new(
        config.nasa_api_url.clone(),
        config.nasa_api_key.clone(),
        config.rover_sol,
        config.http_timeout,
    )?;
    let proxy = Arc::new(ProxyService::new(nasa_client));

    let state = AppState {
        proxy,
        responder: ErrorResponder::new(config.environment.exposes_error_detail()),
    };

    let app = build_router(state);

    // Start server
    let address = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("mars-dashboard proxy listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
