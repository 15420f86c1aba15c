//! Noughts - multi-session tic-tac-toe server binary.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use axum::body::Body;
use axum::http::Request;
use clap::Parser;
use cli::Cli;
use noughts::{ChangeNotifier, GameStore, ServerConfig, SessionRegistry};
use std::sync::Arc;
use tower::ServiceBuilder;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    info!(
        host = %config.host(),
        port = config.port(),
        data_file = %config.data_file().display(),
        "Starting noughts server"
    );

    let store = GameStore::new(config.data_file().clone());
    let notifier = Arc::new(ChangeNotifier::new());
    let registry = SessionRegistry::new(store, notifier);

    // Request logging in front of the router
    let app = noughts::router(registry).layer(ServiceBuilder::new().map_request(
        |req: Request<Body>| {
            debug!(method = %req.method(), uri = %req.uri(), "Incoming HTTP request");
            req
        },
    ));

    let listener =
        tokio::net::TcpListener::bind((config.host().as_str(), *config.port())).await?;
    info!("Server ready at http://{}:{}/", config.host(), config.port());
    axum::serve(listener, app).await?;

    Ok(())
}

/// Resolves the effective configuration.
///
/// Precedence: CLI flags, then the `PORT` environment variable, then the
/// config file, then built-in defaults.
fn load_config(cli: &Cli) -> Result<ServerConfig> {
    let mut config = match &cli.config {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    };

    if let Ok(port) = std::env::var("PORT")
        && let Ok(port) = port.parse()
    {
        config.set_port(port);
    }
    if let Some(host) = &cli.host {
        config.set_host(host.clone());
    }
    if let Some(port) = cli.port {
        config.set_port(port);
    }
    if let Some(path) = &cli.data_file {
        config.set_data_file(path.clone());
    }

    Ok(config)
}
