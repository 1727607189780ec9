//! OP-47 Titling Server
//!
//! A Rust-based broadcast subtitle inserter that converts WebVTT caption
//! files into ETS 300 706 teletext pages carried as OP-47 payloads, and
//! dispatches them to a video mixer in sync with playback — driven either
//! by the mixer's timecode feed or by a local clock.

mod config;
mod config_file;
mod dispatch;
mod error;
mod http;
mod scheduler;
mod segment;
mod state;
mod teletext;
mod timecode;
mod vtt;

use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ServerConfig;
use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::http::create_router;
use crate::state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
const APP_NAME: &str = "op47-titler";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    init_logging();

    tracing::info!("{} v{} starting", APP_NAME, VERSION);

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());
    let config = if std::path::Path::new(&config_path).exists() {
        match crate::config_file::ConfigFile::from_file(&config_path) {
            Ok(cf) => cf.into_server_config(),
            Err(e) => {
                tracing::warn!(
                    "Failed to load config file {}: {}. Using defaults.",
                    config_path,
                    e
                );
                ServerConfig::default()
            }
        }
    } else {
        ServerConfig::default()
    };
    tracing::info!("Configuration loaded: {:?}", config);

    // Downstream link and application state
    let dispatcher = Arc::new(Dispatcher::spawn(
        &config.downstream,
        config.teletext.clone(),
    ));
    let state = Arc::new(AppState::new(config.clone(), dispatcher.clone()));

    // Prime the downstream link so the operator sees the page path working
    dispatcher.send_dummy_page();

    // Background task: external timecode ingestion
    {
        let timecode_config = config.timecode.clone();
        let shared = state.timecode.clone();
        tokio::spawn(async move {
            if let Err(e) = crate::timecode::run_listener(timecode_config, shared).await {
                tracing::error!("Timecode listener failed: {}", e);
            }
        });
    }

    // Build router
    let app = create_router(state.clone());

    // Start server
    let addr: SocketAddr = config.socket_addr().parse().unwrap();
    tracing::info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();

    Ok(())
}

/// Initialize logging with tracing
fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "op47_titler=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
