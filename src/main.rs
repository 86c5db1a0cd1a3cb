//! Event Usher HTTP server.
//!
//! Bridges paid ticket orders from a Pretix instance into chat-room invites.

use std::sync::Arc;
use std::time::Duration;

use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use event_usher::adapters::chat::StubChatService;
use event_usher::adapters::http::{router, AppState};
use event_usher::adapters::pretix::PretixClient;
use event_usher::adapters::storage::{FileProcessedOrderStore, FileRoutingStore, FileTokenStore};
use event_usher::application::BridgeService;
use event_usher::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.server.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        instance = %config.pretix.instance_url,
        data_dir = %config.storage.data_dir.display(),
        "starting event usher"
    );

    let pretix = Arc::new(PretixClient::new(
        config.pretix.clone(),
        Arc::new(FileTokenStore::new(config.storage.token_path())),
        Arc::new(FileProcessedOrderStore::new(config.storage.processed_path())),
    )?);

    let service = Arc::new(BridgeService::new(
        pretix,
        Arc::new(StubChatService::new()),
        Arc::new(FileRoutingStore::new(config.storage.routing_path())),
    ));
    service.start().await?;

    let status = service.status().await;
    if !status.authorized {
        info!(
            authorize_url = %service.authorization_url(),
            "not yet authorized; visit the authorize URL to grant access"
        );
    }

    let app = router(AppState {
        service: service.clone(),
    })
    .layer(TraceLayer::new_for_http())
    .layer(TimeoutLayer::new(Duration::from_secs(
        config.server.request_timeout_secs,
    )));

    let addr = config.server.socket_addr();
    info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    service.shutdown().await?;
    info!("shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "could not listen for shutdown signal");
        return;
    }
    info!("shutdown signal received");
}
