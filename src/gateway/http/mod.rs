pub mod handlers;
pub mod types;

use crate::{Result, config::GatewayConfig, gateway::ChatGateway};
use axum::{
    Router,
    routing::{get, post},
};
use std::{net::SocketAddr, sync::Arc};
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;

pub fn router(gateway: Arc<ChatGateway>, shutdown: CancellationToken) -> Router {
    let app_state = handlers::AppState { gateway, shutdown };

    Router::new()
        .route("/messages", post(handlers::message))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

pub async fn run(
    config: &GatewayConfig,
    gateway: Arc<ChatGateway>,
    shutdown: CancellationToken,
) -> Result<()> {
    let app = router(gateway, shutdown.clone());

    let addr = SocketAddr::new(config.host.parse()?, config.port);
    info!("Starting HTTP gateway on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

    info!("HTTP gateway stopped");
    Ok(())
}
