use super::types::{HealthResponse, MessageRequest, MessageResponse};
use crate::gateway::ChatGateway;
use axum::{extract::State, response::Json};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<ChatGateway>,
    pub shutdown: CancellationToken,
}

/// Always answers 200: pipeline failures are already folded into the reply.
/// If the caller disconnects, axum drops this future and the inference call
/// with it.
pub async fn message(
    State(state): State<AppState>,
    Json(request): Json<MessageRequest>,
) -> Json<MessageResponse> {
    let conversation_id = request
        .conversation_id
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let cancel = state.shutdown.child_token();
    let reply = state
        .gateway
        .handle(
            &conversation_id,
            request.first_name.as_deref(),
            &request.text,
            &cancel,
        )
        .await;

    info!("Replied to conversation: {}", conversation_id);
    Json(MessageResponse {
        conversation_id,
        reply: reply.text,
    })
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
