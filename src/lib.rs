pub mod config;
pub mod error;
pub mod gateway;
pub mod llm;
pub mod recommender;

pub use error::{Error, Result};

use config::{Config, GatewayMode};
use gateway::ChatGateway;
use llm::{OllamaClient, PromptBuilder};
use recommender::RecommendationService;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Wires the pipeline from configuration. Nothing below this reads the
/// environment.
pub fn build_gateway(config: &Config) -> Result<ChatGateway> {
    let prompts = PromptBuilder::new(
        config.inference.model.clone(),
        config.inference.max_request_chars,
    );
    let client = Arc::new(OllamaClient::new(&config.inference)?);
    let recommender = RecommendationService::new(prompts, client);
    Ok(ChatGateway::new(recommender))
}

/// Runs the configured gateway until `shutdown` is cancelled.
pub async fn run(config: Config, shutdown: CancellationToken) -> Result<()> {
    let chat = Arc::new(build_gateway(&config)?);

    match config.gateway.mode {
        GatewayMode::Http => gateway::http::run(&config.gateway, chat, shutdown).await,
        GatewayMode::Telegram => {
            gateway::telegram::run(&config.gateway.telegram, chat, shutdown).await
        }
    }
}
