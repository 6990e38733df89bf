use cinebot::{
    config::{Config, InferenceConfig, TelegramConfig},
    gateway::ChatGateway,
    llm::{InferenceClient, OllamaClient, PromptBuilder},
    recommender::RecommendationService,
};
use serde_json::{Value, json};
use std::sync::Arc;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

pub const CHAT_PATH: &str = "/api/chat";

/// Create an inference configuration pointing at `endpoint`
pub fn create_inference_config(endpoint: &str, timeout_secs: u64) -> InferenceConfig {
    InferenceConfig {
        endpoint: endpoint.to_string(),
        model: "llama3".to_string(),
        timeout_secs,
        max_concurrent_requests: 16,
        max_request_chars: 2000,
    }
}

/// Create a test configuration with sensible defaults
pub fn create_test_config(endpoint: &str) -> Config {
    let mut config = Config::default();
    config.inference = create_inference_config(endpoint, 5);
    config.gateway.host = "127.0.0.1".to_string();
    config.logs.level = "debug".to_string();
    config
}

pub fn create_telegram_config(api_base: &str) -> TelegramConfig {
    TelegramConfig {
        token: Some("123:abc".to_string()),
        api_base: api_base.to_string(),
        poll_timeout_secs: 1,
        retry_delay_secs: 1,
    }
}

pub fn ollama_reply(content: &str) -> Value {
    json!({
        "model": "llama3",
        "created_at": "2024-05-01T12:00:00Z",
        "message": {"role": "assistant", "content": content},
        "done": true
    })
}

pub async fn mount_chat(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .respond_with(template)
        .mount(server)
        .await;
}

pub fn ollama_client(server: &MockServer, timeout_secs: u64) -> OllamaClient {
    let endpoint = format!("{}{}", server.uri(), CHAT_PATH);
    OllamaClient::new(&create_inference_config(&endpoint, timeout_secs)).unwrap()
}

/// Client allowing at most `max_concurrent` in-flight calls
pub fn limited_client(
    server: &MockServer,
    timeout_secs: u64,
    max_concurrent: usize,
) -> OllamaClient {
    let endpoint = format!("{}{}", server.uri(), CHAT_PATH);
    let mut config = create_inference_config(&endpoint, timeout_secs);
    config.max_concurrent_requests = max_concurrent;
    OllamaClient::new(&config).unwrap()
}

pub fn service_with(client: Arc<dyn InferenceClient>) -> RecommendationService {
    RecommendationService::new(PromptBuilder::new("llama3", 2000), client)
}

pub fn gateway_with(client: Arc<dyn InferenceClient>) -> Arc<ChatGateway> {
    Arc::new(ChatGateway::new(service_with(client)))
}
