use async_trait::async_trait;
use cinebot::llm::{InferenceClient, InferenceResult, InstructionPayload};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use wiremock::{Request, Respond, ResponseTemplate};

/// Mock inference client for testing
#[derive(Debug, Clone)]
pub struct MockInferenceClient {
    pub result: InferenceResult,
    pub payloads: Arc<Mutex<Vec<InstructionPayload>>>,
}

impl MockInferenceClient {
    pub fn new(result: InferenceResult) -> Self {
        Self {
            result,
            payloads: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn succeeding(content: &str) -> Self {
        Self::new(InferenceResult::success(content))
    }

    pub fn get_payloads(&self) -> Vec<InstructionPayload> {
        self.payloads.lock().unwrap().clone()
    }
}

#[async_trait]
impl InferenceClient for MockInferenceClient {
    async fn call(&self, payload: &InstructionPayload) -> InferenceResult {
        self.payloads.lock().unwrap().push(payload.clone());
        self.result.clone()
    }
}

/// Answers each chat request with the user directive it received, after a
/// delay that depends on the body length so concurrent calls interleave.
pub struct EchoResponder;

impl Respond for EchoResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = match serde_json::from_slice(&request.body) {
            Ok(body) => body,
            Err(_) => return ResponseTemplate::new(400),
        };
        let user = body["messages"][1]["content"].as_str().unwrap_or_default();
        let delay_ms = (user.len() % 7) as u64 * 15;

        ResponseTemplate::new(200)
            .set_delay(std::time::Duration::from_millis(delay_ms))
            .set_body_json(json!({
                "model": body["model"],
                "message": {"role": "assistant", "content": format!("  eco: {}  ", user)},
                "done": true
            }))
    }
}
