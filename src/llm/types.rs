use serde::{Deserialize, Serialize};
use std::fmt;

/// Fully assembled request for the inference endpoint. Built once per
/// inbound message and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct InstructionPayload {
    pub system_directive: String,
    pub user_directive: String,
    pub model_name: String,
    pub temperature: f32,
    pub streaming: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Timeout,
    NetworkError,
    ProtocolError,
    Cancelled,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Timeout => "timeout",
            Self::NetworkError => "network_error",
            Self::ProtocolError => "protocol_error",
            Self::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Outcome of one inference call. `detail` is for operator logs only.
#[derive(Debug, Clone, PartialEq)]
pub enum InferenceResult {
    Success { content: String },
    Failure { kind: ErrorKind, detail: String },
}

impl InferenceResult {
    pub fn success(content: impl Into<String>) -> Self {
        Self::Success {
            content: content.into(),
        }
    }

    pub fn failure(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self::Failure {
            kind,
            detail: detail.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

// Wire format of the Ollama `/api/chat` endpoint.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatOptions {
    pub temperature: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
    pub options: ChatOptions,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub message: ResponseMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

impl From<&InstructionPayload> for ChatRequest {
    fn from(payload: &InstructionPayload) -> Self {
        Self {
            model: payload.model_name.clone(),
            messages: vec![
                ChatMessage::system(payload.system_directive.clone()),
                ChatMessage::user(payload.user_directive.clone()),
            ],
            stream: payload.streaming,
            options: ChatOptions {
                temperature: payload.temperature,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_chat_request_wire_shape() {
        let payload = InstructionPayload {
            system_directive: "sys".to_string(),
            user_directive: "usr".to_string(),
            model_name: "llama3".to_string(),
            temperature: 0.1,
            streaming: false,
        };

        let value = serde_json::to_value(ChatRequest::from(&payload)).unwrap();
        assert_eq!(value["model"], "llama3");
        assert_eq!(value["stream"], false);
        assert_eq!(
            value["messages"],
            json!([
                {"role": "system", "content": "sys"},
                {"role": "user", "content": "usr"}
            ])
        );
        let temperature = value["options"]["temperature"].as_f64().unwrap();
        assert!((temperature - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_chat_response_ignores_extra_fields() {
        let body = json!({
            "model": "llama3",
            "created_at": "2024-01-01T00:00:00Z",
            "message": {"role": "assistant", "content": "Oi"},
            "done": true
        });
        let response: ChatResponse = serde_json::from_value(body).unwrap();
        assert_eq!(response.message.content, "Oi");
    }

    #[test]
    fn test_error_kind_display() {
        assert_eq!(ErrorKind::Timeout.to_string(), "timeout");
        assert_eq!(ErrorKind::ProtocolError.to_string(), "protocol_error");
    }
}
