use crate::llm::{ErrorKind, InferenceClient, InferenceResult, PromptBuilder};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

/// Sent whenever the inference endpoint cannot produce an answer. The same
/// text is used for every failure kind.
pub const APOLOGY_TEXT: &str = "Tive um problema para gerar recomendações agora 😥\n\
Tenta mandar o pedido de novo em alguns segundos.";

/// The only artifact handed back to the chat gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyText {
    pub text: String,
}

impl ReplyText {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn apology() -> Self {
        Self::new(APOLOGY_TEXT)
    }
}

/// Orchestrates prompt building and the inference call for one request.
#[derive(Clone)]
pub struct RecommendationService {
    prompts: PromptBuilder,
    client: Arc<dyn InferenceClient>,
}

impl RecommendationService {
    pub fn new(prompts: PromptBuilder, client: Arc<dyn InferenceClient>) -> Self {
        Self { prompts, client }
    }

    /// Produces a reply for `user_text`. Never fails: any inference failure is
    /// logged and replaced by [`APOLOGY_TEXT`].
    pub async fn produce(&self, user_text: &str) -> ReplyText {
        let payload = self.prompts.build(user_text);
        let result = self.client.call(&payload).await;
        Self::into_reply(result)
    }

    /// Cancellable form of [`RecommendationService::produce`].
    pub async fn produce_with_cancel(
        &self,
        user_text: &str,
        cancel: &CancellationToken,
    ) -> ReplyText {
        let payload = self.prompts.build(user_text);
        let result = self.client.call_with_cancel(&payload, cancel).await;
        Self::into_reply(result)
    }

    fn into_reply(result: InferenceResult) -> ReplyText {
        match result {
            InferenceResult::Success { content } if !content.trim().is_empty() => {
                debug!("Recommendation generated ({} chars)", content.len());
                ReplyText::new(content)
            }
            InferenceResult::Success { .. } => {
                error!(
                    kind = %ErrorKind::ProtocolError,
                    "Inference failed: endpoint returned empty content"
                );
                ReplyText::apology()
            }
            InferenceResult::Failure { kind, detail } => {
                error!(kind = %kind, "Inference failed: {}", detail);
                ReplyText::apology()
            }
        }
    }
}
