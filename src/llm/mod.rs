mod client;
mod prompt;
mod types;

pub use client::{InferenceClient, OllamaClient};
pub use prompt::{PromptBuilder, SYSTEM_DIRECTIVE, TEMPERATURE};
pub use types::*;
