//! Language model boundary.
//!
//! Defines the `Llm` trait and the OpenAI-compatible provider. The boundary
//! is a black box: a message history goes in, generated text comes out. The
//! only contract is the role/content message format and the configured
//! temperature and token budget.

use async_trait::async_trait;

pub use crate::core_types::{LlmResponse, Message};
use crate::errors::KataError;

pub mod parse;
pub mod providers;

pub use providers::openai::OpenAiClient;

#[async_trait]
pub trait Llm: Send + Sync {
    async fn generate(&self, messages: Vec<Message>) -> Result<LlmResponse, KataError>;
}
