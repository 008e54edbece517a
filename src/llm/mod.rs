pub mod error;
pub mod mock;
pub mod openai;
pub mod types;

use async_trait::async_trait;

pub use error::LlmError;
pub use types::{ChatRequest, ChatResponse, Usage};

/// One chat-completion round trip. Transport, auth and model choice live behind this.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, LlmError>;
}
