use std::time::Duration;

use async_trait::async_trait;

use crate::llm::{ChatRequest, LlmClient, LlmError};

pub const SUMMARY_SYSTEM_PROMPT: &str =
    "You are a helpful assistant that concisely summarizes the meaning of text in very few words.";
const DEFAULT_TEMPERATURE: f32 = 0.3;
const DEFAULT_MAX_TOKENS: u32 = 1024;
const DEFAULT_MAX_RETRIES: u32 = 2;
const DEFAULT_RETRY_BACKOFF_MS: u64 = 500;

/// The injected chunk -> summary capability driven by the reducer.
#[async_trait]
pub trait Summarizer: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn summarize(&self, chunk: &str) -> Result<String, Self::Error>;
}

pub fn summary_prompt(chunk: &str) -> String {
    format!("Please provide a very concise summary of the following content:\n\n{chunk}")
}

#[derive(Clone, Debug)]
pub struct LlmSummarizerConfig {
    pub model: Option<String>,
    pub system_prompt: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub max_retries: u32,
    pub retry_backoff: Duration,
}

impl Default for LlmSummarizerConfig {
    fn default() -> Self {
        Self {
            model: None,
            system_prompt: SUMMARY_SYSTEM_PROMPT.to_string(),
            max_tokens: Some(DEFAULT_MAX_TOKENS),
            temperature: Some(DEFAULT_TEMPERATURE),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_backoff: Duration::from_millis(DEFAULT_RETRY_BACKOFF_MS),
        }
    }
}

/// Summarizes chunks through a chat-completion client. Retryable client errors are
/// retried here, never by the reducer.
pub struct LlmSummarizer<C> {
    client: C,
    cfg: LlmSummarizerConfig,
}

impl<C: LlmClient> LlmSummarizer<C> {
    pub fn new(client: C, cfg: LlmSummarizerConfig) -> Self {
        Self { client, cfg }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    fn build_request(&self, chunk: &str) -> ChatRequest {
        ChatRequest::new(self.cfg.system_prompt.as_str(), summary_prompt(chunk))
            .with_model(self.cfg.model.clone())
            .with_max_tokens(self.cfg.max_tokens)
            .with_temperature(self.cfg.temperature)
    }
}

#[async_trait]
impl<C: LlmClient> Summarizer for LlmSummarizer<C> {
    type Error = LlmError;

    async fn summarize(&self, chunk: &str) -> Result<String, LlmError> {
        let request = self.build_request(chunk);
        let mut attempt = 0u32;
        loop {
            match self.client.complete(request.clone()).await {
                Ok(resp) => {
                    if resp.was_truncated() {
                        tracing::debug!(max_tokens = ?self.cfg.max_tokens, "summary stopped at the token limit");
                    }
                    return Ok(resp.content.trim().to_string());
                }
                Err(err) if err.is_retryable() && attempt < self.cfg.max_retries => {
                    attempt += 1;
                    tracing::warn!(attempt, error = %err, "summarize call failed, retrying");
                    tokio::time::sleep(self.cfg.retry_backoff).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::mock::MockClient;
    use crate::llm::types::ChatRole;

    fn quick_cfg() -> LlmSummarizerConfig {
        LlmSummarizerConfig { retry_backoff: Duration::ZERO, ..Default::default() }
    }

    #[tokio::test]
    async fn sends_system_and_chunk_prompt() {
        let mock = MockClient::new();
        mock.reply("  short gist \n");
        let summarizer = LlmSummarizer::new(mock, quick_cfg());

        let out = summarizer.summarize("Lecture notes.").await.unwrap();
        assert_eq!(out, "short gist");

        let seen = summarizer.client().requests();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].messages[0].role, ChatRole::System);
        assert_eq!(seen[0].messages[0].content, SUMMARY_SYSTEM_PROMPT);
        assert!(seen[0].messages[1].content.ends_with("\n\nLecture notes."));
        assert_eq!(seen[0].max_tokens, Some(1024));
        assert_eq!(seen[0].temperature, Some(0.3));
    }

    #[tokio::test]
    async fn retries_retryable_errors() {
        let mock = MockClient::new();
        mock.enqueue(Err(LlmError::Timeout));
        mock.reply("ok");
        let summarizer = LlmSummarizer::new(mock, quick_cfg());

        assert_eq!(summarizer.summarize("x").await.unwrap(), "ok");
        assert_eq!(summarizer.client().requests().len(), 2);
    }

    #[tokio::test]
    async fn gives_up_on_permanent_errors() {
        let mock = MockClient::new();
        mock.enqueue(Err(LlmError::MissingApiKey));
        mock.reply("never reached");
        let summarizer = LlmSummarizer::new(mock, quick_cfg());

        let err = summarizer.summarize("x").await.unwrap_err();
        assert!(matches!(err, LlmError::MissingApiKey));
        assert_eq!(summarizer.client().requests().len(), 1);
    }

    #[tokio::test]
    async fn stops_after_max_retries() {
        let mock = MockClient::new();
        for _ in 0..3 {
            mock.enqueue(Err(LlmError::Timeout));
        }
        let summarizer = LlmSummarizer::new(mock, LlmSummarizerConfig { max_retries: 1, ..quick_cfg() });

        let err = summarizer.summarize("x").await.unwrap_err();
        assert!(matches!(err, LlmError::Timeout));
        assert_eq!(summarizer.client().requests().len(), 2);
    }
}
