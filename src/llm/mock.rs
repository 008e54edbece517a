use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{ChatRequest, ChatResponse, LlmClient, LlmError};

/// Replays scripted responses in order and records every request it saw.
#[derive(Debug, Default)]
pub struct MockClient {
    script: Mutex<VecDeque<Result<ChatResponse, LlmError>>>,
    seen: Mutex<Vec<ChatRequest>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&self, resp: Result<ChatResponse, LlmError>) {
        self.script.lock().unwrap().push_back(resp);
    }

    pub fn reply(&self, content: &str) {
        self.enqueue(Ok(ChatResponse::text(content)));
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for MockClient {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, LlmError> {
        self.seen.lock().unwrap().push(request);
        self.script.lock().unwrap().pop_front().unwrap_or(Err(LlmError::Exhausted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_in_order_then_runs_dry() {
        let mock = MockClient::new();
        mock.reply("first");
        mock.enqueue(Err(LlmError::Timeout));

        let req = ChatRequest::new("sys", "user");
        assert_eq!(mock.complete(req.clone()).await.unwrap().content, "first");
        assert!(matches!(mock.complete(req.clone()).await, Err(LlmError::Timeout)));
        assert!(matches!(mock.complete(req.clone()).await, Err(LlmError::Exhausted)));
        assert_eq!(mock.requests().len(), 3);
        assert_eq!(mock.requests()[0], req);
    }
}
