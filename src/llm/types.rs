use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChatRole {
    System,
    User,
}

impl ChatRole {
    pub(crate) fn as_api_str(&self) -> &'static str {
        match self {
            ChatRole::System => "system",
            ChatRole::User => "user",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: ChatRole::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }
}

/// A system instruction plus one user turn; unset knobs fall back to client defaults.
#[derive(Clone, Debug, PartialEq)]
pub struct ChatRequest {
    pub model: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl ChatRequest {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            model: None,
            messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
            max_tokens: None,
            temperature: None,
        }
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChatResponse {
    pub content: String,
    pub finish_reason: Option<String>,
    pub usage: Option<Usage>,
}

impl ChatResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self { content: content.into(), finish_reason: None, usage: None }
    }

    /// The endpoint stopped at `max_tokens` rather than at a natural end.
    pub fn was_truncated(&self) -> bool {
        self.finish_reason.as_deref() == Some("length")
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Usage {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_request_has_system_then_user() {
        let req = ChatRequest::new("Be brief.", "Week 4: graphs.")
            .with_model(Some("mixtral".into()))
            .with_max_tokens(Some(256));
        assert_eq!(req.messages[0], ChatMessage::system("Be brief."));
        assert_eq!(req.messages[1], ChatMessage::user("Week 4: graphs."));
        assert_eq!(req.model.as_deref(), Some("mixtral"));
        assert_eq!(req.max_tokens, Some(256));
        assert_eq!(req.temperature, None);
    }

    #[test]
    fn only_length_stops_count_as_truncated() {
        let mut resp = ChatResponse::text("partial answer");
        assert!(!resp.was_truncated());
        resp.finish_reason = Some("stop".into());
        assert!(!resp.was_truncated());
        resp.finish_reason = Some("length".into());
        assert!(resp.was_truncated());
    }
}
