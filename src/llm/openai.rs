use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};

use super::types::{ChatRequest, ChatResponse, Usage};
use super::{LlmClient, LlmError};

/// Settings for any endpoint that speaks the OpenAI chat-completions dialect.
#[derive(Clone, Debug)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout: Duration,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".into(),
            model: "gpt-4o-mini".into(),
            temperature: 0.3,
            timeout: Duration::from_secs(60),
        }
    }
}

impl OpenAiConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Unparseable numbers keep their defaults; a blank key counts as unset.
    pub(crate) fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            api_key: get("OPENAI_API_KEY").filter(|k| !k.trim().is_empty()),
            base_url: get("OPENAI_BASE_URL").unwrap_or(defaults.base_url),
            model: get("OPENAI_MODEL").unwrap_or(defaults.model),
            temperature: get("OPENAI_TEMPERATURE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.temperature),
            timeout: get("OPENAI_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        }
    }
}

#[derive(Clone)]
pub struct OpenAiClient {
    http: HttpClient,
    cfg: OpenAiConfig,
}

impl OpenAiClient {
    pub fn new(cfg: OpenAiConfig) -> Result<Self, LlmError> {
        let http = HttpClient::builder()
            .timeout(cfg.timeout)
            .build()
            .map_err(LlmError::from_reqwest)?;
        Ok(Self { http, cfg })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.cfg.base_url.trim_end_matches('/'))
    }

    fn wire_request<'r>(&'r self, req: &'r ChatRequest) -> WireRequest<'r> {
        WireRequest {
            model: req.model.as_deref().unwrap_or(&self.cfg.model),
            temperature: req.temperature.unwrap_or(self.cfg.temperature),
            max_tokens: req.max_tokens,
            messages: req
                .messages
                .iter()
                .map(|m| WireMessage { role: m.role.as_api_str(), content: &m.content })
                .collect(),
        }
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, LlmError> {
        if request.messages.is_empty() {
            return Err(LlmError::EmptyMessages);
        }
        let api_key = self.cfg.api_key.as_deref().ok_or(LlmError::MissingApiKey)?;

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&self.wire_request(&request))
            .send()
            .await
            .map_err(LlmError::from_reqwest)?;

        let status = response.status();
        let body = response.bytes().await.map_err(LlmError::from_reqwest)?;
        if !status.is_success() {
            let message = serde_json::from_slice::<WireErrorEnvelope>(&body)
                .map(|env| env.error.message)
                .unwrap_or_else(|_| String::from_utf8_lossy(&body).trim().to_string());
            return Err(LlmError::Status { status, message });
        }

        parse_completion(&body)
    }
}

fn parse_completion(body: &[u8]) -> Result<ChatResponse, LlmError> {
    let parsed: WireResponse = serde_json::from_slice(body).map_err(LlmError::Decode)?;
    let first = parsed.choices.into_iter().find(|c| c.message.content.is_some());
    let (content, finish_reason) = match first {
        Some(choice) => (choice.message.content.unwrap_or_default(), choice.finish_reason),
        None => (String::new(), None),
    };
    Ok(ChatResponse {
        content,
        finish_reason,
        usage: parsed.usage.map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        }),
    })
}

#[derive(Serialize)]
struct WireRequest<'r> {
    model: &'r str,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    messages: Vec<WireMessage<'r>>,
}

#[derive(Serialize)]
struct WireMessage<'r> {
    role: &'static str,
    content: &'r str,
}

#[derive(Deserialize)]
struct WireResponse {
    #[serde(default)]
    choices: Vec<WireChoice>,
    usage: Option<WireUsage>,
}

#[derive(Deserialize)]
struct WireChoice {
    message: WireReply,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct WireReply {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct WireUsage {
    prompt_tokens: Option<u32>,
    completion_tokens: Option<u32>,
    total_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct WireErrorEnvelope {
    error: WireErrorBody,
}

#[derive(Deserialize)]
struct WireErrorBody {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn client(cfg: OpenAiConfig) -> OpenAiClient {
        OpenAiClient::new(cfg).unwrap()
    }

    #[test]
    fn wire_request_falls_back_to_config() {
        let c = client(OpenAiConfig {
            api_key: Some("test".into()),
            model: "mistralai/Mixtral-8x7B-Instruct-v0.1".into(),
            ..Default::default()
        });
        let req = ChatRequest::new("Summarize tersely.", "Week 1: syllabus. Week 2: labs.")
            .with_max_tokens(Some(1024));
        let value = serde_json::to_value(c.wire_request(&req)).unwrap();

        assert_eq!(value["model"], "mistralai/Mixtral-8x7B-Instruct-v0.1");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "Week 1: syllabus. Week 2: labs.");
        assert_eq!(value["temperature"], 0.3f32 as f64);
        assert_eq!(value["max_tokens"], 1024);
    }

    #[test]
    fn max_tokens_omitted_when_unset() {
        let c = client(OpenAiConfig::default());
        let req = ChatRequest::new("s", "u").with_model(Some("tiny".into()));
        let value = serde_json::to_value(c.wire_request(&req)).unwrap();
        assert_eq!(value["model"], "tiny");
        assert!(value.get("max_tokens").is_none());
    }

    #[test]
    fn endpoint_tolerates_trailing_slash() {
        let c = client(OpenAiConfig {
            base_url: "https://api.together.xyz/v1/".into(),
            ..Default::default()
        });
        assert_eq!(c.endpoint(), "https://api.together.xyz/v1/chat/completions");
    }

    #[test]
    fn config_reads_overrides_and_ignores_garbage() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_BASE_URL", "http://localhost:8080/v1"),
            ("OPENAI_TEMPERATURE", "not-a-number"),
            ("OPENAI_TIMEOUT_SECS", "5"),
        ]);
        let cfg = OpenAiConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(cfg.api_key.as_deref(), Some("sk-test"));
        assert_eq!(cfg.base_url, "http://localhost:8080/v1");
        assert_eq!(cfg.model, "gpt-4o-mini");
        assert_eq!(cfg.temperature, 0.3);
        assert_eq!(cfg.timeout, Duration::from_secs(5));
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let cfg = OpenAiConfig::from_lookup(|k| (k == "OPENAI_API_KEY").then(|| "  ".to_string()));
        assert!(cfg.api_key.is_none());
    }

    #[test]
    fn parse_completion_takes_first_content() {
        let body = br#"{"choices":[{"message":{"role":"assistant","content":"Recursion, week 3."},"finish_reason":"stop"}],
                        "usage":{"prompt_tokens":12,"completion_tokens":4,"total_tokens":16}}"#;
        let resp = parse_completion(body).unwrap();
        assert_eq!(resp.content, "Recursion, week 3.");
        assert_eq!(resp.finish_reason.as_deref(), Some("stop"));
        assert_eq!(resp.usage.unwrap().total_tokens, Some(16));
    }

    #[test]
    fn parse_completion_without_choices_is_empty() {
        let resp = parse_completion(br#"{"choices":[]}"#).unwrap();
        assert_eq!(resp.content, "");
        assert!(resp.usage.is_none());
        assert!(matches!(parse_completion(b"not json"), Err(LlmError::Decode(_))));
    }

    #[tokio::test]
    async fn missing_key_fails_before_sending() {
        let c = client(OpenAiConfig::default());
        let err = c.complete(ChatRequest::new("s", "u")).await.unwrap_err();
        assert!(matches!(err, LlmError::MissingApiKey));
    }
}
