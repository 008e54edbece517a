use reqwest::StatusCode;

#[derive(Debug)]
pub enum LlmError {
    MissingApiKey,
    EmptyMessages,
    Transport(reqwest::Error),
    Timeout,
    Status { status: StatusCode, message: String },
    Decode(serde_json::Error),
    /// The mock ran out of scripted responses.
    Exhausted,
}

impl LlmError {
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() { LlmError::Timeout } else { LlmError::Transport(err) }
    }

    /// Transport hiccups, timeouts, rate limits and 5xx are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::Timeout | LlmError::Transport(_) => true,
            LlmError::Status { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            LlmError::MissingApiKey | LlmError::EmptyMessages | LlmError::Decode(_) | LlmError::Exhausted => false,
        }
    }
}

impl std::fmt::Display for LlmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmError::MissingApiKey => write!(f, "OPENAI_API_KEY is not set"),
            LlmError::EmptyMessages => write!(f, "chat request has no messages"),
            LlmError::Transport(err) => write!(f, "transport error: {err}"),
            LlmError::Timeout => write!(f, "request timed out"),
            LlmError::Status { status, message } => write!(f, "endpoint returned {status}: {message}"),
            LlmError::Decode(err) => write!(f, "could not decode completion: {err}"),
            LlmError::Exhausted => write!(f, "no scripted response left"),
        }
    }
}

impl std::error::Error for LlmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LlmError::Transport(err) => Some(err),
            LlmError::Decode(err) => Some(err),
            _ => None,
        }
    }
}
