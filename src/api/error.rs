use thiserror::Error;

/// Stable classification of an [`ApiError`], used in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCode {
    Transport,
    Rejected,
    NotFound,
    Decode,
}

impl ApiErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transport => "network_error",
            Self::Rejected => "rejected",
            Self::NotFound => "not_found",
            Self::Decode => "decode_error",
        }
    }
}

/// A failed backend call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never got a response.
    #[error("network error: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("{message} (HTTP {status})")]
    Rejected { status: u16, message: String },

    #[error("{0} not found")]
    NotFound(String),

    /// The response body was not what we expected.
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    #[must_use]
    pub const fn code(&self) -> ApiErrorCode {
        match self {
            Self::Transport(_) => ApiErrorCode::Transport,
            Self::Rejected { .. } => ApiErrorCode::Rejected,
            Self::NotFound(_) => ApiErrorCode::NotFound,
            Self::Decode(_) => ApiErrorCode::Decode,
        }
    }

    /// Build a rejection from a response body, preferring its `error` or
    /// `message` member.
    pub fn rejected(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|value| {
                ["error", "message"]
                    .iter()
                    .find_map(|key| value.get(key)?.as_str().map(str::to_string))
            })
            .unwrap_or_else(|| {
                let trimmed = body.trim();
                if trimmed.is_empty() {
                    "request rejected".to_string()
                } else {
                    trimmed.chars().take(200).collect()
                }
            });
        Self::Rejected { status, message }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
