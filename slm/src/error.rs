use meetmap_core::error::{ErrorCode, MeetmapError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
    #[error("request to model backend failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP {status} from model backend: {body}")]
    Http { status: u16, body: String },
    #[error("Non-JSON response: {0}")]
    NonJson(String),
    #[error("Unexpected response shape: {0}")]
    UnexpectedShape(String),
}

impl MeetmapError for GatewayError {
    fn error_code(&self) -> ErrorCode {
        match self {
            GatewayError::NotConfigured(_) => ErrorCode::Internal,
            GatewayError::Transport(_) => ErrorCode::Upstream,
            GatewayError::Http { .. } => ErrorCode::Upstream,
            GatewayError::NonJson(_) => ErrorCode::Upstream,
            GatewayError::UnexpectedShape(_) => ErrorCode::Upstream,
        }
    }
}

/// First `max` characters of `text`, for error messages quoting a response body.
pub(crate) fn clip(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
