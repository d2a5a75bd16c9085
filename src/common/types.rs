use reqwest::StatusCode;
use thiserror::Error;

/// Terminal failures of an upload run. Each variant names the stage that failed.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Strava token exchange failed: {0}")]
    TokenExchangeFailed(String),

    #[error(
        "No data fetched from Lionheart API. Please verify the class date, class time, \
         studio code, serial number and user id you provided and try again"
    )]
    SessionUnavailable,

    #[error("TCX generation failed: {0}")]
    DocumentGeneration(String),

    #[error("Failed to save TCX file to {path}: {source}")]
    Persistence {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Strava upload failed: {0}")]
    UploadFailed(String),
}

impl PipelineError {
    /// Short stage label used in the final diagnostic line.
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::TokenExchangeFailed(_) => "token",
            PipelineError::SessionUnavailable => "session",
            PipelineError::DocumentGeneration(_) => "generate",
            PipelineError::Persistence { .. } => "persist",
            PipelineError::UploadFailed(_) => "upload",
        }
    }
}

/// Soft failure of a Lionheart read. Never leaves the client; callers see `None`.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {0}")]
    Http(StatusCode),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Renders a status the way the remote reports it, e.g. `401 Unauthorized`.
pub fn status_text(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {reason}", status.as_u16()),
        None => status.as_u16().to_string(),
    }
}

// Re-export commonly used types for convenience
pub use crate::common::lionheart_client::{LionheartProfile, LionheartSession, SessionQuery};
pub use crate::common::strava_client::{AccessToken, StravaCredentials, UploadParameters, UploadResponse};

pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_text_includes_reason() {
        assert_eq!(status_text(StatusCode::UNAUTHORIZED), "401 Unauthorized");
        assert_eq!(status_text(StatusCode::NOT_FOUND), "404 Not Found");
    }

    #[test]
    fn test_session_unavailable_message_is_actionable() {
        let message = PipelineError::SessionUnavailable.to_string();
        assert!(message.contains("No data fetched from Lionheart API"));
        assert!(message.contains("verify"));
        assert_eq!(PipelineError::SessionUnavailable.stage(), "session");
    }
}
