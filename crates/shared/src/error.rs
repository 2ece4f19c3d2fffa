use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NotFound,
    Unauthorized,
    Unavailable,
    Validation,
    Internal,
}

/// Error surfaced to a screen's view state. Cloneable so it can live in state
/// snapshots and on broadcast channels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{code:?}: {message}")]
pub struct ScreenError {
    pub code: ErrorCode,
    pub message: String,
}

impl ScreenError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Classifies a collaborator failure by its message, falling back to
    /// `Internal`.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_ascii_lowercase();
        let code = if lower.contains("not found") || lower.contains("unknown") {
            ErrorCode::NotFound
        } else if lower.contains("unauthorized")
            || lower.contains("logged out")
            || lower.contains("session expired")
        {
            ErrorCode::Unauthorized
        } else if lower.contains("unavailable")
            || lower.contains("timed out")
            || lower.contains("connection")
        {
            ErrorCode::Unavailable
        } else if lower.contains("invalid") || lower.contains("not aired") {
            ErrorCode::Validation
        } else {
            ErrorCode::Internal
        };

        Self { code, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_common_collaborator_failures() {
        assert_eq!(
            ScreenError::from_message("episode 7 not found").code,
            ErrorCode::NotFound
        );
        assert_eq!(
            ScreenError::from_message("Trakt session expired").code,
            ErrorCode::Unauthorized
        );
        assert_eq!(
            ScreenError::from_message("connection refused").code,
            ErrorCode::Unavailable
        );
        assert_eq!(
            ScreenError::from_message("episode has not aired yet").code,
            ErrorCode::Validation
        );
        assert_eq!(
            ScreenError::from_message("boom").code,
            ErrorCode::Internal
        );
    }
}
