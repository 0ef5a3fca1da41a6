use thiserror::Error;

use crate::domain::platform::Platform;

#[derive(Error, Debug)]
pub enum PushError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),

    #[error("Unknown platform: {0}")]
    UnknownPlatform(String),

    #[error("Unknown audience type: {0}")]
    UnknownAudienceType(String),

    #[error("Override '{key}' is not allowed for platform {platform}")]
    OverrideNotAllowed { platform: Platform, key: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PushError {
    /// Whether this error comes from the permissive mutator paths.
    ///
    /// Rejected overrides and unknown platform/audience names leave the
    /// builder untouched, so callers may safely ignore them.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            PushError::UnknownPlatform(_)
                | PushError::UnknownAudienceType(_)
                | PushError::OverrideNotAllowed { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, PushError>;
