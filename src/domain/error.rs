use std::io;

use thiserror::Error;

/// Failure reported by a forge call.
///
/// Callers branch on the variant: `NotFound` is usually a fallback trigger,
/// everything else is a remote or transport failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ForgeError {
    /// The requested path, ref, template, or milestone does not exist.
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    /// The API answered with a non-success status.
    #[error("GitHub API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The request never produced a response.
    #[error("HTTP request failed: {0}")]
    Transport(String),

    /// The response could not be decoded.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// The client cannot perform this operation (for example GraphQL without a token).
    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

impl ForgeError {
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        ForgeError::NotFound { resource: resource.into() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ForgeError::NotFound { .. })
    }
}

/// Library-wide error type for mender-tools operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// A caller-supplied argument failed validation.
    #[error("{0}")]
    InvalidArgument(String),

    /// Configuration or environment issue.
    #[error("{0}")]
    Configuration(String),

    /// Remote forge failure.
    #[error(transparent)]
    Forge(#[from] ForgeError),

    /// YAML serialization or parsing error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),
}

impl AppError {
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        AppError::InvalidArgument(message.into())
    }

    pub fn config_error<S: Into<String>>(message: S) -> Self {
        AppError::Configuration(message.into())
    }
}
