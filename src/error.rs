//! Error types for Cultura
//!
//! This module defines all error types used throughout the simulator,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Cultura operations
///
/// Configuration-class errors (`Config`, `UnknownPersonality`,
/// `UnknownPersona`) reject the operation outright; they are never
/// papered over with a default persona or personality.
#[derive(Error, Debug)]
pub enum CulturaError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A personality tag outside the closed set
    #[error("Unknown personality: {0}")]
    UnknownPersonality(String),

    /// A persona id that is not in the catalog
    #[error("Unknown persona: {0}")]
    UnknownPersona(String),

    /// User message text was empty or whitespace-only
    #[error("Message text cannot be empty")]
    EmptyMessage,

    /// The simulator was stopped and no longer accepts mutations
    #[error("Simulator has been stopped")]
    SimulatorStopped,

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl CulturaError {
    /// Returns true for the configuration class of errors
    ///
    /// # Examples
    ///
    /// ```
    /// use cultura::error::CulturaError;
    ///
    /// assert!(CulturaError::UnknownPersona("p-99".to_string()).is_configuration());
    /// assert!(!CulturaError::EmptyMessage.is_configuration());
    /// ```
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::UnknownPersonality(_) | Self::UnknownPersona(_)
        )
    }
}

/// Result type alias for Cultura operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation. Callers that
/// need the error class downcast to [`CulturaError`].
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = CulturaError::Config("invalid format".to_string());
        assert_eq!(error.to_string(), "Configuration error: invalid format");
    }

    #[test]
    fn test_unknown_personality_display() {
        let error = CulturaError::UnknownPersonality("grumpy".to_string());
        assert_eq!(error.to_string(), "Unknown personality: grumpy");
    }

    #[test]
    fn test_unknown_persona_display() {
        let error = CulturaError::UnknownPersona("p-404".to_string());
        assert_eq!(error.to_string(), "Unknown persona: p-404");
    }

    #[test]
    fn test_empty_message_display() {
        assert_eq!(
            CulturaError::EmptyMessage.to_string(),
            "Message text cannot be empty"
        );
    }

    #[test]
    fn test_configuration_class() {
        assert!(CulturaError::Config("x".to_string()).is_configuration());
        assert!(CulturaError::UnknownPersonality("x".to_string()).is_configuration());
        assert!(!CulturaError::SimulatorStopped.is_configuration());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: CulturaError = io_error.into();
        assert!(matches!(error, CulturaError::Io(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_str = "invalid: : yaml";
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>(yaml_str).unwrap_err();
        let error: CulturaError = yaml_error.into();
        assert!(matches!(error, CulturaError::Yaml(_)));
    }

    #[test]
    fn test_downcast_through_anyhow() {
        let result: Result<()> = Err(CulturaError::EmptyMessage.into());
        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CulturaError>(),
            Some(CulturaError::EmptyMessage)
        ));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CulturaError>();
    }
}
