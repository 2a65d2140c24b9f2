//! Startup errors for the terminal host.

use meridian_core::error::DomainError;
use thiserror::Error;

/// Errors that stop the binary before a session begins.
#[derive(Debug, Error)]
pub enum AppError {
    /// An environment variable is present but invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The story could not be loaded.
    #[error("story error: {0}")]
    Domain(#[from] DomainError),

    /// Terminal I/O failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_error_converts_and_keeps_its_message() {
        let err: AppError = DomainError::Validation("missing start node".into()).into();

        assert_eq!(
            err.to_string(),
            "story error: validation error: missing start node"
        );
    }

    #[test]
    fn test_config_error_names_the_problem() {
        let err = AppError::Config("MERIDIAN_TICK_MS must be positive".into());

        assert_eq!(
            err.to_string(),
            "configuration error: MERIDIAN_TICK_MS must be positive"
        );
    }
}
