use thiserror::Error;

/// Common error types used across the application.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Schedule error: {0}")]
    Schedule(String),
}

impl AppError {
    /// Error for an environment variable that is set but cannot be parsed.
    pub fn invalid_var(key: &str, expected: &str) -> Self {
        AppError::Config(format!("{} must be a valid {}", key, expected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_var_message() {
        let err = AppError::invalid_var("EMAIL_PORT", "u16");
        assert_eq!(
            err.to_string(),
            "Configuration error: EMAIL_PORT must be a valid u16"
        );
    }
}
