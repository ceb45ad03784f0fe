//! CLI error types.

use std::fmt;

use buslane::FetchError;

/// Errors surfaced to the terminal user.
#[derive(Debug)]
pub enum CliError {
    /// The arrival feed client could not be created.
    Feed(FetchError),

    /// The Tokio runtime could not be created.
    Runtime(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Feed(e) => write!(f, "feed client error: {}", e),
            CliError::Runtime(msg) => write!(f, "failed to create runtime: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Feed(e) => Some(e),
            CliError::Runtime(_) => None,
        }
    }
}

impl From<FetchError> for CliError {
    fn from(e: FetchError) -> Self {
        CliError::Feed(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_error_display() {
        let err = CliError::Runtime("no threads".to_string());
        assert!(err.to_string().contains("failed to create runtime"));

        let err: CliError = FetchError::Status(502).into();
        assert!(err.to_string().contains("502"));
    }
}
