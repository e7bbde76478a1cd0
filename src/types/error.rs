use thiserror::Error;

/// optiscale error types
#[derive(Error, Debug)]
pub enum OptiscaleError {
    /// Billing data is missing a required column or has a bad cell
    #[error("malformed input{}: {reason}", line_suffix(.line))]
    MalformedInput {
        /// 1-based line in the CSV text (header is line 1)
        line: Option<usize>,
        reason: String,
    },

    /// An action targets a service that has no spend in the profile
    #[error("unknown service: {0}")]
    UnknownService(String),

    /// A numeric argument is out of its accepted range
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Tool name not present in the registry
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// File I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failed
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),
}

fn line_suffix(line: &Option<usize>) -> String {
    line.map(|l| format!(" at line {}", l)).unwrap_or_default()
}

impl OptiscaleError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            line: None,
            reason: reason.into(),
        }
    }

    pub fn malformed_at(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            line: Some(line),
            reason: reason.into(),
        }
    }
}

/// Result type alias for optiscale
pub type Result<T> = std::result::Result<T, OptiscaleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_malformed_with_line() {
        let err = OptiscaleError::malformed_at(3, "amount is not numeric: 'abc'");
        assert_eq!(
            err.to_string(),
            "malformed input at line 3: amount is not numeric: 'abc'"
        );
    }

    #[test]
    fn test_error_display_malformed_without_line() {
        let err = OptiscaleError::malformed("csv text is empty");
        assert_eq!(err.to_string(), "malformed input: csv text is empty");
    }

    #[test]
    fn test_error_display_unknown_service() {
        let err = OptiscaleError::UnknownService("bigquery".into());
        assert_eq!(err.to_string(), "unknown service: bigquery");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: OptiscaleError = io_err.into();
        assert!(err.to_string().contains("io error"));
    }
}
