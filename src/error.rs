use thiserror::Error;

/// Main error type for Embeval
#[derive(Error, Debug)]
pub enum EmbevalError {
    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Feature file parse errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Convenient Result type using EmbevalError
pub type Result<T> = std::result::Result<T, EmbevalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EmbevalError::InvalidInput("Test error".to_string());
        assert!(err.to_string().contains("Invalid input"));
        assert!(err.to_string().contains("Test error"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: EmbevalError = io_err.into();
        assert!(matches!(err, EmbevalError::Io(_)));
    }
}
