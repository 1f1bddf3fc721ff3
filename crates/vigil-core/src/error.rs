use thiserror::Error;

/// Top-level error type for the Vigil system.
///
/// Subsystem crates define their own error types (backend, provider, resolve)
/// and convert into `VigilError` at the application boundary so that the `?`
/// operator works across crate seams.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VigilError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Language backend error: {0}")]
    Backend(String),

    #[error("Monitoring provider error: {0}")]
    Provider(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for VigilError {
    fn from(err: toml::de::Error) -> Self {
        VigilError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for VigilError {
    fn from(err: toml::ser::Error) -> Self {
        VigilError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for VigilError {
    fn from(err: serde_json::Error) -> Self {
        VigilError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Vigil operations.
pub type Result<T> = std::result::Result<T, VigilError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VigilError::Config("missing field".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing field");

        let err = VigilError::Backend("timeout".to_string());
        assert_eq!(err.to_string(), "Language backend error: timeout");

        let err = VigilError::Provider("502".to_string());
        assert_eq!(err.to_string(), "Monitoring provider error: 502");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: VigilError = io_err.into();
        assert!(matches!(err, VigilError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_from_toml_de() {
        let bad_toml = "invalid = [[[";
        let parsed: std::result::Result<toml::Value, _> = toml::from_str(bad_toml);
        let err: VigilError = parsed.unwrap_err().into();
        assert!(matches!(err, VigilError::Config(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let bad_json = "{ invalid json }";
        let parsed: std::result::Result<serde_json::Value, _> = serde_json::from_str(bad_json);
        let err: VigilError = parsed.unwrap_err().into();
        assert!(matches!(err, VigilError::Serialization(_)));
    }

    #[test]
    fn test_result_type_with_question_mark() {
        fn inner() -> Result<String> {
            let io_result: std::result::Result<i32, std::io::Error> = Ok(42);
            let _value = io_result?;
            Ok("success".to_string())
        }

        assert_eq!(inner().unwrap(), "success");
    }
}
