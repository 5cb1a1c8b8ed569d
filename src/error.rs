// src/error.rs
// Standardized error types for CineQuery

use thiserror::Error;

/// Main error type for the CineQuery library
///
/// `Validation`, `Auth` and `Backend` carry the user-facing message verbatim:
/// either the backend's own `error` field or the fixed fallback copy for the
/// operation that failed.
#[derive(Error, Debug)]
pub enum CineQueryError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Auth(String),

    #[error("{0}")]
    Backend(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("request cancelled")]
    Cancelled,

    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience type alias for Result using CineQueryError
pub type Result<T> = std::result::Result<T, CineQueryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_variants_display_verbatim() {
        let err = CineQueryError::Validation("Alla fält måste fyllas i!".to_string());
        assert_eq!(err.to_string(), "Alla fält måste fyllas i!");

        let err = CineQueryError::Auth("Inloggningen misslyckades!".to_string());
        assert_eq!(err.to_string(), "Inloggningen misslyckades!");

        let err = CineQueryError::Backend("Något gick fel.".to_string());
        assert_eq!(err.to_string(), "Något gick fel.");
    }

    #[test]
    fn test_cancelled_error() {
        let err = CineQueryError::Cancelled;
        assert!(err.to_string().contains("cancelled"));
    }

    #[test]
    fn test_config_error() {
        let err = CineQueryError::Config("missing TMDB api key".to_string());
        assert!(err.to_string().contains("configuration error"));
        assert!(err.to_string().contains("missing TMDB api key"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: CineQueryError = io_err.into();
        assert!(matches!(err, CineQueryError::Io(_)));
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<i32>("not json").unwrap_err();
        let err: CineQueryError = json_err.into();
        assert!(matches!(err, CineQueryError::Json(_)));
        assert!(err.to_string().contains("JSON"));
    }

    #[test]
    fn test_debug_impl() {
        let err = CineQueryError::Validation("debug test".to_string());
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("Validation"));
    }
}
