use thiserror::Error;

/// Centralized error types for the plugin core
///
/// All fallible operations in the pipeline converge on this enum for
/// consistent handling. Uses `thiserror` for conversions and display
/// formatting.
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP/transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP status code errors
    #[error("HTTP request failed with status: {0}")]
    HttpStatus(reqwest::StatusCode),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;
