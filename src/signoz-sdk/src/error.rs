use signoz_query::{DecodeError, TranslateError};

/// Errors from the SigNoz SDK
#[derive(Debug, thiserror::Error)]
pub enum SdkError {
    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// API returned an error response
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },
    /// Response body was not JSON
    #[error("Deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),
    /// Configured base URL could not be parsed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
    /// The panel query could not be translated
    #[error(transparent)]
    Translate(#[from] TranslateError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}
