//! Errors raised by LLM clients

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum BackendError {
    /// The provider rejected or failed the request
    #[error("API error: {message}")]
    ApiError { message: String },

    #[error("Request timed out after {seconds} seconds")]
    TimeoutError { seconds: u64 },

    /// The provider answered with something we cannot use
    #[error("Invalid response from LLM: {message}")]
    InvalidResponse { message: String },

    /// Missing API keys, unknown provider and similar setup problems
    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("{message}")]
    Other { message: String },
}
