use thiserror::Error;

/// Errors returned by a [`VisionModel`](crate::client::VisionModel).
#[derive(Error, Debug)]
pub enum InferenceError {
    /// No API key was configured; raised before any request is sent.
    #[error("OpenRouter API key not configured. Please set OPENROUTER_API_KEY environment variable.")]
    MissingApiKey,

    /// The endpoint returned a non-success HTTP status.
    #[error("OpenRouter API error: {status} - {body}")]
    Upstream { status: u16, body: String },

    /// Network-level request failure with context.
    #[error("{context}: {source}")]
    Network {
        context: String,
        source: reqwest::Error,
    },

    /// The response body could not be decoded.
    #[error("Invalid response from OpenRouter: {0}")]
    InvalidResponse(String),

    /// The endpoint answered without any completion.
    #[error("No response from OpenRouter API")]
    EmptyResponse,
}

/// User-facing identification failures.
///
/// Messages are short and non-technical; details are logged where the
/// error is mapped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentifyError {
    #[error("OpenRouter API key not configured. Please check your environment variables.")]
    ApiKeyNotConfigured,

    #[error("Failed to connect to OpenRouter API. Please try again later.")]
    UpstreamUnavailable,

    #[error("Failed to identify snake species. Please try again.")]
    Failed,
}

impl From<InferenceError> for IdentifyError {
    fn from(err: InferenceError) -> Self {
        match err {
            InferenceError::MissingApiKey => IdentifyError::ApiKeyNotConfigured,
            InferenceError::Upstream { .. } | InferenceError::Network { .. } => {
                IdentifyError::UpstreamUnavailable
            }
            InferenceError::InvalidResponse(_) | InferenceError::EmptyResponse => {
                IdentifyError::Failed
            }
        }
    }
}

/// Invalid process configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: &'static str, message: String },
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, InferenceError>;
