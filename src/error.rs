use std::time::Duration;

use thiserror::Error;

/// Errors raised while talking to the rehab service over JSONP
#[derive(Error, Debug)]
pub enum TransportError {
    /// Connection failure or a non-success HTTP status
    #[error("Network error loading JSONP.")]
    Network(#[from] reqwest::Error),

    /// The service did not answer within the wall-clock budget
    #[error("JSONP request timed out.")]
    Timeout(Duration),

    /// The body was not a `callback(<json>)` invocation
    #[error("Malformed JSONP response: {0}")]
    MalformedResponse(String),

    /// The body invoked a callback that no pending call registered
    #[error("Response invoked unknown callback '{0}'")]
    UnknownCallback(String),

    /// The configured endpoint is not a valid URL
    #[error("Invalid endpoint URL: {0}")]
    Url(String),
}

/// Errors that can occur during a rehab or admin operation
#[derive(Error, Debug)]
pub enum RehabError {
    /// The recipe URL field was blank
    #[error("Please paste a recipe URL.")]
    EmptyUrl,

    /// An admin call was attempted without an access token
    #[error("Missing admin token.")]
    MissingAdminToken,

    /// The service answered with `ok: false`
    #[error("{0}")]
    Service(String),

    /// Builder configuration error
    #[error("Builder error: {0}")]
    BuilderError(String),

    /// Request could not be delivered or answered
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Payload (de)serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Client identity could not be read or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_messages_are_user_facing() {
        let err = RehabError::from(TransportError::Timeout(Duration::from_secs(25)));
        assert_eq!(err.to_string(), "JSONP request timed out.");
    }

    #[test]
    fn test_service_message_is_verbatim() {
        let err = RehabError::Service("Recipe not found".to_string());
        assert_eq!(err.to_string(), "Recipe not found");
    }
}
