use thiserror::Error;

/// Errors that can occur while issuing a request to the Responses endpoint.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Coarse classification of [`Error`], handy for logging and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Authentication,
    Transport,
    Api,
    MalformedResponse,
    Config,
}

impl Error {
    pub fn auth(message: impl Into<String>) -> Self {
        Error::Authentication(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Error::MalformedResponse(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Authentication(_) => ErrorKind::Authentication,
            Error::Transport(_) => ErrorKind::Transport,
            Error::Api { .. } => ErrorKind::Api,
            Error::MalformedResponse(_) => ErrorKind::MalformedResponse,
            Error::Config(_) => ErrorKind::Config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_keeps_status_and_body() {
        let error = Error::Api {
            status: 429,
            body: r#"{"error":{"code":"RateLimit"}}"#.to_string(),
        };
        assert_eq!(error.kind(), ErrorKind::Api);
        assert_eq!(
            error.to_string(),
            r#"API error (429): {"error":{"code":"RateLimit"}}"#
        );
    }

    #[test]
    fn test_helper_constructors() {
        assert_eq!(Error::auth("no source").kind(), ErrorKind::Authentication);
        assert_eq!(Error::config("missing").kind(), ErrorKind::Config);
        assert!(Error::malformed("`output` is empty")
            .to_string()
            .contains("`output` is empty"));
    }
}
