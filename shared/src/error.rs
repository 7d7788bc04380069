//! Error types for the event bot.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur outside of user input handling.
///
/// Malformed user commands never become an `Error`; they are answered with a
/// [`crate::Response::Error`] instead.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// AWS SDK error
    #[error("AWS error: {0}")]
    Aws(String),

    /// Messaging platform rejected a request
    #[error("Platform error: {0}")]
    Platform(String),

    /// Outbound HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_source() {
        assert_eq!(
            Error::Config("BOT_TIMEZONE".to_string()).to_string(),
            "Configuration error: BOT_TIMEZONE"
        );
        assert_eq!(
            Error::Internal("event store lock poisoned".to_string()).to_string(),
            "Internal error: event store lock poisoned"
        );
    }
}
