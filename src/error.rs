//! Error types for yantra-link

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// yantra-link error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TCP connect failure
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Send attempted without an established connection
    #[error("Connection wasn't started")]
    NotConnected,

    /// Corrupt or impossible frame header
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Malformed map record payload
    #[error("Map record parse error: {0}")]
    Parse(String),

    /// Configuration load/parse failure
    #[error("Config error: {0}")]
    Config(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Parse(e.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}
