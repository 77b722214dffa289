//! Application layer errors

use thiserror::Error;

/// Errors raised by the polling client and the Telegram adapter
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Telegram API error {code}: {description}")]
    Api { code: u16, description: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl BotError {
    /// Whether retrying the same request can never succeed.
    ///
    /// 401 and 404 mean the token is wrong, 409 means another poller or a
    /// webhook already owns the update stream.
    pub fn is_fatal(&self) -> bool {
        matches!(self, BotError::Api { code: 401 | 404 | 409, .. })
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variables: {0:?}")]
    MissingKeys(Vec<String>),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Health server errors, contained in the child process
#[derive(Error, Debug)]
pub enum HealthError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Child process management errors
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Failed to spawn health server: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("Failed to signal child {pid}: {reason}")]
    Signal { pid: u32, reason: String },

    #[error("Failed to wait for child: {0}")]
    Wait(#[source] std::io::Error),
}
