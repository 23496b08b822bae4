//! Error types for the daemon and its client.

use std::path::PathBuf;

use thiserror::Error;

use crate::pomodoro::pomodoro::IntervalKind;

#[derive(Error, Debug)]
pub enum DaemonError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to bind RPC listener on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The remote daemon answered with a JSON-RPC error object.
    #[error("RPC call failed ({code}): {message}")]
    RpcFailure { code: i64, message: String },

    #[error("Connection closed before a reply arrived")]
    NoReply,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{kind} alert sound not found at {}", .path.display())]
    MissingSound { kind: IntervalKind, path: PathBuf },

    #[error("Invalid log filter '{filter}': {message}")]
    InvalidLogFilter { filter: String, message: String },
}

#[derive(Error, Debug)]
pub enum AlertError {
    #[error("Failed to start '{player}' for {}: {source}", .path.display())]
    Spawn {
        player: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Desktop notification failed: {0}")]
    Notification(String),
}
