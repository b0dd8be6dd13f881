//! Error types for the voice streaming crate
//!
//! Per-sample and per-frame conditions (rejected frames, send failures,
//! underruns, overflows) are not errors: they are reduced to counters and
//! the audio path carries on. Errors here are the fatal, session-startup
//! kind.

use thiserror::Error;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum Error {
    #[error("Buffer error: {0}")]
    Buffer(#[from] BufferError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Jitter buffer construction errors
#[derive(Error, Debug)]
pub enum BufferError {
    #[error("Capacity of {0} samples is too small to buffer anything")]
    CapacityTooSmall(usize),

    #[error("Target depth {target} out of range for capacity {capacity}")]
    InvalidTargetDepth { target: usize, capacity: usize },
}

/// Framing errors
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Header of {header} bytes does not fit a {capacity} byte frame")]
    HeaderTooLarge { header: usize, capacity: usize },

    #[error("Frame capacity {0} exceeds the link MTU")]
    FrameTooLarge(usize),
}

/// Link-layer errors
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Socket bind failed: {0}")]
    BindFailed(String),

    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Receive failed: {0}")]
    ReceiveFailed(String),
}

/// Result type alias for the crate
pub type Result<T> = std::result::Result<T, Error>;
