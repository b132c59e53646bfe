use std::time::Duration;

/// Errors that can occur on a device transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to open the serial device.
    #[cfg(feature = "serial")]
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        source: serialport::Error,
    },

    /// An I/O error occurred on the underlying channel.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Not enough bytes arrived before the deadline.
    #[error("timed out after {waited:?} ({received} of {expected} bytes received)")]
    Timeout {
        expected: usize,
        received: usize,
        waited: Duration,
    },

    /// The channel has been closed by the peer.
    #[error("transport closed")]
    Closed,
}

impl TransportError {
    /// Whether this error is a deadline expiry rather than a channel fault.
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Timeout { .. })
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
