use std::fmt;
use std::time::Duration;

use ldpclink_transport::TransportError;
use ldpclink_wire::WireError;
use serde::Serialize;

/// Phase of a session an error terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    /// Rejected before touching the device.
    Request,
    Sync,
    Negotiation,
    Transfer,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionPhase::Request => "request",
            SessionPhase::Sync => "sync",
            SessionPhase::Negotiation => "negotiation",
            SessionPhase::Transfer => "transfer",
        };
        f.write_str(name)
    }
}

/// Reasons a session ends in `FAILED`. All of them are terminal.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The device never produced the sync tag.
    #[error("timed out after {waited:?} waiting for sync tag")]
    SyncTimeout { waited: Duration },

    /// Writing the length field failed.
    #[error("failed to send message length: {0}")]
    LengthSendFailure(#[source] TransportError),

    /// The K/N reply did not arrive in time.
    #[error("timed out after {waited:?} waiting for K/N parameters ({available} of 4 bytes buffered)")]
    ParameterTimeout { waited: Duration, available: usize },

    /// The device announced parameters no transfer can be planned from.
    #[error("device announced unusable parameters: {0}")]
    InvalidParameters(#[from] WireError),

    /// A block's encoded reply did not arrive in time.
    #[error(
        "timed out on block {} of {blocks} ({received} of {expected} encoded bytes)",
        .block + 1
    )]
    BlockTimeout {
        block: usize,
        blocks: usize,
        received: usize,
        expected: usize,
    },

    /// The encoded result would exceed the configured ceiling.
    #[error("encoded result too large ({size} bytes, max {max})")]
    EncodedTooLarge { size: usize, max: usize },

    /// The message does not fit the message buffer.
    #[error("message too large ({size} bytes, max {max})")]
    MessageTooLarge { size: usize, max: usize },

    /// The bit count claims more bytes than the message holds.
    #[error("bit count {bits} needs {needed} bytes but message holds {available}")]
    BitCountExceedsData {
        bits: u16,
        needed: usize,
        available: usize,
    },

    /// Any other transport failure.
    #[error("transport error during {phase}: {source}")]
    Transport {
        phase: SessionPhase,
        source: TransportError,
    },
}

impl SessionError {
    /// The phase this error ended.
    pub fn phase(&self) -> SessionPhase {
        match self {
            SessionError::MessageTooLarge { .. } | SessionError::BitCountExceedsData { .. } => {
                SessionPhase::Request
            }
            SessionError::SyncTimeout { .. } => SessionPhase::Sync,
            SessionError::LengthSendFailure(_)
            | SessionError::ParameterTimeout { .. }
            | SessionError::InvalidParameters(_) => SessionPhase::Negotiation,
            SessionError::BlockTimeout { .. } | SessionError::EncodedTooLarge { .. } => {
                SessionPhase::Transfer
            }
            SessionError::Transport { phase, .. } => *phase,
        }
    }

    /// Wrap a transport failure that occurred during `phase`.
    pub fn transport(phase: SessionPhase, source: TransportError) -> Self {
        SessionError::Transport { phase, source }
    }

    /// Whether the session ended because a deadline expired.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            SessionError::SyncTimeout { .. }
                | SessionError::ParameterTimeout { .. }
                | SessionError::BlockTimeout { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;
