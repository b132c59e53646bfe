use std::time::Duration;

use bytes::Bytes;
use ldpclink_wire::SessionParameters;
use serde::Serialize;

use crate::error::SessionError;
use crate::message::Message;

/// How the caller produced the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputMode {
    /// Raw text bytes.
    Text,
    /// Hexadecimal byte string.
    Hex,
    /// Hexadecimal byte string with a separately supplied calculation length.
    HexManualLength,
}

impl InputMode {
    /// Whether the message is best shown as hex rather than ASCII.
    pub fn displays_as_hex(&self) -> bool {
        !matches!(self, InputMode::Text)
    }
}

/// Everything needed to start a session.
#[derive(Debug, Clone)]
pub struct SessionRequest {
    pub message: Message,
    pub mode: InputMode,
    /// Bit count to announce and plan blocks from instead of the message's own.
    pub calculation_bits: Option<u16>,
}

impl SessionRequest {
    pub fn new(message: Message, mode: InputMode) -> Self {
        Self {
            message,
            mode,
            calculation_bits: None,
        }
    }

    /// Plan blocks from `bits` rather than the message's bit count.
    pub fn with_calculation_bits(mut self, bits: u16) -> Self {
        self.calculation_bits = Some(bits);
        self
    }

    /// Value sent in the length field.
    ///
    /// A supplied calculation length is sent as is, even when zero.
    pub fn length_field(&self) -> u16 {
        self.calculation_bits.unwrap_or(self.message.bits())
    }

    /// Bits the block count is derived from: the calculation length when it
    /// is non-zero, otherwise the message's own bit count.
    pub fn effective_bits(&self) -> u16 {
        match self.calculation_bits {
            Some(bits) if bits > 0 => bits,
            _ => self.message.bits(),
        }
    }
}

/// A completed session, kept for read-only inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub message: Message,
    pub mode: InputMode,
    pub params: SessionParameters,
    /// Bits the blocks were planned from.
    pub calculation_bits: u16,
    /// Number of blocks transferred.
    pub blocks: usize,
    /// Concatenated encoded bytes, `blocks * ceil(N/8)` long.
    pub encoded: Bytes,
    /// Wall time from sync wait to last block.
    pub elapsed: Duration,
}

impl Session {
    /// Encoded bytes for one block, if it exists.
    pub fn block(&self, index: usize) -> Option<&[u8]> {
        let n_bytes = self.params.n_bytes();
        let start = index.checked_mul(n_bytes)?;
        let end = start.checked_add(n_bytes)?;
        self.encoded.get(start..end)
    }
}

/// Outcome of one session run.
pub type SessionResult = std::result::Result<Session, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn message(bits: u16) -> Message {
        Message::new(vec![0u8; 8], bits).unwrap()
    }

    #[test]
    fn without_override_message_bits_are_used() {
        let req = SessionRequest::new(message(24), InputMode::Hex);
        assert_eq!(req.length_field(), 24);
        assert_eq!(req.effective_bits(), 24);
    }

    #[test]
    fn override_drives_length_and_blocks() {
        let req = SessionRequest::new(message(24), InputMode::HexManualLength)
            .with_calculation_bits(100);
        assert_eq!(req.length_field(), 100);
        assert_eq!(req.effective_bits(), 100);
    }

    #[test]
    fn zero_override_is_announced_but_not_planned() {
        let req =
            SessionRequest::new(message(24), InputMode::HexManualLength).with_calculation_bits(0);
        assert_eq!(req.length_field(), 0);
        assert_eq!(req.effective_bits(), 24);
    }

    #[test]
    fn session_block_slices() {
        let session = Session {
            message: message(16),
            mode: InputMode::Text,
            params: SessionParameters::new(8, 16),
            calculation_bits: 16,
            blocks: 2,
            encoded: Bytes::from_static(&[1, 2, 3, 4]),
            elapsed: Duration::ZERO,
        };
        assert_eq!(session.block(0), Some(&[1u8, 2][..]));
        assert_eq!(session.block(1), Some(&[3u8, 4][..]));
        assert_eq!(session.block(2), None);
        assert_eq!(session.block(usize::MAX / 2), None);
        assert_eq!(session.block(usize::MAX), None);
        assert!(!session.mode.displays_as_hex());
    }
}
