use bytes::Bytes;

use crate::error::{Result, SessionError};

/// Capacity of the message buffer.
pub const MAX_MESSAGE_BYTES: usize = 1024;

/// An ordered run of bits: a byte buffer plus the exact bit count.
///
/// Only the first `ceil(bits/8)` bytes are message content. Bits beyond
/// `bits` inside the last byte are sent as they are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    data: Bytes,
    bits: u16,
}

impl Message {
    /// A message of `bits` bits taken from the front of `data`.
    pub fn new(data: impl Into<Bytes>, bits: u16) -> Result<Self> {
        let data = data.into();
        if data.len() > MAX_MESSAGE_BYTES {
            return Err(SessionError::MessageTooLarge {
                size: data.len(),
                max: MAX_MESSAGE_BYTES,
            });
        }

        let needed = usize::from(bits).div_ceil(8);
        if needed > data.len() {
            return Err(SessionError::BitCountExceedsData {
                bits,
                needed,
                available: data.len(),
            });
        }

        Ok(Self { data, bits })
    }

    /// A message made of every bit of `data`.
    pub fn from_bytes(data: impl Into<Bytes>) -> Result<Self> {
        let data = data.into();
        let bits = u16::try_from(data.len() * 8).map_err(|_| SessionError::MessageTooLarge {
            size: data.len(),
            max: MAX_MESSAGE_BYTES,
        })?;
        Self::new(data, bits)
    }

    pub fn bits(&self) -> u16 {
        self.bits
    }

    /// `ceil(bits/8)`.
    pub fn byte_len(&self) -> usize {
        usize::from(self.bits).div_ceil(8)
    }

    /// The message's content bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.byte_len()]
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }
}
