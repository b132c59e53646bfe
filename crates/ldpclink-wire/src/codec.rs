use bytes::{Buf, BufMut, BytesMut};
use serde::Serialize;

use crate::error::{Result, WireError};

/// Length field: message bit count, big-endian.
pub const LENGTH_FIELD_SIZE: usize = 2;

/// Parameter reply: K then N, both big-endian.
pub const PARAMETER_FIELD_SIZE: usize = 4;

/// Block code parameters chosen by the device for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionParameters {
    /// Information bits per block.
    pub k: u16,
    /// Codeword bits per block.
    pub n: u16,
}

impl SessionParameters {
    pub const fn new(k: u16, n: u16) -> Self {
        Self { k, n }
    }

    /// Parameters from a complete reply field: K then N, big-endian.
    pub const fn from_be_bytes(field: [u8; PARAMETER_FIELD_SIZE]) -> Self {
        Self {
            k: u16::from_be_bytes([field[0], field[1]]),
            n: u16::from_be_bytes([field[2], field[3]]),
        }
    }

    /// Both K and N are non-zero.
    pub fn is_valid(&self) -> bool {
        self.k > 0 && self.n > 0
    }

    /// Reject parameters a block transfer cannot be planned from.
    pub fn validate(self) -> Result<Self> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(WireError::InvalidParameters {
                k: self.k,
                n: self.n,
            })
        }
    }

    /// Raw bytes sent per block: `ceil(K/8)`.
    pub fn k_bytes(&self) -> usize {
        (self.k as usize).div_ceil(8)
    }

    /// Encoded bytes received per block: `ceil(N/8)`.
    pub fn n_bytes(&self) -> usize {
        (self.n as usize).div_ceil(8)
    }
}

/// Append the length field for `bits`.
pub fn encode_length(bits: u16, dst: &mut BytesMut) {
    dst.reserve(LENGTH_FIELD_SIZE);
    dst.put_u16(bits);
}

/// Append a parameter reply. Only the device side of the link sends these.
pub fn encode_parameters(params: SessionParameters, dst: &mut BytesMut) {
    dst.reserve(PARAMETER_FIELD_SIZE);
    dst.put_u16(params.k);
    dst.put_u16(params.n);
}

/// Decode a parameter reply from the front of `src`.
///
/// Returns `None` while fewer than four bytes are buffered. On success exactly
/// four bytes are consumed; anything after them stays in `src`.
pub fn decode_parameters(src: &mut BytesMut) -> Option<SessionParameters> {
    if src.len() < PARAMETER_FIELD_SIZE {
        return None;
    }
    let mut field = [0u8; PARAMETER_FIELD_SIZE];
    src.copy_to_slice(&mut field);
    Some(SessionParameters::from_be_bytes(field))
}
