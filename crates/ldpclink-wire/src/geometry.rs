use std::ops::Range;

use crate::codec::SessionParameters;
use crate::error::Result;

/// How a message is cut into blocks for a given set of code parameters.
///
/// `blocks = ceil(effective_bits / K)`. Block `b` carries message bytes
/// `b*ceil(K/8) .. (b+1)*ceil(K/8)`; positions past the message's real byte
/// length are zero padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockGeometry {
    params: SessionParameters,
    effective_bits: u32,
    blocks: usize,
}

impl BlockGeometry {
    /// Plan the transfer of `effective_bits` bits. Fails on K=0 or N=0.
    pub fn plan(params: SessionParameters, effective_bits: u16) -> Result<Self> {
        let params = params.validate()?;
        let effective_bits = u32::from(effective_bits);
        let blocks = effective_bits.div_ceil(u32::from(params.k)) as usize;
        Ok(Self {
            params,
            effective_bits,
            blocks,
        })
    }

    pub fn params(&self) -> SessionParameters {
        self.params
    }

    /// Bits the block count was derived from.
    pub fn effective_bits(&self) -> u32 {
        self.effective_bits
    }

    /// Number of blocks `C`.
    pub fn blocks(&self) -> usize {
        self.blocks
    }

    pub fn k_bytes(&self) -> usize {
        self.params.k_bytes()
    }

    pub fn n_bytes(&self) -> usize {
        self.params.n_bytes()
    }

    /// Size of the concatenated encoded result: `C * ceil(N/8)`.
    pub fn encoded_len(&self) -> usize {
        self.blocks * self.n_bytes()
    }

    /// Where block `block`'s encoded bytes live in the result buffer.
    pub fn encoded_range(&self, block: usize) -> Range<usize> {
        let start = block * self.n_bytes();
        start..start + self.n_bytes()
    }

    /// Raw bytes to transmit for `block`.
    ///
    /// Only the first `ceil(actual_bits/8)` bytes of `data` are message
    /// content; every index beyond that, or beyond `data` itself, is sent as
    /// zero.
    pub fn block_payload(&self, block: usize, data: &[u8], actual_bits: u16) -> Vec<u8> {
        let k_bytes = self.k_bytes();
        let limit = (actual_bits as usize).div_ceil(8).min(data.len());
        let start = block * k_bytes;
        (start..start + k_bytes)
            .map(|index| if index < limit { data[index] } else { 0 })
            .collect()
    }
}
