use std::time::Duration;

use bytes::{Bytes, BytesMut};
use ldpclink_transport::{Pacing, Transport, TransportError};
use ldpclink_wire::{BlockGeometry, SessionParameters};
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::error::{Result, SessionError, SessionPhase};
use crate::message::Message;

/// Moves a message to the device block by block and collects the codewords.
///
/// Each block is written with per-byte pacing, then the engine waits up to
/// `block_timeout` for that block's `ceil(N/8)` reply bytes. The first block
/// that misses its deadline aborts the transfer; later blocks are never sent.
#[derive(Debug, Clone)]
pub struct BlockTransferEngine {
    pub block_timeout: Duration,
    pub poll: Duration,
    pub pacing: Pacing,
    pub max_encoded_bytes: usize,
}

impl Default for BlockTransferEngine {
    fn default() -> Self {
        SessionConfig::default().transfer_engine()
    }
}

impl BlockTransferEngine {
    /// Plan blocks for `effective_bits` and check the result fits in memory.
    pub fn plan(&self, params: SessionParameters, effective_bits: u16) -> Result<BlockGeometry> {
        let geometry = BlockGeometry::plan(params, effective_bits)?;
        if geometry.encoded_len() > self.max_encoded_bytes {
            return Err(SessionError::EncodedTooLarge {
                size: geometry.encoded_len(),
                max: self.max_encoded_bytes,
            });
        }
        Ok(geometry)
    }

    /// Transfer `message` and return the concatenated encoded bytes.
    ///
    /// Blocks are planned from `calculation_bits` when it is non-zero and from
    /// the message's bit count otherwise.
    pub fn transfer<T: Transport + ?Sized>(
        &self,
        transport: &mut T,
        params: SessionParameters,
        message: &Message,
        calculation_bits: Option<u16>,
    ) -> Result<Bytes> {
        let mut encoded = BytesMut::new();
        self.transfer_into(
            transport,
            params,
            message.as_bytes(),
            message.bits(),
            calculation_bits,
            &mut encoded,
        )?;
        Ok(encoded.freeze())
    }

    /// Like [`transfer`](Self::transfer) over raw data, writing into `encoded`.
    ///
    /// `encoded` is resized to the full result length up front. After a
    /// [`SessionError::BlockTimeout`] it still holds every completed block and
    /// the partial bytes of the failing one; those partial bytes are not a
    /// valid codeword.
    pub fn transfer_into<T: Transport + ?Sized>(
        &self,
        transport: &mut T,
        params: SessionParameters,
        data: &[u8],
        actual_bits: u16,
        calculation_bits: Option<u16>,
        encoded: &mut BytesMut,
    ) -> Result<BlockGeometry> {
        let effective_bits = match calculation_bits {
            Some(bits) if bits > 0 => bits,
            _ => actual_bits,
        };
        let geometry = self.plan(params, effective_bits)?;
        let blocks = geometry.blocks();

        encoded.clear();
        encoded.resize(geometry.encoded_len(), 0);

        info!(
            blocks,
            k_bytes = geometry.k_bytes(),
            n_bytes = geometry.n_bytes(),
            effective_bits,
            actual_bits,
            "sending blocks"
        );

        for block in 0..blocks {
            let payload = geometry.block_payload(block, data, actual_bits);
            transport
                .write_paced(&payload, &self.pacing)
                .map_err(|err| SessionError::transport(SessionPhase::Transfer, err))?;

            let range = geometry.encoded_range(block);
            match transport.read_exact_within(&mut encoded[range], self.block_timeout, self.poll) {
                Ok(()) => debug!(block = block + 1, blocks, "block encoded"),
                Err(TransportError::Timeout {
                    expected, received, ..
                }) => {
                    warn!(block = block + 1, blocks, received, expected, "block timed out");
                    return Err(SessionError::BlockTimeout {
                        block,
                        blocks,
                        received,
                        expected,
                    });
                }
                Err(err) => return Err(SessionError::transport(SessionPhase::Transfer, err)),
            }
        }

        Ok(geometry)
    }
}

#[cfg(test)]
mod tests {
    use ldpclink_transport::ScriptedTransport;
    use ldpclink_wire::WireError;

    use super::*;

    fn fast() -> BlockTransferEngine {
        BlockTransferEngine {
            block_timeout: Duration::from_millis(40),
            poll: Duration::from_millis(1),
            pacing: Pacing::none(),
            ..BlockTransferEngine::default()
        }
    }

    #[test]
    fn short_message_is_zero_padded_to_block() {
        let mut transport = ScriptedTransport::with_inbound([0xA0, 0xA1, 0xA2, 0xA3]);
        let message = Message::new(vec![0x5A], 8).unwrap();

        let encoded = fast()
            .transfer(&mut transport, SessionParameters::new(16, 32), &message, None)
            .unwrap();

        assert_eq!(transport.written(), &[0x5A, 0x00]);
        assert_eq!(encoded.as_ref(), &[0xA0, 0xA1, 0xA2, 0xA3]);
    }

    #[test]
    fn replies_are_concatenated_in_block_order() {
        let replies = [0x10, 0x11, 0x20, 0x21, 0x30, 0x31];
        let mut transport = ScriptedTransport::with_inbound(replies);
        let message = Message::from_bytes(vec![1, 2, 3]).unwrap();

        let encoded = fast()
            .transfer(&mut transport, SessionParameters::new(8, 16), &message, None)
            .unwrap();

        assert_eq!(transport.written(), &[1, 2, 3]);
        assert_eq!(encoded.as_ref(), &replies);
    }

    #[test]
    fn calculation_bits_override_block_count() {
        let mut transport = ScriptedTransport::with_inbound([0u8; 8]);
        let message = Message::new(vec![0xFF], 8).unwrap();

        let encoded = fast()
            .transfer(
                &mut transport,
                SessionParameters::new(8, 16),
                &message,
                Some(32),
            )
            .unwrap();

        assert_eq!(transport.written(), &[0xFF, 0x00, 0x00, 0x00]);
        assert_eq!(encoded.len(), 8);
    }

    #[test]
    fn timeout_aborts_remaining_blocks() {
        let mut transport = ScriptedTransport::with_inbound([0xE0, 0xE1, 0xE2]);
        let mut encoded = BytesMut::new();

        let err = fast()
            .transfer_into(
                &mut transport,
                SessionParameters::new(8, 16),
                &[1, 2, 3],
                24,
                None,
                &mut encoded,
            )
            .unwrap_err();

        assert!(matches!(
            err,
            SessionError::BlockTimeout {
                block: 1,
                blocks: 3,
                received: 1,
                expected: 2
            }
        ));
        assert_eq!(transport.written(), &[1, 2], "block 3 must not be sent");
        assert_eq!(&encoded[..3], &[0xE0, 0xE1, 0xE2]);
    }

    #[test]
    fn zero_k_is_rejected_before_any_write() {
        let mut transport = ScriptedTransport::new();
        let message = Message::from_bytes(vec![1]).unwrap();

        let err = fast()
            .transfer(&mut transport, SessionParameters::new(0, 16), &message, None)
            .unwrap_err();

        assert!(matches!(
            err,
            SessionError::InvalidParameters(WireError::InvalidParameters { k: 0, n: 16 })
        ));
        assert!(transport.written().is_empty());
    }

    #[test]
    fn oversized_result_is_rejected() {
        let engine = BlockTransferEngine {
            max_encoded_bytes: 1000,
            ..fast()
        };
        let err = engine
            .plan(SessionParameters::new(4096, 8192), 16)
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::EncodedTooLarge {
                size: 1024,
                max: 1000
            }
        ));
    }

    #[test]
    fn empty_message_transfers_nothing() {
        let mut transport = ScriptedTransport::new();
        let message = Message::from_bytes(Vec::new()).unwrap();

        let encoded = fast()
            .transfer(&mut transport, SessionParameters::new(8, 16), &message, None)
            .unwrap();

        assert!(encoded.is_empty());
        assert!(transport.written().is_empty());
    }
}
