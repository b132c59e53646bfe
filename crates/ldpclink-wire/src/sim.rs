//! Software stand-in for the encoder device.

use bytes::{Buf, BytesMut};
use ldpclink_transport::{Result, Transport};
use tracing::{debug, trace};

use crate::codec::{encode_parameters, SessionParameters, LENGTH_FIELD_SIZE};
use crate::tag::SYNC_TAG;

/// Behaviour of a [`SimulatedEncoder`].
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Parameters announced after the length field.
    pub params: SessionParameters,
    /// Bytes emitted before each sync tag.
    pub noise: Vec<u8>,
    /// Send the sync tag at all. A device that never does models a dead link.
    pub respond_to_sync: bool,
    /// Never answer this block (zero-based).
    pub stall_at_block: Option<usize>,
    /// Answer this block with only the given number of bytes.
    pub short_block: Option<(usize, usize)>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            params: SessionParameters::new(64, 128),
            noise: Vec::new(),
            respond_to_sync: true,
            stall_at_block: None,
            short_block: None,
        }
    }
}

#[derive(Debug)]
enum DeviceState {
    AwaitingLength { field: Vec<u8> },
    Encoding { block: usize, pending: Vec<u8> },
    Silent,
}

/// A device that speaks the encoder protocol entirely in memory.
///
/// It announces itself with the sync tag, reads the length field, replies
/// with its configured K/N and then answers every `ceil(K/8)` data bytes with
/// `ceil(N/8)` bytes from [`systematic_codeword`]. Once the number of blocks
/// implied by the length field has been answered it re-arms with a fresh tag,
/// so one simulator can serve consecutive sessions. A zero length field does
/// not say how many blocks follow; the device then re-arms the first time the
/// host polls it after a fully answered block has been drained.
#[derive(Debug)]
pub struct SimulatedEncoder {
    config: SimulatorConfig,
    state: DeviceState,
    outbound: BytesMut,
    written: Vec<u8>,
    length_bits: Option<u16>,
    blocks_answered: usize,
    last_reply_full: bool,
}

impl SimulatedEncoder {
    pub fn new(config: SimulatorConfig) -> Self {
        let mut sim = Self {
            config,
            state: DeviceState::Silent,
            outbound: BytesMut::new(),
            written: Vec::new(),
            length_bits: None,
            blocks_answered: 0,
            last_reply_full: false,
        };
        sim.arm();
        sim
    }

    /// Simulator announcing `K`/`N` with default behaviour otherwise.
    pub fn with_parameters(k: u16, n: u16) -> Self {
        Self::new(SimulatorConfig {
            params: SessionParameters::new(k, n),
            ..SimulatorConfig::default()
        })
    }

    /// Every byte the host has written, in order.
    pub fn written(&self) -> &[u8] {
        &self.written
    }

    /// Length field received in the most recent session.
    pub fn length_bits(&self) -> Option<u16> {
        self.length_bits
    }

    /// Total blocks answered (fully or partially) across all sessions.
    pub fn blocks_answered(&self) -> usize {
        self.blocks_answered
    }

    fn arm(&mut self) {
        if !self.config.respond_to_sync {
            self.state = DeviceState::Silent;
            return;
        }
        self.last_reply_full = false;
        self.outbound.extend_from_slice(&self.config.noise);
        self.outbound.extend_from_slice(&SYNC_TAG);
        self.state = DeviceState::AwaitingLength {
            field: Vec::with_capacity(LENGTH_FIELD_SIZE),
        };
    }

    fn expected_blocks(&self) -> Option<usize> {
        let bits = self.length_bits?;
        if bits == 0 || self.config.params.k == 0 {
            return None;
        }
        Some(usize::from(bits).div_ceil(usize::from(self.config.params.k)))
    }

    fn rearm_if_idle(&mut self) {
        if self.length_bits != Some(0) || !self.last_reply_full || !self.outbound.is_empty() {
            return;
        }
        let between_blocks = matches!(
            &self.state,
            DeviceState::Encoding { block, pending } if *block > 0 && pending.is_empty()
        );
        if between_blocks {
            debug!("simulator idle after open-ended session");
            self.arm();
        }
    }

    fn on_byte(&mut self, byte: u8) {
        let k_bytes = self.config.params.k_bytes();
        let n_bytes = self.config.params.n_bytes();

        match &mut self.state {
            DeviceState::Silent => {}
            DeviceState::AwaitingLength { field } => {
                field.push(byte);
                if field.len() == LENGTH_FIELD_SIZE {
                    let bits = u16::from_be_bytes([field[0], field[1]]);
                    debug!(bits, "simulator received length");
                    self.length_bits = Some(bits);
                    encode_parameters(self.config.params, &mut self.outbound);
                    self.state = DeviceState::Encoding {
                        block: 0,
                        pending: Vec::with_capacity(k_bytes),
                    };
                }
            }
            DeviceState::Encoding { block, pending } => {
                if k_bytes == 0 {
                    return;
                }
                pending.push(byte);
                if pending.len() < k_bytes {
                    return;
                }

                let current = *block;
                let codeword = systematic_codeword(pending, n_bytes);
                pending.clear();
                *block += 1;

                self.last_reply_full = false;
                if self.config.stall_at_block == Some(current) {
                    debug!(block = current, "simulator stalling");
                    self.state = DeviceState::Silent;
                    return;
                }

                let reply_len = match self.config.short_block {
                    Some((short, len)) if short == current => len.min(codeword.len()),
                    _ => codeword.len(),
                };
                trace!(block = current, reply_len, "simulator answering block");
                self.outbound.extend_from_slice(&codeword[..reply_len]);
                self.blocks_answered += 1;
                self.last_reply_full = reply_len == codeword.len();

                if self.expected_blocks() == Some(current + 1) {
                    self.arm();
                }
            }
        }
    }
}

impl Transport for SimulatedEncoder {
    fn bytes_available(&mut self) -> Result<usize> {
        self.rearm_if_idle();
        Ok(self.outbound.len())
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        self.rearm_if_idle();
        if self.outbound.has_remaining() {
            Ok(Some(self.outbound.get_u8()))
        } else {
            Ok(None)
        }
    }

    fn write_byte(&mut self, byte: u8) -> Result<()> {
        self.written.push(byte);
        self.on_byte(byte);
        Ok(())
    }
}

/// Codeword the simulator returns for one block.
///
/// The data bytes come first, truncated to `n_bytes` if needed. Each
/// remaining byte is a running XOR over the data, cycling through it.
pub fn systematic_codeword(data: &[u8], n_bytes: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(n_bytes);
    out.extend(data.iter().copied().take(n_bytes));

    let mut parity = 0u8;
    let mut i = 0usize;
    while out.len() < n_bytes {
        if !data.is_empty() {
            parity ^= data[i % data.len()];
        }
        out.push(parity);
        i += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(sim: &mut SimulatedEncoder) -> Vec<u8> {
        let mut out = Vec::new();
        while let Some(b) = sim.read_byte().unwrap() {
            out.push(b);
        }
        out
    }

    #[test]
    fn announces_noise_then_tag() {
        let mut sim = SimulatedEncoder::new(SimulatorConfig {
            noise: vec![0x01, 0xDE],
            ..SimulatorConfig::default()
        });
        assert_eq!(drain(&mut sim), vec![0x01, 0xDE, 0xDE, 0xAD, 0xC0, 0xDE]);
    }

    #[test]
    fn silent_device_sends_nothing() {
        let mut sim = SimulatedEncoder::new(SimulatorConfig {
            respond_to_sync: false,
            ..SimulatorConfig::default()
        });
        sim.write_byte(0x00).unwrap();
        sim.write_byte(0x08).unwrap();
        assert_eq!(sim.bytes_available().unwrap(), 0);
    }

    #[test]
    fn replies_parameters_after_length() {
        let mut sim = SimulatedEncoder::with_parameters(16, 40);
        drain(&mut sim);

        sim.write_byte(0x00).unwrap();
        assert_eq!(sim.bytes_available().unwrap(), 0);
        sim.write_byte(0x20).unwrap();

        assert_eq!(sim.length_bits(), Some(32));
        assert_eq!(drain(&mut sim), vec![0x00, 0x10, 0x00, 0x28]);
    }

    #[test]
    fn answers_each_block_and_rearms() {
        let mut sim = SimulatedEncoder::with_parameters(16, 32);
        drain(&mut sim);
        sim.write_byte(0x00).unwrap();
        sim.write_byte(0x10).unwrap();
        drain(&mut sim);

        sim.write_byte(0x0F).unwrap();
        sim.write_byte(0xF0).unwrap();

        let reply = drain(&mut sim);
        assert_eq!(&reply[..4], &[0x0F, 0xF0, 0x0F, 0xFF]);
        assert_eq!(&reply[4..], &SYNC_TAG);
        assert_eq!(sim.blocks_answered(), 1);
    }

    #[test]
    fn stalls_and_short_replies() {
        let mut sim = SimulatedEncoder::new(SimulatorConfig {
            params: SessionParameters::new(8, 16),
            short_block: Some((0, 1)),
            stall_at_block: Some(1),
            ..SimulatorConfig::default()
        });
        drain(&mut sim);
        sim.write_byte(0x00).unwrap();
        sim.write_byte(0x18).unwrap();
        drain(&mut sim);

        sim.write_byte(0xAA).unwrap();
        assert_eq!(drain(&mut sim), vec![0xAA]);

        sim.write_byte(0xBB).unwrap();
        assert_eq!(sim.bytes_available().unwrap(), 0);
        sim.write_byte(0xCC).unwrap();
        assert_eq!(sim.bytes_available().unwrap(), 0);
    }

    #[test]
    fn zero_length_field_rearms_once_drained() {
        let mut sim = SimulatedEncoder::with_parameters(8, 16);
        drain(&mut sim);
        sim.write_byte(0x00).unwrap();
        sim.write_byte(0x00).unwrap();
        assert_eq!(sim.length_bits(), Some(0));
        drain(&mut sim);

        sim.write_byte(0x41).unwrap();
        assert_eq!(sim.read_byte().unwrap(), Some(0x41));
        assert_eq!(sim.read_byte().unwrap(), Some(0x41));

        sim.write_byte(0x42).unwrap();
        assert_eq!(sim.read_byte().unwrap(), Some(0x42));
        assert_eq!(sim.read_byte().unwrap(), Some(0x42));

        assert_eq!(drain(&mut sim), SYNC_TAG.to_vec());
        assert_eq!(sim.blocks_answered(), 2);
    }

    #[test]
    fn short_reply_never_rearms_open_ended_session() {
        let mut sim = SimulatedEncoder::new(SimulatorConfig {
            params: SessionParameters::new(8, 16),
            short_block: Some((0, 1)),
            ..SimulatorConfig::default()
        });
        drain(&mut sim);
        sim.write_byte(0x00).unwrap();
        sim.write_byte(0x00).unwrap();
        drain(&mut sim);

        sim.write_byte(0xAA).unwrap();
        assert_eq!(drain(&mut sim), vec![0xAA]);
        assert_eq!(sim.bytes_available().unwrap(), 0);
    }

    #[test]
    fn codeword_is_systematic() {
        assert_eq!(systematic_codeword(&[1, 2], 2), vec![1, 2]);
        assert_eq!(systematic_codeword(&[1, 2], 5), vec![1, 2, 1, 3, 2]);
        assert_eq!(systematic_codeword(&[1, 2, 3], 1), vec![1]);
        assert_eq!(systematic_codeword(&[], 2), vec![0, 0]);
    }
}
