use std::thread;
use std::time::{Duration, Instant};

use tracing::trace;

use crate::error::{Result, TransportError};

/// Delay the encoder device needs between consecutive inbound bytes.
pub const DEFAULT_INTER_BYTE_DELAY: Duration = Duration::from_millis(10);

/// Write pacing applied by [`Transport::write_paced`].
///
/// The device's receive path has no flow control back to the host, so every
/// outbound byte is followed by a fixed delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Delay inserted after each written byte.
    pub inter_byte: Duration,
}

impl Pacing {
    /// Pacing with an explicit inter-byte delay.
    pub const fn new(inter_byte: Duration) -> Self {
        Self { inter_byte }
    }

    /// No delay between bytes. Only suitable for simulated devices.
    pub const fn none() -> Self {
        Self {
            inter_byte: Duration::ZERO,
        }
    }

    /// Total delay incurred when writing `len` bytes.
    pub fn total_for(&self, len: usize) -> Duration {
        self.inter_byte.saturating_mul(len.min(u32::MAX as usize) as u32)
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self::new(DEFAULT_INTER_BYTE_DELAY)
    }
}

/// A duplex byte channel to the encoder device.
///
/// Implementors provide the non-blocking primitives; the timeout-bounded and
/// paced operations are built on top of them and rarely need overriding.
pub trait Transport {
    /// Number of inbound bytes that can be read without waiting.
    fn bytes_available(&mut self) -> Result<usize>;

    /// Read one inbound byte if one is buffered. Never blocks.
    fn read_byte(&mut self) -> Result<Option<u8>>;

    /// Write a single outbound byte.
    fn write_byte(&mut self, byte: u8) -> Result<()>;

    /// Flush any outbound buffering.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    /// Write `bytes` one at a time, sleeping `pacing.inter_byte` after each.
    fn write_paced(&mut self, bytes: &[u8], pacing: &Pacing) -> Result<()> {
        for &byte in bytes {
            trace!(byte = format_args!("{byte:#04x}"), "tx");
            self.write_byte(byte)?;
            self.flush()?;
            if !pacing.inter_byte.is_zero() {
                thread::sleep(pacing.inter_byte);
            }
        }
        Ok(())
    }

    /// Poll until at least `count` bytes are buffered or `timeout` elapses.
    ///
    /// Returns the number of buffered bytes on success. Nothing is consumed.
    fn wait_available(&mut self, count: usize, timeout: Duration, poll: Duration) -> Result<usize> {
        let start = Instant::now();
        loop {
            let available = self.bytes_available()?;
            if available >= count {
                return Ok(available);
            }
            let waited = start.elapsed();
            if waited >= timeout {
                return Err(TransportError::Timeout {
                    expected: count,
                    received: available,
                    waited,
                });
            }
            thread::sleep(poll);
        }
    }

    /// Fill `buf` from the inbound stream within `timeout`.
    ///
    /// On timeout the bytes received so far stay in the prefix of `buf` and
    /// the error reports how many there are.
    fn read_exact_within(&mut self, buf: &mut [u8], timeout: Duration, poll: Duration) -> Result<()> {
        let start = Instant::now();
        let mut received = 0usize;
        while received < buf.len() {
            let waited = start.elapsed();
            if waited >= timeout {
                return Err(TransportError::Timeout {
                    expected: buf.len(),
                    received,
                    waited,
                });
            }
            match self.read_byte()? {
                Some(byte) => {
                    trace!(byte = format_args!("{byte:#04x}"), "rx");
                    buf[received] = byte;
                    received += 1;
                }
                None => thread::sleep(poll),
            }
        }
        Ok(())
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn bytes_available(&mut self) -> Result<usize> {
        (**self).bytes_available()
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        (**self).read_byte()
    }

    fn write_byte(&mut self, byte: u8) -> Result<()> {
        (**self).write_byte(byte)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn bytes_available(&mut self) -> Result<usize> {
        (**self).bytes_available()
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        (**self).read_byte()
    }

    fn write_byte(&mut self, byte: u8) -> Result<()> {
        (**self).write_byte(byte)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}
