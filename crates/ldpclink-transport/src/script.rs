use bytes::{Buf, BytesMut};

use crate::error::{Result, TransportError};
use crate::traits::Transport;

/// Replays a fixed inbound byte stream and records everything written.
///
/// Useful for exercising framing logic against exact byte sequences: noise in
/// front of the sync tag, truncated parameter replies, and so on.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    inbound: BytesMut,
    written: Vec<u8>,
    fail_writes: bool,
}

impl ScriptedTransport {
    /// An empty transport: nothing to read, nothing written.
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport whose inbound stream starts with `bytes`.
    pub fn with_inbound(bytes: impl AsRef<[u8]>) -> Self {
        let mut transport = Self::new();
        transport.push_inbound(bytes);
        transport
    }

    /// Append bytes to the inbound stream.
    pub fn push_inbound(&mut self, bytes: impl AsRef<[u8]>) {
        self.inbound.extend_from_slice(bytes.as_ref());
    }

    /// Make every subsequent write fail with [`TransportError::Closed`].
    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// All bytes written so far, in order.
    pub fn written(&self) -> &[u8] {
        &self.written
    }

    /// Inbound bytes not yet consumed.
    pub fn remaining(&self) -> &[u8] {
        &self.inbound
    }
}

impl Transport for ScriptedTransport {
    fn bytes_available(&mut self) -> Result<usize> {
        Ok(self.inbound.len())
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        if self.inbound.has_remaining() {
            Ok(Some(self.inbound.get_u8()))
        } else {
            Ok(None)
        }
    }

    fn write_byte(&mut self, byte: u8) -> Result<()> {
        if self.fail_writes {
            return Err(TransportError::Closed);
        }
        self.written.push(byte);
        Ok(())
    }
}
