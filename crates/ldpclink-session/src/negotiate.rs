use std::time::Duration;

use bytes::BytesMut;
use ldpclink_transport::{Pacing, Transport, TransportError};
use ldpclink_wire::{encode_length, SessionParameters, PARAMETER_FIELD_SIZE};
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::error::{Result, SessionError, SessionPhase};

/// Announces the message length and collects the device's K/N reply.
#[derive(Debug, Clone)]
pub struct ParameterNegotiator {
    /// Deadline for the K/N reply.
    pub timeout: Duration,
    /// Sleep between availability checks.
    pub poll: Duration,
    /// Delay after each length byte.
    pub pacing: Pacing,
}

impl Default for ParameterNegotiator {
    fn default() -> Self {
        SessionConfig::default().negotiator()
    }
}

impl ParameterNegotiator {
    /// Send `bits` as the big-endian length field, one paced byte at a time.
    ///
    /// No acknowledgement follows; success means both bytes were written.
    pub fn send_length<T: Transport + ?Sized>(&self, transport: &mut T, bits: u16) -> Result<()> {
        let mut field = BytesMut::new();
        encode_length(bits, &mut field);

        transport
            .write_paced(&field, &self.pacing)
            .map_err(SessionError::LengthSendFailure)?;
        info!(bits, "sent message length");
        Ok(())
    }

    /// Wait for four buffered bytes and decode them as K then N.
    ///
    /// Exactly four bytes are consumed; anything after them stays buffered
    /// for the transfer phase.
    pub fn receive_parameters<T: Transport + ?Sized>(
        &self,
        transport: &mut T,
    ) -> Result<SessionParameters> {
        debug!(timeout = ?self.timeout, "waiting for K and N");
        match transport.wait_available(PARAMETER_FIELD_SIZE, self.timeout, self.poll) {
            Ok(_) => {}
            Err(TransportError::Timeout {
                received, waited, ..
            }) => {
                warn!(?waited, available = received, "parameters not received");
                return Err(SessionError::ParameterTimeout {
                    waited,
                    available: received,
                });
            }
            Err(err) => return Err(SessionError::transport(SessionPhase::Negotiation, err)),
        }

        let mut field = [0u8; PARAMETER_FIELD_SIZE];
        transport
            .read_exact_within(&mut field, self.timeout, self.poll)
            .map_err(|err| SessionError::transport(SessionPhase::Negotiation, err))?;

        let params = SessionParameters::from_be_bytes(field);
        info!(k = params.k, n = params.n, "received parameters");
        Ok(params)
    }

    /// `send_length` followed by `receive_parameters`.
    pub fn negotiate<T: Transport + ?Sized>(
        &self,
        transport: &mut T,
        bits: u16,
    ) -> Result<SessionParameters> {
        self.send_length(transport, bits)?;
        self.receive_parameters(transport)
    }
}
