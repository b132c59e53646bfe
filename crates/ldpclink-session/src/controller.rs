use std::fmt;
use std::time::Instant;

use ldpclink_transport::Transport;
use ldpclink_wire::SessionParameters;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::error::{Result, SessionError, SessionPhase};
use crate::message::Message;
use crate::session::{InputMode, Session, SessionRequest, SessionResult};

/// Where the controller is in the session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Syncing,
    Negotiating,
    Transferring,
    Completed,
    Failed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "IDLE",
            SessionState::Syncing => "SYNCING",
            SessionState::Negotiating => "NEGOTIATING",
            SessionState::Transferring => "TRANSFERRING",
            SessionState::Completed => "COMPLETED",
            SessionState::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

/// Why the most recent session failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureSummary {
    pub phase: SessionPhase,
    pub message: String,
    pub timeout: bool,
}

impl From<&SessionError> for FailureSummary {
    fn from(err: &SessionError) -> Self {
        Self {
            phase: err.phase(),
            message: err.to_string(),
            timeout: err.is_timeout(),
        }
    }
}

/// Snapshot of the controller for status displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionStatus {
    pub state: SessionState,
    /// Parameters from the most recent negotiation, even if its transfer failed.
    pub last_parameters: Option<SessionParameters>,
    pub last_message_bits: Option<u16>,
    pub last_failure: Option<FailureSummary>,
    pub sessions_run: u64,
}

/// Runs sessions against one device, one at a time.
///
/// The controller owns the transport and the results of the last session.
/// Each request replaces those results wholesale: they are discarded when the
/// request starts and republished only if it completes.
pub struct SessionController<T> {
    transport: T,
    config: SessionConfig,
    state: SessionState,
    last_session: Option<Session>,
    last_parameters: Option<SessionParameters>,
    last_message_bits: Option<u16>,
    last_failure: Option<FailureSummary>,
    sessions_run: u64,
}

impl<T: Transport> SessionController<T> {
    /// Controller with default timeouts and pacing.
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, SessionConfig::default())
    }

    pub fn with_config(transport: T, config: SessionConfig) -> Self {
        Self {
            transport,
            config,
            state: SessionState::Idle,
            last_session: None,
            last_parameters: None,
            last_message_bits: None,
            last_failure: None,
            sessions_run: 0,
        }
    }

    /// Run one complete session. Nothing is retried.
    pub fn run_session(&mut self, request: SessionRequest) -> SessionResult {
        self.clear_results();
        self.last_message_bits = Some(request.message.bits());
        self.sessions_run += 1;

        let result = self.drive(&request);
        match &result {
            Ok(session) => {
                self.transition(SessionState::Completed);
                info!(
                    blocks = session.blocks,
                    encoded_bytes = session.encoded.len(),
                    elapsed = ?session.elapsed,
                    "session completed"
                );
                self.last_session = Some(session.clone());
            }
            Err(err) => {
                self.transition(SessionState::Failed);
                warn!(phase = %err.phase(), error = %err, "session failed");
                self.last_failure = Some(FailureSummary::from(err));
            }
        }
        self.transition(SessionState::Idle);
        result
    }

    /// Build a request from raw parts and run it.
    ///
    /// `actual_bits` bits of `data` are the message; `calculation_bits`, when
    /// given, replaces it as the announced length and block-planning basis.
    pub fn run(
        &mut self,
        data: impl Into<bytes::Bytes>,
        actual_bits: u16,
        mode: InputMode,
        calculation_bits: Option<u16>,
    ) -> SessionResult {
        let message = match Message::new(data, actual_bits) {
            Ok(message) => message,
            Err(err) => {
                self.clear_results();
                warn!(phase = %err.phase(), error = %err, "request rejected");
                self.last_failure = Some(FailureSummary::from(&err));
                return Err(err);
            }
        };
        let mut request = SessionRequest::new(message, mode);
        request.calculation_bits = calculation_bits;
        self.run_session(request)
    }

    fn drive(&mut self, request: &SessionRequest) -> Result<Session> {
        let started = Instant::now();

        self.transition(SessionState::Syncing);
        self.config.sync_detector().detect(&mut self.transport)?;

        self.transition(SessionState::Negotiating);
        let negotiator = self.config.negotiator();
        negotiator.send_length(&mut self.transport, request.length_field())?;
        let params = negotiator.receive_parameters(&mut self.transport)?;
        self.last_parameters = Some(params);

        self.transition(SessionState::Transferring);
        let engine = self.config.transfer_engine();
        let effective_bits = request.effective_bits();
        let encoded = engine.transfer(
            &mut self.transport,
            params,
            &request.message,
            request.calculation_bits,
        )?;
        let blocks = engine.plan(params, effective_bits)?.blocks();

        Ok(Session {
            message: request.message.clone(),
            mode: request.mode,
            params,
            calculation_bits: effective_bits,
            blocks,
            encoded,
            elapsed: started.elapsed(),
        })
    }

    fn clear_results(&mut self) {
        self.last_session = None;
        self.last_parameters = None;
        self.last_message_bits = None;
        self.last_failure = None;
    }

    fn transition(&mut self, next: SessionState) {
        debug!(from = %self.state, to = %next, "session state");
        self.state = next;
    }
}

impl<T> SessionController<T> {
    /// Current lifecycle state. `Idle` whenever no session is running.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The last completed session, if the most recent request completed.
    pub fn last_session(&self) -> Option<&Session> {
        self.last_session.as_ref()
    }

    /// Why the most recent request failed, if it did.
    pub fn last_failure(&self) -> Option<&FailureSummary> {
        self.last_failure.as_ref()
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            state: self.state,
            last_parameters: self.last_parameters,
            last_message_bits: self.last_message_bits,
            last_failure: self.last_failure.clone(),
            sessions_run: self.sessions_run,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Borrow the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutably borrow the transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consume the controller and return the transport.
    pub fn into_inner(self) -> T {
        self.transport
    }
}

impl<T> fmt::Debug for SessionController<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionController")
            .field("state", &self.state)
            .field("sessions_run", &self.sessions_run)
            .field("has_last_session", &self.last_session.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use ldpclink_transport::{Pacing, ScriptedTransport};
    use ldpclink_wire::{SimulatedEncoder, SimulatorConfig};

    use super::*;

    fn fast_config() -> SessionConfig {
        SessionConfig {
            sync_timeout: Duration::from_millis(60),
            parameter_timeout: Duration::from_millis(60),
            block_timeout: Duration::from_millis(60),
            parameter_poll: Duration::from_millis(1),
            pacing: Pacing::none(),
            ..SessionConfig::default()
        }
    }

    fn text_request(text: &str) -> SessionRequest {
        SessionRequest::new(
            Message::from_bytes(text.as_bytes().to_vec()).unwrap(),
            InputMode::Text,
        )
    }

    #[test]
    fn completed_session_is_published() {
        let sim = SimulatedEncoder::with_parameters(16, 32);
        let mut controller = SessionController::with_config(sim, fast_config());

        let session = controller.run_session(text_request("abc")).unwrap();

        assert_eq!(session.params, SessionParameters::new(16, 32));
        assert_eq!(session.blocks, 2);
        assert_eq!(session.encoded.len(), 8);
        assert_eq!(controller.state(), SessionState::Idle);
        assert_eq!(controller.last_session(), Some(&session));
        assert!(controller.last_failure().is_none());
        assert_eq!(controller.transport().length_bits(), Some(24));
    }

    #[test]
    fn sync_failure_never_writes() {
        let mut controller = SessionController::with_config(ScriptedTransport::new(), fast_config());

        let err = controller.run_session(text_request("x")).unwrap_err();

        assert!(matches!(err, SessionError::SyncTimeout { .. }));
        assert!(controller.transport().written().is_empty());
        assert_eq!(controller.state(), SessionState::Idle);
        assert_eq!(
            controller.last_failure().map(|f| f.phase),
            Some(SessionPhase::Sync)
        );
    }

    #[test]
    fn parameter_timeout_fails_negotiation() {
        let transport = ScriptedTransport::with_inbound([0xDE, 0xAD, 0xC0, 0xDE, 0x00]);
        let mut controller = SessionController::with_config(transport, fast_config());

        let err = controller.run_session(text_request("x")).unwrap_err();

        assert!(matches!(err, SessionError::ParameterTimeout { available: 1, .. }));
        assert_eq!(controller.transport().written(), &[0x00, 0x08]);
        assert!(controller.status().last_parameters.is_none());
    }

    #[test]
    fn invalid_parameters_fail_before_transfer() {
        let transport =
            ScriptedTransport::with_inbound([0xDE, 0xAD, 0xC0, 0xDE, 0x00, 0x00, 0x00, 0x10]);
        let mut controller = SessionController::with_config(transport, fast_config());

        let err = controller.run_session(text_request("x")).unwrap_err();

        assert!(matches!(err, SessionError::InvalidParameters(_)));
        assert_eq!(controller.transport().written().len(), 2);
    }

    #[test]
    fn failure_discards_previous_results() {
        let sim = SimulatedEncoder::new(SimulatorConfig {
            params: SessionParameters::new(8, 16),
            stall_at_block: Some(3),
            ..SimulatorConfig::default()
        });
        let mut controller = SessionController::with_config(sim, fast_config());

        controller.run_session(text_request("ab")).unwrap();
        assert!(controller.last_session().is_some());

        let err = controller.run_session(text_request("abcd")).unwrap_err();
        assert!(matches!(err, SessionError::BlockTimeout { block: 3, .. }));
        assert!(controller.last_session().is_none());

        let status = controller.status();
        assert_eq!(status.sessions_run, 2);
        assert_eq!(status.last_parameters, Some(SessionParameters::new(8, 16)));
        assert_eq!(status.last_message_bits, Some(32));
        assert_eq!(status.state, SessionState::Idle);
    }

    #[test]
    fn run_builds_request_from_parts() {
        let sim = SimulatedEncoder::with_parameters(8, 8);
        let mut controller = SessionController::with_config(sim, fast_config());

        let session = controller
            .run(vec![0x12, 0x34], 16, InputMode::HexManualLength, Some(24))
            .unwrap();

        assert_eq!(session.calculation_bits, 24);
        assert_eq!(session.blocks, 3);
        assert_eq!(session.encoded.as_ref(), &[0x12, 0x34, 0x00]);
        assert_eq!(controller.transport().length_bits(), Some(24));
    }

    #[test]
    fn run_rejects_bits_beyond_data() {
        let mut controller = SessionController::with_config(ScriptedTransport::new(), fast_config());
        let err = controller
            .run(vec![0x01], 16, InputMode::Hex, None)
            .unwrap_err();
        assert_eq!(err.phase(), SessionPhase::Request);
        assert_eq!(controller.status().sessions_run, 0);
    }

    #[test]
    fn rejected_request_replaces_previous_results() {
        let sim = SimulatedEncoder::with_parameters(8, 16);
        let mut controller = SessionController::with_config(sim, fast_config());
        controller.run_session(text_request("a")).unwrap();
        assert!(controller.last_session().is_some());

        let err = controller
            .run(vec![0x01], 16, InputMode::Hex, None)
            .unwrap_err();

        assert!(controller.last_session().is_none());
        let failure = controller.last_failure().expect("rejection is recorded");
        assert_eq!(failure.phase, SessionPhase::Request);
        assert_eq!(failure.message, err.to_string());
        assert!(!failure.timeout);

        let status = controller.status();
        assert_eq!(status.last_parameters, None);
        assert_eq!(status.last_message_bits, None);
        assert_eq!(status.sessions_run, 1);
        assert_eq!(controller.state(), SessionState::Idle);
    }
}
