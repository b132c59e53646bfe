//! Session state machine driving an external LDPC encoder device.
//!
//! A session walks `IDLE → SYNCING → NEGOTIATING → TRANSFERRING` and ends in
//! `COMPLETED` or `FAILED`, after which the controller is idle again. Every
//! phase is bounded by its own timeout and nothing is retried; a failed
//! session is reported to the caller, who may start a new one.
//!
//! The phases are usable on their own:
//! - [`SyncDetector`] waits for the device's sync tag
//! - [`ParameterNegotiator`] sends the length field and reads back K/N
//! - [`BlockTransferEngine`] moves the message block by block
//!
//! [`SessionController`] runs them in order and keeps the last [`Session`].

pub mod config;
pub mod controller;
pub mod error;
pub mod message;
pub mod negotiate;
pub mod session;
pub mod sync;
pub mod transfer;

pub use config::{
    SessionConfig, DEFAULT_BLOCK_TIMEOUT, DEFAULT_MAX_ENCODED_BYTES, DEFAULT_PARAMETER_TIMEOUT,
    DEFAULT_SYNC_TIMEOUT,
};
pub use controller::{FailureSummary, SessionController, SessionState, SessionStatus};
pub use error::{Result, SessionError, SessionPhase};
pub use ldpclink_wire::SessionParameters;
pub use message::{Message, MAX_MESSAGE_BYTES};
pub use negotiate::ParameterNegotiator;
pub use session::{InputMode, Session, SessionRequest, SessionResult};
pub use sync::SyncDetector;
pub use transfer::BlockTransferEngine;
