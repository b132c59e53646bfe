//! Duplex byte transport abstraction for LDPC encoder devices.
//!
//! The protocol layers above only ever see a [`Transport`]: a byte channel
//! that can report how many inbound bytes are buffered, hand them out one at a
//! time without blocking, and accept outbound bytes. Timeout-bounded reads and
//! paced writes are provided on top of those primitives.
//!
//! Implementations:
//! - [`SerialTransport`] over a hardware serial port (`serial` feature)
//! - [`ScriptedTransport`], a replay double for exercising framing logic

pub mod error;
pub mod script;
pub mod traits;

#[cfg(feature = "serial")]
pub mod serial;

pub use error::{Result, TransportError};
pub use script::ScriptedTransport;
pub use traits::{Pacing, Transport, DEFAULT_INTER_BYTE_DELAY};

#[cfg(feature = "serial")]
pub use serial::{available_ports, SerialConfig, SerialTransport, DEFAULT_BAUD};
