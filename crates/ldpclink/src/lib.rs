//! Host client for external LDPC encoder devices.
//!
//! ldpclink drives an encoder that sits on the far end of a serial link: it
//! waits for the device to announce itself, negotiates block parameters and
//! streams a message through it block by block.
//!
//! # Crate Structure
//!
//! - [`transport`]: byte channel abstraction, paced writes and bounded reads
//! - [`wire`]: sync tag, field codecs, block arithmetic and a simulated device
//! - [`session`]: the session state machine and its results
//! - [`input`]: text and hex message entry plus byte rendering

pub mod input;

/// Re-export transport types.
pub mod transport {
    pub use ldpclink_transport::*;
}

/// Re-export wire types.
pub mod wire {
    pub use ldpclink_wire::*;
}

/// Re-export session types.
pub mod session {
    pub use ldpclink_session::*;
}
