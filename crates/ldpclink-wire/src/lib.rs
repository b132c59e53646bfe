//! Byte-exact wire vocabulary of the LDPC encoder device protocol.
//!
//! A session on the wire looks like this:
//!
//! ```text
//! device → host   DE AD C0 DE                 sync tag, noise may precede it
//! host → device   LL LL                       message bit count (BE)
//! device → host   KK KK NN NN                 K and N (BE)
//! host → device   ceil(K/8) bytes  ┐
//! device → host   ceil(N/8) bytes  ┘ repeated once per block
//! ```
//!
//! This crate holds the pure pieces: tag matching, field codecs and block
//! arithmetic. It also ships [`SimulatedEncoder`], a software device that
//! speaks the protocol over a [`ldpclink_transport::Transport`].

pub mod codec;
pub mod error;
pub mod geometry;
pub mod sim;
pub mod tag;

pub use codec::{
    decode_parameters, encode_length, encode_parameters, SessionParameters, LENGTH_FIELD_SIZE,
    PARAMETER_FIELD_SIZE,
};
pub use error::{Result, WireError};
pub use geometry::BlockGeometry;
pub use sim::{systematic_codeword, SimulatedEncoder, SimulatorConfig};
pub use tag::{TagMatcher, SYNC_TAG};
