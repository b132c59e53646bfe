use std::time::Duration;

use ldpclink_transport::Pacing;

use crate::negotiate::ParameterNegotiator;
use crate::sync::SyncDetector;
use crate::transfer::BlockTransferEngine;

/// How long the device gets to announce itself.
pub const DEFAULT_SYNC_TIMEOUT: Duration = Duration::from_secs(5);

/// How long the device gets to answer the length field with K/N.
pub const DEFAULT_PARAMETER_TIMEOUT: Duration = Duration::from_secs(3);

/// How long the device gets to return each block's encoded bytes.
pub const DEFAULT_BLOCK_TIMEOUT: Duration = Duration::from_secs(3);

/// Ceiling on the encoded result buffer: 16 MiB.
pub const DEFAULT_MAX_ENCODED_BYTES: usize = 16 * 1024 * 1024;

/// Timing and limits for a session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Deadline for the sync tag.
    pub sync_timeout: Duration,
    /// Deadline for the K/N reply.
    pub parameter_timeout: Duration,
    /// Deadline for each block's encoded reply.
    pub block_timeout: Duration,
    /// Sleep between polls while waiting for the sync tag.
    pub sync_poll: Duration,
    /// Sleep between polls while waiting for K/N.
    pub parameter_poll: Duration,
    /// Sleep between polls while waiting for encoded bytes.
    pub block_poll: Duration,
    /// Delay after every byte sent to the device.
    pub pacing: Pacing,
    /// Retry a tag-breaking byte as the first tag byte.
    pub sync_rescan: bool,
    /// Largest encoded result a session may allocate.
    pub max_encoded_bytes: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sync_timeout: DEFAULT_SYNC_TIMEOUT,
            parameter_timeout: DEFAULT_PARAMETER_TIMEOUT,
            block_timeout: DEFAULT_BLOCK_TIMEOUT,
            sync_poll: Duration::from_millis(1),
            parameter_poll: Duration::from_millis(10),
            block_poll: Duration::from_millis(1),
            pacing: Pacing::default(),
            sync_rescan: true,
            max_encoded_bytes: DEFAULT_MAX_ENCODED_BYTES,
        }
    }
}

impl SessionConfig {
    pub fn sync_detector(&self) -> SyncDetector {
        SyncDetector {
            timeout: self.sync_timeout,
            poll: self.sync_poll,
            rescan: self.sync_rescan,
        }
    }

    pub fn negotiator(&self) -> ParameterNegotiator {
        ParameterNegotiator {
            timeout: self.parameter_timeout,
            poll: self.parameter_poll,
            pacing: self.pacing,
        }
    }

    pub fn transfer_engine(&self) -> BlockTransferEngine {
        BlockTransferEngine {
            block_timeout: self.block_timeout,
            poll: self.block_poll,
            pacing: self.pacing,
            max_encoded_bytes: self.max_encoded_bytes,
        }
    }
}
