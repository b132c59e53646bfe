use std::thread;
use std::time::{Duration, Instant};

use ldpclink_transport::Transport;
use ldpclink_wire::TagMatcher;
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::error::{Result, SessionError, SessionPhase};

/// Waits for the device's sync tag on the inbound stream.
#[derive(Debug, Clone)]
pub struct SyncDetector {
    /// Give up after this long.
    pub timeout: Duration,
    /// Sleep while no byte is buffered.
    pub poll: Duration,
    /// See [`TagMatcher`].
    pub rescan: bool,
}

impl Default for SyncDetector {
    fn default() -> Self {
        SessionConfig::default().sync_detector()
    }
}

impl SyncDetector {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }

    /// Consume bytes until the tag completes or the timeout expires.
    ///
    /// Returns how long the wait took. Bytes after the tag are left unread.
    pub fn detect<T: Transport + ?Sized>(&self, transport: &mut T) -> Result<Duration> {
        let start = Instant::now();
        let mut matcher = TagMatcher::new(self.rescan);
        let mut discarded = 0usize;

        debug!(timeout = ?self.timeout, "waiting for sync tag");
        loop {
            let waited = start.elapsed();
            if waited >= self.timeout {
                warn!(?waited, discarded, "sync tag not received");
                return Err(SessionError::SyncTimeout { waited });
            }

            let byte = transport
                .read_byte()
                .map_err(|err| SessionError::transport(SessionPhase::Sync, err))?;
            match byte {
                Some(byte) => {
                    if matcher.push(byte) {
                        let waited = start.elapsed();
                        info!(?waited, discarded, "sync tag received");
                        return Ok(waited);
                    }
                    discarded += 1;
                }
                None => thread::sleep(self.poll),
            }
        }
    }
}

impl From<&SessionConfig> for SyncDetector {
    fn from(config: &SessionConfig) -> Self {
        config.sync_detector()
    }
}
