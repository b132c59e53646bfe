//! Sync tag recognition.

/// Tag the device sends when it is ready to start a session.
pub const SYNC_TAG: [u8; 4] = [0xDE, 0xAD, 0xC0, 0xDE];

/// Incremental matcher for [`SYNC_TAG`] over a noisy byte stream.
///
/// Bytes are fed one at a time. Matching bytes must be strictly adjacent; any
/// other byte resets progress. With `rescan` enabled the resetting byte is then
/// tried as the first tag byte, so `DE DE AD C0 DE` is accepted. No proper
/// prefix of the tag is also a suffix of it, which makes that single retry
/// equivalent to a full failure-function automaton. With `rescan` disabled the
/// resetting byte is discarded outright.
#[derive(Debug, Clone)]
pub struct TagMatcher {
    cursor: usize,
    rescan: bool,
}

impl TagMatcher {
    pub fn new(rescan: bool) -> Self {
        Self { cursor: 0, rescan }
    }

    /// Feed one byte. Returns `true` when it completes the tag.
    pub fn push(&mut self, byte: u8) -> bool {
        if byte == SYNC_TAG[self.cursor] {
            self.cursor += 1;
        } else {
            self.cursor = 0;
            if self.rescan && byte == SYNC_TAG[0] {
                self.cursor = 1;
            }
        }

        if self.cursor == SYNC_TAG.len() {
            self.cursor = 0;
            return true;
        }
        false
    }

    /// Number of tag bytes matched so far.
    pub fn progress(&self) -> usize {
        self.cursor
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
    }
}

impl Default for TagMatcher {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(matcher: &mut TagMatcher, bytes: &[u8]) -> Option<usize> {
        bytes.iter().position(|&b| matcher.push(b))
    }

    #[test]
    fn exact_tag_matches_on_last_byte() {
        let mut m = TagMatcher::default();
        assert_eq!(feed(&mut m, &SYNC_TAG), Some(3));
        assert_eq!(m.progress(), 0);
    }

    #[test]
    fn noise_before_tag_is_skipped() {
        let mut m = TagMatcher::default();
        let stream = [0x00, 0xFF, 0x12, 0xAD, 0xC0, 0xDE, 0xAD, 0xC0, 0xDE];
        assert_eq!(feed(&mut m, &stream), Some(8));
    }

    #[test]
    fn three_of_four_is_not_a_match() {
        for near in [
            [0xDE, 0xAD, 0xC0, 0xDF],
            [0xDE, 0xAD, 0xC1, 0xDE],
            [0xDE, 0xAE, 0xC0, 0xDE],
            [0xDF, 0xAD, 0xC0, 0xDE],
        ] {
            let mut m = TagMatcher::default();
            assert_eq!(feed(&mut m, &near), None, "{near:02X?}");
        }
    }

    #[test]
    fn repeated_first_byte_restarts_match() {
        let mut m = TagMatcher::default();
        assert_eq!(feed(&mut m, &[0xDE, 0xDE, 0xAD, 0xC0, 0xDE]), Some(4));
    }

    #[test]
    fn broken_tag_followed_by_full_tag() {
        let mut m = TagMatcher::default();
        let stream = [0xDE, 0xAD, 0xDE, 0xAD, 0xC0, 0xDE];
        assert_eq!(feed(&mut m, &stream), Some(5));
    }

    #[test]
    fn interleaved_noise_resets_progress() {
        let mut m = TagMatcher::default();
        assert_eq!(feed(&mut m, &[0xDE, 0xAD, 0x00, 0xC0, 0xDE]), None);
        assert_eq!(m.progress(), 1);
    }

    #[test]
    fn legacy_matcher_discards_resetting_byte() {
        let mut m = TagMatcher::new(false);
        assert_eq!(feed(&mut m, &[0xDE, 0xDE, 0xAD, 0xC0, 0xDE]), None);
        assert_eq!(m.progress(), 1);

        m.reset();
        assert_eq!(feed(&mut m, &[0x55, 0xDE, 0xAD, 0xC0, 0xDE]), Some(4));
    }
}
