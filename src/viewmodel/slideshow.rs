//! Slideshow state for the full-screen viewer.
//!
//! Timing is driven by the caller: it waits `delay()` and calls `advance()`
//! while `is_playing()` holds.

use std::time::Duration;

use tracing::debug;

use crate::models::preferences::SLIDESHOW_DEFAULT_DELAY_MS;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slideshow {
    len: usize,
    position: usize,
    playing: bool,
    delay_ms: u64,
}

impl Default for Slideshow {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl Slideshow {
    /// Creates a paused slideshow over `len` items starting at `start`.
    pub fn new(len: usize, start: usize) -> Self {
        Self {
            len,
            position: if len == 0 { 0 } else { start.min(len - 1) },
            playing: false,
            delay_ms: SLIDESHOW_DEFAULT_DELAY_MS,
        }
    }

    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.set_delay(delay_ms);
        self
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Sets the per-slide delay. Zero is clamped to one millisecond.
    pub fn set_delay(&mut self, delay_ms: u64) {
        self.delay_ms = delay_ms.max(1);
    }

    /// Starts or stops playback. Returns the new playing state.
    pub fn toggle_play_pause(&mut self) -> bool {
        self.playing = !self.playing && self.len > 0;
        debug!("Slideshow playing={} at {}/{}", self.playing, self.position, self.len);
        self.playing
    }

    /// Moves to the next item, wrapping to the first after the last.
    ///
    /// Does nothing while paused or when there is nothing to show.
    pub fn advance(&mut self) -> Option<usize> {
        if !self.playing || self.len == 0 {
            return None;
        }
        self.position = (self.position + 1) % self.len;
        Some(self.position)
    }

    /// Jumps to an item after the user swipes. Out-of-range indices are ignored.
    pub fn jump_to(&mut self, index: usize) -> bool {
        if index >= self.len {
            return false;
        }
        self.position = index;
        true
    }

    /// Updates the item count after the underlying list changed.
    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        if len == 0 {
            self.position = 0;
            self.playing = false;
        } else if self.position >= len {
            self.position = len - 1;
        }
    }
}
