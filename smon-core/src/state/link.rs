//! Serial link health
//!
//! The link is passive: the host just keeps sending. Health is derived from
//! the time of the last successfully decoded message.

use crate::time::Millis;

/// What the link looks like from the display side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkState {
    /// No message has ever been decoded
    Waiting,
    /// Last message is within the stale timeout
    Live,
    /// Was receiving, but nothing decoded for longer than the timeout
    Stale,
}

/// Line counters for the diagnostic channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkStats {
    /// Lines decoded and merged
    pub accepted: u32,
    /// Lines rejected by the decoder (or not UTF-8)
    pub malformed: u32,
    /// Lines dropped for exceeding the buffer
    pub overlong: u32,
}

/// Tracks the last decode and the stale condition
#[derive(Debug, Clone, Default)]
pub struct LinkMonitor {
    last_decode: Option<Millis>,
    /// Latched once the timeout is seen, so a long silence cannot wrap
    /// back into "live"
    stale: bool,
    stats: LinkStats,
}

impl LinkMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successfully decoded message
    pub fn message_received(&mut self, now: Millis) {
        self.last_decode = Some(now);
        self.stale = false;
        self.stats.accepted = self.stats.accepted.wrapping_add(1);
    }

    pub fn malformed_line(&mut self) {
        self.stats.malformed = self.stats.malformed.wrapping_add(1);
    }

    pub fn overlong_line(&mut self) {
        self.stats.overlong = self.stats.overlong.wrapping_add(1);
    }

    /// Latch the stale condition; call at least once per tick
    pub fn refresh(&mut self, now: Millis, stale_after_ms: u32) {
        if let Some(last) = self.last_decode {
            if now.since(last) > stale_after_ms {
                self.stale = true;
            }
        }
    }

    /// Current link state
    pub fn state(&self, now: Millis, stale_after_ms: u32) -> LinkState {
        match self.last_decode {
            None => LinkState::Waiting,
            Some(last) if self.stale || now.since(last) > stale_after_ms => LinkState::Stale,
            Some(_) => LinkState::Live,
        }
    }

    /// Check whether any message was ever decoded
    pub fn has_data(&self) -> bool {
        self.last_decode.is_some()
    }

    pub fn stats(&self) -> LinkStats {
        self.stats
    }
}
