//! Sleep state machine
//!
//! The character dozes off after a stretch of low load and is forced asleep
//! while the link is stale. It only wakes up when load recovers *and* data
//! is arriving, so a dead link always reads as "sleeping".

use crate::config::AnimationConfig;
use crate::time::Millis;

/// Number of phases of the sleep indicator animation
pub const SLEEP_PHASES: u8 = 3;

/// Character sleep states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SleepState {
    #[default]
    Awake,
    Sleeping,
}

/// Events that drive sleep transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SleepEvent {
    /// Load stayed below the threshold for the configured time
    LowLoadTimeout,
    /// No status message decoded recently
    LinkStale,
    /// Load is back above the threshold and the link is fresh
    LoadRecovered,
}

impl SleepState {
    /// Process an event and return the next state
    pub fn transition(self, event: SleepEvent) -> Self {
        use SleepEvent::*;
        use SleepState::*;

        match (self, event) {
            (Awake, LowLoadTimeout) => Sleeping,
            (Awake, LinkStale) => Sleeping,
            (Sleeping, LoadRecovered) => Awake,
            _ => self,
        }
    }

    pub fn is_sleeping(&self) -> bool {
        matches!(self, SleepState::Sleeping)
    }
}

/// Owns the timers around [`SleepState`]
#[derive(Debug, Clone, Default)]
pub struct SleepTracker {
    state: SleepState,
    /// Start of the current low-load stretch
    low_load_since: Option<Millis>,
    /// Sleep indicator phase, `0..SLEEP_PHASES`
    phase: u8,
    phase_changed_at: Millis,
}

impl SleepTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the tracker by one tick
    ///
    /// # Arguments
    /// - `load`: smoothed load in `[0, 1]`
    /// - `link_fresh`: a message was decoded within the stale timeout
    pub fn update(&mut self, load: f32, link_fresh: bool, now: Millis, config: &AnimationConfig) {
        if !link_fresh {
            self.apply(SleepEvent::LinkStale, now);
        }

        if load < config.sleep_load_threshold {
            let since = *self.low_load_since.get_or_insert(now);
            if now.since(since) >= config.sleep_after_ms {
                self.apply(SleepEvent::LowLoadTimeout, now);
            }
        } else {
            self.low_load_since = None;
            if link_fresh {
                self.apply(SleepEvent::LoadRecovered, now);
            }
        }

        if self.state.is_sleeping() && now.since(self.phase_changed_at) > config.sleep_phase_ms {
            self.phase = (self.phase + 1) % SLEEP_PHASES;
            self.phase_changed_at = now;
        }
    }

    fn apply(&mut self, event: SleepEvent, now: Millis) {
        let next = self.state.transition(event);
        if next != self.state {
            self.phase = 0;
            self.phase_changed_at = now;
            self.state = next;
        }
    }

    pub fn is_sleeping(&self) -> bool {
        self.state.is_sleeping()
    }

    /// Current sleep indicator phase (0 while awake)
    pub fn phase(&self) -> u8 {
        self.phase
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: u32 = 60;

    fn run(tracker: &mut SleepTracker, from: u32, to: u32, load: f32, fresh: bool) {
        let config = AnimationConfig::default();
        let mut t = from;
        while t <= to {
            tracker.update(load, fresh, Millis(t), &config);
            t += TICK;
        }
    }

    #[test]
    fn test_transition_table() {
        use SleepEvent::*;
        use SleepState::*;

        assert_eq!(Awake.transition(LowLoadTimeout), Sleeping);
        assert_eq!(Awake.transition(LinkStale), Sleeping);
        assert_eq!(Awake.transition(LoadRecovered), Awake);
        assert_eq!(Sleeping.transition(LoadRecovered), Awake);
        assert_eq!(Sleeping.transition(LinkStale), Sleeping);
        assert_eq!(Sleeping.transition(LowLoadTimeout), Sleeping);
    }

    #[test]
    fn test_falls_asleep_after_low_load() {
        let mut tracker = SleepTracker::new();
        run(&mut tracker, 1000, 9940, 0.1, true);
        assert!(!tracker.is_sleeping());
        run(&mut tracker, 10_000, 10_000, 0.1, true);
        assert!(tracker.is_sleeping());
    }

    #[test]
    fn test_load_spike_restarts_low_load_timer() {
        let mut tracker = SleepTracker::new();
        run(&mut tracker, 0, 6000, 0.1, true);
        run(&mut tracker, 6060, 6060, 0.5, true);
        run(&mut tracker, 6120, 14_000, 0.1, true);
        assert!(!tracker.is_sleeping());
        run(&mut tracker, 14_060, 15_200, 0.1, true);
        assert!(tracker.is_sleeping());
    }

    #[test]
    fn test_stale_link_forces_sleep_at_any_load() {
        let mut tracker = SleepTracker::new();
        run(&mut tracker, 0, 0, 0.9, false);
        assert!(tracker.is_sleeping());
    }

    #[test]
    fn test_no_wake_while_stale() {
        let mut tracker = SleepTracker::new();
        run(&mut tracker, 0, 3000, 0.9, false);
        assert!(tracker.is_sleeping());
        run(&mut tracker, 3060, 3060, 0.9, true);
        assert!(!tracker.is_sleeping());
    }

    #[test]
    fn test_phase_cycles_and_resets_on_wake() {
        let config = AnimationConfig::default();
        let mut tracker = SleepTracker::new();
        tracker.update(0.9, false, Millis(0), &config);
        assert_eq!(tracker.phase(), 0);

        tracker.update(0.9, false, Millis(601), &config);
        assert_eq!(tracker.phase(), 1);
        tracker.update(0.9, false, Millis(1202), &config);
        assert_eq!(tracker.phase(), 2);
        tracker.update(0.9, false, Millis(1803), &config);
        assert_eq!(tracker.phase(), 0);
        tracker.update(0.9, false, Millis(2404), &config);
        assert_eq!(tracker.phase(), 1);

        tracker.update(0.9, true, Millis(2464), &config);
        assert!(!tracker.is_sleeping());
        assert_eq!(tracker.phase(), 0);
    }

    #[test]
    fn test_low_load_timer_across_rollover() {
        let mut tracker = SleepTracker::new();
        let start = u32::MAX - 4000;
        let config = AnimationConfig::default();
        let mut t = Millis(start);
        for _ in 0..=(9000 / TICK) {
            tracker.update(0.05, true, t, &config);
            t = t.offset(TICK);
        }
        assert!(tracker.is_sleeping());
    }
}
