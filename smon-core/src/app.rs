//! Application state
//!
//! One value owned by the control loop and passed by reference to the
//! decoder side (`ingest`/`apply_line`), the animation side (`tick`) and
//! the renderer. There is no other shared state.

use smon_protocol::{DecodeError, LineError, LineReader, StatusMessage};

use crate::animation::AnimationState;
use crate::config::AnimationConfig;
use crate::metrics::MetricSnapshot;
use crate::state::{LinkMonitor, LinkState, LinkStats, Mood};
use crate::time::Millis;

/// A rejected input line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IngestError {
    /// Framing failure (overlong or not UTF-8)
    Line(LineError),
    /// Line is not a valid status message
    Decode(DecodeError),
}

impl From<LineError> for IngestError {
    fn from(err: LineError) -> Self {
        IngestError::Line(err)
    }
}

impl From<DecodeError> for IngestError {
    fn from(err: DecodeError) -> Self {
        IngestError::Decode(err)
    }
}

/// Metric, animation and link state of the display
#[derive(Debug, Clone)]
pub struct App {
    config: AnimationConfig,
    metrics: MetricSnapshot,
    animation: AnimationState,
    link: LinkMonitor,
}

impl App {
    /// Create the application state
    ///
    /// `seed` initialises the pseudo-random generator of the effect timers.
    pub fn new(config: AnimationConfig, seed: u64) -> Self {
        Self {
            animation: AnimationState::new(seed, &config),
            config,
            metrics: MetricSnapshot::new(),
            link: LinkMonitor::new(),
        }
    }

    /// Decode one record and merge it
    ///
    /// On error nothing but the malformed counter changes.
    pub fn apply_line(&mut self, line: &str, now: Millis) -> Result<(), DecodeError> {
        let msg = match StatusMessage::decode(line) {
            Ok(msg) => msg,
            Err(err) => {
                self.link.malformed_line();
                return Err(err);
            }
        };

        self.metrics.merge(&msg);
        self.animation.retarget(&self.metrics, &self.config);
        self.link.message_received(now);
        Ok(())
    }

    /// Feed received bytes through the line reader and apply every
    /// complete line
    ///
    /// Each rejected line is reported to `on_error`. Returns the number of
    /// lines applied.
    pub fn ingest<F>(&mut self, reader: &mut LineReader, bytes: &[u8], now: Millis, mut on_error: F) -> usize
    where
        F: FnMut(IngestError),
    {
        let mut applied = 0;
        for result in reader.drain(bytes) {
            let outcome = result
                .map_err(IngestError::from)
                .and_then(|line| self.apply_line(&line, now).map_err(IngestError::from));
            match outcome {
                Ok(()) => applied += 1,
                Err(err) => {
                    match err {
                        IngestError::Line(LineError::Overlong) => self.link.overlong_line(),
                        IngestError::Line(LineError::InvalidUtf8) => self.link.malformed_line(),
                        IngestError::Decode(_) => {}
                    }
                    on_error(err);
                }
            }
        }
        applied
    }

    /// One animation tick
    ///
    /// Before the first message only the link state is kept current.
    pub fn tick(&mut self, now: Millis) {
        self.link.refresh(now, self.config.stale_after_ms);
        if !self.link.has_data() {
            return;
        }
        let fresh = self.link_state(now) == LinkState::Live;
        self.animation.tick(now, fresh, &self.config);
    }

    pub fn link_state(&self, now: Millis) -> LinkState {
        self.link.state(now, self.config.stale_after_ms)
    }

    /// Mood band from the smoothed values
    pub fn mood(&self) -> Mood {
        Mood::from_load(self.animation.mood_load(&self.metrics), &self.config)
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    pub fn metrics(&self) -> &MetricSnapshot {
        &self.metrics
    }

    pub fn animation(&self) -> &AnimationState {
        &self.animation
    }

    pub fn stats(&self) -> LinkStats {
        self.link.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;

    const TICK: u32 = 60;

    fn app() -> App {
        App::new(AnimationConfig::default(), 0x5eed)
    }

    /// Tick from `from` to `to` inclusive, feeding `line` every `every` ms
    fn run(app: &mut App, from: u32, to: u32, line: Option<&str>, every: u32) {
        let mut t = from;
        while t <= to {
            if let Some(line) = line {
                if (t - from) % every == 0 {
                    app.apply_line(line, Millis(t)).unwrap();
                }
            }
            app.tick(Millis(t));
            t += TICK;
        }
    }

    #[test]
    fn test_waiting_until_first_message() {
        let mut app = app();
        run(&mut app, 0, 10_000, None, 1);
        assert_eq!(app.link_state(Millis(10_000)), LinkState::Waiting);
        assert_eq!(app.animation().cpu_percent(), 0.0);
        assert!(!app.animation().is_sleeping());
    }

    #[test]
    fn test_end_to_end_neutral() {
        let mut app = app();
        run(
            &mut app,
            0,
            3000,
            Some(r#"{"cpu":55,"ram":8000000,"ram_used":4000000}"#),
            1020,
        );
        assert!((app.animation().cpu_percent() - 55.0).abs() < 0.55);
        assert!((app.animation().ram_ratio() - 0.5).abs() < 0.005);
        assert_eq!(app.mood(), Mood::Neutral);
        assert_eq!(app.link_state(Millis(3000)), LinkState::Live);
    }

    #[test]
    fn test_mood_bands_follow_load() {
        let mut app = app();
        run(&mut app, 0, 3000, Some(r#"{"cpu":5,"ram":100,"ram_used":10}"#), 1020);
        assert_eq!(app.mood(), Mood::Happy);
        run(&mut app, 3060, 6000, Some(r#"{"cpu":95,"ram":100,"ram_used":90}"#), 1020);
        assert_eq!(app.mood(), Mood::Sad);
    }

    #[test]
    fn test_sleeps_after_sustained_low_load() {
        let mut app = app();
        let line = r#"{"cpu":10,"ram":8000000,"ram_used":800000}"#;
        run(&mut app, 0, 8400, Some(line), 1020);
        assert!(!app.animation().is_sleeping());
        run(&mut app, 8460, 9600, Some(line), 1020);
        assert!(app.animation().is_sleeping());
        assert_eq!(app.link_state(Millis(9600)), LinkState::Live);
    }

    #[test]
    fn test_silence_forces_sleep() {
        let mut app = app();
        app.apply_line(r#"{"cpu":90,"ram":100,"ram_used":90}"#, Millis(0))
            .unwrap();
        run(&mut app, 0, 4000, None, 1);
        assert!(!app.animation().is_sleeping());
        assert_eq!(app.link_state(Millis(4000)), LinkState::Live);

        app.tick(Millis(4001));
        assert_eq!(app.link_state(Millis(4001)), LinkState::Stale);
        assert!(app.animation().is_sleeping());
    }

    #[test]
    fn test_low_load_then_silence_sleeps() {
        let mut app = app();
        let line = r#"{"cpu":10,"ram":8000000,"ram_used":800000}"#;
        run(&mut app, 0, 3000, Some(line), 1020);
        assert!(!app.animation().is_sleeping());
        // Last record at 2040; the link goes stale well before the 9 s
        // low-load timeout
        run(&mut app, 3060, 7100, None, 1);
        assert!(app.animation().is_sleeping());
    }

    #[test]
    fn test_no_wake_while_stale() {
        let mut app = app();
        app.apply_line(r#"{"cpu":100,"ram":100,"ram_used":100}"#, Millis(0))
            .unwrap();
        run(&mut app, 0, 20_000, None, 1);
        assert!(app.animation().load() > 0.9);
        assert!(app.animation().is_sleeping());

        // Data again: the next tick wakes it
        app.apply_line(r#"{"cpu":100}"#, Millis(20_030)).unwrap();
        app.tick(Millis(20_060));
        assert!(!app.animation().is_sleeping());
        assert_eq!(app.animation().sleep().phase(), 0);
    }

    #[test]
    fn test_placeholder_ticker_for_empty_record() {
        let mut app = app();
        app.apply_line("{}", Millis(0)).unwrap();
        assert_eq!(app.link_state(Millis(0)), LinkState::Live);
        let text = app.animation().ticker().text();
        assert!(text.contains("Smart Monitor"));
    }

    #[test]
    fn test_malformed_line_changes_nothing() {
        let mut app = app();
        app.apply_line(r#"{"cpu":20,"host":"box"}"#, Millis(0)).unwrap();
        let before = app.metrics().clone();

        assert!(app.apply_line(r#"{"cpu":"#, Millis(100)).is_err());
        assert!(app.apply_line(r#"["cpu",90]"#, Millis(200)).is_err());
        assert_eq!(app.metrics(), &before);
        assert_eq!(app.animation().cpu_gauge().target(), 20.0);
        // Failed decodes do not refresh the link
        assert_eq!(app.link_state(Millis(4001)), LinkState::Stale);
        assert_eq!(app.stats().malformed, 2);
    }

    #[test]
    fn test_mistyped_field_keeps_rest_of_record() {
        let mut app = app();
        app.apply_line(r#"{"weather":{"temp":19.5},"host":"box"}"#, Millis(0))
            .unwrap();

        app.apply_line(r#"{"cpu":55,"ram":8000000.0,"ram_used":4000000}"#, Millis(1000))
            .unwrap();
        app.apply_line(r#"{"weather":{"temp":"n/a"},"host":false,"cpu":"busy"}"#, Millis(2000))
            .unwrap();

        assert_eq!(app.metrics().cpu(), Some(55.0));
        assert_eq!(app.metrics().ram_ratio(), Some(0.5));
        assert_eq!(app.metrics().temperature(), Some(19.5));
        assert_eq!(app.metrics().title(), "box");
        // Both records refreshed the link
        assert_eq!(app.link_state(Millis(6000)), LinkState::Live);
        assert_eq!(app.stats().accepted, 3);
        assert_eq!(app.stats().malformed, 0);
    }

    #[test]
    fn test_empty_record_changes_nothing() {
        let mut app = app();
        app.apply_line(r#"{"cpu":20,"ram":100,"ram_used":50,"app":"vim"}"#, Millis(0))
            .unwrap();
        let before = app.metrics().clone();
        app.apply_line("{}", Millis(60)).unwrap();
        assert_eq!(app.metrics(), &before);
        assert_eq!(app.metrics().title(), "vim");
    }

    #[test]
    fn test_ingest_reports_errors_and_continues() {
        let mut app = app();
        let mut reader = LineReader::new();
        let mut errors = Vec::new();

        let mut input = Vec::new();
        input.extend_from_slice(b"{\"cpu\":12}\r\n");
        input.extend_from_slice(b"not json\n");
        input.extend(core::iter::repeat(b'x').take(smon_protocol::MAX_LINE_LEN + 10));
        input.extend_from_slice(b"\n{\"cpu\":");
        let applied = app.ingest(&mut reader, &input, Millis(0), |err| errors.push(err));
        assert_eq!(applied, 1);

        // Rest of the split record arrives later
        let applied = app.ingest(&mut reader, b"34}\n", Millis(60), |err| errors.push(err));
        assert_eq!(applied, 1);

        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0], IngestError::Decode(DecodeError::Syntax { .. })));
        assert_eq!(errors[1], IngestError::Line(LineError::Overlong));
        assert_eq!(app.metrics().cpu(), Some(34.0));
        assert_eq!(
            app.stats(),
            LinkStats {
                accepted: 2,
                malformed: 1,
                overlong: 1
            }
        );
    }
}
