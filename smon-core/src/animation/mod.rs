//! UI animation state
//!
//! Targets are derived from the metric snapshot whenever a message is
//! decoded. The displayed values chase them on every tick, whether or not
//! new data arrived.

pub mod character;
pub mod gauge;
pub mod ticker;

pub use character::Character;
pub use gauge::{Gauge, NetScale};
pub use ticker::Ticker;

use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::config::AnimationConfig;
use crate::metrics::MetricSnapshot;
use crate::state::SleepTracker;
use crate::time::Millis;

/// Everything the renderer animates
#[derive(Debug, Clone)]
pub struct AnimationState {
    /// CPU percent, `[0, 100]`
    cpu: Gauge,
    /// RAM used ratio, `[0, 1]`
    ram: Gauge,
    /// Network ratio against the auto-scale, `[0, 1]`
    net: Gauge,
    net_scale: NetScale,
    ticker: Ticker,
    character: Character,
    sleep: SleepTracker,
    rng: SmallRng,
}

impl AnimationState {
    /// Create the initial state; `seed` feeds the effect timers
    pub fn new(seed: u64, config: &AnimationConfig) -> Self {
        Self {
            cpu: Gauge::new(100.0),
            ram: Gauge::new(1.0),
            net: Gauge::new(1.0),
            net_scale: NetScale::new(),
            ticker: Ticker::new(config.ticker_viewport_px),
            character: Character::new(),
            sleep: SleepTracker::new(),
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Derive new targets after a successful decode
    pub fn retarget(&mut self, metrics: &MetricSnapshot, config: &AnimationConfig) {
        if let Some(cpu) = metrics.cpu() {
            self.cpu.set_target(cpu);
        }
        if let Some(ratio) = metrics.ram_ratio() {
            self.ram.set_target(ratio);
        }
        if let Some(total) = metrics.net_total() {
            let ratio = self.net_scale.observe(total, config.net_scale_decay);
            self.net.set_target(ratio);
        }
        self.ticker.rebuild(metrics);
    }

    /// One animation tick
    pub fn tick(&mut self, now: Millis, link_fresh: bool, config: &AnimationConfig) {
        self.cpu.step(config.smoothing);
        self.ram.step(config.smoothing);
        self.net.step(config.smoothing);

        self.ticker.scroll();

        let load = self.load();
        self.character.update(now, load, config, &mut self.rng);
        self.sleep.update(load, link_fresh, now, config);
    }

    /// Smoothed load driving sweat and sleep, `[0, 1]`
    pub fn load(&self) -> f32 {
        (self.cpu.current() / 100.0 + self.ram.current()) * 0.5
    }

    /// Smoothed load for the mood bands
    ///
    /// A side only contributes once the snapshot carries it; the sum is
    /// halved either way.
    pub fn mood_load(&self, metrics: &MetricSnapshot) -> f32 {
        let mut load = 0.0;
        if metrics.cpu().is_some() {
            load += self.cpu.current() / 100.0;
        }
        if metrics.ram_ratio().is_some() {
            load += self.ram.current();
        }
        load * 0.5
    }

    /// Displayed CPU percent
    pub fn cpu_percent(&self) -> f32 {
        self.cpu.current()
    }

    /// Displayed RAM ratio
    pub fn ram_ratio(&self) -> f32 {
        self.ram.current()
    }

    /// Displayed network ratio
    #[cfg(test)]
    pub fn net_ratio(&self) -> f32 {
        self.net.current()
    }

    #[cfg(test)]
    pub fn cpu_gauge(&self) -> &Gauge {
        &self.cpu
    }

    #[cfg(test)]
    pub fn ram_gauge(&self) -> &Gauge {
        &self.ram
    }

    #[cfg(test)]
    pub fn net_gauge(&self) -> &Gauge {
        &self.net
    }

    #[cfg(test)]
    pub fn net_scale(&self) -> &NetScale {
        &self.net_scale
    }

    pub fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    pub fn character(&self) -> &Character {
        &self.character
    }

    pub fn sleep(&self) -> &SleepTracker {
        &self.sleep
    }

    pub fn is_sleeping(&self) -> bool {
        self.sleep.is_sleeping()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use smon_protocol::StatusMessage;

    fn merged(metrics: &mut MetricSnapshot, line: &str) {
        metrics.merge(&StatusMessage::decode(line).unwrap());
    }

    #[test]
    fn test_retarget_sets_targets() {
        let config = AnimationConfig::default();
        let mut anim = AnimationState::new(1, &config);
        let mut metrics = MetricSnapshot::new();
        merged(
            &mut metrics,
            r#"{"cpu":80,"ram":1000,"ram_used":250,"net":{"rx":1,"tx":1}}"#,
        );
        anim.retarget(&metrics, &config);

        assert_eq!(anim.cpu_gauge().target(), 80.0);
        assert_eq!(anim.ram_gauge().target(), 0.25);
        assert_eq!(anim.net_gauge().target(), 1.0);
        assert_eq!(anim.cpu_percent(), 0.0);
    }

    #[test]
    fn test_missing_cpu_keeps_target() {
        let config = AnimationConfig::default();
        let mut anim = AnimationState::new(1, &config);
        let mut metrics = MetricSnapshot::new();
        merged(&mut metrics, r#"{"cpu":30}"#);
        anim.retarget(&metrics, &config);
        merged(&mut metrics, r#"{"cpu":-1}"#);
        anim.retarget(&metrics, &config);
        assert_eq!(anim.cpu_gauge().target(), 30.0);
    }

    #[test]
    fn test_net_scale_follows_peaks_then_relaxes() {
        let config = AnimationConfig::default();
        let mut anim = AnimationState::new(1, &config);
        let mut metrics = MetricSnapshot::new();

        for total in [10, 20, 40, 80] {
            let line = format!(r#"{{"net":{{"rx":{},"tx":0}}}}"#, total);
            merged(&mut metrics, &line);
            anim.retarget(&metrics, &config);
            assert!((anim.net_scale().max() - total as f32 * 0.996).abs() < 1e-3);
        }

        let mut previous = anim.net_scale().max();
        for _ in 0..50 {
            merged(&mut metrics, r#"{"net":{"rx":5,"tx":0}}"#);
            anim.retarget(&metrics, &config);
            let max = anim.net_scale().max();
            assert!((max - previous * 0.996).abs() < 1e-3);
            previous = max;
        }
    }

    #[test]
    fn test_mood_load_counts_only_known_sides() {
        let config = AnimationConfig::default();
        let mut anim = AnimationState::new(1, &config);
        let mut metrics = MetricSnapshot::new();
        merged(&mut metrics, r#"{"cpu":100}"#);
        anim.retarget(&metrics, &config);
        for t in 0..100 {
            anim.tick(Millis(t * 60), true, &config);
        }
        // RAM never arrived: the CPU half alone
        assert!((anim.mood_load(&metrics) - 0.5).abs() < 1e-3);
        assert!((anim.load() - 0.5).abs() < 1e-3);
    }

    proptest! {
        #[test]
        fn prop_ranges_hold_for_any_input(
            cpu in -1000.0f32..1000.0,
            ram in 1i64..100_000,
            used in 0i64..200_000,
            rx in -100.0f32..1e6,
            tx in -100.0f32..1e6,
            ticks in 1u32..200,
        ) {
            let config = AnimationConfig::default();
            let mut anim = AnimationState::new(9, &config);
            let mut metrics = MetricSnapshot::new();
            metrics.merge(&StatusMessage {
                cpu: Some(cpu),
                ram: Some(ram),
                ram_used: Some(used),
                net: Some(smon_protocol::NetRates { rx: Some(rx), tx: Some(tx) }),
                ..Default::default()
            });
            anim.retarget(&metrics, &config);
            for t in 0..ticks {
                anim.tick(Millis(t * 60), true, &config);
                prop_assert!((0.0..=100.0).contains(&anim.cpu_percent()));
                prop_assert!((0.0..=1.0).contains(&anim.ram_ratio()));
                prop_assert!((0.0..=1.0).contains(&anim.net_ratio()));
                prop_assert!(anim.net_scale().max() >= 1.0);
            }
        }
    }
}
