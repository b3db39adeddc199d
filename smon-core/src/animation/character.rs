//! Character micro-animations
//!
//! Blink, wink and sweat each run on their own randomized schedule. When a
//! check comes due the effect may start, and the next check is scheduled
//! `interval + U[0, jitter)` later whatever the outcome.

use rand::rngs::SmallRng;
use rand::Rng;

use crate::config::{AnimationConfig, EffectTiming};
use crate::math;
use crate::time::Millis;

/// A timed visual effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Effect {
    active: bool,
    until: Millis,
}

impl Effect {
    fn start(&mut self, now: Millis, duration_ms: u32) {
        self.active = true;
        self.until = now.offset(duration_ms);
    }

    fn expire(&mut self, now: Millis) {
        if self.active && now.is_after(self.until) {
            self.active = false;
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

/// Effect state plus the schedule of the next checks
///
/// `None` means the check is due on the next update.
#[derive(Debug, Clone, Default)]
pub struct Character {
    blink: Effect,
    wink: Effect,
    sweat: Effect,
    next_blink: Option<Millis>,
    next_wink: Option<Millis>,
    next_sweat: Option<Millis>,
    head_bob: i8,
}

impl Character {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance all effects to `now`
    ///
    /// `load` is the smoothed load in `[0, 1]` that drives the sweat chance.
    pub fn update(&mut self, now: Millis, load: f32, config: &AnimationConfig, rng: &mut SmallRng) {
        if is_due(self.next_blink, now) {
            self.blink.start(now, config.blink.duration_ms);
            self.next_blink = Some(schedule(now, &config.blink, rng));
        }
        self.blink.expire(now);

        if is_due(self.next_wink, now) {
            if roll(rng, config.wink_chance_pct) && !self.blink.is_active() {
                self.wink.start(now, config.wink.duration_ms);
            }
            self.next_wink = Some(schedule(now, &config.wink, rng));
        }
        self.wink.expire(now);

        if is_due(self.next_sweat, now) {
            if roll(rng, sweat_chance_pct(load, config)) {
                self.sweat.start(now, config.sweat.duration_ms);
            }
            self.next_sweat = Some(schedule(now, &config.sweat, rng));
        }
        self.sweat.expire(now);

        let bob = math::sin_of_ms(now.as_ms(), config.head_bob_period_ms) * config.head_bob_amplitude;
        self.head_bob = math::round(bob).clamp(i8::MIN as i32, i8::MAX as i32) as i8;
    }

    pub fn is_blinking(&self) -> bool {
        self.blink.is_active()
    }

    pub fn is_winking(&self) -> bool {
        self.wink.is_active()
    }

    pub fn is_sweating(&self) -> bool {
        self.sweat.is_active()
    }

    /// Vertical face offset in pixels
    pub fn head_bob(&self) -> i8 {
        self.head_bob
    }
}

/// Sweat chance: the base percentage plus one point per 0.01 of load above
/// the threshold
pub fn sweat_chance_pct(load: f32, config: &AnimationConfig) -> u32 {
    let excess = (load - config.sweat_load_threshold).max(0.0);
    config.sweat_base_chance_pct + (excess * 100.0) as u32
}

fn is_due(next: Option<Millis>, now: Millis) -> bool {
    next.map_or(true, |next| now.is_after(next))
}

fn schedule(now: Millis, timing: &EffectTiming, rng: &mut SmallRng) -> Millis {
    let jitter = if timing.jitter_ms == 0 {
        0
    } else {
        rng.gen_range(0..timing.jitter_ms)
    };
    now.offset(timing.interval_ms.saturating_add(jitter))
}

fn roll(rng: &mut SmallRng, chance_pct: u32) -> bool {
    rng.gen_range(0..100u32) < chance_pct
}
