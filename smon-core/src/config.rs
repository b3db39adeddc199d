//! Animation and behaviour tunables
//!
//! The display has no configuration file; these values are fixed at build
//! time and grouped here so the control loop, the animation and the tests
//! agree on them.

/// Timing of one randomized character effect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EffectTiming {
    /// How long the effect stays visible once triggered (ms)
    pub duration_ms: u32,
    /// Fixed part of the delay until the next check (ms)
    pub interval_ms: u32,
    /// Upper bound (exclusive) of the random delay added to `interval_ms`
    pub jitter_ms: u32,
}

/// Animation configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AnimationConfig {
    /// Interval between animation ticks (ms)
    pub tick_interval_ms: u32,
    /// Fraction of the remaining gap closed per tick
    pub smoothing: f32,
    /// Multiplicative decay of the network auto-scale per update
    pub net_scale_decay: f32,
    /// Width the ticker scrolls across (px)
    pub ticker_viewport_px: i32,

    pub blink: EffectTiming,
    pub wink: EffectTiming,
    /// Chance (percent) that a due wink check actually winks
    pub wink_chance_pct: u32,
    pub sweat: EffectTiming,
    /// Sweat chance (percent) at or below `sweat_load_threshold`
    pub sweat_base_chance_pct: u32,
    /// Load above which the sweat chance climbs one percent per 0.01
    pub sweat_load_threshold: f32,

    /// Head bob angular period: the bob is `sin(now / period)` (ms)
    pub head_bob_period_ms: u32,
    /// Head bob amplitude in pixels
    pub head_bob_amplitude: f32,

    /// Load below which the character gets drowsy
    pub sleep_load_threshold: f32,
    /// Continuous low load needed before falling asleep (ms)
    pub sleep_after_ms: u32,
    /// Silence after which the link counts as lost (ms)
    pub stale_after_ms: u32,
    /// Duration of one phase of the sleep indicator (ms)
    pub sleep_phase_ms: u32,

    /// Loads below this are happy
    pub mood_happy_below: f32,
    /// Loads above this are sad
    pub mood_sad_above: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 60,
            smoothing: 0.15,
            net_scale_decay: 0.996,
            ticker_viewport_px: 128,
            blink: EffectTiming {
                duration_ms: 120,
                interval_ms: 2000,
                jitter_ms: 3000,
            },
            wink: EffectTiming {
                duration_ms: 120,
                interval_ms: 1500,
                jitter_ms: 2000,
            },
            wink_chance_pct: 10,
            sweat: EffectTiming {
                duration_ms: 500,
                interval_ms: 2000,
                jitter_ms: 2000,
            },
            sweat_base_chance_pct: 5,
            sweat_load_threshold: 0.7,
            head_bob_period_ms: 400,
            head_bob_amplitude: 1.5,
            sleep_load_threshold: 0.22,
            sleep_after_ms: 9000,
            stale_after_ms: 4000,
            sleep_phase_ms: 600,
            mood_happy_below: 0.42,
            mood_sad_above: 0.68,
        }
    }
}
