//! Small float helpers for `no_std`
//!
//! `core` has no `sin` or `round` for `f32`. The head bob only needs a
//! couple of pixels of precision, so a cheap approximation is enough and
//! keeps the Cortex-M0+ build free of a libm.

use core::f32::consts::{PI, TAU};

/// Sine approximation, absolute error below 0.002
///
/// Expects `x` within `[-TAU, TAU]`; callers reduce the angle first.
pub fn sin(x: f32) -> f32 {
    let mut x = x;
    if x > PI {
        x -= TAU;
    } else if x < -PI {
        x += TAU;
    }

    // Parabola through the sine's zeros and peaks, then one refinement step
    const B: f32 = 4.0 / PI;
    const C: f32 = -4.0 / (PI * PI);
    const P: f32 = 0.225;

    let y = B * x + C * x * abs(x);
    P * (y * abs(y) - y) + y
}

/// Sine of `ms / period_ms` radians with the angle reduced in integer space
///
/// Keeps full precision for large millisecond counts where the `f32`
/// quotient would lose its fraction.
pub fn sin_of_ms(ms: u32, period_ms: u32) -> f32 {
    if period_ms == 0 {
        return 0.0;
    }
    // One full turn expressed in nanoseconds of clock time
    let cycle_ns = (core::f64::consts::TAU * period_ms as f64 * 1.0e6) as u64;
    let phase_ns = (ms as u64 * 1_000_000) % cycle_ns;
    sin((phase_ns as f64 / (period_ms as f64 * 1.0e6)) as f32)
}

/// Round half away from zero
pub fn round(x: f32) -> i32 {
    if x >= 0.0 {
        (x + 0.5) as i32
    } else {
        (x - 0.5) as i32
    }
}

#[inline]
fn abs(x: f32) -> f32 {
    if x < 0.0 {
        -x
    } else {
        x
    }
}
