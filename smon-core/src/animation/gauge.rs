//! Smoothed gauges and network auto-scaling

/// A value animated toward its target with a first-order low-pass filter
///
/// Both target and current value stay within `[0, max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Gauge {
    target: f32,
    current: f32,
    max: f32,
}

impl Gauge {
    /// Create a gauge resting at zero
    pub const fn new(max: f32) -> Self {
        Self {
            target: 0.0,
            current: 0.0,
            max,
        }
    }

    /// Set a new target, clamped to the gauge range; NaN is ignored
    pub fn set_target(&mut self, value: f32) {
        if !value.is_nan() {
            self.target = value.clamp(0.0, self.max);
        }
    }

    /// Close `coefficient` of the remaining gap to the target
    pub fn step(&mut self, coefficient: f32) {
        self.current += (self.target - self.current) * coefficient;
        self.current = self.current.clamp(0.0, self.max);
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    #[cfg(test)]
    pub fn target(&self) -> f32 {
        self.target
    }
}

/// Auto-scaling denominator for the network ratio
///
/// Jumps to every new peak and otherwise relaxes by a fixed factor per
/// update, never below 1.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NetScale {
    max: f32,
}

impl Default for NetScale {
    fn default() -> Self {
        Self::new()
    }
}

impl NetScale {
    /// Lowest value the scale relaxes to (KiB/s)
    pub const FLOOR: f32 = 1.0;

    pub const fn new() -> Self {
        Self { max: Self::FLOOR }
    }

    /// Feed one combined rate and return its ratio to the scale
    ///
    /// The ratio is taken before the decay is applied.
    pub fn observe(&mut self, total: f32, decay: f32) -> f32 {
        let total = total.max(0.0);
        if total > self.max {
            self.max = total;
        }
        let ratio = if self.max > 0.0 {
            total / self.max
        } else {
            0.0
        };
        self.max = (self.max * decay).max(Self::FLOOR);
        ratio
    }

    #[cfg(test)]
    pub fn max(&self) -> f32 {
        self.max
    }
}
