//! Millisecond timestamps
//!
//! The control loop hands in a free-running `u32` millisecond counter that
//! rolls over after about 49.7 days. All comparisons here use wrapping
//! arithmetic, so a deadline set just before the rollover still fires just
//! after it.

/// Half the counter range; differences above this are read as "in the past"
const HALF_RANGE: u32 = u32::MAX / 2;

/// A point on the wrapping millisecond clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Millis(pub u32);

impl Millis {
    /// Create from a raw millisecond count
    #[inline]
    pub const fn from_ms(ms: u32) -> Self {
        Self(ms)
    }

    /// Raw millisecond count
    #[inline]
    pub const fn as_ms(self) -> u32 {
        self.0
    }

    /// The instant `ms` milliseconds later
    #[inline]
    pub const fn offset(self, ms: u32) -> Self {
        Self(self.0.wrapping_add(ms))
    }

    /// Milliseconds elapsed from `earlier` to `self`
    #[inline]
    pub const fn since(self, earlier: Self) -> u32 {
        self.0.wrapping_sub(earlier.0)
    }

    /// True if `self` is strictly later than `other`
    #[inline]
    pub const fn is_after(self, other: Self) -> bool {
        let delta = self.0.wrapping_sub(other.0);
        delta != 0 && delta <= HALF_RANGE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        let a = Millis::from_ms(1000);
        let b = a.offset(1);
        assert!(b.is_after(a));
        assert!(!a.is_after(b));
        assert!(!a.is_after(a));
    }

    #[test]
    fn test_since() {
        assert_eq!(Millis(4500).since(Millis(500)), 4000);
    }

    #[test]
    fn test_rollover() {
        let before = Millis(u32::MAX - 10);
        let after = before.offset(20);
        assert_eq!(after.as_ms(), 9);
        assert!(after.is_after(before));
        assert_eq!(after.since(before), 20);
    }
}
