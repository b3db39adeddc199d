//! Mood bands

use crate::config::AnimationConfig;

/// Face expression derived from load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mood {
    Happy,
    Neutral,
    Sad,
}

impl Mood {
    /// Bucket a load value; both band edges belong to `Neutral`
    pub fn from_load(load: f32, config: &AnimationConfig) -> Self {
        if load < config.mood_happy_below {
            Mood::Happy
        } else if load > config.mood_sad_above {
            Mood::Sad
        } else {
            Mood::Neutral
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bands() {
        let config = AnimationConfig::default();
        assert_eq!(Mood::from_load(0.0, &config), Mood::Happy);
        assert_eq!(Mood::from_load(0.419, &config), Mood::Happy);
        assert_eq!(Mood::from_load(0.42, &config), Mood::Neutral);
        assert_eq!(Mood::from_load(0.68, &config), Mood::Neutral);
        assert_eq!(Mood::from_load(0.681, &config), Mood::Sad);
        assert_eq!(Mood::from_load(1.0, &config), Mood::Sad);
    }
}
