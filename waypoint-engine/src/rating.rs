//! Five-level star rating scale shared by every classification strategy.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::RATING_LEVEL_COUNT;

/// Ordered rating levels, best first. Ordering is fixed: `LightningFast < ... < VerySlow`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingLevel {
    LightningFast,
    Fast,
    Average,
    Slow,
    VerySlow,
}

impl RatingLevel {
    /// All levels from best to worst.
    pub const ALL: [Self; RATING_LEVEL_COUNT] = [
        Self::LightningFast,
        Self::Fast,
        Self::Average,
        Self::Slow,
        Self::VerySlow,
    ];

    /// The best level.
    pub const BEST: Self = Self::LightningFast;

    /// The worst level, returned when nothing else matches.
    pub const WORST: Self = Self::VerySlow;

    /// Zero-based position on the scale (0 is best).
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::LightningFast => 0,
            Self::Fast => 1,
            Self::Average => 2,
            Self::Slow => 3,
            Self::VerySlow => 4,
        }
    }

    /// Level at `index`, clamping anything past the end to the worst level.
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        match index {
            0 => Self::LightningFast,
            1 => Self::Fast,
            2 => Self::Average,
            3 => Self::Slow,
            _ => Self::VerySlow,
        }
    }

    /// Number of stars awarded.
    #[must_use]
    pub const fn star_count(self) -> usize {
        RATING_LEVEL_COUNT - self.index()
    }

    /// Star glyphs for display.
    #[must_use]
    pub fn stars(self) -> String {
        "⭐".repeat(self.star_count())
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::LightningFast => "Lightning Fast",
            Self::Fast => "Fast",
            Self::Average => "Average",
            Self::Slow => "Slow",
            Self::VerySlow => "Very Slow",
        }
    }
}

impl fmt::Display for RatingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.stars(), self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_totally_ordered_best_first() {
        for pair in RatingLevel::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        assert_eq!(RatingLevel::BEST, RatingLevel::ALL[0]);
        assert_eq!(RatingLevel::WORST, RatingLevel::ALL[4]);
    }

    #[test]
    fn index_roundtrips_and_clamps() {
        for level in RatingLevel::ALL {
            assert_eq!(RatingLevel::from_index(level.index()), level);
        }
        assert_eq!(RatingLevel::from_index(42), RatingLevel::VerySlow);
    }

    #[test]
    fn stars_shrink_with_level() {
        assert_eq!(RatingLevel::LightningFast.stars(), "⭐⭐⭐⭐⭐");
        assert_eq!(RatingLevel::VerySlow.stars(), "⭐");
        assert_eq!(RatingLevel::Average.to_string(), "⭐⭐⭐ Average");
    }
}
