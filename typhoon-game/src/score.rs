//! Five clamped player axes and the weighted final score.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{
    SCORE_INITIAL, SCORE_MAX, SCORE_MIN, WEIGHT_CONTRIBUTION, WEIGHT_CULTURE, WEIGHT_JUDGMENT,
    WEIGHT_PREPAREDNESS, WEIGHT_SURVIVAL,
};
use crate::numbers::round_f64_to_i32;

/// Per-axis adjustment carried by a choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ScoreDelta {
    #[serde(default)]
    pub survival: i32,
    #[serde(default)]
    pub judgment: i32,
    #[serde(default)]
    pub preparedness: i32,
    #[serde(default)]
    pub contribution: i32,
    #[serde(default)]
    pub culture: i32,
}

impl ScoreDelta {
    /// Largest absolute adjustment on any axis.
    #[must_use]
    pub fn max_magnitude(&self) -> i32 {
        [
            self.survival,
            self.judgment,
            self.preparedness,
            self.contribution,
            self.culture,
        ]
        .iter()
        .map(|value| value.saturating_abs())
        .max()
        .unwrap_or(0)
    }
}

/// Player performance axes, each kept within [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSet {
    pub survival: i32,
    pub judgment: i32,
    pub preparedness: i32,
    pub contribution: i32,
    pub culture: i32,
}

impl Default for ScoreSet {
    fn default() -> Self {
        Self {
            survival: SCORE_INITIAL,
            judgment: SCORE_INITIAL,
            preparedness: SCORE_INITIAL,
            contribution: SCORE_INITIAL,
            culture: SCORE_INITIAL,
        }
    }
}

impl ScoreSet {
    /// Add a delta and clamp every axis.
    pub fn apply(&mut self, delta: &ScoreDelta) {
        self.survival = self.survival.saturating_add(delta.survival);
        self.judgment = self.judgment.saturating_add(delta.judgment);
        self.preparedness = self.preparedness.saturating_add(delta.preparedness);
        self.contribution = self.contribution.saturating_add(delta.contribution);
        self.culture = self.culture.saturating_add(delta.culture);
        self.clamp();
    }

    pub fn clamp(&mut self) {
        self.survival = self.survival.clamp(SCORE_MIN, SCORE_MAX);
        self.judgment = self.judgment.clamp(SCORE_MIN, SCORE_MAX);
        self.preparedness = self.preparedness.clamp(SCORE_MIN, SCORE_MAX);
        self.contribution = self.contribution.clamp(SCORE_MIN, SCORE_MAX);
        self.culture = self.culture.clamp(SCORE_MIN, SCORE_MAX);
    }

    /// Weighted sum of the axes.
    #[must_use]
    pub fn weighted_total(&self) -> f64 {
        f64::from(self.survival) * WEIGHT_SURVIVAL
            + f64::from(self.judgment) * WEIGHT_JUDGMENT
            + f64::from(self.preparedness) * WEIGHT_PREPAREDNESS
            + f64::from(self.contribution) * WEIGHT_CONTRIBUTION
            + f64::from(self.culture) * WEIGHT_CULTURE
    }

    /// Weighted sum rounded to the reported integer score.
    #[must_use]
    pub fn total_score(&self) -> i32 {
        round_f64_to_i32(self.weighted_total())
    }
}

/// Letter rank for a final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rank {
    S,
    A,
    B,
    C,
    D,
}

impl Rank {
    #[must_use]
    pub const fn from_score(score: i32) -> Self {
        if score >= 90 {
            Self::S
        } else if score >= 75 {
            Self::A
        } else if score >= 60 {
            Self::B
        } else if score >= 40 {
            Self::C
        } else {
            Self::D
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Self::S => "S",
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        };
        f.write_str(letter)
    }
}
