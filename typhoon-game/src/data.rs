//! Choice catalog: the static table of player actions.
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

use crate::alerts::ActionLevel;
use crate::constants::MAX_SCORE_DELTA;
use crate::evacuation::EvacStatus;
use crate::phase::PhaseId;
use crate::score::ScoreDelta;

const EMBEDDED_CATALOG: &str = include_str!("../data/choices.json");
const FALLBACK_PREFIX: &str = "fallback.";

/// Grouping used to balance each turn's option set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Info,
    Communication,
    Supplies,
    HomeHardening,
    Evacuation,
    Waiting,
}

impl Category {
    pub const ALL: [Self; 6] = [
        Self::Info,
        Self::Communication,
        Self::Supplies,
        Self::HomeHardening,
        Self::Evacuation,
        Self::Waiting,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Communication => "communication",
            Self::Supplies => "supplies",
            Self::HomeHardening => "home_hardening",
            Self::Evacuation => "evacuation",
            Self::Waiting => "waiting",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Availability predicate. Empty lists match any value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct When {
    #[serde(default)]
    pub phases: Vec<PhaseId>,
    #[serde(default)]
    pub action_levels: Vec<ActionLevel>,
    #[serde(default)]
    pub require_items: Vec<String>,
    #[serde(default)]
    pub require_flags: Vec<String>,
    #[serde(default)]
    pub exclude_evac_status: Vec<EvacStatus>,
    #[serde(default)]
    pub require_house_floors: Option<u8>,
}

/// Engine-side effect that cannot be expressed as flags or items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomEffect {
    StartEvacuation,
    AbortEvacuation,
    MoveUpstairs,
    MoveDownstairs,
}

/// Effects applied when a choice is taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Effects {
    #[serde(default)]
    pub score: ScoreDelta,
    #[serde(default)]
    pub set_flags: Vec<String>,
    #[serde(default)]
    pub add_items: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<CustomEffect>,
}

/// A single player action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub id: String,
    pub text: String,
    pub category: Category,
    #[serde(default = "default_weight")]
    pub weight: u32,
    #[serde(default)]
    pub when: When,
    #[serde(default)]
    pub effects: Effects,
}

impl Choice {
    /// Choices with flag requirements surface ahead of the category draw.
    #[must_use]
    pub fn is_triggered(&self) -> bool {
        !self.when.require_flags.is_empty()
    }

    /// Synthetic fallback choices are never consumed.
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.id.starts_with(FALLBACK_PREFIX)
    }
}

const fn default_weight() -> u32 {
    1
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog JSON could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("catalog entry `{id}` is invalid: {reason}")]
    Invalid { id: String, reason: String },
}

/// Versioned table of every player choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ChoiceCatalog {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub choices: Vec<Choice>,
}

impl ChoiceCatalog {
    /// Create an empty catalog; only the fallback set remains selectable.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse and validate a catalog.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Parse`] for malformed JSON and
    /// [`CatalogError::Invalid`] when an entry breaks a catalog rule.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Check weights, id uniqueness and score delta bounds.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Invalid`] naming the first offending entry.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut seen = HashSet::new();
        for choice in &self.choices {
            let invalid = |reason: &str| CatalogError::Invalid {
                id: choice.id.clone(),
                reason: reason.to_string(),
            };
            if choice.id.trim().is_empty() {
                return Err(invalid("id is empty"));
            }
            if choice.is_fallback() {
                return Err(invalid("id uses the reserved fallback prefix"));
            }
            if !seen.insert(choice.id.as_str()) {
                return Err(invalid("duplicate id"));
            }
            if choice.weight == 0 {
                return Err(invalid("weight must be positive"));
            }
            if choice.effects.score.max_magnitude() > MAX_SCORE_DELTA {
                return Err(invalid("score delta exceeds the per-axis bound"));
            }
            if choice.when.require_house_floors == Some(0) {
                return Err(invalid("requireHouseFloors must be at least 1"));
            }
        }
        Ok(())
    }

    /// Number of authored choices, excluding the fallback set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.choices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    /// Look up a choice by id, including the fallback set.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Choice> {
        self.choices
            .iter()
            .find(|choice| choice.id == id)
            .or_else(|| fallback_choices().iter().find(|choice| choice.id == id))
    }
}

/// Synthetic options used when the catalog cannot fill a turn.
#[must_use]
pub fn fallback_choices() -> &'static [Choice] {
    static FALLBACK: OnceLock<Vec<Choice>> = OnceLock::new();
    FALLBACK.get_or_init(|| {
        let entry = |suffix: &str, text: &str, category: Category, score: ScoreDelta| Choice {
            id: format!("{FALLBACK_PREFIX}{suffix}"),
            text: text.to_string(),
            category,
            weight: 1,
            when: When::default(),
            effects: Effects {
                score,
                ..Effects::default()
            },
        };
        vec![
            entry(
                "info",
                "Check the latest weather report",
                Category::Info,
                ScoreDelta {
                    judgment: 1,
                    ..ScoreDelta::default()
                },
            ),
            entry(
                "communication",
                "Message the family group chat",
                Category::Communication,
                ScoreDelta {
                    contribution: 1,
                    ..ScoreDelta::default()
                },
            ),
            entry(
                "supplies",
                "Recheck the emergency bag",
                Category::Supplies,
                ScoreDelta {
                    preparedness: 1,
                    ..ScoreDelta::default()
                },
            ),
            entry(
                "waiting",
                "Stay put and keep listening",
                Category::Waiting,
                ScoreDelta::default(),
            ),
        ]
    })
}

/// Default catalog embedded in the crate, parsed once.
///
/// A broken embedded table is logged and replaced with an empty catalog.
#[must_use]
pub fn catalog() -> &'static ChoiceCatalog {
    static CATALOG: OnceLock<ChoiceCatalog> = OnceLock::new();
    CATALOG.get_or_init(|| {
        ChoiceCatalog::from_json(EMBEDDED_CATALOG).unwrap_or_else(|err| {
            log::warn!("embedded choice catalog rejected: {err}");
            ChoiceCatalog::empty()
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_catalog_parses_and_covers_every_category() {
        let parsed = ChoiceCatalog::from_json(EMBEDDED_CATALOG).expect("embedded catalog");
        assert!(parsed.len() >= 40);
        for category in Category::ALL {
            assert!(
                parsed.choices.iter().any(|c| c.category == category),
                "missing {category}"
            );
        }
        assert_eq!(catalog().len(), parsed.len());
    }

    #[test]
    fn catalog_from_json_applies_defaults() {
        let json = r#"{
            "version": 2,
            "choices": [
                {
                    "id": "radio",
                    "text": "Turn on the radio",
                    "category": "info",
                    "effects": { "score": { "judgment": 3 }, "setFlags": ["radio_on"] }
                }
            ]
        }"#;

        let data = ChoiceCatalog::from_json(json).unwrap();
        assert_eq!(data.version, 2);
        assert_eq!(data.choices[0].weight, 1);
        assert!(data.choices[0].when.phases.is_empty());
        assert_eq!(data.choices[0].effects.score.judgment, 3);
        assert_eq!(data.choices[0].effects.set_flags, vec!["radio_on"]);
        assert!(!data.choices[0].is_triggered());
    }

    #[test]
    fn validation_rejects_bad_entries() {
        let zero_weight =
            r#"{"choices":[{"id":"a","text":"A","category":"info","weight":0}]}"#;
        assert!(matches!(
            ChoiceCatalog::from_json(zero_weight),
            Err(CatalogError::Invalid { id, .. }) if id == "a"
        ));

        let duplicate = r#"{"choices":[
            {"id":"a","text":"A","category":"info"},
            {"id":"a","text":"B","category":"waiting"}
        ]}"#;
        assert!(ChoiceCatalog::from_json(duplicate).is_err());

        let huge = r#"{"choices":[{"id":"a","text":"A","category":"info",
            "effects":{"score":{"survival":80}}}]}"#;
        assert!(ChoiceCatalog::from_json(huge).is_err());

        let reserved = r#"{"choices":[{"id":"fallback.x","text":"A","category":"info"}]}"#;
        assert!(ChoiceCatalog::from_json(reserved).is_err());

        assert!(matches!(
            ChoiceCatalog::from_json("{not json"),
            Err(CatalogError::Parse(_))
        ));
    }

    #[test]
    fn find_reaches_fallback_set() {
        let empty = ChoiceCatalog::empty();
        assert!(empty.is_empty());
        let fallback = empty.find("fallback.waiting").expect("fallback");
        assert!(fallback.is_fallback());
        assert_eq!(fallback.category, Category::Waiting);
        assert!(empty.find("nope").is_none());
        assert_eq!(fallback_choices().len(), 4);
    }
}
