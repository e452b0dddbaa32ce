//! Hazard alert ladder with minimum-hold hysteresis.
//!
//! Each hazard series holds at most one level. Escalation applies at once and
//! pins the new level for [`HOLD_TURNS`] turns; de-escalation requests inside
//! that window are ignored. The derived action level follows the same rule.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::constants::{HOLD_TURNS, LANDSLIDE_STREAK_TURNS};

/// Hazard series tracked by the ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HazardSeries {
    Rain,
    Wind,
    Flood,
    Wave,
    Tide,
}

impl HazardSeries {
    pub const ALL: [Self; 5] = [Self::Rain, Self::Wind, Self::Flood, Self::Wave, Self::Tide];

    /// Highest level this series can report.
    #[must_use]
    pub const fn max_level(self) -> AlertLevel {
        match self {
            Self::Flood | Self::Wave => AlertLevel::Warning,
            Self::Rain | Self::Wind | Self::Tide => AlertLevel::Special,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Rain => "heavy rain",
            Self::Wind => "storm",
            Self::Flood => "flood",
            Self::Wave => "high wave",
            Self::Tide => "storm surge",
        }
    }
}

/// Severity of a single series alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    Advisory,
    Warning,
    Special,
}

impl AlertLevel {
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Advisory => 1,
            Self::Warning => 2,
            Self::Special => 3,
        }
    }

    #[must_use]
    pub const fn from_rank(rank: u8) -> Option<Self> {
        match rank {
            0 => None,
            1 => Some(Self::Advisory),
            2 => Some(Self::Warning),
            _ => Some(Self::Special),
        }
    }
}

fn rank_of(level: Option<AlertLevel>) -> u8 {
    level.map_or(0, AlertLevel::rank)
}

/// Derived evacuation guidance level.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum ActionLevel {
    #[default]
    None,
    ElderEvacuation,
    EvacuationOrder,
    EmergencySafety,
}

impl ActionLevel {
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::None => 0,
            Self::ElderEvacuation => 1,
            Self::EvacuationOrder => 2,
            Self::EmergencySafety => 3,
        }
    }

    #[must_use]
    pub const fn from_rank(rank: u8) -> Self {
        match rank {
            0 => Self::None,
            1 => Self::ElderEvacuation,
            2 => Self::EvacuationOrder,
            _ => Self::EmergencySafety,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::ElderEvacuation => "elder evacuation",
            Self::EvacuationOrder => "evacuation order",
            Self::EmergencySafety => "emergency safety",
        }
    }
}

impl fmt::Display for ActionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Level and remaining hold for one series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesAlert {
    pub level: AlertLevel,
    pub hold: u8,
}

/// Ladder state carried between turns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AlertState {
    #[serde(default)]
    pub series: BTreeMap<HazardSeries, SeriesAlert>,
    #[serde(default)]
    pub action_level: ActionLevel,
    #[serde(default)]
    pub action_hold: u8,
    /// Consecutive turns with rain at warning or above alongside a flood warning.
    #[serde(default)]
    pub landslide_streak: u8,
}

impl AlertState {
    #[must_use]
    pub fn level(&self, series: HazardSeries) -> Option<AlertLevel> {
        self.series.get(&series).map(|alert| alert.level)
    }

    fn series_at(&self, level: AlertLevel) -> Vec<HazardSeries> {
        self.series
            .iter()
            .filter(|(_, alert)| alert.level == level)
            .map(|(series, _)| *series)
            .collect()
    }

    #[must_use]
    pub fn advisories(&self) -> Vec<HazardSeries> {
        self.series_at(AlertLevel::Advisory)
    }

    #[must_use]
    pub fn warnings(&self) -> Vec<HazardSeries> {
        self.series_at(AlertLevel::Warning)
    }

    #[must_use]
    pub fn specials(&self) -> Vec<HazardSeries> {
        self.series_at(AlertLevel::Special)
    }

    /// True when any warning or special alert is in force.
    #[must_use]
    pub fn has_warning_or_above(&self) -> bool {
        self.series
            .values()
            .any(|alert| alert.level >= AlertLevel::Warning)
    }

    /// True when no series reports anything and the action level is none.
    #[must_use]
    pub fn is_calm(&self) -> bool {
        self.series.is_empty() && self.action_level == ActionLevel::None
    }

    /// Highest level across every series.
    #[must_use]
    pub fn peak_level(&self) -> Option<AlertLevel> {
        self.series.values().map(|alert| alert.level).max()
    }
}

/// Requested level per series for one turn; a missing entry requests none.
pub type SeriesTargets = BTreeMap<HazardSeries, AlertLevel>;

/// Result of one ladder step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertUpdate {
    pub alerts: AlertState,
    /// Whether the landslide warning flag is set after this step.
    pub landslide_warning: bool,
}

/// Apply the hold rule to a rank pair, returning the new `(rank, hold)`.
#[must_use]
pub fn apply_hold(current: u8, hold: u8, requested: u8) -> (u8, u8) {
    if requested > current {
        (requested, HOLD_TURNS)
    } else if requested < current && hold > 0 {
        (current, hold - 1)
    } else if requested == current {
        (current, hold.saturating_sub(1))
    } else {
        (requested, 0)
    }
}

/// Advance the ladder by one turn toward `targets`.
#[must_use]
pub fn advance_alerts(
    prev: &AlertState,
    targets: &SeriesTargets,
    was_landslide_warning: bool,
) -> AlertUpdate {
    let mut series = BTreeMap::new();
    for hazard in HazardSeries::ALL {
        let current = prev.series.get(&hazard).copied();
        let requested = targets.get(&hazard).map(|level| (*level).min(hazard.max_level()));
        let (rank, hold) = apply_hold(
            rank_of(current.map(|alert| alert.level)),
            current.map_or(0, |alert| alert.hold),
            rank_of(requested),
        );
        if let Some(level) = AlertLevel::from_rank(rank) {
            if current.map(|alert| alert.level) != Some(level) {
                log::debug!("{} alert moves to {level:?}", hazard.label());
            }
            series.insert(hazard, SeriesAlert { level, hold });
        } else if current.is_some() {
            log::debug!("{} alert lifted", hazard.label());
        }
    }

    let mut next = AlertState {
        series,
        action_level: prev.action_level,
        action_hold: prev.action_hold,
        landslide_streak: prev.landslide_streak,
    };

    let rain_warning = next
        .level(HazardSeries::Rain)
        .is_some_and(|level| level >= AlertLevel::Warning);
    let flood_warning = next.level(HazardSeries::Flood) == Some(AlertLevel::Warning);
    next.landslide_streak = if rain_warning && flood_warning {
        prev.landslide_streak.saturating_add(1)
    } else {
        0
    };
    let landslide_warning = rain_warning
        && (was_landslide_warning || next.landslide_streak >= LANDSLIDE_STREAK_TURNS);
    if landslide_warning != was_landslide_warning {
        log::debug!("landslide warning information: {landslide_warning}");
    }

    let requested_action = derive_action_level(&next, landslide_warning);
    let (rank, hold) = apply_hold(
        prev.action_level.rank(),
        prev.action_hold,
        requested_action.rank(),
    );
    next.action_level = ActionLevel::from_rank(rank);
    next.action_hold = hold;
    if next.action_level != prev.action_level {
        log::debug!(
            "action level {} -> {}",
            prev.action_level,
            next.action_level
        );
    }

    AlertUpdate {
        alerts: next,
        landslide_warning,
    }
}

/// Action level implied by the current alerts before hold is applied.
#[must_use]
pub fn derive_action_level(alerts: &AlertState, landslide_warning: bool) -> ActionLevel {
    let non_tide_special = alerts
        .series
        .iter()
        .any(|(series, alert)| *series != HazardSeries::Tide && alert.level == AlertLevel::Special);
    if non_tide_special {
        return ActionLevel::EmergencySafety;
    }
    let tide_warning = alerts
        .level(HazardSeries::Tide)
        .is_some_and(|level| level >= AlertLevel::Warning);
    if tide_warning || landslide_warning {
        return ActionLevel::EvacuationOrder;
    }
    if alerts.has_warning_or_above() {
        return ActionLevel::ElderEvacuation;
    }
    ActionLevel::None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets(pairs: &[(HazardSeries, AlertLevel)]) -> SeriesTargets {
        pairs.iter().copied().collect()
    }

    #[test]
    fn hold_rule_covers_each_branch() {
        assert_eq!(apply_hold(1, 0, 3), (3, HOLD_TURNS));
        assert_eq!(apply_hold(3, 2, 1), (3, 1));
        assert_eq!(apply_hold(3, 1, 3), (3, 0));
        assert_eq!(apply_hold(3, 0, 3), (3, 0));
        assert_eq!(apply_hold(3, 0, 1), (1, 0));
        assert_eq!(apply_hold(2, 0, 0), (0, 0));
    }

    #[test]
    fn escalation_is_held_for_two_turns() {
        let raised = advance_alerts(
            &AlertState::default(),
            &targets(&[(HazardSeries::Rain, AlertLevel::Special)]),
            false,
        );
        assert_eq!(raised.alerts.level(HazardSeries::Rain), Some(AlertLevel::Special));

        let mut state = raised.alerts;
        for _ in 0..2 {
            state = advance_alerts(&state, &SeriesTargets::new(), false).alerts;
            assert_eq!(state.level(HazardSeries::Rain), Some(AlertLevel::Special));
        }
        state = advance_alerts(&state, &SeriesTargets::new(), false).alerts;
        assert_eq!(state.level(HazardSeries::Rain), None);
    }

    #[test]
    fn flood_and_wave_cap_at_warning() {
        let update = advance_alerts(
            &AlertState::default(),
            &targets(&[
                (HazardSeries::Flood, AlertLevel::Special),
                (HazardSeries::Wave, AlertLevel::Special),
            ]),
            false,
        );
        assert_eq!(update.alerts.level(HazardSeries::Flood), Some(AlertLevel::Warning));
        assert_eq!(update.alerts.level(HazardSeries::Wave), Some(AlertLevel::Warning));
        assert!(update.alerts.specials().is_empty());
        assert_eq!(update.alerts.warnings().len(), 2);
    }

    #[test]
    fn action_level_follows_series() {
        let mut alerts = AlertState::default();
        alerts.series.insert(
            HazardSeries::Tide,
            SeriesAlert {
                level: AlertLevel::Special,
                hold: 0,
            },
        );
        assert_eq!(derive_action_level(&alerts, false), ActionLevel::EvacuationOrder);
        alerts.series.insert(
            HazardSeries::Wind,
            SeriesAlert {
                level: AlertLevel::Special,
                hold: 0,
            },
        );
        assert_eq!(derive_action_level(&alerts, false), ActionLevel::EmergencySafety);

        let mut warned = AlertState::default();
        warned.series.insert(
            HazardSeries::Rain,
            SeriesAlert {
                level: AlertLevel::Warning,
                hold: 0,
            },
        );
        assert_eq!(derive_action_level(&warned, false), ActionLevel::ElderEvacuation);
        assert_eq!(derive_action_level(&warned, true), ActionLevel::EvacuationOrder);
        assert_eq!(
            derive_action_level(&AlertState::default(), false),
            ActionLevel::None
        );
    }

    #[test]
    fn action_level_downgrade_respects_hold() {
        let peak = advance_alerts(
            &AlertState::default(),
            &targets(&[(HazardSeries::Rain, AlertLevel::Special)]),
            false,
        )
        .alerts;
        assert_eq!(peak.action_level, ActionLevel::EmergencySafety);
        assert_eq!(peak.action_hold, HOLD_TURNS);

        let mut relaxed = peak.clone();
        relaxed.series.clear();
        let next = advance_alerts(&relaxed, &SeriesTargets::new(), false).alerts;
        assert_eq!(next.action_level, ActionLevel::EmergencySafety);
        assert_eq!(next.action_hold, 1);
    }

    #[test]
    fn landslide_flag_needs_two_coupled_turns_and_clears_with_rain() {
        let coupled = targets(&[
            (HazardSeries::Rain, AlertLevel::Warning),
            (HazardSeries::Flood, AlertLevel::Warning),
        ]);
        let first = advance_alerts(&AlertState::default(), &coupled, false);
        assert!(!first.landslide_warning);
        assert_eq!(first.alerts.landslide_streak, 1);

        let second = advance_alerts(&first.alerts, &coupled, first.landslide_warning);
        assert!(second.landslide_warning);
        assert_eq!(second.alerts.action_level, ActionLevel::EvacuationOrder);

        let rain_only = targets(&[(HazardSeries::Rain, AlertLevel::Warning)]);
        let mut unheld = second.alerts.clone();
        for alert in unheld.series.values_mut() {
            alert.hold = 0;
        }
        let third = advance_alerts(&unheld, &rain_only, second.landslide_warning);
        assert!(third.landslide_warning, "flag persists while rain stays high");

        let mut dry = third.alerts.clone();
        for alert in dry.series.values_mut() {
            alert.hold = 0;
        }
        let fourth = advance_alerts(&dry, &SeriesTargets::new(), third.landslide_warning);
        assert!(!fourth.landslide_warning);
    }
}
