//! Root game state, round-tripped by the caller each turn.
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::alerts::{ActionLevel, AlertState};
use crate::constants::{FLAG_LANDSLIDE_WARNING, TURNS_PER_PHASE};
use crate::data::Category;
use crate::evacuation::EvacuationState;
use crate::family::{FamilyMember, ReturnEtas, SplitPlans};
use crate::phase::{PhaseId, phase_id_at, phase_name_at};
use crate::result::{Ending, FinalReport};
use crate::scenario::{Location, Scenario};
use crate::score::ScoreSet;
use crate::selector::SelectionPlan;

/// One submitted action, kept for the final report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnRecord {
    pub turn: u32,
    pub phase: PhaseId,
    pub choice_id: String,
    pub choice_text: String,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_text: Option<String>,
    pub action_level: ActionLevel,
}

/// Coarse progress of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnStatus {
    Ongoing,
    Clearing,
    Ended,
}

impl fmt::Display for TurnStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Ongoing => "ongoing",
            Self::Clearing => "clearing",
            Self::Ended => "ended",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub seed: u64,
    pub scenario: Scenario,
    pub current_phase: u8,
    pub turn_in_phase: u8,
    pub total_turns: u32,
    #[serde(default)]
    pub alerts: AlertState,
    #[serde(default)]
    pub evacuation: EvacuationState,
    pub family: Vec<FamilyMember>,
    #[serde(default)]
    pub return_etas: ReturnEtas,
    #[serde(default)]
    pub split_plans: SplitPlans,
    #[serde(default)]
    pub scores: ScoreSet,
    #[serde(default)]
    pub flags: BTreeSet<String>,
    #[serde(default)]
    pub items: BTreeSet<String>,
    pub current_floor: u8,
    #[serde(default)]
    pub calm_streak: u32,
    #[serde(default)]
    pub selected_choice_ids: Vec<String>,
    #[serde(default)]
    pub offered_choice_ids: Vec<String>,
    #[serde(default)]
    pub selection: SelectionPlan,
    #[serde(default)]
    pub disaster_occurred: bool,
    #[serde(default)]
    pub game_ended: bool,
    #[serde(default)]
    pub ending: Option<Ending>,
    #[serde(default)]
    pub final_report: Option<FinalReport>,
    #[serde(default)]
    pub history: Vec<TurnRecord>,
}

impl GameState {
    /// Fresh state at turn 1 of the first phase.
    #[must_use]
    pub fn new(scenario: Scenario, seed: u64) -> Self {
        let family = scenario.family.iter().map(FamilyMember::from).collect();
        let mut items = BTreeSet::new();
        if scenario.car_available {
            items.insert(String::from("car"));
        }
        Self {
            seed,
            scenario,
            current_phase: 0,
            turn_in_phase: 1,
            total_turns: 0,
            alerts: AlertState::default(),
            evacuation: EvacuationState::default(),
            family,
            return_etas: ReturnEtas::new(),
            split_plans: SplitPlans::new(),
            scores: ScoreSet::default(),
            flags: BTreeSet::new(),
            items,
            current_floor: 1,
            calm_streak: 0,
            selected_choice_ids: Vec::new(),
            offered_choice_ids: Vec::new(),
            selection: SelectionPlan::default(),
            disaster_occurred: false,
            game_ended: false,
            ending: None,
            final_report: None,
            history: Vec::new(),
        }
    }

    #[must_use]
    pub fn phase_id(&self) -> PhaseId {
        phase_id_at(self.current_phase)
    }

    #[must_use]
    pub fn phase_name(&self) -> &'static str {
        phase_name_at(self.current_phase)
    }

    /// One-based number of the turn about to be played.
    #[must_use]
    pub const fn upcoming_turn(&self) -> u32 {
        self.total_turns.saturating_add(1)
    }

    #[must_use]
    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    #[must_use]
    pub fn landslide_warning(&self) -> bool {
        self.has_flag(FLAG_LANDSLIDE_WARNING)
    }

    /// Any advisory, warning or special alert, or a raised action level.
    #[must_use]
    pub fn alerts_active(&self) -> bool {
        !self.alerts.is_calm()
    }

    #[must_use]
    pub fn member(&self, name: &str) -> Option<&FamilyMember> {
        self.family.iter().find(|member| member.name == name)
    }

    #[must_use]
    pub fn count_at(&self, locations: &[Location]) -> usize {
        self.family
            .iter()
            .filter(|member| locations.contains(&member.location))
            .count()
    }

    /// Keep the player's floor inside the house.
    pub fn clamp_floor(&mut self) {
        self.current_floor = self
            .current_floor
            .clamp(1, self.scenario.house.floors.max(1));
    }

    #[must_use]
    pub const fn status(&self) -> TurnStatus {
        if self.game_ended {
            TurnStatus::Ended
        } else if self.calm_streak > 0 {
            TurnStatus::Clearing
        } else {
            TurnStatus::Ongoing
        }
    }

    /// Turns left in the current phase, counting the upcoming one.
    #[must_use]
    pub const fn turns_left_in_phase(&self) -> u8 {
        (TURNS_PER_PHASE + 1).saturating_sub(self.turn_in_phase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::{Area, House, Role, RosterEntry, TimeOfDay};

    fn scenario(car: bool) -> Scenario {
        Scenario {
            house: House {
                floors: 2,
                area: Area::Coastal,
            },
            time_of_day: TimeOfDay::Evening,
            family: vec![
                RosterEntry {
                    name: String::from("You"),
                    role: Role::Player,
                    location: Location::Home,
                },
                RosterEntry {
                    name: String::from("Spouse"),
                    role: Role::Spouse,
                    location: Location::Away,
                },
            ],
            shelter: String::from("Civic Center"),
            has_elderly: false,
            car_available: car,
        }
    }

    #[test]
    fn new_state_starts_at_first_turn() {
        let state = GameState::new(scenario(true), 9);
        assert_eq!(state.current_phase, 0);
        assert_eq!(state.turn_in_phase, 1);
        assert_eq!(state.upcoming_turn(), 1);
        assert_eq!(state.phase_id(), PhaseId::Approach);
        assert_eq!(state.family.len(), 2);
        assert!(state.items.contains("car"));
        assert!(!state.alerts_active());
        assert_eq!(state.status(), TurnStatus::Ongoing);
        assert_eq!(state.turns_left_in_phase(), 3);
        assert_eq!(state.count_at(&[Location::Away]), 1);
        assert!(state.member("Spouse").is_some());
    }

    #[test]
    fn floor_is_clamped_to_house() {
        let mut state = GameState::new(scenario(false), 1);
        state.current_floor = 7;
        state.clamp_floor();
        assert_eq!(state.current_floor, 2);
        state.current_floor = 0;
        state.clamp_floor();
        assert_eq!(state.current_floor, 1);
    }

    #[test]
    fn state_roundtrips_as_camel_case_json() {
        let state = GameState::new(scenario(false), 77);
        let json = serde_json::to_value(&state).expect("serialize");
        assert!(json.get("currentPhase").is_some());
        assert!(json.get("selectedChoiceIds").is_some());
        assert_eq!(json["evacuation"]["status"], "none");
        let restored: GameState = serde_json::from_value(json).expect("deserialize");
        assert_eq!(restored, state);
    }
}
