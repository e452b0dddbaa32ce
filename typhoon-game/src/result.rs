//! End of game evaluation
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::alerts::ActionLevel;
use crate::constants::{FLAG_ROUTE_CONFIRMED, HAZARD_VEHICLE_FLOODWATER};
use crate::data::Category;
use crate::evacuation::EvacStatus;
use crate::numbers::percent_of;
use crate::scenario::{Area, Location, Role};
use crate::score::{Rank, ScoreSet};
use crate::state::GameState;

/// How a session finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ending {
    /// A disaster roll hit the household
    Disaster,
    /// The calm streak outlasted the storm
    TyphoonPassed,
    /// Every phase was played out
    StormOver,
}

impl fmt::Display for Ending {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disaster => write!(f, "disaster"),
            Self::TyphoonPassed => write!(f, "typhoon_passed"),
            Self::StormOver => write!(f, "storm_over"),
        }
    }
}

/// Complete evaluation shown when the game ends
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalReport {
    pub ending: Ending,
    pub headline: String,
    pub summary: String,
    pub scores: ScoreSet,
    pub total_score: i32,
    pub rank: Rank,
    pub safety_score: i32,
    pub turn_ended: u32,
    pub highlights: Vec<String>,
    pub advice: Vec<String>,
}

/// Share of the household accounted for at the end, in percent.
#[must_use]
pub fn safety_score(ending: Ending, state: &GameState) -> i32 {
    let total = state.family.len();
    match ending {
        Ending::Disaster => 0,
        Ending::TyphoonPassed => percent_of(
            total - state.count_at(&[Location::Unknown]),
            total,
        ),
        Ending::StormOver => percent_of(
            state.count_at(&[Location::Home, Location::Arrived]),
            total,
        ),
    }
}

/// Build the report for a finished state.
#[must_use]
pub fn build_final_report(state: &GameState, ending: Ending) -> FinalReport {
    let total_score = state.scores.total_score();
    let safety = safety_score(ending, state);
    FinalReport {
        ending,
        headline: headline(ending).to_string(),
        summary: summary(ending, state, safety),
        scores: state.scores,
        total_score,
        rank: Rank::from_score(total_score),
        safety_score: safety,
        turn_ended: state.total_turns,
        highlights: highlights(state),
        advice: advice(state),
    }
}

const fn headline(ending: Ending) -> &'static str {
    match ending {
        Ending::Disaster => "The storm caught your household",
        Ending::TyphoonPassed => "The typhoon has passed",
        Ending::StormOver => "You made it through the night",
    }
}

fn summary(ending: Ending, state: &GameState, safety: i32) -> String {
    let turns = state.total_turns;
    match ending {
        Ending::Disaster => format!(
            "After {turns} turns the situation turned deadly during the {} phase.",
            state.phase_name().to_lowercase()
        ),
        Ending::TyphoonPassed => format!(
            "Calm returned after {turns} turns; {safety}% of the household is accounted for."
        ),
        Ending::StormOver => format!(
            "The storm blew itself out after {turns} turns; {safety}% of the household is safe at home or in a shelter."
        ),
    }
}

fn highlights(state: &GameState) -> Vec<String> {
    let mut lines = Vec::new();
    match state.evacuation.status {
        EvacStatus::Arrived => lines.push(String::from("Reached the shelter with the household")),
        EvacStatus::Aborted => lines.push(String::from("Turned back from an evacuation attempt")),
        EvacStatus::EnRoute => lines.push(String::from("Was still on the road when it ended")),
        EvacStatus::None => {}
    }
    let contacted = state
        .family
        .iter()
        .filter(|member| member.contacted && member.role != Role::Player)
        .count();
    if contacted > 0 {
        lines.push(format!("Reached {contacted} family member(s) by phone"));
    }
    if !state.split_plans.is_empty() {
        lines.push(String::from(
            "Family members away from home sheltered where they were",
        ));
    }
    if state.current_floor > 1 {
        lines.push(String::from("Moved up to a higher floor"));
    }
    if let Some(last) = state
        .history
        .iter()
        .rev()
        .find(|record| record.action_level > ActionLevel::None)
    {
        lines.push(format!(
            "Last action under {}: {}",
            last.action_level, last.choice_text
        ));
    }
    lines
}

fn advice(state: &GameState) -> Vec<String> {
    let mut lines = Vec::new();
    let scenario = &state.scenario;
    match scenario.house.area {
        Area::Coastal => lines.push(String::from(
            "On the coast, storm surge can rise fast; decide early whether to leave.",
        )),
        Area::Riverside => lines.push(String::from(
            "By the river, check the water level gauges and leave before the flood warning.",
        )),
        Area::Slope => lines.push(String::from(
            "Near a slope, landslide warning information means leave or move away from the hillside.",
        )),
        Area::Highland | Area::Residential => {}
    }
    if scenario.house.floors == 1 {
        lines.push(String::from(
            "A one-storey house has no upstairs refuge; plan a vertical evacuation spot nearby.",
        ));
    }
    if !state.has_flag(FLAG_ROUTE_CONFIRMED) {
        lines.push(String::from(
            "Walk the route to your shelter on a calm day so you know it in the dark.",
        ));
    }
    let gathered = state
        .history
        .iter()
        .any(|record| record.category == Category::Supplies);
    if !gathered {
        lines.push(String::from(
            "Keep water, food and a radio ready before the season starts.",
        ));
    }
    if state
        .evacuation
        .hazards
        .iter()
        .any(|hazard| hazard == HAZARD_VEHICLE_FLOODWATER)
    {
        lines.push(String::from(
            "Driving through floodwater is dangerous; walk when roads start to flood.",
        ));
    }
    lines
}
