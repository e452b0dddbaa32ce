//! Per-turn checks run against every state the engine hands back.
use std::collections::BTreeSet;

use typhoon_game::constants::{
    CALM_STREAK_TO_END, CHOICES_PER_TURN, PHASE_COUNT, SCORE_MAX, SCORE_MIN, TURNS_PER_PHASE,
};
use typhoon_game::{Ending, EvacStatus, GameState, Rank, TurnOutcome};

/// Upper bound on resolved turns in one session.
pub const MAX_TURNS: u32 = PHASE_COUNT as u32 * TURNS_PER_PHASE as u32;

/// Compare the state before a resolved turn with what came back.
/// Returns one message per violated rule.
#[must_use]
pub fn check_turn(before: &GameState, outcome: &TurnOutcome) -> Vec<String> {
    let after = &outcome.state;
    let mut violations = check_state(after);

    if after.total_turns != before.total_turns + 1 {
        violations.push(format!(
            "turn counter moved from {} to {}",
            before.total_turns, after.total_turns
        ));
    }
    if after.current_phase < before.current_phase {
        violations.push(format!(
            "phase went backwards from {} to {}",
            before.current_phase, after.current_phase
        ));
    }
    if after.selected_choice_ids.len() < before.selected_choice_ids.len() {
        violations.push(String::from("consumed choices were forgotten"));
    }

    if after.game_ended {
        match (&after.final_report, after.ending) {
            (Some(report), Some(ending)) => {
                if report.ending != ending {
                    violations.push(format!(
                        "report ending {} disagrees with state ending {ending}",
                        report.ending
                    ));
                }
                if report.rank != Rank::from_score(report.total_score) {
                    violations.push(format!(
                        "rank {} does not match total {}",
                        report.rank, report.total_score
                    ));
                }
                if after.disaster_occurred && report.safety_score != 0 {
                    violations.push(format!(
                        "disaster left safety at {}",
                        report.safety_score
                    ));
                }
                if !(0..=100).contains(&report.safety_score) {
                    violations.push(format!("safety {} out of range", report.safety_score));
                }
            }
            _ => violations.push(String::from("game ended without a final report")),
        }
        if !outcome.choices.is_empty() {
            violations.push(String::from("choices offered after the game ended"));
        }
    } else {
        violations.extend(check_offer(after, outcome));
    }

    violations
}

/// Rules that hold for any single state.
#[must_use]
pub fn check_state(state: &GameState) -> Vec<String> {
    let mut violations = Vec::new();
    let scores = &state.scores;
    let axes = [
        ("survival", scores.survival),
        ("judgment", scores.judgment),
        ("preparedness", scores.preparedness),
        ("contribution", scores.contribution),
        ("culture", scores.culture),
    ];
    for (axis, value) in axes {
        if !(SCORE_MIN..=SCORE_MAX).contains(&value) {
            violations.push(format!("{axis} score {value} out of range"));
        }
    }

    let floors = state.scenario.house.floors.max(1);
    if !(1..=floors).contains(&state.current_floor) {
        violations.push(format!(
            "floor {} outside a {floors}-floor house",
            state.current_floor
        ));
    }

    let unique: BTreeSet<&String> = state.selected_choice_ids.iter().collect();
    if unique.len() != state.selected_choice_ids.len() {
        violations.push(String::from("a choice was consumed twice"));
    }

    if state.total_turns > MAX_TURNS {
        violations.push(format!("session ran {} turns", state.total_turns));
    }
    if !state.game_ended && !(1..=TURNS_PER_PHASE).contains(&state.turn_in_phase) {
        violations.push(format!("turn {} of phase", state.turn_in_phase));
    }
    if state.ending == Some(Ending::TyphoonPassed)
        && (state.calm_streak < CALM_STREAK_TO_END || !state.alerts.series.is_empty())
    {
        violations.push(format!(
            "typhoon passed after {} calm turns with {} alerts up",
            state.calm_streak,
            state.alerts.series.len()
        ));
    }

    let evacuation = &state.evacuation;
    if evacuation.turns_required < 1 {
        violations.push(String::from("journey needs zero turns"));
    }
    match evacuation.status {
        EvacStatus::Arrived if evacuation.turns_elapsed < evacuation.turns_required => {
            violations.push(format!(
                "arrived after {} of {} turns",
                evacuation.turns_elapsed, evacuation.turns_required
            ));
        }
        EvacStatus::EnRoute if evacuation.turns_elapsed >= evacuation.turns_required => {
            violations.push(format!(
                "still en route after {} of {} turns",
                evacuation.turns_elapsed, evacuation.turns_required
            ));
        }
        _ => {}
    }

    violations
}

fn check_offer(state: &GameState, outcome: &TurnOutcome) -> Vec<String> {
    let mut violations = Vec::new();
    if outcome.choices.len() != CHOICES_PER_TURN {
        violations.push(format!("{} choices offered", outcome.choices.len()));
    }
    let categories: BTreeSet<_> = outcome.choices.iter().map(|choice| choice.category).collect();
    if categories.len() != outcome.choices.len() {
        violations.push(String::from("offer repeats a category"));
    }
    for choice in &outcome.choices {
        if !choice.is_fallback() && state.selected_choice_ids.contains(&choice.id) {
            violations.push(format!("consumed choice {} offered again", choice.id));
        }
    }
    violations
}
