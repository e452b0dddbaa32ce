//! Turn orchestration: resolves a submitted choice and runs the fixed
//! per-turn pipeline over the game state.
//!
//! Order within a turn: choice effects, alert ladder, evacuation, family,
//! disaster gate, natural end, phase clock, then the next option set.
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::alerts::{ActionLevel, advance_alerts};
use crate::constants::{
    CALM_STREAK_TO_END, DISASTER_EVACUATING_EMERGENCY, DISASTER_GROUND_FLOOR_EMERGENCY,
    DISASTER_SLOPE_LANDSLIDE, FLAG_ALERT_RECEIVED, FLAG_LANDSLIDE_WARNING,
    MIN_TURNS_FOR_NATURAL_END, PHASE_COUNT, TURNS_PER_PHASE,
};
use crate::data::{Choice, ChoiceCatalog, CustomEffect};
use crate::evacuation::{
    EvacStatus, EvacuationContext, abort_evacuation, advance_evacuation, start_evacuation,
};
use crate::family;
use crate::phase::{phase_at, sample_targets};
use crate::result::{Ending, FinalReport, build_final_report};
use crate::scenario::{Area, Scenario};
use crate::selector::select_for_turn;
use crate::signals::heard_chime;
use crate::state::{GameState, TurnRecord};

pub mod event;
pub mod rng;

pub use event::{EventDecisionTrace, WeightedCandidate};
pub use rng::{CountingRng, RngBundle};

/// Reasons a submitted turn is rejected. The state is never modified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TurnError {
    #[error("unknown choice id `{0}`")]
    UnknownChoice(String),
    #[error("choice `{0}` has already been used")]
    ChoiceAlreadyUsed(String),
    #[error("the game has already ended")]
    GameOver,
}

/// Player submission for one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TurnInput {
    /// `None` asks for the current offer without advancing.
    #[serde(default)]
    pub choice_id: Option<String>,
    #[serde(default)]
    pub action_text: Option<String>,
}

impl TurnInput {
    #[must_use]
    pub fn choose(choice_id: impl Into<String>) -> Self {
        Self {
            choice_id: Some(choice_id.into()),
            action_text: None,
        }
    }

    #[must_use]
    pub fn refresh() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.action_text = Some(text.into());
        self
    }
}

/// Result of a turn or refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    pub state: GameState,
    /// Options for the next turn; empty once the game has ended.
    pub choices: Vec<Choice>,
    pub final_report: Option<FinalReport>,
    /// The choice that was resolved, absent on refresh.
    pub resolved: Option<Choice>,
    /// Family members reached by phone this turn.
    pub contacted: Vec<String>,
    pub traces: Vec<EventDecisionTrace>,
}

/// Situation that exposes the household to a disaster roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisasterCause {
    EvacuatingInEmergency,
    GroundFloorInEmergency,
    SlopeLandslide,
}

impl DisasterCause {
    #[must_use]
    pub const fn probability(self) -> f64 {
        match self {
            Self::EvacuatingInEmergency => DISASTER_EVACUATING_EMERGENCY,
            Self::GroundFloorInEmergency => DISASTER_GROUND_FLOOR_EMERGENCY,
            Self::SlopeLandslide => DISASTER_SLOPE_LANDSLIDE,
        }
    }
}

/// Exposures present in `state`, in the order they are rolled.
#[must_use]
pub fn disaster_exposures(state: &GameState) -> Vec<DisasterCause> {
    let emergency = state.alerts.action_level == ActionLevel::EmergencySafety;
    let en_route = state.evacuation.is_en_route();
    let at_home = !en_route && state.evacuation.status != EvacStatus::Arrived;
    let mut exposures = Vec::new();
    if emergency && en_route {
        exposures.push(DisasterCause::EvacuatingInEmergency);
    }
    if emergency && at_home && state.current_floor <= 1 {
        exposures.push(DisasterCause::GroundFloorInEmergency);
    }
    if at_home && state.scenario.house.area == Area::Slope && state.landslide_warning() {
        exposures.push(DisasterCause::SlopeLandslide);
    }
    exposures
}

/// Roll every exposure independently; the first hit is returned.
pub fn roll_disaster<R: Rng + ?Sized>(state: &GameState, rng: &mut R) -> Option<DisasterCause> {
    for cause in disaster_exposures(state) {
        let hit = rng.gen_bool(cause.probability());
        log::debug!("disaster roll {cause:?}: {hit}");
        if hit {
            return Some(cause);
        }
    }
    None
}

/// Drives turns for one catalog.
#[derive(Debug, Clone, Copy)]
pub struct TurnEngine<'a> {
    catalog: &'a ChoiceCatalog,
}

impl<'a> TurnEngine<'a> {
    #[must_use]
    pub const fn new(catalog: &'a ChoiceCatalog) -> Self {
        Self { catalog }
    }

    #[must_use]
    pub const fn catalog(&self) -> &'a ChoiceCatalog {
        self.catalog
    }

    /// Initial state for `scenario` with its first option set.
    #[must_use]
    pub fn start_game(&self, scenario: Scenario, seed: u64) -> TurnOutcome {
        let state = GameState::new(scenario, seed);
        self.refresh(&state, &RngBundle::for_turn(seed, state.total_turns))
    }

    /// Advance `state` by one turn, deriving randomness from its seed.
    ///
    /// # Errors
    ///
    /// Returns a [`TurnError`] for unknown or consumed ids and for finished games.
    pub fn advance(&self, state: &GameState, input: &TurnInput) -> Result<TurnOutcome, TurnError> {
        // Offers for turn N draw from stream N-1 so a refresh reproduces them.
        let stream_turn = if input.choice_id.is_some() {
            state.upcoming_turn()
        } else {
            state.total_turns
        };
        self.advance_with(
            state,
            input,
            &RngBundle::for_turn(state.seed, stream_turn),
        )
    }

    /// Advance using caller-provided streams.
    ///
    /// # Errors
    ///
    /// Returns a [`TurnError`] for unknown or consumed ids and for finished games.
    pub fn advance_with<R: RngCore>(
        &self,
        state: &GameState,
        input: &TurnInput,
        rngs: &RngBundle<R>,
    ) -> Result<TurnOutcome, TurnError> {
        let Some(choice_id) = input.choice_id.as_deref() else {
            return Ok(self.refresh(state, rngs));
        };
        if state.game_ended || state.current_phase >= PHASE_COUNT {
            return Err(TurnError::GameOver);
        }
        let choice = self
            .catalog
            .find(choice_id)
            .ok_or_else(|| TurnError::UnknownChoice(choice_id.to_string()))?;
        if state.selected_choice_ids.iter().any(|id| id == choice_id) {
            return Err(TurnError::ChoiceAlreadyUsed(choice_id.to_string()));
        }

        let mut next = state.clone();
        // Client-held clocks may arrive out of range.
        next.turn_in_phase = next.turn_in_phase.clamp(1, TURNS_PER_PHASE);
        let turn = next.upcoming_turn();
        let contacted = apply_choice(&mut next, choice, input.action_text.as_deref(), turn);

        if let Some(phase) = phase_at(next.current_phase) {
            let targets = sample_targets(phase, &mut *rngs.alerts());
            let update = advance_alerts(&next.alerts, &targets, next.landslide_warning());
            next.alerts = update.alerts;
            if update.landslide_warning {
                next.flags.insert(FLAG_LANDSLIDE_WARNING.to_string());
            } else {
                next.flags.remove(FLAG_LANDSLIDE_WARNING);
            }
        }

        let was_en_route = next.evacuation.is_en_route();
        next.evacuation = advance_evacuation(
            &next.evacuation,
            &EvacuationContext {
                turn,
                flags: &next.flags,
                has_elderly: next.scenario.has_elderly,
            },
            &mut *rngs.evacuation(),
        );
        if was_en_route && next.evacuation.status == EvacStatus::Arrived {
            family::complete_evacuation(&mut next.family);
        }

        let alerts_active = next.alerts.action_level != ActionLevel::None
            || next.alerts.has_warning_or_above();
        let whereabouts = family::advance_family(
            &next.family,
            &next.return_etas,
            &next.split_plans,
            alerts_active,
            &mut *rngs.family(),
        );
        next.family = whereabouts.family;
        next.return_etas = whereabouts.return_etas;
        next.split_plans = whereabouts.split_plans;

        let mut ending = None;
        if let Some(cause) = roll_disaster(&next, &mut *rngs.disaster()) {
            log::debug!("disaster at turn {turn}: {cause:?}");
            next.disaster_occurred = true;
            family::mark_disaster(&mut next.family);
            ending = Some(Ending::Disaster);
        } else {
            let calm = next.alerts.series.is_empty()
                && next.alerts.action_level == ActionLevel::None
                && !next.evacuation.is_en_route();
            next.calm_streak = if calm { next.calm_streak.saturating_add(1) } else { 0 };
            if next.calm_streak >= CALM_STREAK_TO_END
                && next.total_turns >= MIN_TURNS_FOR_NATURAL_END
            {
                ending = Some(Ending::TyphoonPassed);
            }
        }

        next.total_turns = turn;
        if ending.is_none() {
            next.turn_in_phase = next.turn_in_phase.saturating_add(1);
            if next.turn_in_phase > TURNS_PER_PHASE {
                next.current_phase = next.current_phase.saturating_add(1);
                next.turn_in_phase = 1;
                family::settle_unknown(&mut next.family, &mut next.return_etas);
                log::debug!("phase advanced to {}", next.phase_name());
                if next.current_phase >= PHASE_COUNT {
                    ending = Some(Ending::StormOver);
                }
            }
        }

        let resolved = Some(choice.clone());
        if let Some(ending) = ending {
            let report = finish(&mut next, ending);
            return Ok(TurnOutcome {
                state: next,
                choices: Vec::new(),
                final_report: Some(report),
                resolved,
                contacted,
                traces: Vec::new(),
            });
        }

        let selection = select_for_turn(self.catalog, &next, &mut *rngs.selection());
        next.selection = selection.plan.clone();
        next.offered_choice_ids = selection.ids();
        Ok(TurnOutcome {
            state: next,
            choices: selection.choices,
            final_report: None,
            resolved,
            contacted,
            traces: selection.traces,
        })
    }

    /// Current offer without a transition, computing it when missing.
    fn refresh<R: RngCore>(&self, state: &GameState, rngs: &RngBundle<R>) -> TurnOutcome {
        let mut next = state.clone();
        let mut traces = Vec::new();
        let choices = if next.game_ended {
            Vec::new()
        } else if next.offered_choice_ids.is_empty() {
            let selection = select_for_turn(self.catalog, &next, &mut *rngs.selection());
            next.selection = selection.plan.clone();
            next.offered_choice_ids = selection.ids();
            traces = selection.traces;
            selection.choices
        } else {
            self.offered_choices(&next)
        };
        TurnOutcome {
            final_report: next.final_report.clone(),
            state: next,
            choices,
            resolved: None,
            contacted: Vec::new(),
            traces,
        }
    }

    /// Resolve the state's offered ids against the catalog.
    #[must_use]
    pub fn offered_choices(&self, state: &GameState) -> Vec<Choice> {
        state
            .offered_choice_ids
            .iter()
            .filter_map(|id| self.catalog.find(id).cloned())
            .collect()
    }

    /// Fold narration text back into the state; only the chime flag can change.
    #[must_use]
    pub fn absorb_narration(state: &GameState, narration: &str) -> GameState {
        let mut next = state.clone();
        if !next.has_flag(FLAG_ALERT_RECEIVED) && heard_chime(narration) {
            next.flags.insert(FLAG_ALERT_RECEIVED.to_string());
        }
        next
    }
}

/// Apply a choice's effects and free-text signals; returns contacted names.
fn apply_choice(
    state: &mut GameState,
    choice: &Choice,
    action_text: Option<&str>,
    turn: u32,
) -> Vec<String> {
    if !choice.is_fallback() {
        state.selected_choice_ids.push(choice.id.clone());
    }
    state.scores.apply(&choice.effects.score);
    state
        .flags
        .extend(choice.effects.set_flags.iter().cloned());
    state
        .items
        .extend(choice.effects.add_items.iter().cloned());

    match choice.effects.custom {
        Some(CustomEffect::StartEvacuation) => {
            match start_evacuation(
                &state.evacuation,
                turn,
                &state.flags,
                &state.scenario.shelter,
            ) {
                Some(started) => {
                    state.evacuation = started;
                    family::begin_evacuation(&mut state.family);
                }
                None => log::warn!(
                    "evacuation start ignored while {}",
                    state.evacuation.status.as_str()
                ),
            }
        }
        Some(CustomEffect::AbortEvacuation) => {
            if let Some(aborted) = abort_evacuation(&state.evacuation, turn) {
                state.evacuation = aborted;
                family::abort_evacuation(&mut state.family);
            }
        }
        Some(CustomEffect::MoveUpstairs) => {
            state.current_floor = state.current_floor.saturating_add(1);
        }
        Some(CustomEffect::MoveDownstairs) => {
            state.current_floor = state.current_floor.saturating_sub(1);
        }
        None => {}
    }
    state.clamp_floor();

    let mut text = choice.text.clone();
    if let Some(extra) = action_text.filter(|extra| !extra.trim().is_empty()) {
        text.push('\n');
        text.push_str(extra);
    }
    if !state.has_flag(FLAG_ALERT_RECEIVED) && heard_chime(&text) {
        state.flags.insert(FLAG_ALERT_RECEIVED.to_string());
    }
    let contacted = family::register_contact(&mut state.family, &text);

    state.history.push(TurnRecord {
        turn,
        phase: state.phase_id(),
        choice_id: choice.id.clone(),
        choice_text: choice.text.clone(),
        category: choice.category,
        action_text: action_text.map(str::to_string),
        action_level: state.alerts.action_level,
    });
    contacted
}

fn finish(state: &mut GameState, ending: Ending) -> FinalReport {
    state.game_ended = true;
    state.ending = Some(ending);
    state.offered_choice_ids.clear();
    let report = build_final_report(state, ending);
    state.final_report = Some(report.clone());
    log::debug!("game ended at turn {}: {ending}", state.total_turns);
    report
}
