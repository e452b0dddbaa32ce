//! Multi-turn evacuation journey with dynamically extended duration.
use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeSet;

use crate::constants::{
    DETOUR_CHANCE_PER_TURN, EVAC_BASE_TURNS, EVAC_MIN_TURNS, FLAG_CAR_USE, FLAG_NEIGHBORS_RALLIED,
    FLAG_RESCUE_REQUEST, FLAG_ROUTE_CONFIRMED, HAZARD_FLOODED_DETOUR, HAZARD_RESCUE_STOP,
    HAZARD_VEHICLE_FLOODWATER,
};

/// Hazard tags picked up along the way, stored inline for short journeys.
pub type HazardTags = SmallVec<[String; 4]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EvacStatus {
    #[default]
    None,
    EnRoute,
    Arrived,
    Aborted,
}

impl EvacStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::EnRoute => "en_route",
            Self::Arrived => "arrived",
            Self::Aborted => "aborted",
        }
    }

    /// Whether a new journey may begin from this status.
    #[must_use]
    pub const fn can_start(self) -> bool {
        matches!(self, Self::None | Self::Aborted)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JourneyEntry {
    pub turn: u32,
    pub text: String,
}

/// Journey ledger carried between turns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvacuationState {
    pub status: EvacStatus,
    #[serde(default)]
    pub start_turn: u32,
    #[serde(default)]
    pub turns_elapsed: u32,
    pub turns_required: u32,
    #[serde(default)]
    pub hazards: HazardTags,
    #[serde(default)]
    pub journey_log: Vec<JourneyEntry>,
    #[serde(default)]
    pub rescue_delay_applied: bool,
    #[serde(default)]
    pub detour_delay_applied: bool,
    #[serde(default)]
    pub route_reduction_applied: bool,
    #[serde(default)]
    pub rally_reduction_applied: bool,
    /// Preparation finished mid-journey, spent against the next delay.
    #[serde(default)]
    pub prep_credit: u32,
}

impl Default for EvacuationState {
    fn default() -> Self {
        Self {
            status: EvacStatus::None,
            start_turn: 0,
            turns_elapsed: 0,
            turns_required: EVAC_BASE_TURNS,
            hazards: HazardTags::new(),
            journey_log: Vec::new(),
            rescue_delay_applied: false,
            detour_delay_applied: false,
            route_reduction_applied: false,
            rally_reduction_applied: false,
            prep_credit: 0,
        }
    }
}

impl EvacuationState {
    #[must_use]
    pub const fn is_en_route(&self) -> bool {
        matches!(self.status, EvacStatus::EnRoute)
    }

    fn log(&mut self, turn: u32, text: impl Into<String>) {
        self.journey_log.push(JourneyEntry {
            turn,
            text: text.into(),
        });
    }

    fn tag(&mut self, hazard: &str) {
        if !self.hazards.iter().any(|tag| tag == hazard) {
            self.hazards.push(hazard.to_string());
        }
    }

    /// Extend the journey by one turn unless banked preparation absorbs it.
    fn delay(&mut self, turn: u32, reason: &str) {
        if self.prep_credit > 0 {
            self.prep_credit -= 1;
            self.log(turn, format!("{reason}, but earlier preparation keeps you on time"));
        } else {
            self.turns_required = self.turns_required.saturating_add(1);
            self.log(turn, format!("{reason}; the journey takes longer"));
        }
        log::debug!("evacuation delay at turn {turn}: {reason}");
    }

    fn shorten(&mut self) {
        self.turns_required = self
            .turns_required
            .saturating_sub(1)
            .max(EVAC_MIN_TURNS);
    }
}

/// Inputs the tracker reads from the wider game state.
#[derive(Debug, Clone, Copy)]
pub struct EvacuationContext<'a> {
    pub turn: u32,
    pub flags: &'a BTreeSet<String>,
    pub has_elderly: bool,
}

/// Begin a journey toward `shelter`.
///
/// Returns `None` when a journey is already under way or finished.
#[must_use]
pub fn start_evacuation(
    prev: &EvacuationState,
    turn: u32,
    flags: &BTreeSet<String>,
    shelter: &str,
) -> Option<EvacuationState> {
    if !prev.status.can_start() {
        return None;
    }
    let mut next = EvacuationState {
        status: EvacStatus::EnRoute,
        start_turn: turn,
        journey_log: prev.journey_log.clone(),
        ..EvacuationState::default()
    };
    next.log(turn, format!("Left home for {shelter}"));
    if flags.contains(FLAG_ROUTE_CONFIRMED) {
        next.route_reduction_applied = true;
        next.shorten();
    }
    if flags.contains(FLAG_NEIGHBORS_RALLIED) {
        next.rally_reduction_applied = true;
        next.shorten();
    }
    log::debug!(
        "evacuation started at turn {turn}, {} turns required",
        next.turns_required
    );
    Some(next)
}

/// Turn back home; only meaningful while en route.
#[must_use]
pub fn abort_evacuation(prev: &EvacuationState, turn: u32) -> Option<EvacuationState> {
    if !prev.is_en_route() {
        return None;
    }
    let mut next = prev.clone();
    next.status = EvacStatus::Aborted;
    next.log(turn, "Turned back toward home");
    Some(next)
}

/// Advance an in-progress journey by one turn.
pub fn advance_evacuation<R: Rng + ?Sized>(
    prev: &EvacuationState,
    ctx: &EvacuationContext<'_>,
    rng: &mut R,
) -> EvacuationState {
    let mut next = prev.clone();
    if !next.is_en_route() {
        return next;
    }
    let turn = ctx.turn;
    next.turns_elapsed = turn.saturating_sub(next.start_turn);

    if ctx.flags.contains(FLAG_ROUTE_CONFIRMED) && !next.route_reduction_applied {
        next.route_reduction_applied = true;
        next.prep_credit = next.prep_credit.saturating_add(1);
    }
    if ctx.flags.contains(FLAG_NEIGHBORS_RALLIED) && !next.rally_reduction_applied {
        next.rally_reduction_applied = true;
        next.prep_credit = next.prep_credit.saturating_add(1);
    }

    if ctx.flags.contains(FLAG_RESCUE_REQUEST) && !next.rescue_delay_applied {
        next.rescue_delay_applied = true;
        next.tag(HAZARD_RESCUE_STOP);
        next.delay(turn, "Stopped to help with a rescue request");
    }
    if !next.detour_delay_applied && rng.gen_bool(DETOUR_CHANCE_PER_TURN) {
        next.detour_delay_applied = true;
        next.tag(HAZARD_FLOODED_DETOUR);
        next.delay(turn, "A flooded underpass forced a detour");
    }
    if ctx.flags.contains(FLAG_CAR_USE) && !ctx.has_elderly {
        next.tag(HAZARD_VEHICLE_FLOODWATER);
    }

    if next.turns_elapsed >= next.turns_required {
        next.status = EvacStatus::Arrived;
        next.log(turn, "Arrived at the shelter");
        log::debug!("evacuation arrived at turn {turn}");
    } else {
        let left = next.turns_required - next.turns_elapsed;
        next.log(turn, format!("Still on the way, about {left} turn(s) to go"));
    }
    next
}
