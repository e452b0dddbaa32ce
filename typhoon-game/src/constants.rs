//! Centralized balance and tuning constants for the Typhoon Night simulation.
//!
//! These values define the deterministic math for the core simulation.
//! Keeping them together ensures that gameplay can only be adjusted via
//! code changes reviewed in version control, rather than through the
//! externally loaded choice catalog.

// Flags and tags -----------------------------------------------------------
pub const FLAG_ALERT_RECEIVED: &str = "alert_received";
pub const FLAG_LANDSLIDE_WARNING: &str = "landslide_warning_info";
pub const FLAG_ROUTE_CONFIRMED: &str = "route_confirmed";
pub const FLAG_NEIGHBORS_RALLIED: &str = "neighbors_rallied";
pub const FLAG_RESCUE_REQUEST: &str = "rescue_request";
pub const FLAG_CAR_USE: &str = "car_use";
pub const HAZARD_VEHICLE_FLOODWATER: &str = "vehicle_in_floodwater";
pub const HAZARD_FLOODED_DETOUR: &str = "flooded_detour";
pub const HAZARD_RESCUE_STOP: &str = "rescue_stop";

// Phase clock --------------------------------------------------------------
pub const TURNS_PER_PHASE: u8 = 3;
pub const PHASE_COUNT: u8 = 4;
pub const MIN_TURNS_FOR_NATURAL_END: u32 = 5;
pub const CALM_STREAK_TO_END: u32 = 5;

// Alert ladder -------------------------------------------------------------
pub const HOLD_TURNS: u8 = 2;
pub const LANDSLIDE_STREAK_TURNS: u8 = 2;

// Evacuation ---------------------------------------------------------------
pub const EVAC_BASE_TURNS: u32 = 2;
pub const EVAC_MIN_TURNS: u32 = 1;
pub const DETOUR_CHANCE_PER_TURN: f64 = 0.2;

// Family -------------------------------------------------------------------
pub const AWAY_ETA_RANGE: (u32, u32) = (2, 4);
pub const UNKNOWN_ETA_RANGE: (u32, u32) = (3, 6);

// Disaster gate ------------------------------------------------------------
pub const DISASTER_EVACUATING_EMERGENCY: f64 = 0.25;
pub const DISASTER_GROUND_FLOOR_EMERGENCY: f64 = 0.20;
pub const DISASTER_SLOPE_LANDSLIDE: f64 = 0.15;

// Scores -------------------------------------------------------------------
pub const SCORE_MIN: i32 = 0;
pub const SCORE_MAX: i32 = 100;
pub const SCORE_INITIAL: i32 = 50;
pub const MAX_SCORE_DELTA: i32 = 20;
pub const WEIGHT_SURVIVAL: f64 = 0.35;
pub const WEIGHT_JUDGMENT: f64 = 0.25;
pub const WEIGHT_PREPAREDNESS: f64 = 0.20;
pub const WEIGHT_CONTRIBUTION: f64 = 0.15;
pub const WEIGHT_CULTURE: f64 = 0.05;

// Choice selection ---------------------------------------------------------
pub const CHOICES_PER_TURN: usize = 4;
pub(crate) const SELECTION_POOL_ID: &str = "typhoon.choices";

// Narration ----------------------------------------------------------------
pub const NARRATION_FALLBACK: &str =
    "Rain drums on the roof and the wind keeps rising outside the window.";

#[cfg(test)]
pub(crate) const FLOAT_EPSILON: f64 = 1e-9;
