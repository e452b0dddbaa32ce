//! Narration boundary types shared with the service that writes turn prose.
use serde::{Deserialize, Serialize};

use crate::alerts::ActionLevel;
use crate::constants::NARRATION_FALLBACK;
use crate::evacuation::EvacStatus;
use crate::phase::PhaseId;
use crate::state::GameState;

/// Request sent to the narration service after a turn resolves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrationPrompt {
    pub phase: PhaseId,
    pub turn: u32,
    pub alert_level: ActionLevel,
    pub evacuation_status: EvacStatus,
    pub action: String,
}

impl NarrationPrompt {
    /// Describe the state reached after `action` was taken.
    #[must_use]
    pub fn for_state(state: &GameState, action: impl Into<String>) -> Self {
        Self {
            phase: state.phase_id(),
            turn: state.total_turns,
            alert_level: state.alerts.action_level,
            evacuation_status: state.evacuation.status,
            action: action.into(),
        }
    }
}

/// Expected reply body from the narration service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrationReply {
    pub narration: String,
}

/// Sentence used whenever narration is unavailable.
#[must_use]
pub const fn fallback_narration() -> &'static str {
    NARRATION_FALLBACK
}

/// Offline narration built from the state alone.
#[must_use]
pub fn describe_turn(prompt: &NarrationPrompt) -> String {
    let scene = match prompt.evacuation_status {
        EvacStatus::EnRoute => "You press on through the rain toward the shelter.",
        EvacStatus::Arrived => "The shelter hums with radios and low voices.",
        EvacStatus::Aborted => "Back home, you shake the water from your coat.",
        EvacStatus::None => match prompt.alert_level {
            ActionLevel::None => "The wind worries at the shutters.",
            ActionLevel::ElderEvacuation => "Loudspeakers urge elderly residents to move early.",
            ActionLevel::EvacuationOrder => "An evacuation order crackles over the town speakers.",
            ActionLevel::EmergencySafety => {
                "Every phone in the house shrieks with an emergency alert."
            }
        },
    };
    let action = prompt.action.trim().trim_end_matches('.');
    if action.is_empty() {
        scene.to_string()
    } else {
        format!("{action}. {scene}")
    }
}
