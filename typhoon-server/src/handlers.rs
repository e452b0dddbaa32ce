//! Endpoint handlers.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/new-scenario` | Random household and house |
//! | `POST` | `/new-game` | Initial state and first choices |
//! | `POST` | `/turn` | Resolve a choice, or refresh when it is null |
//! | `GET` | `/health` | Liveness and catalog size |

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use typhoon_game::{
    ActionLevel, Category, Choice, FinalReport, GameState, NarrationPrompt, PhaseId, Scenario,
    TurnEngine, TurnInput, TurnOutcome, describe_turn, generate_scenario,
};

use crate::error::ApiError;
use crate::narration::narrate_or_fallback;
use crate::state::AppState;

/// Longest free-text action accepted with a turn, in characters.
pub const MAX_ACTION_TEXT: usize = 500;

#[derive(Debug, Serialize, Deserialize)]
pub struct ScenarioResponse {
    pub scenario: Scenario,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGameRequest {
    pub scenario: Scenario,
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnRequest {
    pub state: GameState,
    #[serde(default)]
    pub selected_choice_id: Option<String>,
    #[serde(default)]
    pub action_text: Option<String>,
}

/// Public projection of a catalog choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceView {
    pub id: String,
    pub text: String,
    pub category: Category,
}

impl From<&Choice> for ChoiceView {
    fn from(choice: &Choice) -> Self {
        Self {
            id: choice.id.clone(),
            text: choice.text.clone(),
            category: choice.category,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseInfo {
    pub phase_name: String,
    pub phase_id: PhaseId,
    pub turn_in_phase: u8,
    pub total_turns: u32,
    pub alert_level: ActionLevel,
}

impl PhaseInfo {
    fn of(state: &GameState) -> Self {
        Self {
            phase_name: state.phase_name().to_string(),
            phase_id: state.phase_id(),
            turn_in_phase: state.turn_in_phase,
            total_turns: state.total_turns,
            alert_level: state.alerts.action_level,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnResponse {
    pub narration: String,
    pub choices: Vec<ChoiceView>,
    pub state: GameState,
    pub phase_info: PhaseInfo,
    pub final_report: Option<FinalReport>,
}

impl TurnResponse {
    fn new(outcome: TurnOutcome, narration: String) -> Self {
        Self {
            narration,
            choices: outcome.choices.iter().map(ChoiceView::from).collect(),
            phase_info: PhaseInfo::of(&outcome.state),
            final_report: outcome.final_report,
            state: outcome.state,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub choices: usize,
}

pub async fn new_scenario() -> Json<ScenarioResponse> {
    let scenario = generate_scenario(&mut rand::thread_rng());
    Json(ScenarioResponse { scenario })
}

pub async fn new_game(
    State(app): State<Arc<AppState>>,
    Json(request): Json<NewGameRequest>,
) -> Json<TurnResponse> {
    let seed = request.seed.unwrap_or_else(rand::random);
    let outcome = TurnEngine::new(&app.catalog).start_game(request.scenario, seed);
    log::debug!("new game with seed {seed}");
    let narration = describe_turn(&NarrationPrompt::for_state(&outcome.state, ""));
    Json(TurnResponse::new(outcome, narration))
}

pub async fn turn(
    State(app): State<Arc<AppState>>,
    Json(request): Json<TurnRequest>,
) -> Result<Json<TurnResponse>, ApiError> {
    if let Some(text) = &request.action_text
        && text.chars().count() > MAX_ACTION_TEXT
    {
        return Err(ApiError::BadRequest(format!(
            "action text is longer than {MAX_ACTION_TEXT} characters"
        )));
    }
    let input = TurnInput {
        choice_id: request.selected_choice_id,
        action_text: request.action_text,
    };
    let outcome = TurnEngine::new(&app.catalog).advance(&request.state, &input)?;

    let Some(resolved) = outcome.resolved.as_ref() else {
        let narration = describe_turn(&NarrationPrompt::for_state(&outcome.state, ""));
        return Ok(Json(TurnResponse::new(outcome, narration)));
    };

    let action = input
        .action_text
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .unwrap_or(&resolved.text)
        .to_string();
    let prompt = NarrationPrompt::for_state(&outcome.state, action);
    let narration = narrate_or_fallback(app.narrator.as_ref(), &prompt).await;

    let mut outcome = outcome;
    if !outcome.state.game_ended {
        outcome.state = TurnEngine::absorb_narration(&outcome.state, &narration);
    }
    Ok(Json(TurnResponse::new(outcome, narration)))
}

pub async fn health(State(app): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: String::from("ok"),
        choices: app.catalog.len(),
    })
}
