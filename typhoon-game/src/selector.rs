//! Choice availability filtering and category-balanced turn selection.
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::constants::{CHOICES_PER_TURN, SELECTION_POOL_ID};
use crate::data::{Category, Choice, ChoiceCatalog, fallback_choices};
use crate::phase::phase_id_at;
use crate::state::GameState;
use crate::turn::event::{EventDecisionTrace, WeightedCandidate};

/// Categories that take part in the per-phase rotation.
const ROTATING: [Category; 5] = [
    Category::Info,
    Category::Communication,
    Category::Supplies,
    Category::HomeHardening,
    Category::Evacuation,
];

/// Category plan remembered across the turns of one phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SelectionPlan {
    pub phase: u8,
    /// Category held back on the first turn and guaranteed on the second.
    #[serde(default)]
    pub held: Option<Category>,
    /// Categories already offered during this phase.
    #[serde(default)]
    pub used: Vec<Category>,
}

/// Offered options for one turn plus the updated plan.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub choices: Vec<Choice>,
    pub plan: SelectionPlan,
    pub traces: Vec<EventDecisionTrace>,
}

impl Selection {
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        self.choices.iter().map(|choice| choice.id.clone()).collect()
    }
}

/// Every catalog entry whose predicate matches the current state.
#[must_use]
pub fn filter_available<'a>(catalog: &'a ChoiceCatalog, state: &GameState) -> Vec<&'a Choice> {
    let phase = phase_id_at(state.current_phase);
    catalog
        .choices
        .iter()
        .filter(|choice| {
            let when = &choice.when;
            (when.phases.is_empty() || when.phases.contains(&phase))
                && (when.action_levels.is_empty()
                    || when.action_levels.contains(&state.alerts.action_level))
                && when
                    .require_items
                    .iter()
                    .all(|item| state.items.contains(item))
                && when
                    .require_flags
                    .iter()
                    .all(|flag| state.flags.contains(flag))
                && !when.exclude_evac_status.contains(&state.evacuation.status)
                && when
                    .require_house_floors
                    .is_none_or(|floors| floors <= state.scenario.house.floors)
                && !state.selected_choice_ids.contains(&choice.id)
        })
        .collect()
}

struct TurnBuilder<'a> {
    available: Vec<&'a Choice>,
    picked: Vec<&'a Choice>,
    traces: Vec<EventDecisionTrace>,
}

impl<'a> TurnBuilder<'a> {
    fn is_full(&self) -> bool {
        self.picked.len() >= CHOICES_PER_TURN
    }

    fn has_category(&self, category: Category) -> bool {
        self.picked.iter().any(|choice| choice.category == category)
    }

    fn has_available(&self, category: Category) -> bool {
        self.available
            .iter()
            .any(|choice| choice.category == category && !self.is_picked(choice))
    }

    fn is_picked(&self, choice: &Choice) -> bool {
        self.picked.iter().any(|picked| picked.id == choice.id)
    }

    fn push_triggered(&mut self) {
        let triggered: Vec<&'a Choice> = self
            .available
            .iter()
            .copied()
            .filter(|choice| choice.is_triggered())
            .collect();
        for choice in triggered {
            if self.is_full() {
                break;
            }
            if !self.has_category(choice.category) {
                self.picked.push(choice);
            }
        }
    }

    /// Weighted draw of one choice from `category`; false when nothing fits.
    fn draw<R: Rng + ?Sized>(&mut self, category: Category, rng: &mut R) -> bool {
        if self.is_full() || self.has_category(category) {
            return false;
        }
        let pool: Vec<&'a Choice> = self
            .available
            .iter()
            .copied()
            .filter(|choice| choice.category == category && !self.is_picked(choice))
            .collect();
        let weights: Vec<(usize, u32)> = pool
            .iter()
            .enumerate()
            .map(|(idx, choice)| (idx, choice.weight.max(1)))
            .collect();
        let Some((idx, roll)) = choose_weighted(&weights, rng) else {
            return false;
        };
        let Some(chosen) = pool.get(idx).copied() else {
            return false;
        };
        self.traces.push(EventDecisionTrace {
            pool_id: format!("{SELECTION_POOL_ID}.{category}"),
            roll,
            candidates: pool
                .iter()
                .map(|choice| WeightedCandidate::new(choice.id.clone(), choice.weight.max(1)))
                .collect(),
            chosen_id: chosen.id.clone(),
        });
        self.picked.push(chosen);
        true
    }

    fn backfill<R: Rng + ?Sized>(&mut self, plan: &SelectionPlan, rng: &mut R) {
        let mut fresh: Vec<Category> = ROTATING
            .iter()
            .copied()
            .filter(|category| !plan.used.contains(category))
            .collect();
        fresh.shuffle(rng);
        for category in fresh {
            self.draw(category, rng);
        }
        let mut rest: Vec<Category> = ROTATING.to_vec();
        rest.shuffle(rng);
        for category in rest {
            self.draw(category, rng);
        }
    }

    fn fill_with_fallback(&mut self) {
        for choice in fallback_choices() {
            if self.is_full() {
                break;
            }
            if !self.has_category(choice.category) {
                self.picked.push(choice);
            }
        }
    }
}

/// Select the options offered on the state's current turn.
///
/// Always yields [`CHOICES_PER_TURN`] choices with distinct categories; the
/// fallback set covers whatever the catalog cannot.
pub fn select_for_turn<R: Rng + ?Sized>(
    catalog: &ChoiceCatalog,
    state: &GameState,
    rng: &mut R,
) -> Selection {
    let mut builder = TurnBuilder {
        available: filter_available(catalog, state),
        picked: Vec::with_capacity(CHOICES_PER_TURN),
        traces: Vec::new(),
    };
    let same_phase = state.selection.phase == state.current_phase;
    let mut plan = if same_phase && state.turn_in_phase > 1 {
        state.selection.clone()
    } else {
        SelectionPlan {
            phase: state.current_phase,
            ..SelectionPlan::default()
        }
    };

    builder.push_triggered();

    match state.turn_in_phase {
        0 | 1 => {
            let mut order: Vec<Category> = ROTATING
                .iter()
                .copied()
                .filter(|category| builder.has_available(*category))
                .collect();
            order.shuffle(rng);
            let mut pending = order.into_iter();
            for category in pending.by_ref() {
                builder.draw(category, rng);
                if builder.is_full() {
                    break;
                }
            }
            plan.held = pending.find(|category| !builder.has_category(*category));
        }
        2 => {
            if let Some(held) = plan.held.take() {
                builder.draw(held, rng);
            }
            builder.draw(Category::Waiting, rng);
            builder.backfill(&plan, rng);
        }
        _ => {
            builder.draw(Category::Waiting, rng);
            builder.backfill(&plan, rng);
        }
    }

    builder.fill_with_fallback();

    for choice in &builder.picked {
        if !plan.used.contains(&choice.category) {
            plan.used.push(choice.category);
        }
    }

    Selection {
        choices: builder.picked.into_iter().cloned().collect(),
        plan,
        traces: builder.traces,
    }
}

/// Weighted pick over `(index, weight)` pairs, returning the index and roll.
pub(crate) fn choose_weighted<R: Rng + ?Sized>(
    weights: &[(usize, u32)],
    rng: &mut R,
) -> Option<(usize, u32)> {
    let total_weight: u32 = weights.iter().map(|(_, weight)| *weight).sum();
    if total_weight == 0 {
        return None;
    }

    let roll = rng.gen_range(0..total_weight);
    let mut current = 0;
    for (idx, weight) in weights {
        current += *weight;
        if roll < current {
            return Some((*idx, roll));
        }
    }

    weights.first().map(|(idx, _)| (*idx, roll))
}
