use std::fmt;
use std::str::FromStr;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use typhoon_game::{Category, Choice, CustomEffect, GameState};

/// Decision returned by a [`PlayerPolicy`]
#[derive(Debug, Clone)]
pub struct PolicyDecision {
    pub choice_index: usize,
    pub rationale: Option<String>,
}

impl PolicyDecision {
    #[must_use]
    pub fn new(choice_index: usize, rationale: Option<String>) -> Self {
        Self {
            choice_index,
            rationale,
        }
    }
}

/// Policy interface for automated play strategies.
pub trait PlayerPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Select one of the offered choices.
    fn pick_choice(&mut self, state: &GameState, offered: &[Choice]) -> PolicyDecision;
}

/// Built-in gameplay strategies for automated runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameplayStrategy {
    Cautious,
    Evacuator,
    Helper,
    Idler,
    Random,
}

impl GameplayStrategy {
    pub const ALL: [Self; 5] = [
        Self::Cautious,
        Self::Evacuator,
        Self::Helper,
        Self::Idler,
        Self::Random,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            GameplayStrategy::Cautious => "Cautious",
            GameplayStrategy::Evacuator => "Evacuator",
            GameplayStrategy::Helper => "Helper",
            GameplayStrategy::Idler => "Idler",
            GameplayStrategy::Random => "Random",
        }
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn PlayerPolicy + Send> {
        match self {
            GameplayStrategy::Cautious => Box::new(CautiousPolicy),
            GameplayStrategy::Evacuator => Box::new(EvacuatorPolicy),
            GameplayStrategy::Helper => Box::new(HelperPolicy),
            GameplayStrategy::Idler => Box::new(IdlerPolicy),
            GameplayStrategy::Random => Box::new(RandomPolicy::new(seed)),
        }
    }
}

impl fmt::Display for GameplayStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for GameplayStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.label().to_ascii_lowercase() == wanted)
            .ok_or_else(|| format!("unknown strategy '{s}'"))
    }
}

struct CautiousPolicy;
struct EvacuatorPolicy;
struct HelperPolicy;
struct IdlerPolicy;

struct RandomPolicy {
    rng: ChaCha20Rng,
}

impl RandomPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

fn best_by<F>(offered: &[Choice], score: F) -> (usize, i32)
where
    F: Fn(&Choice) -> i32,
{
    offered
        .iter()
        .enumerate()
        .map(|(idx, choice)| (idx, score(choice)))
        // Ties keep the earliest offer.
        .fold((0, i32::MIN), |best, candidate| {
            if candidate.1 > best.1 { candidate } else { best }
        })
}

fn safety_value(choice: &Choice) -> i32 {
    let delta = &choice.effects.score;
    delta.survival * 2 + delta.judgment
}

impl PlayerPolicy for CautiousPolicy {
    fn name(&self) -> &'static str {
        "Cautious"
    }

    fn pick_choice(&mut self, _state: &GameState, offered: &[Choice]) -> PolicyDecision {
        let (idx, value) = best_by(offered, safety_value);
        PolicyDecision::new(idx, Some(format!("safety {value}")))
    }
}

impl PlayerPolicy for EvacuatorPolicy {
    fn name(&self) -> &'static str {
        "Evacuator"
    }

    fn pick_choice(&mut self, state: &GameState, offered: &[Choice]) -> PolicyDecision {
        let on_the_road = !state.evacuation.status.can_start();
        let (idx, value) = best_by(offered, |choice| {
            let bonus = match choice.effects.custom {
                Some(CustomEffect::StartEvacuation) if !on_the_road => 100,
                Some(CustomEffect::MoveUpstairs) => 50,
                Some(CustomEffect::AbortEvacuation) => -100,
                _ => 0,
            };
            bonus + safety_value(choice)
        });
        PolicyDecision::new(idx, Some(format!("evacuation {value}")))
    }
}

impl PlayerPolicy for HelperPolicy {
    fn name(&self) -> &'static str {
        "Helper"
    }

    fn pick_choice(&mut self, _state: &GameState, offered: &[Choice]) -> PolicyDecision {
        let (idx, value) = best_by(offered, |choice| {
            let talk = i32::from(choice.category == Category::Communication) * 10;
            talk + choice.effects.score.contribution * 2 + choice.effects.score.culture
        });
        PolicyDecision::new(idx, Some(format!("contribution {value}")))
    }
}

impl PlayerPolicy for IdlerPolicy {
    fn name(&self) -> &'static str {
        "Idler"
    }

    fn pick_choice(&mut self, _state: &GameState, offered: &[Choice]) -> PolicyDecision {
        let idx = offered
            .iter()
            .position(|choice| choice.category == Category::Waiting)
            .unwrap_or(0);
        PolicyDecision::new(idx, Some(String::from("waits it out")))
    }
}

impl PlayerPolicy for RandomPolicy {
    fn name(&self) -> &'static str {
        "Random"
    }

    fn pick_choice(&mut self, _state: &GameState, offered: &[Choice]) -> PolicyDecision {
        if offered.is_empty() {
            return PolicyDecision::new(0, Some("no choices".to_string()));
        }
        PolicyDecision::new(self.rng.gen_range(0..offered.len()), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use typhoon_game::{CatalogSource, EmbeddedCatalog, TurnEngine, generate_scenario};

    fn opening() -> (GameState, Vec<Choice>) {
        let catalog = EmbeddedCatalog.load_catalog().unwrap();
        let scenario = generate_scenario(&mut ChaCha20Rng::seed_from_u64(7));
        let outcome = TurnEngine::new(&catalog).start_game(scenario, 7);
        (outcome.state, outcome.choices)
    }

    #[test]
    fn strategies_parse_case_insensitively() {
        assert_eq!(
            "evacuator".parse::<GameplayStrategy>(),
            Ok(GameplayStrategy::Evacuator)
        );
        assert_eq!(
            " IDLER ".parse::<GameplayStrategy>(),
            Ok(GameplayStrategy::Idler)
        );
        assert!("reckless".parse::<GameplayStrategy>().is_err());
    }

    #[test]
    fn every_policy_picks_an_offered_index() {
        let (state, offered) = opening();
        for strategy in GameplayStrategy::ALL {
            let mut policy = strategy.create_policy(3);
            let decision = policy.pick_choice(&state, &offered);
            assert!(decision.choice_index < offered.len(), "{strategy}");
        }
    }

    #[test]
    fn idler_prefers_waiting() {
        let (state, offered) = opening();
        let decision = IdlerPolicy.pick_choice(&state, &offered);
        if offered.iter().any(|choice| choice.category == Category::Waiting) {
            assert_eq!(offered[decision.choice_index].category, Category::Waiting);
        }
    }

    #[test]
    fn random_policy_is_seeded() {
        let (state, offered) = opening();
        let mut first = RandomPolicy::new(11);
        let mut second = RandomPolicy::new(11);
        for _ in 0..8 {
            assert_eq!(
                first.pick_choice(&state, &offered).choice_index,
                second.pick_choice(&state, &offered).choice_index
            );
        }
    }
}
