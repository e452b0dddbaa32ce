use std::collections::BTreeMap;
use std::hash::Hasher;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use colored::Colorize;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use twox_hash::XxHash64;
use typhoon_game::{
    Category, ChoiceCatalog, FinalReport, GameState, PhaseId, TurnEngine, TurnInput,
    generate_scenario,
};

use super::invariants::{MAX_TURNS, check_state, check_turn};
use super::policy::GameplayStrategy;

/// One automated pick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub turn: u32,
    pub phase: PhaseId,
    pub choice_id: String,
    pub category: Category,
    pub rationale: Option<String>,
}

/// Everything one autoplayed session produced.
#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub seed: u64,
    pub strategy: GameplayStrategy,
    pub decisions: Vec<DecisionRecord>,
    pub final_state: GameState,
    pub report: Option<FinalReport>,
    pub violations: Vec<String>,
    /// XxHash64 over every serialized state in order.
    pub fingerprint: u64,
}

/// Aggregated outcome of one strategy over one seed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub strategy: String,
    pub seed: u64,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    pub endings: BTreeMap<String, usize>,
    pub average_total_score: f64,
    pub average_turns: f64,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
}

fn fingerprint_state(hasher: &mut XxHash64, state: &GameState) -> Result<()> {
    let bytes = serde_json::to_vec(state).context("serialize state for fingerprint")?;
    hasher.write(&bytes);
    Ok(())
}

/// Autoplay one session from `seed` until the engine ends it.
///
/// The scenario is drawn from the same seed so a run is fully reproducible.
pub fn play_session(
    catalog: &ChoiceCatalog,
    strategy: GameplayStrategy,
    seed: u64,
) -> Result<SessionSummary> {
    let engine = TurnEngine::new(catalog);
    let scenario = generate_scenario(&mut ChaCha20Rng::seed_from_u64(seed));
    let mut policy = strategy.create_policy(seed);
    let mut outcome = engine.start_game(scenario, seed);

    let mut hasher = XxHash64::with_seed(0);
    fingerprint_state(&mut hasher, &outcome.state)?;
    let mut violations = check_state(&outcome.state);
    let mut decisions = Vec::new();

    while !outcome.state.game_ended {
        if outcome.state.total_turns > MAX_TURNS {
            bail!("seed {seed} did not finish within {MAX_TURNS} turns");
        }
        let decision = policy.pick_choice(&outcome.state, &outcome.choices);
        let Some(choice) = outcome.choices.get(decision.choice_index) else {
            bail!(
                "{} picked index {} from {} choices",
                policy.name(),
                decision.choice_index,
                outcome.choices.len()
            );
        };
        decisions.push(DecisionRecord {
            turn: outcome.state.upcoming_turn(),
            phase: outcome.state.phase_id(),
            choice_id: choice.id.clone(),
            category: choice.category,
            rationale: decision.rationale,
        });

        let next = engine
            .advance(&outcome.state, &TurnInput::choose(choice.id.clone()))
            .with_context(|| format!("seed {seed} turn {}", outcome.state.upcoming_turn()))?;
        for violation in check_turn(&outcome.state, &next) {
            violations.push(format!("turn {}: {violation}", next.state.total_turns));
        }
        fingerprint_state(&mut hasher, &next.state)?;
        outcome = next;
    }

    Ok(SessionSummary {
        seed,
        strategy,
        decisions,
        report: outcome.final_report.clone(),
        final_state: outcome.state,
        violations,
        fingerprint: hasher.finish(),
    })
}

/// Run `iterations` sessions for one strategy starting at `seed`, replaying
/// each once to confirm it is deterministic.
#[must_use]
pub fn run_strategy(
    catalog: &ChoiceCatalog,
    strategy: GameplayStrategy,
    seed: u64,
    iterations: usize,
    verbose: bool,
) -> ScenarioResult {
    if verbose {
        println!(
            "🧪 Testing strategy: {} (seed: {seed})",
            strategy.label().bright_white()
        );
    }

    let mut successes = 0;
    let mut failures = Vec::new();
    let mut endings = BTreeMap::new();
    let mut total_score = 0_i64;
    let mut total_turns = 0_u64;
    let mut finished = 0_u32;
    let mut elapsed = Duration::ZERO;

    for i in 0..iterations {
        let iteration_seed = seed.wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));
        let start = Instant::now();
        let played = play_session(catalog, strategy, iteration_seed);
        let replayed = play_session(catalog, strategy, iteration_seed);
        elapsed += start.elapsed();

        let summary = match (played, replayed) {
            (Ok(summary), Ok(replay)) => {
                if summary.fingerprint != replay.fingerprint {
                    failures.push(format!(
                        "Iteration {} (seed {iteration_seed}): replay diverged ({:016x} vs {:016x})",
                        i + 1,
                        summary.fingerprint,
                        replay.fingerprint
                    ));
                    continue;
                }
                summary
            }
            (Err(err), _) | (_, Err(err)) => {
                failures.push(format!("Iteration {} (seed {iteration_seed}): {err:#}", i + 1));
                continue;
            }
        };

        if let Some(report) = &summary.report {
            *endings.entry(report.ending.to_string()).or_insert(0) += 1;
            total_score += i64::from(report.total_score);
            total_turns += u64::from(summary.final_state.total_turns);
            finished += 1;
        }

        if summary.violations.is_empty() {
            successes += 1;
        } else {
            failures.push(format!(
                "Iteration {} (seed {iteration_seed}, {} turns): {}",
                i + 1,
                summary.decisions.len(),
                summary.violations.join("; ")
            ));
        }
        log::debug!(
            "{} seed {}: {} decisions, fingerprint {:016x}",
            summary.strategy,
            summary.seed,
            summary.decisions.len(),
            summary.fingerprint
        );
    }

    #[allow(clippy::cast_precision_loss)]
    let (average_total_score, average_turns) = if finished == 0 {
        (0.0, 0.0)
    } else {
        (
            total_score as f64 / f64::from(finished),
            total_turns as f64 / f64::from(finished),
        )
    };
    let average_duration = if iterations == 0 {
        Duration::ZERO
    } else {
        elapsed / u32::try_from(iterations).unwrap_or(u32::MAX)
    };

    ScenarioResult {
        scenario_name: format!("{} seed {seed}", strategy.label()),
        strategy: strategy.label().to_string(),
        seed,
        passed: failures.is_empty(),
        iterations_run: iterations,
        successful_iterations: successes,
        failures,
        endings,
        average_total_score,
        average_turns,
        average_duration,
    }
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}
