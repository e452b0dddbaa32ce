//! Typhoon Night Game Engine
//!
//! Platform-agnostic core logic for the Typhoon Night disaster-preparedness game.
//! The engine is pure: every turn takes the previous state and returns the next one,
//! with all randomness derived from the session seed.

pub mod alerts;
pub mod constants;
pub mod data;
pub mod evacuation;
pub mod family;
pub mod narration;
pub mod numbers;
pub mod phase;
pub mod result;
pub mod scenario;
pub mod score;
pub mod selector;
pub mod signals;
pub mod state;
pub mod turn;

// Re-export commonly used types
pub use alerts::{ActionLevel, AlertLevel, AlertState, HazardSeries, SeriesAlert};
pub use data::{Category, CatalogError, Choice, ChoiceCatalog, CustomEffect, Effects, When};
pub use evacuation::{EvacStatus, EvacuationState};
pub use family::FamilyMember;
pub use narration::{NarrationPrompt, NarrationReply, describe_turn, fallback_narration};
pub use phase::PhaseId;
pub use result::{Ending, FinalReport};
pub use scenario::{Area, House, Location, Role, RosterEntry, Scenario, generate_scenario};
pub use score::{Rank, ScoreDelta, ScoreSet};
pub use state::{GameState, TurnRecord, TurnStatus};
pub use turn::{RngBundle, TurnEngine, TurnError, TurnInput, TurnOutcome};

/// Trait for abstracting where the choice catalog comes from
/// Platform-specific implementations should provide this
pub trait CatalogSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load and validate the choice catalog
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be read, parsed or validated.
    fn load_catalog(&self) -> Result<ChoiceCatalog, Self::Error>;
}

/// The catalog compiled into the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedCatalog;

impl CatalogSource for EmbeddedCatalog {
    type Error = std::convert::Infallible;

    fn load_catalog(&self) -> Result<ChoiceCatalog, Self::Error> {
        Ok(data::catalog().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn embedded_catalog_drives_a_game() {
        let catalog = EmbeddedCatalog.load_catalog().unwrap();
        assert!(!catalog.is_empty());
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        let scenario = generate_scenario(&mut rng);
        let engine = TurnEngine::new(&catalog);
        let outcome = engine.start_game(scenario, 11);
        assert_eq!(outcome.choices.len(), constants::CHOICES_PER_TURN);
        assert_eq!(outcome.state.status(), TurnStatus::Ongoing);
    }
}
