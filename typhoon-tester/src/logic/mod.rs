pub mod invariants;
pub mod policy;
pub mod reports;
pub mod simulation;

pub use policy::GameplayStrategy;
pub use simulation::{ScenarioResult, run_strategy};
