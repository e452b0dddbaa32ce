//! Fixed story phases and the hazard policy each one drives.
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::alerts::{AlertLevel, HazardSeries, SeriesTargets};
use crate::constants::{PHASE_COUNT, TURNS_PER_PHASE};
use crate::selector::choose_weighted;

/// Identifier for a story phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseId {
    Approach,
    Escalation,
    Peak,
    Passing,
    Ended,
}

impl PhaseId {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Approach => "approach",
            Self::Escalation => "escalation",
            Self::Peak => "peak",
            Self::Passing => "passing",
            Self::Ended => "ended",
        }
    }
}

/// Requested level source for one series during a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesPolicy {
    Fixed(Option<AlertLevel>),
    OneOf(&'static [(Option<AlertLevel>, u32)]),
}

/// One fixed story stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Phase {
    pub id: PhaseId,
    pub name: &'static str,
    pub turns: u8,
    /// Percent chance per turn that the rain bands miss and no series asks
    /// for any level.
    pub lull_percent: u32,
    pub policy: [(HazardSeries, SeriesPolicy); 5],
}

use AlertLevel::{Advisory, Special, Warning};
use HazardSeries::{Flood, Rain, Tide, Wave, Wind};
use SeriesPolicy::{Fixed, OneOf};

const PHASES: [Phase; PHASE_COUNT as usize] = [
    Phase {
        id: PhaseId::Approach,
        name: "Approach",
        turns: TURNS_PER_PHASE,
        lull_percent: 30,
        policy: [
            (Rain, OneOf(&[(None, 2), (Some(Advisory), 3)])),
            (Wind, OneOf(&[(None, 1), (Some(Advisory), 3)])),
            (Flood, Fixed(None)),
            (Wave, OneOf(&[(None, 2), (Some(Advisory), 1)])),
            (Tide, Fixed(None)),
        ],
    },
    Phase {
        id: PhaseId::Escalation,
        name: "Escalation",
        turns: TURNS_PER_PHASE,
        lull_percent: 20,
        policy: [
            (Rain, OneOf(&[(Some(Advisory), 1), (Some(Warning), 3)])),
            (Wind, OneOf(&[(Some(Advisory), 2), (Some(Warning), 2)])),
            (
                Flood,
                OneOf(&[(None, 2), (Some(Advisory), 2), (Some(Warning), 1)]),
            ),
            (Wave, OneOf(&[(Some(Advisory), 2), (Some(Warning), 1)])),
            (Tide, OneOf(&[(None, 2), (Some(Advisory), 1)])),
        ],
    },
    Phase {
        id: PhaseId::Peak,
        name: "Peak",
        turns: TURNS_PER_PHASE,
        lull_percent: 50,
        policy: [
            (Rain, OneOf(&[(Some(Warning), 2), (Some(Special), 2)])),
            (Wind, OneOf(&[(Some(Warning), 2), (Some(Special), 1)])),
            (Flood, OneOf(&[(Some(Warning), 3), (Some(Advisory), 1)])),
            (Wave, OneOf(&[(Some(Warning), 3), (Some(Advisory), 1)])),
            (
                Tide,
                OneOf(&[
                    (Some(Advisory), 1),
                    (Some(Warning), 2),
                    (Some(Special), 1),
                ]),
            ),
        ],
    },
    Phase {
        id: PhaseId::Passing,
        name: "Passing",
        turns: TURNS_PER_PHASE,
        lull_percent: 80,
        policy: [
            (
                Rain,
                OneOf(&[(None, 3), (Some(Advisory), 2), (Some(Warning), 1)]),
            ),
            (Wind, OneOf(&[(None, 2), (Some(Advisory), 1)])),
            (Flood, Fixed(None)),
            (Wave, OneOf(&[(None, 2), (Some(Advisory), 1)])),
            (Tide, Fixed(None)),
        ],
    },
];

/// Phase at `index`, or `None` for the terminal pseudo-phase.
#[must_use]
pub fn phase_at(index: u8) -> Option<&'static Phase> {
    PHASES.get(usize::from(index))
}

/// Phase id at `index`, mapping anything past the table to [`PhaseId::Ended`].
#[must_use]
pub fn phase_id_at(index: u8) -> PhaseId {
    phase_at(index).map_or(PhaseId::Ended, |phase| phase.id)
}

/// Display name for the phase at `index`.
#[must_use]
pub fn phase_name_at(index: u8) -> &'static str {
    phase_at(index).map_or("Ended", |phase| phase.name)
}

/// Sample this turn's requested level for every series.
///
/// A lull is rolled first and returns no targets. Otherwise series are
/// sampled in table order; fixed entries draw nothing.
pub fn sample_targets<R: Rng + ?Sized>(phase: &Phase, rng: &mut R) -> SeriesTargets {
    let mut targets = SeriesTargets::new();
    if rng.gen_ratio(phase.lull_percent, 100) {
        return targets;
    }
    for (series, policy) in &phase.policy {
        let level = match policy {
            Fixed(level) => *level,
            OneOf(options) => {
                let weights: Vec<(usize, u32)> = options
                    .iter()
                    .enumerate()
                    .map(|(idx, (_, weight))| (idx, *weight))
                    .collect();
                choose_weighted(&weights, rng)
                    .and_then(|(idx, _)| options.get(idx))
                    .and_then(|(level, _)| *level)
            }
        };
        if let Some(level) = level {
            targets.insert(*series, level);
        }
    }
    targets
}
