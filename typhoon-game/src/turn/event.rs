//! Explainability telemetry for weighted random selection.
//!
//! Every weighted draw made while building a turn's option set records which
//! pool it sampled, the raw roll, and the weights it saw.

use serde::{Deserialize, Serialize};

/// Trace of a single weighted draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDecisionTrace {
    /// Identifier for the selection pool (e.g., `typhoon.choices.info`).
    pub pool_id: String,
    /// Draw in `0..total_weight` that picked the winner.
    pub roll: u32,
    /// Candidate weights considered during selection.
    pub candidates: Vec<WeightedCandidate>,
    /// Identifier of the selected candidate.
    pub chosen_id: String,
}

impl EventDecisionTrace {
    /// Sum of every candidate weight the roll was drawn against.
    #[must_use]
    pub fn total_weight(&self) -> u32 {
        self.candidates.iter().map(|candidate| candidate.weight).sum()
    }
}

/// One candidate and the weight it was drawn with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightedCandidate {
    pub id: String,
    pub weight: u32,
}

impl WeightedCandidate {
    #[must_use]
    pub fn new(id: impl Into<String>, weight: u32) -> Self {
        Self {
            id: id.into(),
            weight,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_trace_roundtrips() {
        let trace = EventDecisionTrace {
            pool_id: String::from("typhoon.choices.info"),
            roll: 4,
            candidates: vec![
                WeightedCandidate::new("info.radio", 3),
                WeightedCandidate::new("info.hazard_map", 2),
            ],
            chosen_id: String::from("info.hazard_map"),
        };
        assert_eq!(trace.total_weight(), 5);

        let json = serde_json::to_string(&trace).expect("serialize");
        assert!(json.contains("\"poolId\""));
        assert!(json.contains("\"chosenId\""));
        let restored: EventDecisionTrace = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored, trace);
    }
}
