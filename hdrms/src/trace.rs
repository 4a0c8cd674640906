//! Structured record of an elicitation run

use std::fmt;

use hdrms_geometry::PointId;
use serde::Serialize;

use crate::budget::QuestionPhase;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Narrowing,
    Splitting,
    Elicitation,
    SubsetConstruction,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Narrowing => write!(f, "narrowing"),
            Phase::Splitting => write!(f, "splitting"),
            Phase::Elicitation => write!(f, "elicitation"),
            Phase::SubsetConstruction => write!(f, "subset_construction"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TraceEvent {
    PhaseStarted {
        phase: Phase,
    },
    /// Phase 1 block question
    BlockTested {
        dims: Vec<usize>,
        kept: bool,
        pool: usize,
    },
    /// Phase 2 group or single-dimension question
    GroupTested {
        dims: Vec<usize>,
        positive: bool,
    },
    DimensionsDiscarded {
        dims: Vec<usize>,
        pool: usize,
    },
    DimensionConfirmed {
        dim: usize,
        pool: usize,
    },
    ComparisonRound {
        round: u32,
        shown: Vec<PointId>,
        winner: PointId,
        candidates: usize,
        regret_bound: f64,
    },
    SubsetRound {
        round: usize,
        dims: Vec<usize>,
        covered: Vec<PointId>,
    },
    BudgetExhausted {
        phase: QuestionPhase,
    },
}

/// Trace of decisions for debugging/audit
#[derive(Clone, Debug, Default, Serialize)]
pub struct ElicitationTrace {
    pub events: Vec<TraceEvent>,
}

impl ElicitationTrace {
    pub fn push(&mut self, event: TraceEvent) {
        self.events.push(event);
    }

    /// Dimension pool size after every Phase 1 and Phase 2 change
    pub fn pool_sizes(&self) -> Vec<usize> {
        self.events
            .iter()
            .filter_map(|e| match e {
                TraceEvent::BlockTested { pool, .. }
                | TraceEvent::DimensionsDiscarded { pool, .. }
                | TraceEvent::DimensionConfirmed { pool, .. } => Some(*pool),
                _ => None,
            })
            .collect()
    }

    /// Candidate count after every comparison round
    pub fn candidate_sizes(&self) -> Vec<usize> {
        self.events
            .iter()
            .filter_map(|e| match e {
                TraceEvent::ComparisonRound { candidates, .. } => Some(*candidates),
                _ => None,
            })
            .collect()
    }

    /// Regret bound after every comparison round
    pub fn regret_bounds(&self) -> Vec<f64> {
        self.events
            .iter()
            .filter_map(|e| match e {
                TraceEvent::ComparisonRound { regret_bound, .. } => Some(*regret_bound),
                _ => None,
            })
            .collect()
    }
}
