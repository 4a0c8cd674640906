use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Question allowance of one elicitation run
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BudgetLimits {
    /// Questions put to the user, across all phases
    pub questions: u32,
    /// Comparison rounds of the interactive search
    pub rounds: u32,
}

impl BudgetLimits {
    pub fn questions(questions: u32) -> Self {
        Self {
            questions,
            ..Default::default()
        }
    }
}

impl Default for BudgetLimits {
    fn default() -> Self {
        Self {
            questions: 50,
            rounds: 1000,
        }
    }
}

/// The two counters a run is metered on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Meter {
    Questions,
    Rounds,
}

impl Meter {
    pub const ALL: [Meter; 2] = [Meter::Questions, Meter::Rounds];
}

impl fmt::Display for Meter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Meter::Questions => write!(f, "questions"),
            Meter::Rounds => write!(f, "rounds"),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BudgetConsumed {
    pub questions: u32,
    pub rounds: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BudgetRemaining {
    pub questions: u32,
    pub rounds: u32,
}

/// State of the budget as seen by [`BudgetContext::check`](super::BudgetContext::check)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BudgetCheckResult {
    Ok,
    /// `meter` just crossed `percent` of its limit
    Warning { meter: Meter, percent: u8 },
    Exhausted { meter: Meter },
}

/// Refusal to reserve one more unit of `meter`
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{meter} budget exhausted ({consumed}/{limit})")]
pub struct BudgetExhausted {
    pub meter: Meter,
    pub consumed: u32,
    pub limit: u32,
}
