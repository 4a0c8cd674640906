//! Budget events kept alongside the elicitation trace

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::budget::types::{BudgetLimits, BudgetRemaining, Meter};

/// Phase that asked a question
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionPhase {
    Narrowing,
    Splitting,
    Elicitation,
}

impl fmt::Display for QuestionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionPhase::Narrowing => write!(f, "narrowing"),
            QuestionPhase::Splitting => write!(f, "splitting"),
            QuestionPhase::Elicitation => write!(f, "elicitation"),
        }
    }
}

#[derive(Clone, Debug)]
pub enum BudgetEvent {
    /// Limits the run started with
    Allocation { limits: BudgetLimits },
    Question {
        phase: QuestionPhase,
        remaining: BudgetRemaining,
    },
    /// 50% or 80% of a meter used up
    Warning {
        meter: Meter,
        percent: u8,
        consumed: u32,
        limit: u32,
    },
    /// A question was refused
    Exhausted {
        meter: Meter,
        phase: QuestionPhase,
        consumed: u32,
        limit: u32,
    },
}

/// Questions asked per phase at the end of a run
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalConsumption {
    pub narrowing: u32,
    pub splitting: u32,
    pub elicitation: u32,
    pub rounds: u32,
}

impl FinalConsumption {
    pub fn total_questions(&self) -> u32 {
        self.narrowing + self.splitting + self.elicitation
    }

    pub(crate) fn count(&mut self, phase: QuestionPhase) {
        match phase {
            QuestionPhase::Narrowing => self.narrowing += 1,
            QuestionPhase::Splitting => self.splitting += 1,
            QuestionPhase::Elicitation => self.elicitation += 1,
        }
    }
}
