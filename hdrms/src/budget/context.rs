//! Budget context - question accounting for one run

use std::collections::HashSet;

use log::{debug, warn};

use crate::budget::events::{BudgetEvent, FinalConsumption, QuestionPhase};
use crate::budget::types::{
    BudgetCheckResult, BudgetConsumed, BudgetExhausted, BudgetLimits, BudgetRemaining, Meter,
};

/// Usage levels reported once per meter, highest first
const THRESHOLDS: [u8; 2] = [80, 50];

#[derive(Debug)]
pub struct BudgetContext {
    limits: BudgetLimits,
    consumed: BudgetConsumed,
    per_phase: FinalConsumption,
    /// (meter, threshold) pairs already reported
    reported: HashSet<(Meter, u8)>,
    events: Vec<BudgetEvent>,
}

impl BudgetContext {
    pub fn new(limits: BudgetLimits) -> Self {
        Self {
            events: vec![BudgetEvent::Allocation {
                limits: limits.clone(),
            }],
            limits,
            consumed: BudgetConsumed::default(),
            per_phase: FinalConsumption::default(),
            reported: HashSet::new(),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(BudgetLimits::default())
    }

    pub fn consumed(&self) -> &BudgetConsumed {
        &self.consumed
    }

    pub fn limits(&self) -> &BudgetLimits {
        &self.limits
    }

    pub fn events(&self) -> &[BudgetEvent] {
        &self.events
    }

    pub fn final_consumption(&self) -> FinalConsumption {
        self.per_phase.clone()
    }

    pub fn remaining(&self) -> BudgetRemaining {
        BudgetRemaining {
            questions: self.limits.questions.saturating_sub(self.consumed.questions),
            rounds: self.limits.rounds.saturating_sub(self.consumed.rounds),
        }
    }

    pub fn has_questions(&self) -> bool {
        self.consumed.questions < self.limits.questions
    }

    fn usage(&self, meter: Meter) -> (u32, u32) {
        match meter {
            Meter::Questions => (self.consumed.questions, self.limits.questions),
            Meter::Rounds => (self.consumed.rounds, self.limits.rounds),
        }
    }

    /// First exhausted meter, else the first threshold not reported yet.
    /// A reported threshold is remembered together with every lower one.
    pub fn check(&mut self) -> BudgetCheckResult {
        for meter in Meter::ALL {
            let (consumed, limit) = self.usage(meter);
            if consumed >= limit {
                return BudgetCheckResult::Exhausted { meter };
            }
            let percent = (u64::from(consumed) * 100 / u64::from(limit)) as u8;
            let crossed = THRESHOLDS
                .iter()
                .copied()
                .find(|&t| percent >= t && !self.reported.contains(&(meter, t)));
            if let Some(threshold) = crossed {
                for t in THRESHOLDS.iter().filter(|&&t| t <= threshold) {
                    self.reported.insert((meter, *t));
                }
                return BudgetCheckResult::Warning {
                    meter,
                    percent: threshold,
                };
            }
        }
        BudgetCheckResult::Ok
    }

    fn refuse(&self, meter: Meter) -> BudgetExhausted {
        let (consumed, limit) = self.usage(meter);
        BudgetExhausted {
            meter,
            consumed,
            limit,
        }
    }

    /// Reserve one question for `phase`. Consumption never passes the limit.
    pub fn try_ask(&mut self, phase: QuestionPhase) -> Result<(), BudgetExhausted> {
        if !self.has_questions() {
            debug!("{} question refused: budget exhausted", phase);
            let refused = self.refuse(Meter::Questions);
            self.events.push(BudgetEvent::Exhausted {
                meter: Meter::Questions,
                phase,
                consumed: refused.consumed,
                limit: refused.limit,
            });
            return Err(refused);
        }

        self.consumed.questions += 1;
        self.per_phase.count(phase);
        self.events.push(BudgetEvent::Question {
            phase,
            remaining: self.remaining(),
        });
        self.report_threshold();
        Ok(())
    }

    /// Reserve one comparison round of the interactive search.
    pub fn try_round(&mut self) -> Result<(), BudgetExhausted> {
        if self.consumed.rounds >= self.limits.rounds {
            return Err(self.refuse(Meter::Rounds));
        }
        self.consumed.rounds += 1;
        self.per_phase.rounds += 1;
        Ok(())
    }

    fn report_threshold(&mut self) {
        if let BudgetCheckResult::Warning { meter, percent } = self.check() {
            let (consumed, limit) = self.usage(meter);
            warn!("Budget {}: {}% consumed ({}/{})", meter, percent, consumed, limit);
            self.events.push(BudgetEvent::Warning {
                meter,
                percent,
                consumed,
                limit,
            });
        }
    }
}
