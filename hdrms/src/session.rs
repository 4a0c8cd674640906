//! One run's mutable state: the budget, the respondent, the random stream
//! and the trace. Every question goes through [`Session`], which reserves
//! budget before the respondent sees anything.

use hdrms_geometry::Point;
use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::budget::{BudgetContext, BudgetExhausted, BudgetLimits, QuestionPhase};
use crate::respondent::{GroupAnswer, Respondent};
use crate::trace::{ElicitationTrace, TraceEvent};

pub struct Session<'r> {
    pub budget: BudgetContext,
    pub trace: ElicitationTrace,
    pub rng: StdRng,
    respondent: &'r mut dyn Respondent,
}

impl<'r> Session<'r> {
    pub fn new(limits: BudgetLimits, seed: u64, respondent: &'r mut dyn Respondent) -> Self {
        Self {
            budget: BudgetContext::new(limits),
            trace: ElicitationTrace::default(),
            rng: StdRng::seed_from_u64(seed),
            respondent,
        }
    }

    /// Favourite among `shown` on `dims`
    pub fn ask_group(
        &mut self,
        phase: QuestionPhase,
        shown: &[&Point],
        dims: &[usize],
    ) -> Result<GroupAnswer, BudgetExhausted> {
        self.reserve(phase)?;
        let answer = self.respondent.favourite(shown, dims);
        debug!("{} question on {:?}: {:?}", phase, dims, answer);
        Ok(answer)
    }

    /// Whether `dim` matters to the user
    pub fn ask_dimension(&mut self, phase: QuestionPhase, dim: usize) -> Result<bool, BudgetExhausted> {
        self.reserve(phase)?;
        let answer = self.respondent.cares_about(dim);
        debug!("{} question on dimension {}: {}", phase, dim, answer);
        Ok(answer)
    }

    /// Position in `options` of the user's pick
    pub fn ask_choice(&mut self, options: &[&Point], dims: &[usize]) -> Result<usize, BudgetExhausted> {
        self.reserve(QuestionPhase::Elicitation)?;
        Ok(self.respondent.choose(options, dims))
    }

    fn reserve(&mut self, phase: QuestionPhase) -> Result<(), BudgetExhausted> {
        self.budget.try_ask(phase).map_err(|e| {
            self.trace.push(TraceEvent::BudgetExhausted { phase });
            e
        })
    }
}
