//! Elicitation Orchestrator
//!
//! Runs the three phases in order over one dataset and one respondent:
//! dimension narrowing, binary splitting, then either interactive
//! elicitation (questions left) or subset construction (budget spent).

use std::time::{Duration, Instant};

use hdrms_geometry::{skyline, GeometryError, PointSet, PointView};
use log::{info, warn};
use rand::Rng;
use serde::Serialize;

use crate::budget::{BudgetEvent, FinalConsumption};
use crate::config::ElicitationConfig;
use crate::dimensions::DimensionSet;
use crate::elicitor::UtilityElicitor;
use crate::error::{ElicitResult, InvariantViolation};
use crate::narrowing::DimensionNarrower;
use crate::respondent::Respondent;
use crate::session::Session;
use crate::splitting::GeneralizedBinarySplitter;
use crate::subset::SubsetConstructor;
use crate::trace::ElicitationTrace;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PhaseTimings {
    pub narrowing_and_splitting: Duration,
    pub final_selection: Duration,
}

/// How the final phase produced its answer
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FinalSelection {
    Interactive {
        rounds: u32,
        candidates_left: usize,
        regret_bound: f64,
    },
    Covering {
        rounds_run: usize,
    },
}

/// Result of an elicitation run
#[derive(Debug)]
pub struct ElicitationOutcome<'a> {
    /// One point after interactive elicitation, a small subset otherwise.
    /// Points are borrowed from the caller's dataset.
    pub selected: PointView<'a>,
    pub final_dimensions: DimensionSet,
    pub questions: FinalConsumption,
    pub timings: PhaseTimings,
    pub selection: FinalSelection,
    pub seed: u64,
    pub trace: ElicitationTrace,
    pub budget_events: Vec<BudgetEvent>,
}

pub struct Elicitation {
    config: ElicitationConfig,
}

impl Elicitation {
    pub fn new(config: ElicitationConfig) -> ElicitResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ElicitationConfig {
        &self.config
    }

    pub fn run<'a>(
        &self,
        dataset: &'a PointSet,
        respondent: &mut dyn Respondent,
    ) -> ElicitResult<ElicitationOutcome<'a>> {
        if dataset.is_empty() {
            return Err(GeometryError::EmptyPointSet.into());
        }
        let sky = skyline(dataset);
        let seed = self.config.seed.unwrap_or_else(|| rand::thread_rng().gen());
        let mut session = Session::new(self.config.budget_limits(), seed, respondent);
        info!(
            "Elicitation over {} points ({} on the skyline), budget {}, seed {}",
            dataset.len(),
            sky.len(),
            self.config.budget,
            seed
        );

        // 1. Narrow the dimensions by blocks
        let started = Instant::now();
        let narrowed =
            DimensionNarrower::new(&self.config.narrowing).run(&dataset.view(), &mut session);

        // 2. Isolate the dimensions that matter
        let splitter = GeneralizedBinarySplitter::new(
            self.config.splitting.d_bar,
            self.config.narrowing.sample_size,
        );
        let split = splitter.run(&dataset.view(), narrowed.pool, &mut session)?;
        let narrowing_and_splitting = started.elapsed();
        let dims = split.final_dimensions.to_vec();

        // 3. Pick the answer on the final dimensions
        let started = Instant::now();
        let (selected, selection) = if session.budget.has_questions() {
            let projected = sky.project(&dims);
            let candidates = skyline(&projected).to_owned_set();
            if candidates.is_empty() {
                return Err(InvariantViolation::EmptyCandidates.into());
            }
            let result =
                UtilityElicitor::new(&self.config.elicitor).run(&candidates, &dims, &mut session)?;
            let best = dataset
                .iter()
                .find(|p| p.id() == result.best)
                .ok_or(InvariantViolation::EmptyCandidates)?;
            (
                PointView::from_refs(vec![best]),
                FinalSelection::Interactive {
                    rounds: result.rounds,
                    candidates_left: result.candidates_left,
                    regret_bound: result.regret_bound,
                },
            )
        } else {
            warn!("Question budget spent before the final phase, building a subset");
            let outcome =
                SubsetConstructor::new(&self.config.subset).run(&sky, &dims, seed, &mut session.trace)?;
            (
                outcome.selected,
                FinalSelection::Covering {
                    rounds_run: outcome.rounds_run,
                },
            )
        };
        let final_selection = started.elapsed();

        let questions = session.budget.final_consumption();
        info!(
            "Elicitation done: {} points selected on {} dimensions with {} questions",
            selected.len(),
            dims.len(),
            questions.total_questions()
        );

        Ok(ElicitationOutcome {
            selected,
            final_dimensions: split.final_dimensions,
            questions,
            timings: PhaseTimings {
                narrowing_and_splitting,
                final_selection,
            },
            selection,
            seed,
            budget_events: session.budget.events().to_vec(),
            trace: session.trace,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::respondent::{SimulatedUser, UtilityVector};

    #[test]
    fn test_empty_dataset_is_rejected() {
        let data = PointSet::from_rows(Vec::new()).unwrap();
        let mut user = SimulatedUser::new(UtilityVector::new(vec![]));
        let err = Elicitation::new(ElicitationConfig::default())
            .unwrap()
            .run(&data, &mut user)
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::ElicitError::Geometry(GeometryError::EmptyPointSet)
        ));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = ElicitationConfig::default();
        config.splitting.d_bar = 0;
        assert!(matches!(
            Elicitation::new(config),
            Err(crate::error::ElicitError::Config(_))
        ));
    }
}
