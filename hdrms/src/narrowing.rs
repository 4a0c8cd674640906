//! Phase 1: grouped elimination of dimension blocks.
//!
//! The dimensions are cut into consecutive blocks of `d_hat`. For each block
//! the user sees a few random alternatives restricted to that block; if none
//! of them appeals at all, nothing in the block matters and the whole block
//! leaves the pool. Trailing dimensions that do not fill a block are kept
//! untested.

use hdrms_geometry::{Point, PointSet, PointView};
use log::{debug, info};
use rand::Rng;

use crate::budget::QuestionPhase;
use crate::config::NarrowingConfig;
use crate::dimensions::DimensionSet;
use crate::respondent::GroupAnswer;
use crate::session::Session;
use crate::trace::{Phase, TraceEvent};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NarrowingOutcome {
    pub pool: DimensionSet,
    pub blocks_tested: usize,
    pub blocks_dropped: usize,
}

#[derive(Clone, Debug)]
pub struct DimensionNarrower {
    d_hat: usize,
    sample_size: usize,
}

impl DimensionNarrower {
    pub fn new(config: &NarrowingConfig) -> Self {
        Self {
            d_hat: config.d_hat,
            sample_size: config.sample_size,
        }
    }

    pub fn run(&self, points: &PointView<'_>, session: &mut Session<'_>) -> NarrowingOutcome {
        session.trace.push(TraceEvent::PhaseStarted {
            phase: Phase::Narrowing,
        });
        let dim = points.dim().unwrap_or(0);
        let mut pool = DimensionSet::full(dim);
        let mut blocks_tested = 0;
        let mut blocks_dropped = 0;

        for block in 0..dim / self.d_hat {
            let dims: Vec<usize> = (block * self.d_hat..(block + 1) * self.d_hat).collect();
            let projected = points.project(&dims);
            let shown = sample_with_replacement(&projected, self.sample_size, &mut session.rng);

            let answer = match session.ask_group(QuestionPhase::Narrowing, &shown, &dims) {
                Ok(answer) => answer,
                Err(_) => {
                    info!("Narrowing stopped after {} blocks: budget exhausted", blocks_tested);
                    break;
                }
            };
            blocks_tested += 1;

            let kept = answer != GroupAnswer::NoPreference;
            if !kept {
                pool.remove_all(&dims);
                blocks_dropped += 1;
                debug!("dropping block {:?}", dims);
            }
            session.trace.push(TraceEvent::BlockTested {
                dims,
                kept,
                pool: pool.len(),
            });
        }

        info!(
            "Narrowing kept {}/{} dimensions ({} of {} blocks dropped)",
            pool.len(),
            dim,
            blocks_dropped,
            blocks_tested
        );
        NarrowingOutcome {
            pool,
            blocks_tested,
            blocks_dropped,
        }
    }
}

/// `count` members of `set` drawn uniformly with replacement
pub(crate) fn sample_with_replacement<'p, R: Rng + ?Sized>(
    set: &'p PointSet,
    count: usize,
    rng: &mut R,
) -> Vec<&'p Point> {
    if set.is_empty() {
        return Vec::new();
    }
    (0..count)
        .filter_map(|_| set.get(rng.gen_range(0..set.len())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::BudgetLimits;
    use crate::respondent::{SimulatedUser, UtilityVector};

    fn dataset() -> PointSet {
        PointSet::from_rows(vec![
            vec![0.9, 0.2, 0.4, 0.1, 0.3, 0.5, 0.7],
            vec![0.1, 0.8, 0.3, 0.9, 0.6, 0.2, 0.3],
            vec![0.5, 0.5, 0.9, 0.4, 0.2, 0.7, 0.1],
            vec![0.3, 0.6, 0.2, 0.7, 0.9, 0.1, 0.6],
        ])
        .unwrap()
    }

    #[test]
    fn test_drops_irrelevant_blocks_and_keeps_tail() {
        let data = dataset();
        let mut user = SimulatedUser::new(UtilityVector::new(vec![
            0.0, 0.0, 0.5, 0.0, 0.0, 0.0, 0.5,
        ]));
        let mut session = Session::new(BudgetLimits::questions(10), 1, &mut user);
        let narrower = DimensionNarrower::new(&NarrowingConfig {
            d_hat: 2,
            sample_size: 3,
        });
        let outcome = narrower.run(&data.view(), &mut session);

        // Blocks {0,1} and {4,5} carry no weight; dimension 6 is never tested.
        assert_eq!(outcome.blocks_tested, 3);
        assert_eq!(outcome.blocks_dropped, 2);
        assert_eq!(outcome.pool.to_vec(), vec![2, 3, 6]);
        assert_eq!(session.budget.consumed().questions, 3);
    }

    #[test]
    fn test_stops_when_budget_runs_out() {
        let data = dataset();
        let mut user = SimulatedUser::new(UtilityVector::new(vec![0.0; 7]));
        let mut session = Session::new(BudgetLimits::questions(1), 1, &mut user);
        let narrower = DimensionNarrower::new(&NarrowingConfig {
            d_hat: 2,
            sample_size: 2,
        });
        let outcome = narrower.run(&data.view(), &mut session);

        assert_eq!(outcome.blocks_tested, 1);
        assert_eq!(outcome.pool.to_vec(), vec![2, 3, 4, 5, 6]);
        assert_eq!(session.budget.remaining().questions, 0);
        let sizes = session.trace.pool_sizes();
        assert!(sizes.windows(2).all(|w| w[0] >= w[1]));
    }
}
