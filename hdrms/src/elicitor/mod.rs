//! Phase 3a: interactive utility elicitation.
//!
//! The user repeatedly picks a favourite among a few candidates. Every answer
//! cuts the range of utilities consistent with what the user said; candidates
//! that can no longer be best anywhere in that range are pruned. The search
//! stops when one candidate is left, the regret bound drops to `epsilon`, or
//! the budget runs out.

pub mod bound;
pub mod dominance;
pub mod pruning;
pub mod range;
pub mod selection;

use hdrms_geometry::{is_zero, PointId, PointSet};
use log::{debug, info};
use serde::Serialize;

use crate::config::ElicitorConfig;
use crate::error::{ElicitResult, InvariantViolation};
use crate::session::Session;
use crate::trace::{Phase, TraceEvent};

pub use dominance::{Comparison, DominanceTest};
pub use pruning::{pruner_for, HalfspacePruner, PruneContext, PruneOutcome, PruningOracle, RtreePruner};
pub use range::UtilityRange;
pub use selection::{selector_for, CandidateSelector, RandomSelector, SelectionContext, SimplexSelector};

/// Positions of the remaining candidates in the phase-3 point set.
/// Only ever shrinks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CandidateSet {
    indices: Vec<usize>,
}

impl CandidateSet {
    pub fn all(len: usize) -> Self {
        Self {
            indices: (0..len).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.indices.binary_search(&index).is_ok()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.indices
    }

    pub fn remove(&mut self, index: usize) -> bool {
        match self.indices.binary_search(&index) {
            Ok(pos) => {
                self.indices.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    /// Keep only members also in `survivors`
    pub fn retain(&mut self, survivors: &[usize]) {
        self.indices.retain(|i| survivors.contains(i));
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct InteractiveResult {
    pub best: PointId,
    pub rounds: u32,
    pub candidates_left: usize,
    pub regret_bound: f64,
}

/// Candidate scoring highest under `direction`; the first one on ties.
pub fn current_best(points: &PointSet, candidates: &[usize], direction: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for &i in candidates {
        let Some(p) = points.get(i) else {
            continue;
        };
        let score = p.dot(direction);
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((i, score));
        }
    }
    best.map(|(i, _)| i)
}

pub struct UtilityElicitor {
    config: ElicitorConfig,
    selector: Box<dyn CandidateSelector>,
    pruner: Box<dyn PruningOracle>,
}

impl UtilityElicitor {
    pub fn new(config: &ElicitorConfig) -> Self {
        Self {
            config: config.clone(),
            selector: selector_for(config.selection),
            pruner: pruner_for(config),
        }
    }

    pub fn with_strategies(
        config: &ElicitorConfig,
        selector: Box<dyn CandidateSelector>,
        pruner: Box<dyn PruningOracle>,
    ) -> Self {
        Self {
            config: config.clone(),
            selector,
            pruner,
        }
    }

    /// Search `points` (the skyline projected on `dims`) for the user's
    /// favourite.
    pub fn run(
        &mut self,
        points: &PointSet,
        dims: &[usize],
        session: &mut Session<'_>,
    ) -> ElicitResult<InteractiveResult> {
        session.trace.push(TraceEvent::PhaseStarted {
            phase: Phase::Elicitation,
        });
        if points.is_empty() {
            return Err(InvariantViolation::EmptyCandidates.into());
        }
        info!(
            "Elicitation over {} candidates on dimensions {:?} ({} selection, {} pruning)",
            points.len(),
            dims,
            self.selector.name(),
            self.pruner.name()
        );

        let mut candidates = CandidateSet::all(points.len());
        let mut range = UtilityRange::new(dims.len());
        let mut best = current_best(points, candidates.as_slice(), &range.centroid());
        let mut rr = 1.0_f64;
        let mut rounds = 0u32;
        let epsilon = self.config.epsilon;

        while candidates.len() > 1 && rr > epsilon && !is_zero(rr - epsilon) {
            if !session.budget.has_questions() || session.budget.try_round().is_err() {
                break;
            }

            let shown = self.selector.select(
                &SelectionContext {
                    points,
                    candidates: candidates.as_slice(),
                    current_best: best,
                    size: self.config.question_size,
                },
                &mut session.rng,
            )?;
            if shown.len() < 2 {
                break;
            }
            let options: Vec<_> = shown.iter().filter_map(|&i| points.get(i)).collect();
            let Ok(pick) = session.ask_choice(&options, dims) else {
                break;
            };
            rounds += 1;

            let winner = shown[pick.min(shown.len() - 1)];
            best = Some(winner);
            for &loser in shown.iter().filter(|&&i| i != winner) {
                if let (Some(w), Some(l)) = (points.get(winner), points.get(loser)) {
                    range.prefer(w, l)?;
                }
                candidates.remove(loser);
            }

            if candidates.len() > 1 {
                let vertices = range.extreme_points();
                let outcome = self.pruner.prune(&PruneContext {
                    points,
                    candidates: candidates.as_slice(),
                    range: &range,
                    vertices: &vertices,
                    best,
                })?;
                candidates.retain(&outcome.survivors);
                if let Some(bound) = outcome.regret {
                    rr = rr.min(bound);
                }
            }

            let winner_id = points.get(winner).map(|p| p.id()).unwrap_or(PointId(winner));
            debug!(
                "round {}: {} won, {} candidates left, regret bound {:.4}",
                rounds,
                winner_id,
                candidates.len(),
                rr
            );
            session.trace.push(TraceEvent::ComparisonRound {
                round: rounds,
                shown: options.iter().map(|p| p.id()).collect(),
                winner: winner_id,
                candidates: candidates.len(),
                regret_bound: rr,
            });
        }

        let chosen = current_best(points, candidates.as_slice(), &range.centroid())
            .and_then(|i| points.get(i))
            .ok_or(InvariantViolation::EmptyCandidates)?;
        if candidates.len() == 1 {
            rr = 0.0;
        }
        info!(
            "Elicitation picked {} after {} rounds ({} candidates left)",
            chosen.id(),
            rounds,
            candidates.len()
        );
        Ok(InteractiveResult {
            best: chosen.id(),
            rounds,
            candidates_left: candidates.len(),
            regret_bound: rr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::BudgetLimits;
    use crate::config::{DominanceMode, PruningMode, SelectionMode, StopCondition};
    use crate::respondent::{SimulatedUser, UtilityVector};
    use pretty_assertions::assert_eq;

    fn arc_points() -> PointSet {
        // Points on the positive quarter circle: all of them are on the skyline.
        PointSet::from_rows(
            (0..12)
                .map(|i| {
                    let t = std::f64::consts::FRAC_PI_2 * i as f64 / 11.0;
                    vec![t.cos(), t.sin()]
                })
                .collect(),
        )
        .unwrap()
    }

    fn true_best(points: &PointSet, weights: &[f64]) -> PointId {
        let all: Vec<usize> = (0..points.len()).collect();
        let i = current_best(points, &all, weights).unwrap();
        points.get(i).unwrap().id()
    }

    fn run_with(config: ElicitorConfig, budget: u32) -> (InteractiveResult, Vec<usize>, Vec<f64>, u32) {
        let points = arc_points();
        let mut user = SimulatedUser::new(UtilityVector::new(vec![0.3, 0.7]));
        let mut session = Session::new(BudgetLimits::questions(budget), 9, &mut user);
        let result = UtilityElicitor::new(&config)
            .run(&points, &[0, 1], &mut session)
            .unwrap();
        let asked = session.budget.consumed().questions;
        (
            result,
            session.trace.candidate_sizes(),
            session.trace.regret_bounds(),
            asked,
        )
    }

    #[test]
    fn test_current_best_first_max_wins() {
        let points = PointSet::from_rows(vec![vec![0.5, 0.5], vec![0.5, 0.5], vec![0.1, 0.2]]).unwrap();
        assert_eq!(current_best(&points, &[0, 1, 2], &[0.5, 0.5]), Some(0));
        assert_eq!(current_best(&points, &[1, 2], &[0.0, 0.0]), Some(1));
        assert_eq!(current_best(&points, &[], &[0.5, 0.5]), None);
    }

    #[test]
    fn test_candidate_set_only_shrinks() {
        let mut set = CandidateSet::all(5);
        assert!(set.remove(3));
        assert!(!set.remove(3));
        set.retain(&[0, 1, 3]);
        assert_eq!(set.as_slice(), &[0, 1]);
    }

    #[test]
    fn test_finds_true_best_for_every_strategy() {
        let points = arc_points();
        let expected = true_best(&points, &[0.3, 0.7]);
        for selection in [SelectionMode::Random, SelectionMode::Simplex] {
            for pruning in [PruningMode::Halfspace, PruningMode::Rtree] {
                for dominance in [DominanceMode::HyperPlane, DominanceMode::ConicalHull] {
                    let config = ElicitorConfig {
                        selection,
                        pruning,
                        dominance,
                        ..ElicitorConfig::default()
                    };
                    let (result, sizes, bounds, asked) = run_with(config, 50);
                    assert_eq!(result.best, expected, "{:?}/{:?}/{:?}", selection, pruning, dominance);
                    assert!(result.candidates_left >= 1);
                    assert!(asked <= 50);
                    assert!(sizes.windows(2).all(|w| w[0] >= w[1]));
                    assert!(bounds.windows(2).all(|w| w[0] >= w[1]));
                }
            }
        }
    }

    #[test]
    fn test_stops_at_budget() {
        let config = ElicitorConfig {
            stop: StopCondition::NoBound,
            ..ElicitorConfig::default()
        };
        let (result, _, _, asked) = run_with(config, 1);
        assert_eq!(asked, 1);
        assert_eq!(result.rounds, 1);
        assert!(result.candidates_left >= 1);
    }

    #[test]
    fn test_empty_points_is_invariant_violation() {
        let points = PointSet::from_rows(Vec::new()).unwrap();
        let mut user = SimulatedUser::new(UtilityVector::new(vec![1.0]));
        let mut session = Session::new(BudgetLimits::questions(3), 1, &mut user);
        let err = UtilityElicitor::new(&ElicitorConfig::default())
            .run(&points, &[0], &mut session)
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::ElicitError::Invariant(InvariantViolation::EmptyCandidates)
        ));
    }
}
