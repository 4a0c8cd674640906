//! Candidate pruning between comparison rounds.
//!
//! A candidate leaves the set once another candidate is at least as good for
//! every utility still in the range. Each pruner also refreshes the regret
//! bound used as the stop condition.

mod halfspace;
mod rtree;

use hdrms_geometry::PointSet;

pub use halfspace::HalfspacePruner;
pub use rtree::RtreePruner;

use crate::config::{ElicitorConfig, PruningMode};
use crate::elicitor::dominance::{Comparison, DominanceTest};
use crate::elicitor::range::UtilityRange;
use crate::error::ElicitResult;

pub struct PruneContext<'c> {
    pub points: &'c PointSet,
    /// Remaining candidates, ascending
    pub candidates: &'c [usize],
    pub range: &'c UtilityRange,
    pub vertices: &'c [Vec<f64>],
    /// Never pruned
    pub best: Option<usize>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PruneOutcome {
    /// Surviving candidates, ascending
    pub survivors: Vec<usize>,
    pub regret: Option<f64>,
}

pub trait PruningOracle {
    fn name(&self) -> &str;

    fn prune(&self, ctx: &PruneContext<'_>) -> ElicitResult<PruneOutcome>;
}

pub fn pruner_for(config: &ElicitorConfig) -> Box<dyn PruningOracle> {
    let dominance = DominanceTest::from(config.dominance);
    match config.pruning {
        PruningMode::Halfspace => Box::new(HalfspacePruner::new(dominance, config.stop)),
        PruningMode::Rtree => Box::new(RtreePruner::new(dominance, config.stop)),
    }
}

/// Whether `by` removes `victim`: strict dominance, or a tie won by the
/// smaller index.
fn removes(
    dominance: DominanceTest,
    ctx: &PruneContext<'_>,
    by: usize,
    victim: usize,
) -> ElicitResult<bool> {
    let (Some(q), Some(p)) = (ctx.points.get(by), ctx.points.get(victim)) else {
        return Ok(false);
    };
    Ok(
        match dominance.compare(q.coords(), p.coords(), ctx.range, ctx.vertices)? {
            Comparison::Dominates => true,
            Comparison::Ties => by < victim,
            Comparison::Incomparable => false,
        },
    )
}
