use log::debug;

use super::{removes, PruneContext, PruneOutcome, PruningOracle};
use crate::config::StopCondition;
use crate::elicitor::bound::regret_bound;
use crate::elicitor::dominance::DominanceTest;
use crate::error::ElicitResult;

/// Pairwise test of every candidate against every other.
#[derive(Clone, Debug)]
pub struct HalfspacePruner {
    dominance: DominanceTest,
    stop: StopCondition,
}

impl HalfspacePruner {
    pub fn new(dominance: DominanceTest, stop: StopCondition) -> Self {
        Self { dominance, stop }
    }
}

impl PruningOracle for HalfspacePruner {
    fn name(&self) -> &str {
        "halfspace"
    }

    fn prune(&self, ctx: &PruneContext<'_>) -> ElicitResult<PruneOutcome> {
        let mut survivors = Vec::with_capacity(ctx.candidates.len());
        for &p in ctx.candidates {
            let mut pruned = false;
            if ctx.best != Some(p) {
                for &q in ctx.candidates {
                    if q != p && removes(self.dominance, ctx, q, p)? {
                        pruned = true;
                        break;
                    }
                }
            }
            if !pruned {
                survivors.push(p);
            }
        }
        debug!(
            "halfspace pruning kept {}/{} candidates",
            survivors.len(),
            ctx.candidates.len()
        );
        let regret = regret_bound(self.stop, ctx.points, &survivors, ctx.vertices, ctx.best);
        Ok(PruneOutcome { survivors, regret })
    }
}
