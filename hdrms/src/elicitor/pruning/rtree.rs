use std::cmp::Reverse;
use std::collections::BinaryHeap;

use hdrms_geometry::{dot, Point, RTree, RTreeNode};
use log::debug;
use ordered_float::OrderedFloat;

use super::{removes, PruneContext, PruneOutcome, PruningOracle};
use crate::config::StopCondition;
use crate::elicitor::bound::regret_bound;
use crate::elicitor::dominance::{Comparison, DominanceTest};
use crate::error::ElicitResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Entry {
    Node(usize),
    /// Position in the slice the tree was built from
    Point(usize),
}

/// Branch-and-bound skyline over an R-tree of the candidates.
///
/// Entries are visited by decreasing score under the range centroid, so a
/// point is always visited after anything that dominates it. Whole subtrees
/// are skipped once a kept point dominates the upper corner of their box.
#[derive(Clone, Debug)]
pub struct RtreePruner {
    dominance: DominanceTest,
    stop: StopCondition,
}

impl RtreePruner {
    pub fn new(dominance: DominanceTest, stop: StopCondition) -> Self {
        Self { dominance, stop }
    }
}

impl PruningOracle for RtreePruner {
    fn name(&self) -> &str {
        "rtree"
    }

    fn prune(&self, ctx: &PruneContext<'_>) -> ElicitResult<PruneOutcome> {
        let members: Vec<&Point> = ctx
            .candidates
            .iter()
            .filter_map(|&i| ctx.points.get(i))
            .collect();
        let tree = RTree::bulk_load(&members);
        let centroid = ctx.range.centroid();

        let mut heap = BinaryHeap::new();
        if let Some(root) = tree.root() {
            let score = dot(&centroid, &tree.node(root).mbr().upper);
            heap.push((OrderedFloat(score), Reverse(0), Entry::Node(root)));
        }

        let mut kept: Vec<usize> = Vec::new();
        while let Some((_, _, entry)) = heap.pop() {
            match entry {
                Entry::Node(id) => {
                    let node = tree.node(id);
                    let corner = &node.mbr().upper;
                    if self.covers(ctx, &kept, corner)? {
                        continue;
                    }
                    match node {
                        RTreeNode::Leaf { entries, .. } => {
                            for &pos in entries {
                                let score = dot(&centroid, members[pos].coords());
                                heap.push((OrderedFloat(score), Reverse(ctx.candidates[pos]), Entry::Point(pos)));
                            }
                        }
                        RTreeNode::Inner { children, .. } => {
                            for &child in children {
                                let score = dot(&centroid, &tree.node(child).mbr().upper);
                                heap.push((OrderedFloat(score), Reverse(0), Entry::Node(child)));
                            }
                        }
                    }
                }
                Entry::Point(pos) => {
                    let index = ctx.candidates[pos];
                    let mut pruned = false;
                    if ctx.best != Some(index) {
                        for &k in &kept {
                            if removes(self.dominance, ctx, k, index)? {
                                pruned = true;
                                break;
                            }
                        }
                    }
                    if !pruned {
                        kept.push(index);
                    }
                }
            }
        }

        if let Some(best) = ctx.best {
            if ctx.candidates.contains(&best) && !kept.contains(&best) {
                kept.push(best);
            }
        }
        kept.sort_unstable();
        debug!(
            "rtree pruning kept {}/{} candidates",
            kept.len(),
            ctx.candidates.len()
        );
        let regret = regret_bound(self.stop, ctx.points, &kept, ctx.vertices, ctx.best);
        Ok(PruneOutcome {
            survivors: kept,
            regret,
        })
    }
}

impl RtreePruner {
    /// Whether some kept point strictly dominates everything under `corner`
    fn covers(&self, ctx: &PruneContext<'_>, kept: &[usize], corner: &[f64]) -> ElicitResult<bool> {
        for &k in kept {
            let Some(q) = ctx.points.get(k) else {
                continue;
            };
            if self.dominance.compare(q.coords(), corner, ctx.range, ctx.vertices)?
                == Comparison::Dominates
            {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
