//! Phase 2: generalized binary splitting.
//!
//! Group testing over the surviving dimensions to isolate at most `d_bar`
//! dimensions the user cares about. A group of `g = 2^⌊log2(l / d_target)⌋`
//! dimensions is tested at once; a positive group is bisected on its lower
//! half until one dimension is left. When few dimensions remain relative to
//! the target, each one is asked about individually instead.

use std::collections::BTreeSet;

use hdrms_geometry::PointView;
use log::{debug, info};

use crate::budget::{BudgetExhausted, QuestionPhase};
use crate::dimensions::DimensionSet;
use crate::error::{ElicitResult, InvariantViolation};
use crate::narrowing::sample_with_replacement;
use crate::session::Session;
use crate::trace::{Phase, TraceEvent};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplittingOutcome {
    /// Dimensions the user confirmed
    pub confirmed: BTreeSet<usize>,
    /// Dimensions neither confirmed nor discarded
    pub unresolved: DimensionSet,
    /// Dimensions handed to the final phase
    pub final_dimensions: DimensionSet,
}

#[derive(Clone, Debug)]
pub struct GeneralizedBinarySplitter {
    d_bar: usize,
    sample_size: usize,
}

/// Working state: `order` mirrors `pool` in ascending order; tests always
/// run on a prefix of `order`.
struct Split<'s, 'r> {
    session: &'s mut Session<'r>,
    pool: DimensionSet,
    order: Vec<usize>,
    confirmed: BTreeSet<usize>,
}

impl Split<'_, '_> {
    fn discard_prefix(&mut self, count: usize) {
        let dims: Vec<usize> = self.order.drain(..count).collect();
        self.pool.remove_all(&dims);
        debug!("discarding dimensions {:?}", dims);
        self.session.trace.push(TraceEvent::DimensionsDiscarded {
            dims,
            pool: self.pool.len(),
        });
    }

    fn confirm_first(&mut self) {
        let dim = self.order.remove(0);
        self.pool.remove_all(&[dim]);
        self.confirmed.insert(dim);
        debug!("confirmed dimension {}", dim);
        self.session.trace.push(TraceEvent::DimensionConfirmed {
            dim,
            pool: self.pool.len(),
        });
    }
}

impl GeneralizedBinarySplitter {
    pub fn new(d_bar: usize, sample_size: usize) -> Self {
        Self { d_bar, sample_size }
    }

    pub fn run(
        &self,
        points: &PointView<'_>,
        pool: DimensionSet,
        session: &mut Session<'_>,
    ) -> ElicitResult<SplittingOutcome> {
        if pool.is_empty() {
            return Err(InvariantViolation::EmptyDimensionPool.into());
        }
        session.trace.push(TraceEvent::PhaseStarted {
            phase: Phase::Splitting,
        });

        let entry_pool = pool.clone();
        let mut split = Split {
            order: pool.to_vec(),
            pool,
            session,
            confirmed: BTreeSet::new(),
        };
        let mut d_target = self.d_bar;

        'outer: while !split.order.is_empty()
            && split.session.budget.has_questions()
            && split.confirmed.len() < self.d_bar
        {
            let d_left = split.order.len();

            if d_left + 2 <= 2 * d_target {
                // Few dimensions left: ask about each one.
                while !split.order.is_empty() && split.confirmed.len() < self.d_bar {
                    let dim = split.order[0];
                    let Ok(positive) = self.test(points, &[dim], split.session) else {
                        break 'outer;
                    };
                    if positive {
                        split.confirm_first();
                        d_target -= 1;
                    } else {
                        split.discard_prefix(1);
                    }
                }
                continue;
            }

            let group = group_size(d_left, d_target)?;
            let dims = split.order[..group].to_vec();
            let Ok(positive) = self.test(points, &dims, split.session) else {
                break;
            };
            if !positive {
                split.discard_prefix(group);
                continue;
            }
            if !split.session.budget.has_questions() {
                break;
            }

            // Bisect the positive group on its lower half.
            let mut width = group;
            while width > 1 {
                let half = width / 2;
                let lower = split.order[..half].to_vec();
                let Ok(positive) = self.test(points, &lower, split.session) else {
                    break 'outer;
                };
                if positive {
                    width = half;
                } else {
                    split.discard_prefix(half);
                    width -= half;
                }
            }
            split.confirm_first();
            d_target -= 1;
        }

        let Split {
            pool, confirmed, ..
        } = split;

        let final_dimensions = if pool.is_empty() || confirmed.len() >= self.d_bar {
            entry_pool.restrict_to(confirmed.iter().copied())
        } else {
            entry_pool.restrict_to(confirmed.iter().copied().chain(pool.iter()))
        };
        if final_dimensions.is_empty() {
            return Err(InvariantViolation::EmptyFinalDimensions.into());
        }

        info!(
            "Splitting confirmed {:?}, {} unresolved, final dimensions {:?}",
            confirmed,
            pool.len(),
            final_dimensions.to_vec()
        );
        Ok(SplittingOutcome {
            confirmed,
            unresolved: pool,
            final_dimensions,
        })
    }

    /// One question on `dims`: a single dimension is asked about directly,
    /// larger groups through sampled points.
    fn test(
        &self,
        points: &PointView<'_>,
        dims: &[usize],
        session: &mut Session<'_>,
    ) -> Result<bool, BudgetExhausted> {
        let positive = if let [dim] = dims {
            session.ask_dimension(QuestionPhase::Splitting, *dim)?
        } else {
            let projected = points.project(dims);
            let shown = sample_with_replacement(&projected, self.sample_size, &mut session.rng);
            session
                .ask_group(QuestionPhase::Splitting, &shown, dims)?
                .is_positive()
        };
        session.trace.push(TraceEvent::GroupTested {
            dims: dims.to_vec(),
            positive,
        });
        Ok(positive)
    }
}

/// `2^⌊log2(l / d_target)⌋` with `l = d_left - d_target + 1`
pub fn group_size(d_left: usize, d_target: usize) -> Result<usize, InvariantViolation> {
    let l = (d_left + 1).saturating_sub(d_target);
    let ratio = if d_target == 0 { 0 } else { l / d_target };
    if ratio == 0 {
        return Err(InvariantViolation::ZeroGroupSize { d_left });
    }
    let group = 1usize << ratio.ilog2();
    if group > d_left {
        return Err(InvariantViolation::GroupExceedsPool { group, d_left });
    }
    Ok(group)
}
