//! Which alternatives to show in the next comparison round.

use hdrms_geometry::{cone_frame, PointSet};
use log::debug;
use rand::rngs::StdRng;
use rand::seq::index::sample;

use crate::config::SelectionMode;
use crate::error::ElicitResult;

/// Inputs to one selection. Indices refer to positions in `points`.
pub struct SelectionContext<'c> {
    pub points: &'c PointSet,
    /// Remaining candidates, ascending
    pub candidates: &'c [usize],
    pub current_best: Option<usize>,
    /// At most this many indices are returned
    pub size: usize,
}

pub trait CandidateSelector {
    fn name(&self) -> &str;

    /// Up to `min(size, |candidates|)` distinct candidate indices.
    fn select(&mut self, ctx: &SelectionContext<'_>, rng: &mut StdRng) -> ElicitResult<Vec<usize>>;
}

pub fn selector_for(mode: SelectionMode) -> Box<dyn CandidateSelector> {
    match mode {
        SelectionMode::Random => Box::new(RandomSelector),
        SelectionMode::Simplex => Box::new(SimplexSelector::default()),
    }
}

/// Uniform draw without replacement
#[derive(Clone, Debug, Default)]
pub struct RandomSelector;

impl CandidateSelector for RandomSelector {
    fn name(&self) -> &str {
        "random"
    }

    fn select(&mut self, ctx: &SelectionContext<'_>, rng: &mut StdRng) -> ElicitResult<Vec<usize>> {
        let amount = ctx.size.min(ctx.candidates.len());
        Ok(sample(rng, ctx.candidates.len(), amount)
            .iter()
            .map(|i| ctx.candidates[i])
            .collect())
    }
}

/// Shows the current best together with the points spanning the cone of
/// directions `p - best`. Those are the alternatives that could still beat
/// the best under some utility.
#[derive(Clone, Debug, Default)]
pub struct SimplexSelector {
    frame: Vec<usize>,
    frame_best: Option<usize>,
}

impl SimplexSelector {
    fn refresh(&mut self, points: &PointSet, best: usize) -> ElicitResult<()> {
        let Some(anchor) = points.get(best) else {
            self.frame.clear();
            return Ok(());
        };
        let rays: Vec<Vec<f64>> = points
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != best)
            .map(|(_, p)| p.difference(anchor))
            .collect();
        self.frame = cone_frame(&rays)?
            .into_iter()
            .map(|j| if j < best { j } else { j + 1 })
            .collect();
        self.frame_best = Some(best);
        debug!("frame around {} has {} points", best, self.frame.len());
        Ok(())
    }
}

impl CandidateSelector for SimplexSelector {
    fn name(&self) -> &str {
        "simplex"
    }

    fn select(&mut self, ctx: &SelectionContext<'_>, rng: &mut StdRng) -> ElicitResult<Vec<usize>> {
        let Some(best) = ctx.current_best else {
            return RandomSelector.select(ctx, rng);
        };
        if self.frame_best != Some(best) || self.frame.is_empty() {
            self.refresh(ctx.points, best)?;
        }

        let amount = ctx.size.min(ctx.candidates.len());
        let is_candidate = |i: &usize| ctx.candidates.binary_search(i).is_ok();
        let mut chosen: Vec<usize> = Vec::with_capacity(amount);
        let ordered = std::iter::once(best)
            .chain(self.frame.iter().copied())
            .chain(ctx.candidates.iter().copied());
        for i in ordered {
            if chosen.len() == amount {
                break;
            }
            if is_candidate(&i) && !chosen.contains(&i) {
                chosen.push(i);
            }
        }
        Ok(chosen)
    }
}
