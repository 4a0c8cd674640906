//! Phase 3b: randomized subset construction.
//!
//! With no questions left the user can only be handed a small set of
//! alternatives. Low-dimensional problems are covered directly; otherwise
//! the final dimensions are sub-sampled several times, each low-dimensional
//! projection is covered, and the covers are merged.

use std::collections::BTreeSet;

use hdrms_geometry::{CoveringOracle, GeoGreedyCover, PointId, PointView, SphereCover};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::config::{CoveringMode, SubsetConfig};
use crate::error::{ElicitResult, InvariantViolation};
use crate::trace::{ElicitationTrace, Phase, TraceEvent};

pub struct SubsetOutcome<'a> {
    /// Full-dimensional skyline points, ordered by id
    pub selected: PointView<'a>,
    /// Cover computations run
    pub rounds_run: usize,
}

struct RoundCover {
    round: usize,
    dims: Vec<usize>,
    ids: Vec<PointId>,
}

pub fn covering_for(mode: CoveringMode) -> Box<dyn CoveringOracle> {
    match mode {
        CoveringMode::Sphere => Box::new(SphereCover),
        CoveringMode::GeoGreedy => Box::new(GeoGreedyCover),
    }
}

pub struct SubsetConstructor {
    config: SubsetConfig,
    oracle: Box<dyn CoveringOracle>,
}

impl SubsetConstructor {
    pub fn new(config: &SubsetConfig) -> Self {
        Self {
            config: config.clone(),
            oracle: covering_for(config.covering),
        }
    }

    pub fn with_oracle(config: &SubsetConfig, oracle: Box<dyn CoveringOracle>) -> Self {
        Self {
            config: config.clone(),
            oracle,
        }
    }

    pub fn run<'a>(
        &self,
        skyline: &PointView<'a>,
        dims: &[usize],
        seed: u64,
        trace: &mut ElicitationTrace,
    ) -> ElicitResult<SubsetOutcome<'a>> {
        trace.push(TraceEvent::PhaseStarted {
            phase: Phase::SubsetConstruction,
        });
        if dims.is_empty() {
            return Err(InvariantViolation::EmptyFinalDimensions.into());
        }

        let covers = if dims.len() <= self.config.d_hat_2 {
            if dims.len() >= self.config.output_size {
                return Err(InvariantViolation::OutputNotLargerThanDimension {
                    dim: dims.len(),
                    k: self.config.output_size,
                }
                .into());
            }
            vec![self.cover(skyline, 0, dims.to_vec(), self.config.output_size)?]
        } else {
            self.sampled_covers(skyline, dims, seed)?
        };

        let mut ids = BTreeSet::new();
        for cover in &covers {
            ids.extend(cover.ids.iter().copied());
        }
        let rounds_run = covers.len();
        for cover in covers {
            trace.push(TraceEvent::SubsetRound {
                round: cover.round,
                dims: cover.dims,
                covered: cover.ids,
            });
        }

        let mut selected: Vec<_> = skyline
            .refs()
            .iter()
            .copied()
            .filter(|p| ids.contains(&p.id()))
            .collect();
        selected.sort_by_key(|p| p.id());
        selected.dedup_by_key(|p| p.id());

        info!(
            "Subset construction ({}) kept {} of {} skyline points after {} rounds",
            self.oracle.name(),
            selected.len(),
            skyline.len(),
            rounds_run
        );
        Ok(SubsetOutcome {
            selected: PointView::from_refs(selected),
            rounds_run,
        })
    }

    fn sampled_covers(
        &self,
        skyline: &PointView<'_>,
        dims: &[usize],
        seed: u64,
    ) -> ElicitResult<Vec<RoundCover>> {
        let round = |r: usize| -> ElicitResult<RoundCover> {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(r as u64));
            let mut picked: Vec<usize> = sample(&mut rng, dims.len(), self.config.d_hat_2)
                .iter()
                .map(|i| dims[i])
                .collect();
            picked.sort_unstable();
            self.cover(skyline, r, picked, self.config.d_hat_2 + 1)
        };

        if self.config.parallel {
            (0..self.config.rounds).into_par_iter().map(round).collect()
        } else {
            (0..self.config.rounds).map(round).collect()
        }
    }

    fn cover(
        &self,
        skyline: &PointView<'_>,
        round: usize,
        dims: Vec<usize>,
        k: usize,
    ) -> ElicitResult<RoundCover> {
        let projected = skyline.project(&dims);
        let ids = self.oracle.cover(&projected, k)?.ids();
        debug!("round {} on {:?} covered {:?}", round, dims, ids);
        Ok(RoundCover { round, dims, ids })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdrms_geometry::{skyline, PointSet};
    use pretty_assertions::assert_eq;

    fn dataset(dim: usize) -> PointSet {
        PointSet::from_rows(
            (0..30)
                .map(|i| {
                    (0..dim)
                        .map(|d| ((i * 13 + d * 7 + i * d) % 17) as f64 / 17.0 + 0.01)
                        .collect()
                })
                .collect(),
        )
        .unwrap()
    }

    fn config(parallel: bool) -> SubsetConfig {
        SubsetConfig {
            parallel,
            ..SubsetConfig::default()
        }
    }

    #[test]
    fn test_sampled_rounds_are_reproducible() {
        let data = dataset(6);
        let sky = skyline(&data);
        let dims: Vec<usize> = (0..6).collect();

        let mut trace_a = ElicitationTrace::default();
        let mut trace_b = ElicitationTrace::default();
        let a = SubsetConstructor::new(&config(true))
            .run(&sky, &dims, 42, &mut trace_a)
            .unwrap();
        let b = SubsetConstructor::new(&config(false))
            .run(&sky, &dims, 42, &mut trace_b)
            .unwrap();

        assert_eq!(a.selected.ids(), b.selected.ids());
        assert_eq!(a.rounds_run, 5);
        assert!(!a.selected.is_empty());
        assert!(a.selected.len() <= sky.len());
        let ids = a.selected.ids();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        assert!(a.selected.iter().all(|p| p.dim() == 6));
    }

    #[test]
    fn test_direct_cover_for_low_dimensions() {
        let data = dataset(4);
        let sky = skyline(&data);
        let mut trace = ElicitationTrace::default();
        let outcome = SubsetConstructor::new(&config(false))
            .run(&sky, &[1, 3], 0, &mut trace)
            .unwrap();
        assert_eq!(outcome.rounds_run, 1);
        assert!(outcome.selected.len() <= 5);
        assert!(!outcome.selected.is_empty());
    }

    #[test]
    fn test_direct_cover_needs_room() {
        let data = dataset(4);
        let sky = skyline(&data);
        let mut trace = ElicitationTrace::default();
        let cfg = SubsetConfig {
            output_size: 2,
            ..config(false)
        };
        let err = SubsetConstructor::new(&cfg)
            .run(&sky, &[0, 1, 2], 0, &mut trace)
            .err()
            .unwrap();
        assert!(matches!(
            err,
            crate::error::ElicitError::Invariant(InvariantViolation::OutputNotLargerThanDimension {
                dim: 3,
                k: 2
            })
        ));
    }
}
