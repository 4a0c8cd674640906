//! Covering subsets: at most `k` points of a set chosen to keep the maximum
//! regret ratio over all non-negative utilities small.
//!
//! Both oracles seed the answer with the per-dimension maxima (the boundary
//! points every representative set needs) and then add points greedily.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use log::debug;
use ordered_float::OrderedFloat;

use crate::error::GeometryError;
use crate::lp::{LinearProgram, LpOutcome};
use crate::point::{Point, PointSet, PointView};
use crate::regret::regret_ratio;
use crate::EPS;

pub trait CoveringOracle: Send + Sync {
    fn name(&self) -> &str;

    /// Pick at most `k` members of `points`; `k` must be at least the dimensionality.
    fn cover<'a>(&self, points: &'a PointSet, k: usize) -> Result<PointView<'a>, GeometryError>;
}

/// Sphere-style cover: axis maxima, then greedy additions of the point with
/// the largest regret ratio. Regret only shrinks as the subset grows, so stale
/// values are valid upper bounds and points are re-evaluated lazily.
#[derive(Clone, Debug, Default)]
pub struct SphereCover;

impl CoveringOracle for SphereCover {
    fn name(&self) -> &str {
        "sphere"
    }

    fn cover<'a>(&self, points: &'a PointSet, k: usize) -> Result<PointView<'a>, GeometryError> {
        let Some(dim) = points.dim() else {
            return Ok(PointView::from_refs(Vec::new()));
        };
        check_size(k, dim)?;
        let refs: Vec<&'a Point> = points.iter().collect();
        let mut selected = axis_maxima(&refs);

        let mut heap: BinaryHeap<(OrderedFloat<f64>, Reverse<usize>)> = (0..refs.len())
            .filter(|i| !selected.contains(i))
            .map(|i| (OrderedFloat(1.0), Reverse(i)))
            .collect();

        while selected.len() < k {
            let Some((bound, Reverse(i))) = heap.pop() else {
                break;
            };
            if bound.0 <= EPS {
                break;
            }
            let subset: Vec<&Point> = selected.iter().map(|&s| refs[s]).collect();
            let regret = regret_ratio(refs[i], &subset)?;
            let next_bound = heap.peek().map(|(b, _)| b.0).unwrap_or(0.0);
            if regret + EPS >= next_bound {
                if regret <= EPS {
                    break;
                }
                debug!("sphere cover adds {} (regret {:.4})", refs[i].id(), regret);
                selected.push(i);
            } else {
                heap.push((OrderedFloat(regret), Reverse(i)));
            }
        }

        selected.sort_unstable();
        Ok(PointView::from_refs(selected.into_iter().map(|i| refs[i]).collect()))
    }
}

/// Greedy cover by critical ratio: a point's critical ratio is how far along
/// the ray from the origin it can be scaled before leaving the down-closed
/// hull of the selected points; the point with the smallest ratio is added.
#[derive(Clone, Debug, Default)]
pub struct GeoGreedyCover;

impl CoveringOracle for GeoGreedyCover {
    fn name(&self) -> &str {
        "geo_greedy"
    }

    fn cover<'a>(&self, points: &'a PointSet, k: usize) -> Result<PointView<'a>, GeometryError> {
        let Some(dim) = points.dim() else {
            return Ok(PointView::from_refs(Vec::new()));
        };
        check_size(k, dim)?;
        let refs: Vec<&'a Point> = points.iter().collect();
        let mut selected = axis_maxima(&refs);
        let mut hull = DownClosedHull::default();
        for &s in &selected {
            hull.insert(refs[s].coords());
        }

        while selected.len() < k {
            let mut worst: Option<(usize, f64)> = None;
            for (i, p) in refs.iter().enumerate() {
                if selected.contains(&i) {
                    continue;
                }
                let regret = 1.0 - hull.critical_ratio(p.coords())?.min(1.0);
                if worst.map_or(true, |(_, w)| regret > w) {
                    worst = Some((i, regret));
                }
            }
            match worst {
                Some((i, regret)) if regret > EPS => {
                    debug!("geo greedy adds {} (regret {:.4})", refs[i].id(), regret);
                    hull.insert(refs[i].coords());
                    selected.push(i);
                }
                _ => break,
            }
        }

        selected.sort_unstable();
        Ok(PointView::from_refs(selected.into_iter().map(|i| refs[i]).collect()))
    }
}

fn check_size(k: usize, dim: usize) -> Result<(), GeometryError> {
    if k < dim {
        return Err(GeometryError::CoverTooSmall { k, dim });
    }
    Ok(())
}

/// Index of the first maximum in every dimension, deduplicated.
fn axis_maxima(points: &[&Point]) -> Vec<usize> {
    let dim = points.first().map_or(0, |p| p.dim());
    let mut picked = Vec::with_capacity(dim);
    for axis in 0..dim {
        let mut best: Option<usize> = None;
        for (i, p) in points.iter().enumerate() {
            if best.map_or(true, |b| p.coord(axis) > points[b].coord(axis)) {
                best = Some(i);
            }
        }
        if let Some(b) = best {
            if !picked.contains(&b) {
                picked.push(b);
            }
        }
    }
    picked
}

/// Generators of the down-closed convex hull of the inserted points: every
/// inserted point together with its projections obtained by zeroing any
/// subset of coordinates.
#[derive(Clone, Debug, Default)]
struct DownClosedHull {
    generators: Vec<Vec<f64>>,
}

impl DownClosedHull {
    fn insert(&mut self, coords: &[f64]) {
        // (point, first axis that may still be zeroed)
        let mut stack = vec![(coords.to_vec(), 0usize)];
        while let Some((current, from)) = stack.pop() {
            for axis in from..current.len() {
                if current[axis] > 0.0 {
                    let mut lowered = current.clone();
                    lowered[axis] = 0.0;
                    stack.push((lowered, axis + 1));
                }
            }
            if !self.generators.iter().any(|g| g == &current) {
                self.generators.push(current);
            }
        }
    }

    /// Largest `t` with `t·p` inside the hull.
    fn critical_ratio(&self, p: &[f64]) -> Result<f64, GeometryError> {
        if p.iter().all(|&v| v <= EPS) || self.generators.is_empty() {
            return Ok(f64::INFINITY);
        }
        let g = self.generators.len();
        // Variables: λ_0..λ_{g-1}, t
        let mut objective = vec![0.0; g + 1];
        objective[g] = 1.0;
        let mut weights = vec![1.0; g];
        weights.push(0.0);
        let mut lp = LinearProgram::maximize(objective).less_eq(weights, 1.0);
        for axis in 0..p.len() {
            let mut row: Vec<f64> = self.generators.iter().map(|g| g[axis]).collect();
            row.push(-p[axis]);
            lp = lp.equal(row, 0.0);
        }
        Ok(match lp.solve()? {
            LpOutcome::Optimal(solution) => solution.value,
            LpOutcome::Unbounded => f64::INFINITY,
            LpOutcome::Infeasible => 0.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::PointId;
    use crate::regret::max_regret_ratio;

    fn sample_set() -> PointSet {
        PointSet::from_rows(vec![
            vec![1.0, 0.0, 0.2],
            vec![0.0, 1.0, 0.1],
            vec![0.1, 0.2, 1.0],
            vec![0.7, 0.7, 0.3],
            vec![0.5, 0.4, 0.6],
            vec![0.3, 0.6, 0.6],
        ])
        .unwrap()
    }

    #[test]
    fn test_hull_insert_enumerates_projections() {
        let mut hull = DownClosedHull::default();
        hull.insert(&[1.0, 2.0, 3.0]);
        assert_eq!(hull.generators.len(), 8);
        assert!(hull.generators.contains(&vec![0.0, 0.0, 0.0]));
        assert!(hull.generators.contains(&vec![1.0, 0.0, 3.0]));
    }

    #[test]
    fn test_critical_ratio_matches_regret() {
        let mut hull = DownClosedHull::default();
        hull.insert(&[1.0, 0.0]);
        hull.insert(&[0.0, 1.0]);
        let t = hull.critical_ratio(&[0.75, 0.75]).unwrap();
        assert!((t - 2.0 / 3.0).abs() < 1e-7, "got {}", t);
    }

    #[test]
    fn test_covers_respect_size_and_keep_axis_maxima() {
        let set = sample_set();
        let oracles: [&dyn CoveringOracle; 2] = [&SphereCover, &GeoGreedyCover];
        for oracle in oracles {
            let cover = oracle.cover(&set, 4).unwrap();
            assert!(cover.len() <= 4, "{} returned {}", oracle.name(), cover.len());
            for id in [PointId(0), PointId(1), PointId(2)] {
                assert!(cover.position(id).is_some(), "{} lost {}", oracle.name(), id);
            }
        }
    }

    #[test]
    fn test_greedy_step_reduces_regret() {
        let set = sample_set();
        let all: Vec<&Point> = set.iter().collect();
        let basis = SphereCover.cover(&set, 3).unwrap();
        let bigger = SphereCover.cover(&set, 4).unwrap();
        let before = max_regret_ratio(&all, basis.refs()).unwrap();
        let after = max_regret_ratio(&all, bigger.refs()).unwrap();
        assert!(after < before);
    }

    #[test]
    fn test_both_oracles_agree_on_first_greedy_pick() {
        let set = sample_set();
        let sphere = SphereCover.cover(&set, 4).unwrap();
        let geo = GeoGreedyCover.cover(&set, 4).unwrap();
        assert_eq!(sphere.ids(), geo.ids());
    }

    #[test]
    fn test_rejects_k_below_dimension() {
        let set = sample_set();
        assert!(matches!(
            SphereCover.cover(&set, 2),
            Err(GeometryError::CoverTooSmall { k: 2, dim: 3 })
        ));
    }
}
