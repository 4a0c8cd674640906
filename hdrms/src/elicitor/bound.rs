//! Upper estimate of the regret ratio still possible after a round.

use hdrms_geometry::{dot, PointSet, EPS};

use crate::config::StopCondition;

/// Largest regret ratio `candidate` can suffer at any vertex of the range,
/// relative to the best remaining candidate there.
fn worst_regret(points: &PointSet, candidates: &[usize], candidate: usize, vertices: &[Vec<f64>]) -> f64 {
    let Some(c) = points.get(candidate) else {
        return 1.0;
    };
    vertices
        .iter()
        .map(|e| {
            let top = candidates
                .iter()
                .filter_map(|&q| points.get(q))
                .map(|q| dot(e, q.coords()))
                .fold(0.0, f64::max);
            if top <= EPS {
                0.0
            } else {
                ((top - dot(e, c.coords())) / top).max(0.0)
            }
        })
        .fold(0.0, f64::max)
}

/// `None` under [`StopCondition::NoBound`]. The exact bound is the smallest
/// worst-case regret over all candidates; the approximate one only looks at
/// `best`.
pub fn regret_bound(
    stop: StopCondition,
    points: &PointSet,
    candidates: &[usize],
    vertices: &[Vec<f64>],
    best: Option<usize>,
) -> Option<f64> {
    match stop {
        StopCondition::NoBound => None,
        StopCondition::ExactBound => candidates
            .iter()
            .map(|&c| worst_regret(points, candidates, c, vertices))
            .reduce(f64::min),
        StopCondition::ApproxBound => best
            .or_else(|| candidates.first().copied())
            .map(|b| worst_regret(points, candidates, b, vertices)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points() -> PointSet {
        PointSet::from_rows(vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.6, 0.6]]).unwrap()
    }

    #[test]
    fn test_exact_bound_on_full_simplex() {
        let points = points();
        let vertices = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        let rr = regret_bound(StopCondition::ExactBound, &points, &[0, 1, 2], &vertices, None).unwrap();
        // The balanced point loses 40% at either axis.
        assert!((rr - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_single_vertex_has_zero_regret() {
        let points = points();
        let vertices = vec![vec![1.0, 0.0]];
        let rr = regret_bound(StopCondition::ApproxBound, &points, &[0, 2], &vertices, Some(0)).unwrap();
        assert_eq!(rr, 0.0);
        assert!(regret_bound(StopCondition::NoBound, &points, &[0], &vertices, Some(0)).is_none());
    }
}
