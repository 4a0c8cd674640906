//! R-dominance: `q` dominates `p` over the utility range when no feasible
//! utility prefers `p`.

use hdrms_geometry::{dot, LinearProgram, EPS};

use crate::config::DominanceMode;
use crate::elicitor::range::UtilityRange;
use crate::error::ElicitResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Comparison {
    /// At least as good everywhere on the range, strictly better somewhere
    Dominates,
    /// Equal everywhere on the range
    Ties,
    Incomparable,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DominanceTest {
    /// Compare scores at every vertex of the range
    HyperPlane,
    /// Solve `max u·(p - q)` over the range
    ConicalHull,
}

impl From<DominanceMode> for DominanceTest {
    fn from(mode: DominanceMode) -> Self {
        match mode {
            DominanceMode::HyperPlane => DominanceTest::HyperPlane,
            DominanceMode::ConicalHull => DominanceTest::ConicalHull,
        }
    }
}

impl DominanceTest {
    /// Compare coordinate vectors `q` and `p` over `range`, whose vertices are
    /// `vertices`.
    pub fn compare(
        &self,
        q: &[f64],
        p: &[f64],
        range: &UtilityRange,
        vertices: &[Vec<f64>],
    ) -> ElicitResult<Comparison> {
        let diff: Vec<f64> = q.iter().zip(p).map(|(a, b)| a - b).collect();
        let (worst, best) = match self {
            DominanceTest::HyperPlane => {
                let scores: Vec<f64> = vertices.iter().map(|e| dot(e, &diff)).collect();
                let worst = scores.iter().copied().fold(f64::INFINITY, f64::min);
                let best = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                (worst, best)
            }
            DominanceTest::ConicalHull => {
                let neg: Vec<f64> = diff.iter().map(|d| -d).collect();
                let worst = -max_over_range(&neg, range)?;
                let best = max_over_range(&diff, range)?;
                (worst, best)
            }
        };
        Ok(if worst < -EPS {
            Comparison::Incomparable
        } else if best > EPS {
            Comparison::Dominates
        } else {
            Comparison::Ties
        })
    }
}

/// `max c·u` subject to `u >= 0`, `Σu = 1` and every learned `v·u <= 0`
fn max_over_range(c: &[f64], range: &UtilityRange) -> ElicitResult<f64> {
    let dim = c.len();
    let lp = range
        .learned()
        .iter()
        .fold(
            LinearProgram::maximize(c.to_vec()).equal(vec![1.0; dim], 1.0),
            |lp, v| lp.less_eq(v.clone(), 0.0),
        );
    Ok(lp
        .solve()?
        .optimal()
        .map(|solution| solution.value)
        .unwrap_or(f64::NEG_INFINITY))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdrms_geometry::{Point, PointId};

    fn range_favouring_first() -> UtilityRange {
        let mut range = UtilityRange::new(2);
        let a = Point::new(PointId(0), vec![1.0, 0.0]);
        let b = Point::new(PointId(1), vec![0.0, 1.0]);
        range.prefer(&a, &b).unwrap();
        range
    }

    #[test]
    fn test_both_tests_agree() {
        let range = range_favouring_first();
        let vertices = range.extreme_points();
        let q = [0.8, 0.3];
        let p = [0.3, 0.7];
        for test in [DominanceTest::HyperPlane, DominanceTest::ConicalHull] {
            assert_eq!(
                test.compare(&q, &p, &range, &vertices).unwrap(),
                Comparison::Dominates
            );
            assert_eq!(
                test.compare(&p, &q, &range, &vertices).unwrap(),
                Comparison::Incomparable
            );
            assert_eq!(test.compare(&q, &q, &range, &vertices).unwrap(), Comparison::Ties);
        }
    }

    #[test]
    fn test_unconstrained_range_is_pareto_dominance() {
        let range = UtilityRange::new(2);
        let vertices = range.extreme_points();
        let test = DominanceTest::HyperPlane;
        assert_eq!(
            test.compare(&[0.8, 0.3], &[0.3, 0.7], &range, &vertices).unwrap(),
            Comparison::Incomparable
        );
        assert_eq!(
            test.compare(&[0.8, 0.7], &[0.3, 0.7], &range, &vertices).unwrap(),
            Comparison::Dominates
        );
    }
}
