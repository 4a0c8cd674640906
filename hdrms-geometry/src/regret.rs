//! Regret ratios of representative subsets.
//!
//! For a utility `u`, the regret ratio of subset `S` against point `p` is
//! `max(0, 1 - max_{q∈S} u·q / u·p)`. Maximizing over all `u >= 0` is one LP
//! per point: fix `u·p = 1`, then maximize `x` with `u·q + x <= 1` for every
//! `q ∈ S`.

use crate::error::GeometryError;
use crate::lp::{LinearProgram, LpOutcome};
use crate::point::Point;

/// Worst-case regret ratio of `subset` with respect to `point` over all
/// non-negative utilities.
pub fn regret_ratio(point: &Point, subset: &[&Point]) -> Result<f64, GeometryError> {
    if subset.iter().any(|q| q.id() == point.id()) {
        return Ok(0.0);
    }
    if subset.is_empty() {
        return Ok(1.0);
    }
    let dim = point.dim();
    for q in subset {
        if q.dim() != dim {
            return Err(GeometryError::DimensionMismatch {
                expected: dim,
                found: q.dim(),
            });
        }
    }

    // Variables: u_0..u_{dim-1}, x
    let mut objective = vec![0.0; dim + 1];
    objective[dim] = 1.0;
    let mut p_row = point.coords().to_vec();
    p_row.push(0.0);
    let mut lp = LinearProgram::maximize(objective).equal(p_row, 1.0);
    for q in subset {
        let mut row = q.coords().to_vec();
        row.push(1.0);
        lp = lp.less_eq(row, 1.0);
    }

    Ok(match lp.solve()? {
        LpOutcome::Optimal(solution) => solution.value.clamp(0.0, 1.0),
        // Every feasible u already favours the subset, or p is the origin.
        LpOutcome::Infeasible => 0.0,
        LpOutcome::Unbounded => 1.0,
    })
}

/// Maximum regret ratio of `subset` over every member of `points`.
pub fn max_regret_ratio(points: &[&Point], subset: &[&Point]) -> Result<f64, GeometryError> {
    let mut worst: f64 = 0.0;
    for p in points {
        worst = worst.max(regret_ratio(p, subset)?);
    }
    Ok(worst)
}
