//! Frame (minimal generating set) of a finitely generated cone.

use crate::error::GeometryError;
use crate::lp::LinearProgram;
use crate::EPS;

/// Indices of the rays that are not non-negative combinations of the others.
///
/// Zero rays never belong to the frame, and of several rays pointing in the
/// same direction only the first is kept. Indices are returned ascending.
pub fn cone_frame(rays: &[Vec<f64>]) -> Result<Vec<usize>, GeometryError> {
    let Some(dim) = rays.first().map(Vec::len) else {
        return Ok(Vec::new());
    };

    let mut unique: Vec<(usize, Vec<f64>)> = Vec::new();
    for (i, ray) in rays.iter().enumerate() {
        if ray.len() != dim {
            return Err(GeometryError::DimensionMismatch {
                expected: dim,
                found: ray.len(),
            });
        }
        let norm = ray.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm <= EPS {
            continue;
        }
        let unit: Vec<f64> = ray.iter().map(|v| v / norm).collect();
        let duplicate = unique
            .iter()
            .any(|(_, u)| u.iter().zip(&unit).all(|(a, b)| (a - b).abs() <= 1e-9));
        if !duplicate {
            unique.push((i, unit));
        }
    }

    let mut frame = Vec::new();
    for (k, (index, target)) in unique.iter().enumerate() {
        let others: Vec<&Vec<f64>> = unique
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != k)
            .map(|(_, (_, r))| r)
            .collect();
        if !is_conic_combination(target, &others)? {
            frame.push(*index);
        }
    }
    Ok(frame)
}

/// Whether `target = Σ λ_j gens[j]` for some `λ >= 0`.
fn is_conic_combination(target: &[f64], gens: &[&Vec<f64>]) -> Result<bool, GeometryError> {
    if gens.is_empty() {
        return Ok(false);
    }
    let lp = (0..target.len()).fold(LinearProgram::feasibility(gens.len()), |lp, c| {
        lp.equal(gens.iter().map(|g| g[c]).collect(), target[c])
    });
    Ok(lp.solve()?.is_feasible())
}
