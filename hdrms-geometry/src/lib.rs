// hdrms geometry
// Geometric oracles used by the elicitation pipeline: skyline, utility cones,
// cone frames, LP feasibility, R-tree indexing, regret evaluation and covering subsets.

pub mod cone;
pub mod covering;
pub mod error;
pub mod frame;
pub mod lp;
pub mod point;
pub mod regret;
pub mod rtree;
pub mod skyline;

pub use cone::UtilityCone;
pub use covering::{CoveringOracle, GeoGreedyCover, SphereCover};
pub use error::GeometryError;
pub use frame::cone_frame;
pub use lp::{LinearProgram, LpOutcome, LpSolution};
pub use point::{Point, PointId, PointSet, PointView};
pub use regret::{max_regret_ratio, regret_ratio};
pub use rtree::{Mbr, RTree, RTreeNode};
pub use skyline::{dominates, skyline};

/// Absolute tolerance shared by the oracles.
pub const EPS: f64 = 1e-9;

/// True when `value` is within [`EPS`] of zero.
pub fn is_zero(value: f64) -> bool {
    value.abs() <= EPS
}

/// Dot product of two equally sized slices.
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
