use thiserror::Error;

use crate::point::PointId;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("Point set is empty")]
    EmptyPointSet,

    #[error("Duplicate point id {0}")]
    DuplicateId(PointId),

    #[error("Utility range is empty: the recorded preferences are inconsistent")]
    EmptyUtilityRange,

    #[error("Simplex did not converge within {limit} pivots")]
    LpIterationLimit { limit: usize },

    #[error("Cannot cover {dim}-dimensional points with {k} representatives")]
    CoverTooSmall { k: usize, dim: usize },
}
