use hdrms_geometry::GeometryError;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum ElicitError {
    #[error("Invariant violated: {0}")]
    Invariant(#[from] InvariantViolation),

    #[error("Geometry oracle failed: {0}")]
    Geometry(#[from] GeometryError),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// A precondition of the pipeline that does not hold. Fatal: no partial
/// result is produced.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("dimension pool is empty entering binary splitting")]
    EmptyDimensionPool,

    #[error("group size is zero with {d_left} dimensions left")]
    ZeroGroupSize { d_left: usize },

    #[error("group size {group} exceeds the {d_left} dimensions left")]
    GroupExceedsPool { group: usize, d_left: usize },

    #[error("no dimension survived for the final selection")]
    EmptyFinalDimensions,

    #[error("candidate set is empty")]
    EmptyCandidates,

    #[error("reduced dimensionality {dim} is not smaller than the requested output size {k}")]
    OutputNotLargerThanDimension { dim: usize, k: usize },
}

pub type ElicitResult<T> = Result<T, ElicitError>;
