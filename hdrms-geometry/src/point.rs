//! Points and point sets.
//!
//! A [`PointSet`] is generic over the element it stores. `PointSet<Point>`
//! owns its points; [`PointView`] (`PointSet<&Point>`) borrows them from
//! another set and can never outlive it. Projections always allocate a new
//! owned set whose points keep the ids of their sources.

use std::borrow::Borrow;
use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::GeometryError;

/// Identity of a point, stable across projections.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PointId(pub usize);

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An immutable alternative in attribute space.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    id: PointId,
    coords: Vec<f64>,
}

impl Point {
    pub fn new(id: PointId, coords: Vec<f64>) -> Self {
        Self { id, coords }
    }

    pub fn id(&self) -> PointId {
        self.id
    }

    pub fn dim(&self) -> usize {
        self.coords.len()
    }

    pub fn coords(&self) -> &[f64] {
        &self.coords
    }

    pub fn coord(&self, i: usize) -> f64 {
        self.coords[i]
    }

    /// Score of this point under a utility vector of the same dimensionality.
    pub fn dot(&self, utility: &[f64]) -> f64 {
        crate::dot(&self.coords, utility)
    }

    /// Restrict the point to `dims`, in the given order, keeping the id.
    pub fn project(&self, dims: &[usize]) -> Point {
        Point {
            id: self.id,
            coords: dims.iter().map(|&d| self.coords[d]).collect(),
        }
    }

    /// Coordinate-wise `self - other`.
    pub fn difference(&self, other: &Point) -> Vec<f64> {
        self.coords
            .iter()
            .zip(&other.coords)
            .map(|(a, b)| a - b)
            .collect()
    }
}

/// Ordered collection of points, owned (`P = Point`) or borrowed (`P = &Point`).
#[derive(Clone, Debug, PartialEq)]
pub struct PointSet<P = Point> {
    points: Vec<P>,
}

/// A point set that borrows its points from an owning set.
pub type PointView<'a> = PointSet<&'a Point>;

impl PointSet<Point> {
    /// Build an owned set, checking that all points agree on dimensionality
    /// and that ids are unique.
    pub fn new(points: Vec<Point>) -> Result<Self, GeometryError> {
        validate(&points)?;
        Ok(Self { points })
    }

    /// Owned set from raw rows; point `i` gets id `i`.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, GeometryError> {
        let points = rows
            .into_iter()
            .enumerate()
            .map(|(i, coords)| Point::new(PointId(i), coords))
            .collect();
        Self::new(points)
    }

    pub fn into_points(self) -> Vec<Point> {
        self.points
    }
}

impl<'a> PointSet<&'a Point> {
    pub fn from_refs(points: Vec<&'a Point>) -> Self {
        Self { points }
    }

    /// Borrowed elements with the lifetime of the owning set.
    pub fn refs(&self) -> &[&'a Point] {
        &self.points
    }

    /// Clone the referenced points into a new owned set.
    pub fn to_owned_set(&self) -> PointSet<Point> {
        PointSet {
            points: self.points.iter().map(|p| (*p).clone()).collect(),
        }
    }
}

impl<P: Borrow<Point>> PointSet<P> {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Dimensionality of the members, `None` for an empty set.
    pub fn dim(&self) -> Option<usize> {
        self.points.first().map(|p| p.borrow().dim())
    }

    pub fn get(&self, index: usize) -> Option<&Point> {
        self.points.get(index).map(Borrow::borrow)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point> + '_ {
        self.points.iter().map(Borrow::borrow)
    }

    pub fn ids(&self) -> Vec<PointId> {
        self.iter().map(Point::id).collect()
    }

    pub fn position(&self, id: PointId) -> Option<usize> {
        self.iter().position(|p| p.id() == id)
    }

    pub fn find(&self, id: PointId) -> Option<&Point> {
        self.iter().find(|p| p.id() == id)
    }

    /// A borrowed view over every member of this set.
    pub fn view(&self) -> PointView<'_> {
        PointSet {
            points: self.iter().collect(),
        }
    }

    /// A borrowed view over the members at `indices`.
    pub fn select(&self, indices: &[usize]) -> PointView<'_> {
        PointSet {
            points: indices.iter().filter_map(|&i| self.get(i)).collect(),
        }
    }

    /// Project every member on `dims`; the result owns its points.
    pub fn project(&self, dims: &[usize]) -> PointSet<Point> {
        PointSet {
            points: self.iter().map(|p| p.project(dims)).collect(),
        }
    }
}

impl<P> FromIterator<P> for PointSet<P> {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

fn validate(points: &[Point]) -> Result<(), GeometryError> {
    let Some(first) = points.first() else {
        return Ok(());
    };
    let mut seen = HashSet::with_capacity(points.len());
    for p in points {
        if p.dim() != first.dim() {
            return Err(GeometryError::DimensionMismatch {
                expected: first.dim(),
                found: p.dim(),
            });
        }
        if !seen.insert(p.id()) {
            return Err(GeometryError::DuplicateId(p.id()));
        }
    }
    Ok(())
}
