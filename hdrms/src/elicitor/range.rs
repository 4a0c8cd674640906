//! The set of utilities consistent with the answers so far.

use hdrms_geometry::{GeometryError, Point, UtilityCone, EPS};

/// Extreme vectors `v` with `v·u <= 0` for every feasible utility `u`,
/// together with the double-description cone they cut out.
#[derive(Clone, Debug)]
pub struct UtilityRange {
    vectors: Vec<Vec<f64>>,
    cone: UtilityCone,
}

impl UtilityRange {
    /// No answers yet: the negative unit vectors, i.e. `u >= 0`.
    pub fn new(dim: usize) -> Self {
        let vectors = (0..dim)
            .map(|i| {
                let mut v = vec![0.0; dim];
                v[i] = -1.0;
                v
            })
            .collect();
        Self {
            vectors,
            cone: UtilityCone::orthant(dim),
        }
    }

    pub fn dim(&self) -> usize {
        self.cone.dim()
    }

    pub fn vectors(&self) -> &[Vec<f64>] {
        &self.vectors
    }

    /// Vectors recorded from answers, without the initial orthant bounds
    pub fn learned(&self) -> &[Vec<f64>] {
        &self.vectors[self.dim().min(self.vectors.len())..]
    }

    /// Record that `winner` was preferred over `loser`. Returns false when the
    /// two coincide and nothing was learned.
    pub fn prefer(&mut self, winner: &Point, loser: &Point) -> Result<bool, GeometryError> {
        let diff = loser.difference(winner);
        let norm = diff.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm <= EPS {
            return Ok(false);
        }
        let v: Vec<f64> = diff.iter().map(|x| x / norm).collect();
        self.cone.intersect(&v)?;
        self.vectors.push(v);
        Ok(true)
    }

    /// Vertices of the range on the unit simplex
    pub fn extreme_points(&self) -> Vec<Vec<f64>> {
        self.cone.extreme_points()
    }

    pub fn centroid(&self) -> Vec<f64> {
        self.cone.centroid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdrms_geometry::PointId;

    #[test]
    fn test_preference_cuts_range() {
        let mut range = UtilityRange::new(2);
        let a = Point::new(PointId(0), vec![1.0, 0.0]);
        let b = Point::new(PointId(1), vec![0.0, 1.0]);
        assert!(range.prefer(&a, &b).unwrap());
        assert_eq!(range.learned().len(), 1);
        // Only utilities favouring dimension 0 remain.
        for e in range.extreme_points() {
            assert!(e[0] >= e[1] - 1e-9);
        }
    }

    #[test]
    fn test_identical_points_teach_nothing() {
        let mut range = UtilityRange::new(2);
        let a = Point::new(PointId(0), vec![0.5, 0.5]);
        let b = Point::new(PointId(1), vec![0.5, 0.5]);
        assert!(!range.prefer(&a, &b).unwrap());
        assert_eq!(range.vectors().len(), 2);
    }
}
