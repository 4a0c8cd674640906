//! The user side of the question protocol.
//!
//! Three kinds of questions are asked:
//! - a favourite among sampled points shown on a group of dimensions,
//! - whether a single dimension matters at all,
//! - which of a few candidate points is best on the selected dimensions.
//!
//! [`SimulatedUser`] answers from a known linear utility, which is how runs
//! are evaluated.

use std::fmt;

use hdrms_geometry::{Point, PointId};
use itertools::Itertools;
use rand::seq::index::sample;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Answer to a group question
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GroupAnswer {
    Preferred(PointId),
    /// Nothing on these dimensions appeals to the user
    NoPreference,
}

impl GroupAnswer {
    pub fn is_positive(&self) -> bool {
        matches!(self, GroupAnswer::Preferred(_))
    }
}

pub trait Respondent {
    /// Pick a favourite among `shown`, whose coordinates are the `dims`
    /// components of the original points.
    fn favourite(&mut self, shown: &[&Point], dims: &[usize]) -> GroupAnswer;

    /// Whether dimension `dim` contributes to the user's utility.
    fn cares_about(&mut self, dim: usize) -> bool;

    /// Index into `options` of the best alternative on `dims`.
    fn choose(&mut self, options: &[&Point], dims: &[usize]) -> usize;
}

/// Linear preference over the full attribute space.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UtilityVector(Vec<f64>);

impl UtilityVector {
    pub fn new(weights: Vec<f64>) -> Self {
        Self(weights)
    }

    /// `nonzero` distinct coordinates drawn at random, weights uniform in
    /// (0, 1] and normalized to sum one.
    pub fn random_sparse<R: Rng + ?Sized>(dim: usize, nonzero: usize, rng: &mut R) -> Self {
        let mut weights = vec![0.0; dim];
        let picks = sample(rng, dim, nonzero.min(dim));
        for i in picks.iter() {
            weights[i] = 1.0 - rng.gen::<f64>();
        }
        let sum: f64 = weights.iter().sum();
        if sum > 0.0 {
            weights.iter_mut().for_each(|w| *w /= sum);
        }
        Self(weights)
    }

    pub fn dim(&self) -> usize {
        self.0.len()
    }

    pub fn weights(&self) -> &[f64] {
        &self.0
    }

    /// Dimensions with a non-zero weight
    pub fn support(&self) -> Vec<usize> {
        (0..self.0.len()).filter(|&i| self.0[i] != 0.0).collect()
    }

    pub fn restrict(&self, dims: &[usize]) -> Vec<f64> {
        dims.iter().map(|&d| self.0[d]).collect()
    }

    /// Score of a point projected on `dims`
    pub fn score(&self, point: &Point, dims: &[usize]) -> f64 {
        point
            .coords()
            .iter()
            .zip(dims)
            .map(|(c, &d)| c * self.0[d])
            .sum()
    }
}

impl fmt::Display for UtilityVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.iter().map(|w| format!("{:.3}", w)).join(", "))
    }
}

/// Respondent answering truthfully from a known utility vector
#[derive(Clone, Debug)]
pub struct SimulatedUser {
    utility: UtilityVector,
    asked: u32,
}

impl SimulatedUser {
    pub fn new(utility: UtilityVector) -> Self {
        Self { utility, asked: 0 }
    }

    pub fn utility(&self) -> &UtilityVector {
        &self.utility
    }

    /// Questions answered so far
    pub fn asked(&self) -> u32 {
        self.asked
    }
}

impl Respondent for SimulatedUser {
    fn favourite(&mut self, shown: &[&Point], dims: &[usize]) -> GroupAnswer {
        self.asked += 1;
        let mut best: Option<(PointId, f64)> = None;
        for p in shown {
            let score = self.utility.score(p, dims);
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((p.id(), score));
            }
        }
        match best {
            Some((id, score)) if score > 0.0 => GroupAnswer::Preferred(id),
            _ => GroupAnswer::NoPreference,
        }
    }

    fn cares_about(&mut self, dim: usize) -> bool {
        self.asked += 1;
        self.utility.weights()[dim] > 0.0
    }

    fn choose(&mut self, options: &[&Point], dims: &[usize]) -> usize {
        self.asked += 1;
        let mut best = 0;
        let mut best_score = f64::NEG_INFINITY;
        for (i, p) in options.iter().enumerate() {
            let score = self.utility.score(p, dims);
            if score > best_score {
                best = i;
                best_score = score;
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_random_sparse_support() {
        let mut rng = StdRng::seed_from_u64(11);
        let u = UtilityVector::random_sparse(10, 3, &mut rng);
        assert_eq!(u.support().len(), 3);
        assert!((u.weights().iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_favourite_on_irrelevant_block() {
        let mut user = SimulatedUser::new(UtilityVector::new(vec![0.7, 0.3, 0.0, 0.0]));
        let a = Point::new(PointId(0), vec![0.9, 0.1]);
        let b = Point::new(PointId(1), vec![0.2, 0.8]);
        assert_eq!(user.favourite(&[&a, &b], &[2, 3]), GroupAnswer::NoPreference);
        assert_eq!(user.favourite(&[&a, &b], &[0, 1]), GroupAnswer::Preferred(PointId(0)));
        assert_eq!(user.asked(), 2);
    }

    #[test]
    fn test_choose_uses_projected_dims() {
        let mut user = SimulatedUser::new(UtilityVector::new(vec![0.0, 1.0, 0.0]));
        let a = Point::new(PointId(4), vec![1.0, 0.0]);
        let b = Point::new(PointId(5), vec![0.0, 1.0]);
        // Coordinates stand for dims [2, 1]
        assert_eq!(user.choose(&[&a, &b], &[2, 1]), 1);
    }
}
