//! Utility cones and their extreme points.
//!
//! The feasible utility region after a number of comparisons is
//! `R = { u >= 0 : v·u <= 0 for every recorded v, Σu = 1 }`. [`UtilityCone`]
//! keeps the extreme rays of the cone `{u >= 0 : v·u <= 0}` and refines them
//! one half-space at a time with the double description method, starting
//! from the non-negative orthant. Normalizing each ray to coordinate sum one
//! yields the vertices of `R`.
//!
//! Adjacency of rays is decided combinatorially: two rays are adjacent when
//! their common tight constraints number at least `dim - 2` and no third ray
//! is tight on all of them.

use log::trace;

use crate::error::GeometryError;
use crate::{dot, EPS};

/// Bitset of constraint indices a ray is tight on.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct TightSet {
    words: Vec<u64>,
}

impl TightSet {
    fn insert(&mut self, index: usize) {
        let (word, bit) = (index / 64, index % 64);
        if self.words.len() <= word {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= 1 << bit;
    }

    fn intersection(&self, other: &TightSet) -> TightSet {
        TightSet {
            words: self
                .words
                .iter()
                .zip(&other.words)
                .map(|(a, b)| a & b)
                .collect(),
        }
    }

    fn is_subset_of(&self, other: &TightSet) -> bool {
        self.words.iter().enumerate().all(|(i, &w)| {
            let o = other.words.get(i).copied().unwrap_or(0);
            w & !o == 0
        })
    }

    fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }
}

#[derive(Clone, Debug)]
struct Ray {
    dir: Vec<f64>,
    tight: TightSet,
}

/// Extreme rays of a polyhedral cone inside the non-negative orthant.
#[derive(Clone, Debug)]
pub struct UtilityCone {
    dim: usize,
    rays: Vec<Ray>,
    constraints: usize,
}

impl UtilityCone {
    /// The non-negative orthant: rays are the unit vectors, and constraint `j`
    /// (`-e_j·u <= 0`) is tight on every unit vector except `e_j`.
    pub fn orthant(dim: usize) -> Self {
        let rays = (0..dim)
            .map(|i| {
                let mut dir = vec![0.0; dim];
                dir[i] = 1.0;
                let mut tight = TightSet::default();
                for j in (0..dim).filter(|&j| j != i) {
                    tight.insert(j);
                }
                Ray { dir, tight }
            })
            .collect();
        Self {
            dim,
            rays,
            constraints: dim,
        }
    }

    /// Orthant cut by every `normal·u <= 0` in `normals`.
    pub fn from_halfspaces<'a, I>(dim: usize, normals: I) -> Result<Self, GeometryError>
    where
        I: IntoIterator<Item = &'a Vec<f64>>,
    {
        let mut cone = Self::orthant(dim);
        for normal in normals {
            cone.intersect(normal)?;
        }
        Ok(cone)
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn num_rays(&self) -> usize {
        self.rays.len()
    }

    /// Cut the cone with `normal·u <= 0`.
    pub fn intersect(&mut self, normal: &[f64]) -> Result<(), GeometryError> {
        if normal.len() != self.dim {
            return Err(GeometryError::DimensionMismatch {
                expected: self.dim,
                found: normal.len(),
            });
        }
        let index = self.constraints;
        self.constraints += 1;

        let scale = normal.iter().map(|v| v.abs()).fold(0.0, f64::max);
        if scale <= EPS {
            // 0·u <= 0 holds everywhere and is tight on every ray.
            for ray in &mut self.rays {
                ray.tight.insert(index);
            }
            return Ok(());
        }

        let values: Vec<f64> = self
            .rays
            .iter()
            .map(|r| dot(&r.dir, normal) / scale)
            .collect();
        let positive: Vec<usize> = (0..self.rays.len()).filter(|&i| values[i] > EPS).collect();
        let negative: Vec<usize> = (0..self.rays.len()).filter(|&i| values[i] < -EPS).collect();

        let mut next = Vec::with_capacity(self.rays.len());
        for (i, ray) in self.rays.iter().enumerate() {
            if values[i] <= EPS {
                let mut kept = ray.clone();
                if values[i] >= -EPS {
                    kept.tight.insert(index);
                }
                next.push(kept);
            }
        }

        for &p in &positive {
            for &n in &negative {
                let common = self.rays[p].tight.intersection(&self.rays[n].tight);
                if !self.adjacent(p, n, &common) {
                    continue;
                }
                let (vp, vn) = (values[p], values[n]);
                // vp > 0 > vn, so both weights are positive and the new ray is tight.
                let dir: Vec<f64> = self.rays[n]
                    .dir
                    .iter()
                    .zip(&self.rays[p].dir)
                    .map(|(rn, rp)| vp * rn - vn * rp)
                    .collect();
                let mut tight = common;
                tight.insert(index);
                next.push(Ray {
                    dir: normalize_sum(dir),
                    tight,
                });
            }
        }

        trace!(
            "cone cut {}: {} rays -> {} ({} positive, {} negative)",
            index,
            self.rays.len(),
            next.len(),
            positive.len(),
            negative.len()
        );

        if next.is_empty() {
            return Err(GeometryError::EmptyUtilityRange);
        }
        self.rays = next;
        Ok(())
    }

    fn adjacent(&self, p: usize, n: usize, common: &TightSet) -> bool {
        if common.len() + 2 < self.dim {
            return false;
        }
        !self
            .rays
            .iter()
            .enumerate()
            .any(|(i, r)| i != p && i != n && common.is_subset_of(&r.tight))
    }

    /// Vertices of the utility range: the rays scaled to coordinate sum one.
    pub fn extreme_points(&self) -> Vec<Vec<f64>> {
        self.rays.iter().map(|r| normalize_sum(r.dir.clone())).collect()
    }

    /// Average of the extreme points, an interior direction of the range.
    pub fn centroid(&self) -> Vec<f64> {
        let mut mean = vec![0.0; self.dim];
        if self.rays.is_empty() {
            return mean;
        }
        for point in self.extreme_points() {
            for (m, v) in mean.iter_mut().zip(point) {
                *m += v;
            }
        }
        let count = self.rays.len() as f64;
        mean.iter_mut().for_each(|m| *m /= count);
        mean
    }
}

fn normalize_sum(mut dir: Vec<f64>) -> Vec<f64> {
    for v in dir.iter_mut() {
        if *v < 0.0 && *v > -EPS {
            *v = 0.0;
        }
    }
    let sum: f64 = dir.iter().sum();
    if sum > EPS {
        dir.iter_mut().for_each(|v| *v /= sum);
    }
    dir
}
