//! Dimension pools. A [`DimensionSet`] can only lose members; there is no
//! insertion API, so the pool size is non-increasing by construction.

use std::collections::BTreeSet;

use serde::Serialize;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DimensionSet {
    dims: BTreeSet<usize>,
}

impl DimensionSet {
    /// All of `0..dim`
    pub fn full(dim: usize) -> Self {
        Self {
            dims: (0..dim).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.dims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dims.is_empty()
    }

    pub fn contains(&self, dim: usize) -> bool {
        self.dims.contains(&dim)
    }

    /// Members in ascending order
    pub fn to_vec(&self) -> Vec<usize> {
        self.dims.iter().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.dims.iter().copied()
    }

    /// Remove every member of `dims`; returns how many were present.
    pub fn remove_all(&mut self, dims: &[usize]) -> usize {
        dims.iter().filter(|d| self.dims.remove(d)).count()
    }

    /// The members also present in `keep`.
    pub fn restrict_to(&self, keep: impl IntoIterator<Item = usize>) -> Self {
        let keep: BTreeSet<usize> = keep.into_iter().collect();
        Self {
            dims: self.dims.intersection(&keep).copied().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_shrinks() {
        let mut set = DimensionSet::full(5);
        assert_eq!(set.remove_all(&[1, 3, 7]), 2);
        assert_eq!(set.to_vec(), vec![0, 2, 4]);
        let restricted = set.restrict_to([0, 4, 9]);
        assert_eq!(restricted.to_vec(), vec![0, 4]);
    }
}
