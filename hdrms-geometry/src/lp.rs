//! Dense two-phase simplex over non-negative variables.
//!
//! Problems here are tiny (a handful of utility coordinates plus one
//! variable per alternative), so a full tableau with Bland's rule is enough.
//! Every variable is constrained to `x >= 0`.

use crate::error::GeometryError;

const PIVOT_EPS: f64 = 1e-10;
const FEASIBILITY_EPS: f64 = 1e-8;
const MAX_PIVOTS: usize = 50_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConstraintKind {
    LessEq,
    GreaterEq,
    Equal,
}

#[derive(Clone, Debug)]
struct Constraint {
    coeffs: Vec<f64>,
    kind: ConstraintKind,
    rhs: f64,
}

/// `maximize c·x` subject to linear rows and `x >= 0`.
#[derive(Clone, Debug)]
pub struct LinearProgram {
    objective: Vec<f64>,
    rows: Vec<Constraint>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LpSolution {
    pub x: Vec<f64>,
    pub value: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum LpOutcome {
    Optimal(LpSolution),
    Infeasible,
    Unbounded,
}

impl LpOutcome {
    pub fn is_feasible(&self) -> bool {
        !matches!(self, LpOutcome::Infeasible)
    }

    pub fn optimal(self) -> Option<LpSolution> {
        match self {
            LpOutcome::Optimal(solution) => Some(solution),
            _ => None,
        }
    }
}

impl LinearProgram {
    pub fn maximize(objective: Vec<f64>) -> Self {
        Self {
            objective,
            rows: Vec::new(),
        }
    }

    /// Pure feasibility problem over `n` variables.
    pub fn feasibility(n: usize) -> Self {
        Self::maximize(vec![0.0; n])
    }

    pub fn num_vars(&self) -> usize {
        self.objective.len()
    }

    pub fn less_eq(self, coeffs: Vec<f64>, rhs: f64) -> Self {
        self.with_row(coeffs, ConstraintKind::LessEq, rhs)
    }

    pub fn greater_eq(self, coeffs: Vec<f64>, rhs: f64) -> Self {
        self.with_row(coeffs, ConstraintKind::GreaterEq, rhs)
    }

    pub fn equal(self, coeffs: Vec<f64>, rhs: f64) -> Self {
        self.with_row(coeffs, ConstraintKind::Equal, rhs)
    }

    pub fn with_row(mut self, coeffs: Vec<f64>, kind: ConstraintKind, rhs: f64) -> Self {
        self.rows.push(Constraint { coeffs, kind, rhs });
        self
    }

    pub fn solve(&self) -> Result<LpOutcome, GeometryError> {
        let n = self.num_vars();
        for row in &self.rows {
            if row.coeffs.len() != n {
                return Err(GeometryError::DimensionMismatch {
                    expected: n,
                    found: row.coeffs.len(),
                });
            }
        }
        Tableau::build(self).run(&self.objective)
    }
}

struct Tableau {
    /// `m` rows of `cols + 1` entries; the last entry is the right-hand side.
    rows: Vec<Vec<f64>>,
    basis: Vec<usize>,
    n: usize,
    cols: usize,
    artificial: Vec<bool>,
}

impl Tableau {
    fn build(lp: &LinearProgram) -> Self {
        let n = lp.num_vars();
        // Flip rows so every right-hand side is non-negative.
        let normalized: Vec<Constraint> = lp
            .rows
            .iter()
            .map(|row| {
                if row.rhs < 0.0 {
                    Constraint {
                        coeffs: row.coeffs.iter().map(|c| -c).collect(),
                        kind: match row.kind {
                            ConstraintKind::LessEq => ConstraintKind::GreaterEq,
                            ConstraintKind::GreaterEq => ConstraintKind::LessEq,
                            ConstraintKind::Equal => ConstraintKind::Equal,
                        },
                        rhs: -row.rhs,
                    }
                } else {
                    row.clone()
                }
            })
            .collect();

        let extra: usize = normalized
            .iter()
            .map(|row| match row.kind {
                ConstraintKind::LessEq | ConstraintKind::Equal => 1,
                ConstraintKind::GreaterEq => 2,
            })
            .sum();
        let cols = n + extra;
        let mut artificial = vec![false; cols];
        let mut rows = Vec::with_capacity(normalized.len());
        let mut basis = Vec::with_capacity(normalized.len());
        let mut next = n;

        for row in &normalized {
            let mut entries = vec![0.0; cols + 1];
            entries[..n].copy_from_slice(&row.coeffs);
            entries[cols] = row.rhs;
            match row.kind {
                ConstraintKind::LessEq => {
                    entries[next] = 1.0;
                    basis.push(next);
                    next += 1;
                }
                ConstraintKind::GreaterEq => {
                    entries[next] = -1.0;
                    entries[next + 1] = 1.0;
                    artificial[next + 1] = true;
                    basis.push(next + 1);
                    next += 2;
                }
                ConstraintKind::Equal => {
                    entries[next] = 1.0;
                    artificial[next] = true;
                    basis.push(next);
                    next += 1;
                }
            }
            rows.push(entries);
        }

        Self {
            rows,
            basis,
            n,
            cols,
            artificial,
        }
    }

    fn run(mut self, objective: &[f64]) -> Result<LpOutcome, GeometryError> {
        // Phase 1: drive the artificial variables to zero.
        if self.artificial.iter().any(|&a| a) {
            let phase_one: Vec<f64> = (0..self.cols)
                .map(|j| if self.artificial[j] { -1.0 } else { 0.0 })
                .collect();
            let value = match self.optimize(&phase_one, false)? {
                Some(value) => value,
                // Bounded above by zero, so phase 1 cannot be unbounded.
                None => return Ok(LpOutcome::Infeasible),
            };
            if value < -FEASIBILITY_EPS {
                return Ok(LpOutcome::Infeasible);
            }
            self.evict_artificials();
        }

        // Phase 2
        let mut costs = vec![0.0; self.cols];
        costs[..self.n].copy_from_slice(objective);
        match self.optimize(&costs, true)? {
            Some(value) => Ok(LpOutcome::Optimal(LpSolution {
                x: self.primal(),
                value,
            })),
            None => Ok(LpOutcome::Unbounded),
        }
    }

    /// Maximize `costs` from the current basic feasible solution.
    /// Returns `None` when the objective is unbounded.
    fn optimize(&mut self, costs: &[f64], block_artificial: bool) -> Result<Option<f64>, GeometryError> {
        for _ in 0..MAX_PIVOTS {
            // Bland's rule: first column with a negative reduced cost enters.
            let entering = (0..self.cols).find(|&j| {
                !(block_artificial && self.artificial[j])
                    && !self.basis.contains(&j)
                    && self.reduced_cost(costs, j) < -PIVOT_EPS
            });
            let Some(col) = entering else {
                return Ok(Some(self.objective_value(costs)));
            };

            let mut leaving: Option<(usize, f64)> = None;
            for (i, row) in self.rows.iter().enumerate() {
                let a = row[col];
                if a <= PIVOT_EPS {
                    continue;
                }
                let ratio = row[self.cols] / a;
                leaving = match leaving {
                    None => Some((i, ratio)),
                    Some((best, best_ratio)) => {
                        if ratio < best_ratio - PIVOT_EPS
                            || (ratio <= best_ratio + PIVOT_EPS && self.basis[i] < self.basis[best])
                        {
                            Some((i, ratio))
                        } else {
                            Some((best, best_ratio))
                        }
                    }
                };
            }
            let Some((row, _)) = leaving else {
                return Ok(None);
            };
            self.pivot(row, col);
        }
        Err(GeometryError::LpIterationLimit { limit: MAX_PIVOTS })
    }

    fn reduced_cost(&self, costs: &[f64], col: usize) -> f64 {
        let basic: f64 = self
            .rows
            .iter()
            .zip(&self.basis)
            .map(|(row, &b)| costs[b] * row[col])
            .sum();
        basic - costs[col]
    }

    fn objective_value(&self, costs: &[f64]) -> f64 {
        self.rows
            .iter()
            .zip(&self.basis)
            .map(|(row, &b)| costs[b] * row[self.cols])
            .sum()
    }

    fn pivot(&mut self, row: usize, col: usize) {
        let width = self.cols + 1;
        let pivot = self.rows[row][col];
        for j in 0..width {
            self.rows[row][j] /= pivot;
        }
        let pivot_row = self.rows[row].clone();
        for (i, other) in self.rows.iter_mut().enumerate() {
            if i == row {
                continue;
            }
            let factor = other[col];
            if factor.abs() <= f64::EPSILON {
                continue;
            }
            for j in 0..width {
                other[j] -= factor * pivot_row[j];
            }
        }
        self.basis[row] = col;
    }

    /// Pivot zero-valued artificials out of the basis; rows where that is
    /// impossible are redundant and dropped.
    fn evict_artificials(&mut self) {
        let mut i = 0;
        while i < self.rows.len() {
            if !self.artificial[self.basis[i]] {
                i += 1;
                continue;
            }
            let replacement = (0..self.cols)
                .find(|&j| !self.artificial[j] && self.rows[i][j].abs() > PIVOT_EPS);
            match replacement {
                Some(col) => {
                    self.pivot(i, col);
                    i += 1;
                }
                None => {
                    self.rows.remove(i);
                    self.basis.remove(i);
                }
            }
        }
    }

    fn primal(&self) -> Vec<f64> {
        let mut x = vec![0.0; self.n];
        for (row, &b) in self.rows.iter().zip(&self.basis) {
            if b < self.n {
                x[b] = row[self.cols].max(0.0);
            }
        }
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-7, "{} != {}", a, b);
    }

    #[test]
    fn test_simple_maximization() {
        // max 3x + 2y  s.t. x + y <= 4, x + 3y <= 6
        let outcome = LinearProgram::maximize(vec![3.0, 2.0])
            .less_eq(vec![1.0, 1.0], 4.0)
            .less_eq(vec![1.0, 3.0], 6.0)
            .solve()
            .unwrap();
        let solution = outcome.optimal().expect("Expected optimum");
        assert_close(solution.value, 12.0);
        assert_close(solution.x[0], 4.0);
        assert_close(solution.x[1], 0.0);
    }

    #[test]
    fn test_equality_and_greater_eq() {
        // max x - y  s.t. x + y = 1, y >= 0.25
        let solution = LinearProgram::maximize(vec![1.0, -1.0])
            .equal(vec![1.0, 1.0], 1.0)
            .greater_eq(vec![0.0, 1.0], 0.25)
            .solve()
            .unwrap()
            .optimal()
            .expect("Expected optimum");
        assert_close(solution.value, 0.5);
        assert_close(solution.x[0], 0.75);
        assert_close(solution.x[1], 0.25);
    }

    #[test]
    fn test_infeasible() {
        let outcome = LinearProgram::feasibility(2)
            .equal(vec![1.0, 1.0], 1.0)
            .greater_eq(vec![1.0, 0.0], 2.0)
            .solve()
            .unwrap();
        assert_eq!(outcome, LpOutcome::Infeasible);
    }

    #[test]
    fn test_unbounded() {
        let outcome = LinearProgram::maximize(vec![1.0, 0.0])
            .greater_eq(vec![1.0, -1.0], 0.0)
            .solve()
            .unwrap();
        assert_eq!(outcome, LpOutcome::Unbounded);
    }

    #[test]
    fn test_negative_rhs_is_normalized() {
        // -x <= -2  <=>  x >= 2 ; max -x
        let solution = LinearProgram::maximize(vec![-1.0])
            .less_eq(vec![-1.0], -2.0)
            .solve()
            .unwrap()
            .optimal()
            .expect("Expected optimum");
        assert_close(solution.x[0], 2.0);
    }

    #[test]
    fn test_redundant_equalities() {
        let solution = LinearProgram::maximize(vec![1.0, 1.0])
            .equal(vec![1.0, 1.0], 1.0)
            .equal(vec![2.0, 2.0], 2.0)
            .solve()
            .unwrap()
            .optimal()
            .expect("Expected optimum");
        assert_close(solution.value, 1.0);
    }

    #[test]
    fn test_row_length_checked() {
        let err = LinearProgram::maximize(vec![1.0, 1.0])
            .less_eq(vec![1.0], 1.0)
            .solve()
            .unwrap_err();
        assert!(matches!(err, GeometryError::DimensionMismatch { .. }));
    }
}
