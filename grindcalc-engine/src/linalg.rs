//! Dense linear algebra for the cycle solver.
//!
//! Problems here are a few dozen rows and columns at most, so everything is a
//! plain row-major `Vec<f64>` with no blocking or sparsity.
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

use crate::constants::{SIMPLEX_EPS, SIMPLEX_FEASIBILITY_EPS, SVD_MAX_SWEEPS};
use crate::error::{GrindError, OptimizerError};
use crate::numbers::count_to_f64;

/// Row-major dense matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    #[must_use]
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    #[must_use]
    pub fn identity(size: usize) -> Self {
        let mut matrix = Self::zeros(size, size);
        for i in 0..size {
            matrix[(i, i)] = 1.0;
        }
        matrix
    }

    /// Build from equally long rows.
    ///
    /// # Errors
    ///
    /// Returns [`GrindError::LengthMismatch`] when a row differs in length
    /// from the first.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, GrindError> {
        let cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            if row.len() != cols {
                return Err(GrindError::LengthMismatch {
                    what: "matrix row",
                    left: cols,
                    right: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            data,
        })
    }

    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    #[must_use]
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    #[must_use]
    pub fn column(&self, j: usize) -> Vec<f64> {
        (0..self.rows).map(|i| self[(i, j)]).collect()
    }

    /// Rows `start..` as a new matrix.
    #[must_use]
    pub fn rows_from(&self, start: usize) -> Self {
        let start = start.min(self.rows);
        Self {
            rows: self.rows - start,
            cols: self.cols,
            data: self.data[start * self.cols..].to_vec(),
        }
    }

    /// Matrix-vector product.
    ///
    /// # Errors
    ///
    /// Returns [`GrindError::LengthMismatch`] when `x` does not match the
    /// column count.
    pub fn mul_vec(&self, x: &[f64]) -> Result<Vec<f64>, GrindError> {
        if x.len() != self.cols {
            return Err(GrindError::LengthMismatch {
                what: "matrix-vector product",
                left: self.cols,
                right: x.len(),
            });
        }
        Ok((0..self.rows).map(|i| dot(self.row(i), x)).collect())
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        &self.data[i * self.cols + j]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f64 {
        &mut self.data[i * self.cols + j]
    }
}

#[must_use]
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[must_use]
pub fn norm(a: &[f64]) -> f64 {
    dot(a, a).sqrt()
}

/// Singular values and right singular vectors of an `m x n` matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Svd {
    /// All `n` singular values, descending. Padded with zeros when `m < n`.
    pub singular_values: Vec<f64>,
    /// `n x n`; column `j` pairs with `singular_values[j]`.
    pub v: Matrix,
}

impl Svd {
    /// Columns of `v` spanning the null space of the decomposed `rows x n` matrix.
    ///
    /// The `n - min(rows, n)` trailing values are zero by rank. Of the rest, a
    /// value counts as zero when it is at most
    /// `tolerance * max(rows, n) * max(1, sigma_max)`.
    #[must_use]
    pub fn null_space(&self, rows: usize, tolerance: f64) -> Vec<Vec<f64>> {
        let n = self.singular_values.len();
        let rank_bound = rows.min(n);
        let sigma_max = self.singular_values.first().copied().unwrap_or(0.0);
        let threshold = tolerance * count_to_f64(rows.max(n)) * sigma_max.max(1.0);
        self.singular_values
            .iter()
            .enumerate()
            .filter(|&(j, sigma)| j >= rank_bound || *sigma <= threshold)
            .map(|(j, _)| self.v.column(j))
            .collect()
    }
}

/// One-sided Jacobi SVD.
///
/// Orthogonalizes the columns of `a` by plane rotations, accumulating the
/// rotations in `v`. The column norms of the rotated matrix are the singular
/// values.
#[must_use]
pub fn svd(a: &Matrix) -> Svd {
    let (m, n) = (a.rows(), a.cols());
    let mut u = a.clone();
    let mut v = Matrix::identity(n);

    for sweep in 0..SVD_MAX_SWEEPS {
        let mut rotated = false;
        for p in 0..n {
            for q in (p + 1)..n {
                let (mut alpha, mut beta, mut gamma) = (0.0, 0.0, 0.0);
                for i in 0..m {
                    let (up, uq) = (u[(i, p)], u[(i, q)]);
                    alpha += up * up;
                    beta += uq * uq;
                    gamma += up * uq;
                }
                if gamma == 0.0 || gamma.abs() <= f64::EPSILON * (alpha * beta).sqrt() {
                    continue;
                }
                rotated = true;
                let zeta = (beta - alpha) / (2.0 * gamma);
                let t = zeta.signum() / (zeta.abs() + zeta.mul_add(zeta, 1.0).sqrt());
                let c = 1.0 / t.mul_add(t, 1.0).sqrt();
                let s = c * t;
                rotate(&mut u, p, q, c, s);
                rotate(&mut v, p, q, c, s);
            }
        }
        if !rotated {
            log::trace!("jacobi svd converged after {} sweeps", sweep + 1);
            break;
        }
    }

    let mut order: Vec<(f64, usize)> = (0..n).map(|j| (norm(&u.column(j)), j)).collect();
    order.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));

    let mut sorted_v = Matrix::zeros(n, n);
    for (dest, &(_, src)) in order.iter().enumerate() {
        for i in 0..n {
            sorted_v[(i, dest)] = v[(i, src)];
        }
    }
    Svd {
        singular_values: order.into_iter().map(|(sigma, _)| sigma).collect(),
        v: sorted_v,
    }
}

fn rotate(matrix: &mut Matrix, p: usize, q: usize, c: f64, s: f64) {
    for i in 0..matrix.rows() {
        let (xp, xq) = (matrix[(i, p)], matrix[(i, q)]);
        matrix[(i, p)] = c * xp - s * xq;
        matrix[(i, q)] = s * xp + c * xq;
    }
}

/// `minimize objective . x` subject to `constraints x = rhs`, `x >= 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearProgram {
    pub objective: Vec<f64>,
    pub constraints: Matrix,
    pub rhs: Vec<f64>,
}

/// Optimal point and value of a [`LinearProgram`].
#[derive(Debug, Clone, PartialEq)]
pub struct LpSolution {
    pub x: Vec<f64>,
    pub value: f64,
    pub pivots: usize,
}

struct Tableau {
    /// `m` constraint rows then the cost row; last column is the right-hand side.
    cells: Matrix,
    basis: Vec<usize>,
    /// Columns at or past this index are artificial and never enter.
    artificial_from: usize,
    pivots: usize,
    max_pivots: usize,
}

impl Tableau {
    fn rhs_col(&self) -> usize {
        self.cells.cols() - 1
    }

    fn cost_row(&self) -> usize {
        self.cells.rows() - 1
    }

    fn pivot(&mut self, row: usize, col: usize) {
        let width = self.cells.cols();
        let pivot = self.cells[(row, col)];
        for j in 0..width {
            self.cells[(row, j)] /= pivot;
        }
        for i in 0..self.cells.rows() {
            if i == row {
                continue;
            }
            let factor = self.cells[(i, col)];
            if factor == 0.0 {
                continue;
            }
            for j in 0..width {
                let delta = factor * self.cells[(row, j)];
                self.cells[(i, j)] -= delta;
            }
        }
        self.basis[row] = col;
        self.pivots += 1;
    }

    /// Run simplex iterations with Bland's rule until optimal.
    fn optimize(&mut self) -> Result<(), OptimizerError> {
        let cost = self.cost_row();
        let rhs = self.rhs_col();
        loop {
            let Some(col) = (0..self.artificial_from).find(|&j| self.cells[(cost, j)] < -SIMPLEX_EPS)
            else {
                return Ok(());
            };
            if self.pivots >= self.max_pivots {
                return Err(OptimizerError::IterationLimit {
                    iterations: self.pivots,
                });
            }
            let mut leaving: Option<(usize, f64)> = None;
            for i in 0..cost {
                let coefficient = self.cells[(i, col)];
                if coefficient <= SIMPLEX_EPS {
                    continue;
                }
                let ratio = self.cells[(i, rhs)] / coefficient;
                leaving = match leaving {
                    Some((best, best_ratio))
                        if ratio > best_ratio + SIMPLEX_EPS
                            || ((ratio - best_ratio).abs() <= SIMPLEX_EPS
                                && self.basis[i] > self.basis[best]) =>
                    {
                        Some((best, best_ratio))
                    }
                    _ => Some((i, ratio)),
                };
            }
            let Some((row, _)) = leaving else {
                return Err(OptimizerError::Unbounded);
            };
            self.pivot(row, col);
        }
    }

    fn load_costs(&mut self, costs: &[f64]) {
        let cost = self.cost_row();
        for j in 0..self.cells.cols() {
            self.cells[(cost, j)] = costs.get(j).copied().unwrap_or(0.0);
        }
        for i in 0..cost {
            let basic_cost = costs.get(self.basis[i]).copied().unwrap_or(0.0);
            if basic_cost == 0.0 {
                continue;
            }
            for j in 0..self.cells.cols() {
                let delta = basic_cost * self.cells[(i, j)];
                self.cells[(cost, j)] -= delta;
            }
        }
    }
}

/// Dense two-phase simplex with Bland's anti-cycling rule.
///
/// # Errors
///
/// - [`OptimizerError::NoPositiveGain`] when the constraints are infeasible.
/// - [`OptimizerError::Unbounded`] when the objective has no lower bound.
/// - [`OptimizerError::IterationLimit`] when `max_pivots` runs out.
pub fn minimize(lp: &LinearProgram, max_pivots: usize) -> Result<LpSolution, OptimizerError> {
    let m = lp.constraints.rows();
    let n = lp.constraints.cols();
    let mut cells = Matrix::zeros(m + 1, n + m + 1);
    for i in 0..m {
        // Artificials need a non-negative right-hand side.
        let sign = if lp.rhs[i] < 0.0 { -1.0 } else { 1.0 };
        for j in 0..n {
            cells[(i, j)] = sign * lp.constraints[(i, j)];
        }
        cells[(i, n + i)] = 1.0;
        cells[(i, n + m)] = sign * lp.rhs[i];
    }
    let mut tableau = Tableau {
        cells,
        basis: (n..n + m).collect(),
        artificial_from: n,
        pivots: 0,
        max_pivots,
    };

    // Phase one: drive the artificials to zero.
    let mut phase_one = vec![0.0; n + m];
    phase_one[n..].fill(1.0);
    tableau.artificial_from = n + m;
    tableau.load_costs(&phase_one);
    tableau.optimize()?;
    let infeasibility = -tableau.cells[(m, n + m)];
    if infeasibility > SIMPLEX_FEASIBILITY_EPS {
        log::debug!("phase one ended with infeasibility {infeasibility:e}");
        return Err(OptimizerError::NoPositiveGain);
    }

    // Pivot remaining zero-valued artificials out where a real column allows.
    tableau.artificial_from = n;
    for row in 0..m {
        if tableau.basis[row] < n {
            continue;
        }
        if let Some(col) = (0..n).find(|&j| tableau.cells[(row, j)].abs() > SIMPLEX_EPS) {
            tableau.pivot(row, col);
        }
    }

    // Phase two.
    tableau.load_costs(&lp.objective);
    tableau.optimize()?;

    let mut x = vec![0.0; n];
    for (row, &col) in tableau.basis.iter().enumerate() {
        if col < n {
            x[col] = tableau.cells[(row, n + m)].max(0.0);
        }
    }
    Ok(LpSolution {
        value: dot(&lp.objective, &x),
        x,
        pivots: tableau.pivots,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn matrix(rows: &[&[f64]]) -> Matrix {
        Matrix::from_rows(&rows.iter().map(|r| r.to_vec()).collect::<Vec<_>>()).unwrap()
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(err, GrindError::LengthMismatch { left: 2, right: 1, .. }));
    }

    #[test]
    fn product_and_row_slices() {
        let a = matrix(&[&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]]);
        let tail = a.rows_from(1);
        assert_eq!(tail.rows(), 1);
        assert!((tail[(0, 2)] - 6.0).abs() < EPS);
        assert_eq!(a.mul_vec(&[1.0, 0.0, -1.0]).unwrap(), vec![-2.0, -2.0]);
        assert!(a.mul_vec(&[1.0]).is_err());
    }

    #[test]
    fn svd_recovers_diagonal_values() {
        let a = matrix(&[&[0.0, 3.0], &[4.0, 0.0]]);
        let svd = svd(&a);
        assert!((svd.singular_values[0] - 4.0).abs() < EPS);
        assert!((svd.singular_values[1] - 3.0).abs() < EPS);
    }

    #[test]
    fn null_space_of_wide_matrix() {
        // x + y - z = 0 and y - z = 0 leave (0, 1, 1) free.
        let a = matrix(&[&[1.0, 1.0, -1.0], &[0.0, 1.0, -1.0]]);
        let svd = svd(&a);
        let kernel = svd.null_space(a.rows(), 5e-16);
        assert_eq!(kernel.len(), 1);
        let k = &kernel[0];
        assert!(k[0].abs() < EPS);
        assert!((k[1].abs() - k[2].abs()).abs() < EPS);
        assert!(a.mul_vec(k).unwrap().iter().all(|r| r.abs() < EPS));
        assert!((norm(k) - 1.0).abs() < EPS);
    }

    #[test]
    fn empty_matrix_has_full_kernel() {
        let a = Matrix::zeros(0, 3);
        let svd = svd(&a);
        assert_eq!(svd.null_space(0, 5e-16).len(), 3);
    }

    #[test]
    fn simplex_finds_vertex() {
        // min -x - y with x + 2y + s1 = 4, 3x + y + s2 = 6.
        let lp = LinearProgram {
            objective: vec![-1.0, -1.0, 0.0, 0.0],
            constraints: matrix(&[&[1.0, 2.0, 1.0, 0.0], &[3.0, 1.0, 0.0, 1.0]]),
            rhs: vec![4.0, 6.0],
        };
        let solution = minimize(&lp, 100).unwrap();
        assert!((solution.x[0] - 1.6).abs() < EPS);
        assert!((solution.x[1] - 1.2).abs() < EPS);
        assert!((solution.value + 2.8).abs() < EPS);
    }

    #[test]
    fn simplex_reports_infeasible_and_unbounded() {
        let infeasible = LinearProgram {
            objective: vec![1.0],
            constraints: matrix(&[&[1.0], &[1.0]]),
            rhs: vec![1.0, 2.0],
        };
        assert_eq!(minimize(&infeasible, 100), Err(OptimizerError::NoPositiveGain));

        let unbounded = LinearProgram {
            objective: vec![-1.0, 0.0],
            constraints: matrix(&[&[1.0, -1.0]]),
            rhs: vec![1.0],
        };
        assert_eq!(minimize(&unbounded, 100), Err(OptimizerError::Unbounded));
    }

    #[test]
    fn simplex_respects_pivot_budget() {
        let lp = LinearProgram {
            objective: vec![-1.0, -1.0, 0.0, 0.0],
            constraints: matrix(&[&[1.0, 2.0, 1.0, 0.0], &[3.0, 1.0, 0.0, 1.0]]),
            rhs: vec![4.0, 6.0],
        };
        assert!(matches!(
            minimize(&lp, 1),
            Err(OptimizerError::IterationLimit { .. })
        ));
    }

    #[test]
    fn redundant_rows_do_not_break_phase_two() {
        // Second row duplicates the first.
        let lp = LinearProgram {
            objective: vec![1.0, 2.0],
            constraints: matrix(&[&[1.0, 1.0], &[1.0, 1.0]]),
            rhs: vec![1.0, 1.0],
        };
        let solution = minimize(&lp, 100).unwrap();
        assert!((solution.x[0] - 1.0).abs() < EPS);
        assert!(solution.x[1].abs() < EPS);
    }
}
