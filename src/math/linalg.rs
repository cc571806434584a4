use serde::{Serialize, Deserialize};

use crate::error::{Error, Result};
use crate::math::matrix::Matrix;

/// Pivots whose magnitude falls below this are treated as zero.
pub const TOLERANCE: f64 = 1e-9;

/// Result of an LU decomposition with partial pivoting: `L·U = P·A`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LuDecomposition {
    /// Row permutation.
    pub p: Matrix,
    /// Lower triangular factor with a unit diagonal.
    pub l: Matrix,
    /// Upper triangular factor.
    pub u: Matrix,
    /// Number of row swaps performed; gives the sign of the determinant.
    pub swaps: usize,
}

impl Matrix {
    fn check_square(&self) -> Result<usize> {
        if self.rows() != self.cols() {
            return Err(Error::NotSquare { rows: self.rows(), cols: self.cols() });
        }
        Ok(self.rows())
    }

    /// Row in `[col, rows)` with the largest absolute value in column `col`.
    fn pivot_row(&self, col: usize) -> usize {
        let mut pivot = col;
        let mut max = self[(col, col)].abs();
        for r in col + 1..self.rows() {
            let v = self[(r, col)].abs();
            if max < v {
                max = v;
                pivot = r;
            }
        }
        pivot
    }

    /// row[target] <- row[target] + factor * row[source]
    fn add_scaled_row(&mut self, target: usize, factor: f64, source: usize) {
        for j in 0..self.cols() {
            let v = self[(source, j)];
            self[(target, j)] += factor * v;
        }
    }

    fn scale_row(&mut self, row: usize, factor: f64) {
        for j in 0..self.cols() {
            self[(row, j)] *= factor;
        }
    }

    /// LU decomposition with partial pivoting.
    ///
    /// Fails with `Error::Singular` when a pivot drops below `TOLERANCE` or
    /// the last row of `U` vanishes.
    pub fn lu(&self) -> Result<LuDecomposition> {
        let n = self.check_square()?;

        let mut p = Matrix::eye(n);
        let mut l = Matrix::zeros(n, n);
        let mut u = self.clone();
        let mut swaps = 0;

        for i in 0..n {
            let pivot = u.pivot_row(i);
            if pivot != i {
                p.swap_rows(pivot, i);
                l.swap_rows(pivot, i);
                u.swap_rows(pivot, i);
                swaps += 1;
            }

            let coef = u[(i, i)];
            if i + 1 < n && coef.abs() < TOLERANCE {
                return Err(Error::Singular);
            }
            for j in i + 1..n {
                let factor = u[(j, i)] / coef;
                l[(j, i)] = factor;
                for k in i..n {
                    let v = u[(i, k)];
                    u[(j, k)] -= factor * v;
                }
            }
        }

        if n > 0 && u.row(n - 1).iter().all(|x| x.abs() <= TOLERANCE) {
            return Err(Error::Singular);
        }

        for i in 0..n {
            l[(i, i)] = 1.0;
        }

        Ok(LuDecomposition { p, l, u, swaps })
    }

    /// Determinant via LU. A singular matrix has determinant `0.0`.
    pub fn det(&self) -> Result<f64> {
        let n = self.check_square()?;
        if n == 1 {
            return Ok(self[(0, 0)]);
        }

        let lu = match self.lu() {
            Ok(lu) => lu,
            Err(Error::Singular) => return Ok(0.0),
            Err(e) => return Err(e),
        };

        let det: f64 = (0..n).map(|i| lu.u[(i, i)]).product();
        let sign = if lu.swaps % 2 == 0 { 1.0 } else { -1.0 };
        Ok(sign * det)
    }

    /// Inverse by Gauss-Jordan elimination with partial pivoting.
    pub fn inv(&self) -> Result<Matrix> {
        let n = self.check_square()?;

        let mut b = self.clone();
        let mut inv = Matrix::eye(n);

        for i in 0..n {
            let pivot = b.pivot_row(i);
            if pivot != i {
                b.swap_rows(pivot, i);
                inv.swap_rows(pivot, i);
            }

            let coef = b[(i, i)];
            if coef.abs() < TOLERANCE {
                return Err(Error::Singular);
            }
            b.scale_row(i, 1.0 / coef);
            inv.scale_row(i, 1.0 / coef);

            for r in 0..n {
                if r == i {
                    continue;
                }
                let factor = -b[(r, i)];
                b.add_scaled_row(r, factor, i);
                inv.add_scaled_row(r, factor, i);
            }
        }

        Ok(inv)
    }

    /// Solves `self · x = b` as `inv(self) · b`.
    pub fn solve(&self, b: &Matrix) -> Result<Matrix> {
        self.inv()?.prod(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn m(rows: Vec<Vec<f64>>) -> Matrix {
        Matrix::from_rows(rows).unwrap()
    }

    fn assert_close(a: &Matrix, b: &Matrix) {
        assert_eq!(a.shape(), b.shape());
        for (x, y) in a.as_slice().iter().zip(b.as_slice()) {
            assert_abs_diff_eq!(*x, *y, epsilon = 1e-6);
        }
    }

    #[test]
    fn lu_reconstructs_permuted_matrix() {
        let a = m(vec![
            vec![2.0, 1.0, 1.0],
            vec![4.0, -6.0, 0.0],
            vec![-2.0, 7.0, 2.0],
        ]);
        let lu = a.lu().unwrap();
        assert_close(&lu.l.prod(&lu.u).unwrap(), &lu.p.prod(&a).unwrap());

        for i in 0..3 {
            assert_eq!(lu.l[(i, i)], 1.0);
            for j in i + 1..3 {
                assert_eq!(lu.l[(i, j)], 0.0);
                assert_abs_diff_eq!(lu.u[(j, i)], 0.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn lu_counts_row_swaps() {
        let a = m(vec![vec![0.0, 1.0], vec![1.0, 0.0]]);
        let lu = a.lu().unwrap();
        assert_eq!(lu.swaps, 1);
        assert_eq!(lu.p, a);
    }

    #[test]
    fn lu_rejects_non_square_and_singular() {
        assert!(matches!(Matrix::zeros(2, 3).lu(), Err(Error::NotSquare { rows: 2, cols: 3 })));
        let s = m(vec![vec![1.0, 2.0], vec![2.0, 4.0]]);
        assert!(matches!(s.lu(), Err(Error::Singular)));
    }

    #[test]
    fn det_of_small_matrices() {
        assert_abs_diff_eq!(m(vec![vec![-3.5]]).det().unwrap(), -3.5);
        assert_abs_diff_eq!(m(vec![vec![3.0, 8.0], vec![4.0, 6.0]]).det().unwrap(), -14.0, epsilon = 1e-6);
        let a = m(vec![
            vec![6.0, 1.0, 1.0],
            vec![4.0, -2.0, 5.0],
            vec![2.0, 8.0, 7.0],
        ]);
        assert_abs_diff_eq!(a.det().unwrap(), -306.0, epsilon = 1e-6);
    }

    #[test]
    fn det_of_singular_matrix_is_zero() {
        let a = m(vec![
            vec![1.0, 2.0, 3.0],
            vec![1.0, 2.0, 3.0],
            vec![4.0, 5.0, 6.0],
        ]);
        assert_eq!(a.det().unwrap(), 0.0);
    }

    #[test]
    fn inverse_round_trip() {
        let a = m(vec![
            vec![4.0, 7.0, 2.0],
            vec![3.0, 6.0, 1.0],
            vec![2.0, 5.0, 3.0],
        ]);
        let inv = a.inv().unwrap();
        assert_close(&a.prod(&inv).unwrap(), &Matrix::eye(3));
        assert_close(&inv.prod(&a).unwrap(), &Matrix::eye(3));
    }

    #[test]
    fn inverse_needs_pivoting_when_leading_entry_is_zero() {
        let a = m(vec![vec![0.0, 2.0], vec![3.0, 1.0]]);
        let inv = a.inv().unwrap();
        assert_close(&a.prod(&inv).unwrap(), &Matrix::eye(2));
    }

    #[test]
    fn inverse_of_matrix_with_identical_rows_fails() {
        let a = m(vec![
            vec![1.0, 2.0, 3.0],
            vec![0.0, 1.0, 4.0],
            vec![1.0, 2.0, 3.0],
        ]);
        assert!(matches!(a.inv(), Err(Error::Singular)));
        assert_eq!(a.det().unwrap(), 0.0);
    }

    #[test]
    fn solve_linear_system() {
        let a = m(vec![
            vec![2.0, 1.0, -1.0],
            vec![-3.0, -1.0, 2.0],
            vec![-2.0, 1.0, 2.0],
        ]);
        let b = m(vec![vec![8.0], vec![-11.0], vec![-3.0]]);
        let x = a.solve(&b).unwrap();
        assert_close(&x, &m(vec![vec![2.0], vec![3.0], vec![-1.0]]));
        assert_close(&a.prod(&x).unwrap(), &b);
    }

    #[test]
    fn solve_with_singular_matrix_fails() {
        let a = m(vec![vec![1.0, 1.0], vec![1.0, 1.0]]);
        let b = m(vec![vec![1.0], vec![2.0]]);
        assert!(a.solve(&b).is_err());
    }
}
