use serde::{Serialize, Deserialize};
use std::fmt;
use std::ops::{Add, Sub, Mul, Index, IndexMut};

use crate::error::{Error, Result};
use crate::random::prng::Prng;

/// Dense row-major matrix of `f64`.
///
/// The shape is fixed at construction; every operation that produces a
/// different shape allocates a new matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMatrix")]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

/// Unchecked wire form; validated into a `Matrix` on deserialization.
#[derive(Deserialize)]
struct RawMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl TryFrom<RawMatrix> for Matrix {
    type Error = Error;

    fn try_from(raw: RawMatrix) -> Result<Matrix> {
        Matrix::from_vec(raw.rows, raw.cols, raw.data)
    }
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Identity matrix of order `n`.
    pub fn eye(n: usize) -> Matrix {
        let mut res = Matrix::zeros(n, n);
        for i in 0..n {
            res[(i, i)] = 1.0;
        }
        res
    }

    /// Builds a matrix from a row-major buffer of exactly `rows * cols` values.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Result<Matrix> {
        if data.len() != rows * cols {
            return Err(Error::InvalidArgument(format!(
                "buffer of {} values cannot fill a ({}, {}) matrix",
                data.len(),
                rows,
                cols
            )));
        }
        Ok(Matrix { rows, cols, data })
    }

    /// Builds a matrix from nested rows. All rows must have the same length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Matrix> {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(n_rows * n_cols);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != n_cols {
                return Err(Error::InvalidArgument(format!(
                    "row {} has {} columns, expected {}",
                    i,
                    row.len(),
                    n_cols
                )));
            }
            data.extend(row);
        }
        Ok(Matrix { rows: n_rows, cols: n_cols, data })
    }

    /// Samples every entry independently from N(mean, std_dev²).
    pub fn normal(rows: usize, cols: usize, mean: f64, std_dev: f64, prng: &mut dyn Prng) -> Matrix {
        let mut res = Matrix::zeros(rows, cols);
        for x in res.data.iter_mut() {
            *x = prng.normal(mean, std_dev);
        }
        res
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Row-major view of all entries.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Entries of row `i`.
    ///
    /// # Panics
    /// If `i >= rows`. Use `get` for a checked read.
    pub fn row(&self, i: usize) -> &[f64] {
        assert!(i < self.rows, "row {i} out of bounds for ({}, {})", self.rows, self.cols);
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn get(&self, i: usize, j: usize) -> Result<f64> {
        self.check_index(i, j)?;
        Ok(self.data[i * self.cols + j])
    }

    /// Writes one entry; an out-of-range index leaves the matrix untouched.
    pub fn set(&mut self, i: usize, j: usize, value: f64) -> Result<()> {
        self.check_index(i, j)?;
        self.data[i * self.cols + j] = value;
        Ok(())
    }

    fn check_index(&self, i: usize, j: usize) -> Result<()> {
        if i >= self.rows || j >= self.cols {
            return Err(Error::OutOfBounds {
                row: i,
                col: j,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(())
    }

    fn check_same_shape(&self, rhs: &Matrix, op: &'static str) -> Result<()> {
        if self.shape() != rhs.shape() {
            return Err(Error::ShapeMismatch {
                op,
                left: self.shape(),
                right: rhs.shape(),
            });
        }
        Ok(())
    }

    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|&x| functor(x)).collect(),
        }
    }

    fn zip_with<F>(&self, rhs: &Matrix, op: &'static str, functor: F) -> Result<Matrix>
    where
        F: Fn(f64, f64) -> f64,
    {
        self.check_same_shape(rhs, op)?;
        Ok(Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().zip(rhs.data.iter()).map(|(&a, &b)| functor(a, b)).collect(),
        })
    }

    /// Element-wise `self + rhs`.
    pub fn sum(&self, rhs: &Matrix) -> Result<Matrix> {
        self.zip_with(rhs, "sum", |a, b| a + b)
    }

    /// Element-wise `self - rhs`.
    pub fn dif(&self, rhs: &Matrix) -> Result<Matrix> {
        self.zip_with(rhs, "dif", |a, b| a - b)
    }

    /// Element-wise (Hadamard) product.
    pub fn hadamard(&self, rhs: &Matrix) -> Result<Matrix> {
        self.zip_with(rhs, "hadamard", |a, b| a * b)
    }

    /// Matrix product `self · rhs`; requires `self.cols == rhs.rows`.
    pub fn prod(&self, rhs: &Matrix) -> Result<Matrix> {
        if self.cols != rhs.rows {
            return Err(Error::ShapeMismatch {
                op: "prod",
                left: self.shape(),
                right: rhs.shape(),
            });
        }

        let mut res = Matrix::zeros(self.rows, rhs.cols);

        for i in 0..res.rows {
            for j in 0..res.cols {
                let mut sum = 0.0;

                for k in 0..self.cols {
                    sum += self[(i, k)] * rhs[(k, j)];
                }

                res[(i, j)] = sum;
            }
        }

        Ok(res)
    }

    pub fn scale(&self, factor: f64) -> Matrix {
        self.map(|x| x * factor)
    }

    pub fn transpose(&self) -> Matrix {
        let mut res = Matrix::zeros(self.cols, self.rows);

        for i in 0..res.rows {
            for j in 0..res.cols {
                res[(i, j)] = self[(j, i)];
            }
        }

        res
    }

    /// Writes the transpose into a caller-provided `(cols, rows)` matrix.
    pub fn transpose_into(&self, out: &mut Matrix) -> Result<()> {
        if out.shape() != (self.cols, self.rows) {
            return Err(Error::ShapeMismatch {
                op: "transpose",
                left: self.shape(),
                right: out.shape(),
            });
        }
        for i in 0..out.rows {
            for j in 0..out.cols {
                out[(i, j)] = self[(j, i)];
            }
        }
        Ok(())
    }

    /// Sum of the `min(rows, cols)` diagonal entries.
    pub fn trace(&self) -> f64 {
        (0..self.rows.min(self.cols)).map(|i| self[(i, i)]).sum()
    }

    /// Mean of each column, as a `(cols, 1)` column vector.
    pub fn column_mean(&self) -> Matrix {
        let mut res = Matrix::zeros(self.cols, 1);
        if self.rows == 0 {
            return res;
        }
        for j in 0..self.cols {
            let sum: f64 = (0..self.rows).map(|i| self[(i, j)]).sum();
            res[(j, 0)] = sum / self.rows as f64;
        }
        res
    }

    /// Scales every column by its maximum value.
    ///
    /// This is the plain maximum, not the maximum absolute value: a column
    /// whose largest entry is negative gets its signs flipped. Columns whose
    /// maximum is exactly zero are copied unchanged.
    pub fn normalize(&self) -> Matrix {
        let mut res = self.clone();
        for j in 0..self.cols {
            let max = (0..self.rows)
                .map(|i| self[(i, j)])
                .fold(f64::NEG_INFINITY, f64::max);
            if max == 0.0 || !max.is_finite() {
                continue;
            }
            for i in 0..self.rows {
                res[(i, j)] = self[(i, j)] / max;
            }
        }
        res
    }

    /// Rewrites every row as the one-hot encoding of its argmax column.
    ///
    /// Ties go to the first maximal column. Used to turn predicted
    /// probabilities into hard class predictions.
    pub fn softmax_rows(&mut self) {
        for i in 0..self.rows {
            let index = argmax(self.row(i));
            for j in 0..self.cols {
                self[(i, j)] = if j == index { 1.0 } else { 0.0 };
            }
        }
    }

    pub(crate) fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for j in 0..self.cols {
            self.data.swap(a * self.cols + j, b * self.cols + j);
        }
    }

    /// Confusion matrix of one-hot encoded predictions against one-hot targets.
    ///
    /// Entry `(t, p)` counts rows whose target class is `t` and predicted class
    /// is `p`. The hot column is the first entry exactly equal to `1.0`; a row
    /// without one counts as class 0.
    pub fn confusion(yhat: &Matrix, y: &Matrix) -> Result<Matrix> {
        yhat.check_same_shape(y, "confusion")?;

        let hot = |row: &[f64]| row.iter().position(|&v| v == 1.0).unwrap_or(0);

        let mut report = Matrix::zeros(y.cols, y.cols);
        if y.cols == 0 {
            return Ok(report);
        }
        for i in 0..y.rows {
            let target = hot(y.row(i));
            let predicted = hot(yhat.row(i));
            report[(target, predicted)] += 1.0;
        }
        Ok(report)
    }
}

/// Index of the first maximal element in a slice.
pub(crate) fn argmax(v: &[f64]) -> usize {
    let mut index = 0;
    for (j, &x) in v.iter().enumerate() {
        if x > v[index] {
            index = j;
        }
    }
    index
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.rows {
            let cells: Vec<String> = self.row(i).iter().map(|v| format!("{v:>10.4}")).collect();
            writeln!(f, "[{} ]", cells.join(""))?;
        }
        Ok(())
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        assert!(i < self.rows && j < self.cols, "index ({i}, {j}) out of bounds for ({}, {})", self.rows, self.cols);
        &self.data[i * self.cols + j]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f64 {
        assert!(i < self.rows && j < self.cols, "index ({i}, {j}) out of bounds for ({}, {})", self.rows, self.cols);
        &mut self.data[i * self.cols + j]
    }
}

// ---------------------------------------------------------------------------
// Operators. These panic on shape mismatch; use `sum`/`dif`/`prod` to get an
// error instead.
// ---------------------------------------------------------------------------

impl Add for &Matrix {
    type Output = Matrix;

    fn add(self, rhs: Self) -> Matrix {
        match self.sum(rhs) {
            Ok(res) => res,
            Err(e) => panic!("{e}"),
        }
    }
}

impl Sub for &Matrix {
    type Output = Matrix;

    fn sub(self, rhs: Self) -> Matrix {
        match self.dif(rhs) {
            Ok(res) => res,
            Err(e) => panic!("{e}"),
        }
    }
}

impl Mul for &Matrix {
    type Output = Matrix;

    fn mul(self, rhs: Self) -> Matrix {
        match self.prod(rhs) {
            Ok(res) => res,
            Err(e) => panic!("{e}"),
        }
    }
}

impl Add for Matrix {
    type Output = Matrix;

    fn add(self, rhs: Self) -> Matrix {
        &self + &rhs
    }
}

impl Sub for Matrix {
    type Output = Matrix;

    fn sub(self, rhs: Self) -> Matrix {
        &self - &rhs
    }
}

impl Mul for Matrix {
    type Output = Matrix;

    fn mul(self, rhs: Self) -> Matrix {
        &self * &rhs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn m(rows: Vec<Vec<f64>>) -> Matrix {
        Matrix::from_rows(rows).unwrap()
    }

    #[test]
    fn zeros_and_eye() {
        let z = Matrix::zeros(2, 3);
        assert_eq!(z.shape(), (2, 3));
        assert!(z.as_slice().iter().all(|&x| x == 0.0));

        let i = Matrix::eye(3);
        assert_eq!(i.trace(), 3.0);
        assert_eq!(i[(0, 1)], 0.0);
    }

    #[test]
    fn get_and_set_are_bounds_checked() {
        let mut a = Matrix::zeros(2, 2);
        a.set(1, 0, 4.0).unwrap();
        assert_eq!(a.get(1, 0).unwrap(), 4.0);

        assert!(matches!(a.get(2, 0), Err(Error::OutOfBounds { row: 2, col: 0, rows: 2, cols: 2 })));
        assert!(a.set(0, 5, 1.0).is_err());
        assert_eq!(a, m(vec![vec![0.0, 0.0], vec![4.0, 0.0]]));
    }

    #[test]
    fn from_rows_rejects_ragged_input() {
        assert!(Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).is_err());
        assert!(Matrix::from_vec(2, 2, vec![1.0; 3]).is_err());
    }

    #[test]
    fn elementwise_arithmetic() {
        let a = m(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        let b = m(vec![vec![5.0, 6.0], vec![7.0, 8.0]]);

        assert_eq!(a.sum(&b).unwrap(), m(vec![vec![6.0, 8.0], vec![10.0, 12.0]]));
        assert_eq!(b.dif(&a).unwrap(), m(vec![vec![4.0, 4.0], vec![4.0, 4.0]]));
        assert_eq!(a.hadamard(&b).unwrap(), m(vec![vec![5.0, 12.0], vec![21.0, 32.0]]));
    }

    #[test]
    fn elementwise_arithmetic_rejects_mismatched_shapes() {
        let a = Matrix::zeros(2, 2);
        let b = Matrix::zeros(2, 3);
        assert!(matches!(a.sum(&b), Err(Error::ShapeMismatch { op: "sum", .. })));
        assert!(a.dif(&b).is_err());
        assert!(a.hadamard(&b).is_err());
    }

    #[test]
    fn product_of_compatible_matrices() {
        let a = m(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
        let b = m(vec![vec![7.0, 8.0], vec![9.0, 10.0], vec![11.0, 12.0]]);
        let p = a.prod(&b).unwrap();
        assert_eq!(p, m(vec![vec![58.0, 64.0], vec![139.0, 154.0]]));
        assert_eq!(&a * &b, p);
    }

    #[test]
    fn product_rejects_incompatible_matrices() {
        let a = Matrix::zeros(2, 3);
        let b = Matrix::zeros(2, 3);
        assert!(matches!(
            a.prod(&b),
            Err(Error::ShapeMismatch { op: "prod", left: (2, 3), right: (2, 3) })
        ));
    }

    #[test]
    #[should_panic]
    fn add_operator_panics_on_mismatch() {
        let _ = Matrix::zeros(1, 2) + Matrix::zeros(2, 1);
    }

    #[test]
    fn transpose_twice_is_identity() {
        let a = m(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
        let t = a.transpose();
        assert_eq!(t.shape(), (3, 2));
        assert_eq!(t[(2, 0)], 3.0);
        assert_eq!(t.transpose(), a);
    }

    #[test]
    fn transpose_into_checks_output_shape() {
        let a = m(vec![vec![1.0, 2.0, 3.0]]);
        let mut good = Matrix::zeros(3, 1);
        a.transpose_into(&mut good).unwrap();
        assert_eq!(good, a.transpose());

        let mut bad = Matrix::zeros(1, 3);
        assert!(a.transpose_into(&mut bad).is_err());
    }

    #[test]
    fn trace_of_rectangular_matrix_uses_shorter_diagonal() {
        let a = m(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
        assert_eq!(a.trace(), 6.0);
    }

    #[test]
    fn column_mean_is_a_column_vector() {
        let a = m(vec![vec![1.0, 2.0], vec![3.0, 6.0]]);
        assert_eq!(a.column_mean(), m(vec![vec![2.0], vec![4.0]]));
    }

    #[test]
    fn normalize_divides_each_column_by_its_maximum() {
        let a = m(vec![vec![1.0, 0.0, -2.0], vec![4.0, 0.0, -1.0]]);
        let n = a.normalize();
        assert_relative_eq!(n[(0, 0)], 0.25);
        assert_relative_eq!(n[(1, 0)], 1.0);
        // all-zero column stays as is
        assert_eq!(n[(0, 1)], 0.0);
        // maximum of an all-negative column is -1
        assert_relative_eq!(n[(0, 2)], 2.0);
        assert_relative_eq!(n[(1, 2)], 1.0);
    }

    #[test]
    fn softmax_rows_collapses_to_one_hot() {
        let mut a = m(vec![vec![0.1, 0.7, 0.2], vec![0.5, 0.5, 0.0], vec![-3.0, -1.0, -2.0]]);
        a.softmax_rows();
        assert_eq!(
            a,
            m(vec![vec![0.0, 1.0, 0.0], vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]])
        );
    }

    #[test]
    fn confusion_counts_target_against_prediction() {
        let yhat = m(vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0]]);
        let y = m(vec![vec![1.0, 0.0], vec![1.0, 0.0], vec![0.0, 1.0]]);
        let conf = Matrix::confusion(&yhat, &y).unwrap();
        assert_eq!(conf, m(vec![vec![1.0, 1.0], vec![1.0, 0.0]]));
    }

    #[test]
    fn confusion_defaults_rows_without_a_hot_entry_to_class_zero() {
        let yhat = m(vec![vec![0.4, 0.6]]);
        let y = m(vec![vec![0.0, 1.0]]);
        let conf = Matrix::confusion(&yhat, &y).unwrap();
        assert_eq!(conf[(1, 0)], 1.0);
        assert!(Matrix::confusion(&Matrix::zeros(1, 2), &Matrix::zeros(2, 2)).is_err());
    }

    #[test]
    fn deserialization_validates_the_buffer() {
        let ok: Matrix = serde_json::from_str(r#"{"rows":1,"cols":2,"data":[1.0,2.0]}"#).unwrap();
        assert_eq!(ok.shape(), (1, 2));
        let bad = serde_json::from_str::<Matrix>(r#"{"rows":2,"cols":2,"data":[1.0]}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn display_one_row_per_line() {
        let text = Matrix::eye(2).to_string();
        assert_eq!(text, "[    1.0000    0.0000 ]\n[    0.0000    1.0000 ]\n");
    }

    #[test]
    #[should_panic(expected = "row 2 out of bounds")]
    fn row_panics_past_the_last_row() {
        let a = Matrix::zeros(2, 3);
        let _ = a.row(2);
    }
}
