use crate::error::{Error, Result};
use crate::math::matrix::Matrix;

pub struct BceLoss;

const EPS: f64 = 1e-12;

impl BceLoss {
    /// -sum(y·log(p+ε) + (1-y)·log(1-p+ε)) / m, m being the number of rows.
    pub fn loss(predicted: &Matrix, expected: &Matrix) -> Result<f64> {
        if predicted.shape() != expected.shape() {
            return Err(Error::ShapeMismatch {
                op: "binary cross-entropy",
                left: predicted.shape(),
                right: expected.shape(),
            });
        }
        let m = predicted.rows().max(1) as f64;
        let total: f64 = predicted.as_slice().iter().zip(expected.as_slice())
            .map(|(p, y)| -(y * (p + EPS).ln() + (1.0 - y) * (1.0 - p + EPS).ln()))
            .sum();
        Ok(total / m)
    }
}
