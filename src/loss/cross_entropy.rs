use crate::error::{Error, Result};
use crate::math::matrix::Matrix;

/// Categorical cross-entropy loss for use with a Softmax output layer.
pub struct CrossEntropyLoss;

/// Small epsilon added inside log() to prevent log(0) = -inf.
const EPS: f64 = 1e-12;

impl CrossEntropyLoss {
    /// Mean negative log-likelihood of the targets:
    ///   L = -trace(expectedᵀ · ln(predicted + eps)) / m
    ///
    /// `predicted`: softmax probabilities, shape (m, n_classes)
    /// `expected` : one-hot targets, same shape
    pub fn loss(predicted: &Matrix, expected: &Matrix) -> Result<f64> {
        if predicted.shape() != expected.shape() {
            return Err(Error::ShapeMismatch {
                op: "cross-entropy",
                left: predicted.shape(),
                right: expected.shape(),
            });
        }
        let log_prob = predicted.map(|p| (p + EPS).ln());
        let joint = expected.transpose().prod(&log_prob)?;
        let m = predicted.rows().max(1) as f64;
        Ok(-joint.trace() / m)
    }
}
