use serde::{Serialize, Deserialize};
use std::fmt;

use crate::error::Result;
use crate::loss::{bce::BceLoss, cross_entropy::CrossEntropyLoss, mse::MseLoss};
use crate::math::matrix::Matrix;

/// Selects the loss a `Sequential` model reports while training.
///
/// - `SquaredError`          : pair with Linear or Sigmoid output.
/// - `BinaryCrossEntropy`    : pair with Sigmoid output.
/// - `MultiClassCrossEntropy`: pair with Softmax output.
///
/// Whatever the kind, backpropagation starts from `predicted - expected`,
/// the combined gradient of each loss with its paired output activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossType {
    SquaredError,
    BinaryCrossEntropy,
    MultiClassCrossEntropy,
}

impl LossType {
    /// Scalar loss over a batch, computed by this kind.
    pub fn loss(&self, predicted: &Matrix, expected: &Matrix) -> Result<f64> {
        match self {
            LossType::SquaredError           => MseLoss::loss(predicted, expected),
            LossType::BinaryCrossEntropy     => BceLoss::loss(predicted, expected),
            LossType::MultiClassCrossEntropy => CrossEntropyLoss::loss(predicted, expected),
        }
    }

    /// Error at the output layer that seeds the backward pass.
    pub fn output_error(&self, predicted: &Matrix, expected: &Matrix) -> Result<Matrix> {
        predicted.dif(expected)
    }

    pub fn name(&self) -> &'static str {
        match self {
            LossType::SquaredError           => "Squared Loss",
            LossType::BinaryCrossEntropy     => "Binary Cross Entropy",
            LossType::MultiClassCrossEntropy => "Multi Class Cross Entropy",
        }
    }
}

impl fmt::Display for LossType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
