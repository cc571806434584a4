use serde::{Serialize, Deserialize};
use std::fmt;

/// Slope of `LeakyReLU` for negative inputs.
pub const LEAKY_RELU_COEF: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationFunction {
    Linear,
    ReLU,
    LeakyReLU,
    Sigmoid,
    Tanh,
    /// Element-wise this is the exponential; the row normalization that makes
    /// it a softmax is applied by `Layer::eval()`.
    Softmax,
}

impl ActivationFunction {
    /// Element-wise activation.
    pub fn function(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Linear => x,
            ActivationFunction::ReLU => if x > 0.0 { x } else { 0.0 },
            ActivationFunction::LeakyReLU => if x > 0.0 { x } else { LEAKY_RELU_COEF * x },
            ActivationFunction::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            ActivationFunction::Tanh => x.tanh(),
            ActivationFunction::Softmax => x.exp(),
        }
    }

    /// Element-wise derivative, evaluated at the pre-activation value.
    ///
    /// For `Softmax` this is the exponential itself rather than the softmax
    /// Jacobian. It is only meaningful paired with multi-class cross-entropy,
    /// whose output error `predicted - expected` already folds the Jacobian in.
    pub fn derivative(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Linear => 1.0,
            ActivationFunction::ReLU => if x > 0.0 { 1.0 } else { 0.0 },
            ActivationFunction::LeakyReLU => if x > 0.0 { 1.0 } else { LEAKY_RELU_COEF },
            ActivationFunction::Sigmoid => {
                let fx = self.function(x);
                fx * (1.0 - fx)
            }
            ActivationFunction::Tanh => {
                let t = x.tanh();
                1.0 - t * t
            }
            ActivationFunction::Softmax => x.exp(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ActivationFunction::Linear => "linear",
            ActivationFunction::ReLU => "relu",
            ActivationFunction::LeakyReLU => "lrelu",
            ActivationFunction::Sigmoid => "sigmoid",
            ActivationFunction::Tanh => "tanh",
            ActivationFunction::Softmax => "softmax",
        }
    }
}

impl fmt::Display for ActivationFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
