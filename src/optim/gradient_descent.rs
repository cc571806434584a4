use crate::{error::Result, math::matrix::Matrix, layers::dense::Layer};

/// Plain gradient descent: `param -= learning_rate * grad`.
#[derive(Debug, Clone, Copy)]
pub struct GradientDescent {
    pub learning_rate: f64,
}

impl GradientDescent {
    pub fn new(learning_rate: f64) -> GradientDescent {
        GradientDescent { learning_rate }
    }

    /// Applies one update to a layer given its pre-computed gradients.
    pub fn step(&self, layer: &mut Layer, weights_grad: &Matrix, biases_grad: &Matrix) -> Result<()> {
        layer.apply_gradients(weights_grad, biases_grad, self.learning_rate)
    }
}
