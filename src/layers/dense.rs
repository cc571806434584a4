use serde::{Serialize, Deserialize};

use crate::{activation::activation::ActivationFunction, math::matrix::Matrix, random::prng::Prng};
use crate::error::{Error, Result};

/// Standard deviation of the normal distribution weights and biases are drawn from.
pub const INIT_STD_DEV: f64 = 0.1;

/// Fully-connected layer computing `activation(x · W + b)`.
///
/// `W` has shape `(n_inputs, units)` and `b` shape `(units, 1)`; both exist
/// only once the layer is compiled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawLayer")]
pub struct Layer {
    units: usize,
    activator: ActivationFunction,
    params: Option<Parameters>,
}

/// Unchecked wire form; parameter shapes are validated into a `Layer`.
#[derive(Deserialize)]
struct RawLayer {
    units: usize,
    activator: ActivationFunction,
    params: Option<Parameters>,
}

impl TryFrom<RawLayer> for Layer {
    type Error = Error;

    fn try_from(raw: RawLayer) -> Result<Layer> {
        match raw.params {
            None => Ok(Layer::new(raw.units, raw.activator)),
            Some(params) => {
                if params.weights.cols() != raw.units {
                    return Err(Error::ShapeMismatch {
                        op: "layer units",
                        left: params.weights.shape(),
                        right: (params.weights.rows(), raw.units),
                    });
                }
                Layer::with_parameters(raw.activator, params.weights, params.biases)
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Parameters {
    weights: Matrix,
    biases: Matrix,
}

impl Layer {
    pub fn new(units: usize, activation: ActivationFunction) -> Layer {
        Layer {
            units,
            activator: activation,
            params: None,
        }
    }

    /// Builds an already compiled layer from explicit parameters.
    pub fn with_parameters(activation: ActivationFunction, weights: Matrix, biases: Matrix) -> Result<Layer> {
        if biases.shape() != (weights.cols(), 1) {
            return Err(Error::ShapeMismatch {
                op: "layer parameters",
                left: weights.shape(),
                right: biases.shape(),
            });
        }
        Ok(Layer {
            units: weights.cols(),
            activator: activation,
            params: Some(Parameters { weights, biases }),
        })
    }

    /// Allocates `W` and `b` for `n_inputs` inputs, drawing every entry from
    /// N(0, `INIT_STD_DEV`²). Without a generator the parameters start at zero.
    /// Compiling again re-initializes the parameters.
    pub fn compile(&mut self, n_inputs: usize, prng: Option<&mut dyn Prng>) {
        let params = match prng {
            Some(prng) => Parameters {
                weights: Matrix::normal(n_inputs, self.units, 0.0, INIT_STD_DEV, prng),
                biases: Matrix::normal(self.units, 1, 0.0, INIT_STD_DEV, prng),
            },
            None => Parameters {
                weights: Matrix::zeros(n_inputs, self.units),
                biases: Matrix::zeros(self.units, 1),
            },
        };
        self.params = Some(params);
    }

    pub fn units(&self) -> usize {
        self.units
    }

    pub fn activation(&self) -> ActivationFunction {
        self.activator
    }

    pub fn is_compiled(&self) -> bool {
        self.params.is_some()
    }

    fn params(&self) -> Result<&Parameters> {
        self.params.as_ref().ok_or(Error::LayerNotCompiled)
    }

    pub fn weights(&self) -> Result<&Matrix> {
        Ok(&self.params()?.weights)
    }

    pub fn biases(&self) -> Result<&Matrix> {
        Ok(&self.params()?.biases)
    }

    /// Number of weights, `n_inputs × units`. Biases are not counted.
    pub fn parameter_count(&self) -> usize {
        self.params
            .as_ref()
            .map_or(0, |p| p.weights.rows() * p.weights.cols())
    }

    /// z = x · W + b, with b broadcast over the rows of x.
    fn pre_activation(&self, x: &Matrix) -> Result<Matrix> {
        let params = self.params()?;
        if x.cols() != params.weights.rows() {
            return Err(Error::ShapeMismatch {
                op: "layer input x·W",
                left: x.shape(),
                right: params.weights.shape(),
            });
        }
        let mut z = x.prod(&params.weights)?;
        for i in 0..z.rows() {
            for j in 0..z.cols() {
                z[(i, j)] += params.biases[(j, 0)];
            }
        }
        Ok(z)
    }

    /// Layer output for a batch `x` of shape `(m, n_inputs)`; the result is `(m, units)`.
    ///
    /// A `Softmax` layer normalizes every output row to sum to one.
    pub fn eval(&self, x: &Matrix) -> Result<Matrix> {
        let z = self.pre_activation(x)?;
        if self.activator != ActivationFunction::Softmax {
            return Ok(z.map(|v| self.activator.function(v)));
        }

        let mut a = z;
        for i in 0..a.rows() {
            // shifting by the row maximum leaves the softmax unchanged
            let max = a.row(i).iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let mut total = 0.0;
            for j in 0..a.cols() {
                let e = self.activator.function(a[(i, j)] - max);
                a[(i, j)] = e;
                total += e;
            }
            for j in 0..a.cols() {
                a[(i, j)] /= total;
            }
        }
        Ok(a)
    }

    /// Activation derivative at the same pre-activation values `eval` uses.
    pub fn gradient(&self, x: &Matrix) -> Result<Matrix> {
        let z = self.pre_activation(x)?;
        Ok(z.map(|v| self.activator.derivative(v)))
    }

    /// Batch-averaged gradients for this layer. Returns (weights_grad, biases_grad).
    ///
    /// `inputs` is what the layer was fed, `delta` the error at its output,
    /// one row per sample.
    pub fn compute_gradients(&self, inputs: &Matrix, delta: &Matrix) -> Result<(Matrix, Matrix)> {
        if inputs.rows() != delta.rows() || delta.cols() != self.units {
            return Err(Error::ShapeMismatch {
                op: "layer gradients",
                left: inputs.shape(),
                right: delta.shape(),
            });
        }
        let batch_size = inputs.rows().max(1) as f64;
        let weights_grad = inputs.transpose().prod(delta)?.scale(1.0 / batch_size);
        let biases_grad = delta.column_mean();
        Ok((weights_grad, biases_grad))
    }

    /// Applies pre-computed gradients scaled by lr, in place.
    pub fn apply_gradients(&mut self, weights_grad: &Matrix, biases_grad: &Matrix, lr: f64) -> Result<()> {
        let params = self.params.as_mut().ok_or(Error::LayerNotCompiled)?;
        if weights_grad.shape() != params.weights.shape() || biases_grad.shape() != params.biases.shape() {
            return Err(Error::ShapeMismatch {
                op: "apply gradients",
                left: params.weights.shape(),
                right: weights_grad.shape(),
            });
        }
        for i in 0..params.weights.rows() {
            for j in 0..params.weights.cols() {
                params.weights[(i, j)] -= lr * weights_grad[(i, j)];
            }
        }
        for j in 0..params.biases.rows() {
            params.biases[(j, 0)] -= lr * biases_grad[(j, 0)];
        }
        Ok(())
    }
}
