use serde::{Serialize, Deserialize};

use crate::error::{Error, Result};
use crate::layers::dense::Layer;
use crate::loss::loss_type::LossType;
use crate::math::matrix::Matrix;
use crate::network::summary::{LayerSummary, ModelSummary};
use crate::optim::gradient_descent::GradientDescent;
use crate::random::prng::Prng;
use crate::train::{epoch_stats::EpochStats, loop_fn::train_loop, train_config::TrainConfig};

/// Ordered chain of dense layers trained by full-batch gradient descent.
///
/// A model starts uncompiled. `compile` binds every layer's input width
/// (`n_inputs` for the first layer, the previous layer's `units` afterwards)
/// and initializes the weights; `fit`, `predict`, `evaluate` and `summary`
/// are only available afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sequential {
    layers: Vec<Layer>,
    n_inputs: usize,
    loss: LossType,
    compiled: bool,
}

impl Sequential {
    /// Takes ownership of `layers`, which must not be empty.
    pub fn new(layers: Vec<Layer>, n_inputs: usize, loss: LossType) -> Result<Sequential> {
        if layers.is_empty() {
            return Err(Error::InvalidArgument("a model needs at least one layer".into()));
        }
        Ok(Sequential {
            layers,
            n_inputs,
            loss,
            compiled: false,
        })
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn n_inputs(&self) -> usize {
        self.n_inputs
    }

    pub fn n_outputs(&self) -> usize {
        self.layers.last().map_or(0, Layer::units)
    }

    pub fn loss(&self) -> LossType {
        self.loss
    }

    pub fn is_compiled(&self) -> bool {
        self.compiled
    }

    /// Binds layer shapes in order and initializes their parameters.
    ///
    /// Without a generator every weight and bias starts at zero.
    pub fn compile(&mut self, mut prng: Option<&mut dyn Prng>) -> Result<()> {
        if self.compiled {
            return Err(Error::AlreadyCompiled);
        }
        let mut n_inputs = self.n_inputs;
        for layer in self.layers.iter_mut() {
            match prng {
                Some(ref mut prng) => layer.compile(n_inputs, Some(&mut **prng as &mut dyn Prng)),
                None => layer.compile(n_inputs, None),
            }
            n_inputs = layer.units();
        }
        self.compiled = true;
        Ok(())
    }

    fn ensure_compiled(&self) -> Result<()> {
        if !self.compiled {
            return Err(Error::NotCompiled);
        }
        Ok(())
    }

    /// Checks that `x`/`y` can be trained on without touching the model.
    pub(crate) fn check_training_data(&self, x: &Matrix, y: &Matrix) -> Result<()> {
        self.ensure_compiled()?;
        if x.cols() != self.n_inputs {
            return Err(Error::ShapeMismatch {
                op: "model input",
                left: x.shape(),
                right: (x.rows(), self.n_inputs),
            });
        }
        if y.shape() != (x.rows(), self.n_outputs()) {
            return Err(Error::ShapeMismatch {
                op: "model targets",
                left: y.shape(),
                right: (x.rows(), self.n_outputs()),
            });
        }
        Ok(())
    }

    /// Output of every layer for the batch `x`, first layer first.
    pub(crate) fn forward(&self, x: &Matrix) -> Result<Vec<Matrix>> {
        let mut outputs: Vec<Matrix> = Vec::with_capacity(self.layers.len());
        for layer in &self.layers {
            let output = match outputs.last() {
                Some(previous) => layer.eval(previous)?,
                None => layer.eval(x)?,
            };
            outputs.push(output);
        }
        Ok(outputs)
    }

    /// Backpropagates the output error through the chain, updating each
    /// layer's weights and biases in place, last layer first. Layer 0 is
    /// updated too, with `x` as its input.
    ///
    /// `outputs` is the result of `forward(x)`.
    pub(crate) fn backward(
        &mut self,
        x: &Matrix,
        outputs: &[Matrix],
        y: &Matrix,
        optimizer: &GradientDescent,
    ) -> Result<()> {
        if outputs.len() != self.layers.len() {
            return Err(Error::InvalidArgument(format!(
                "expected {} layer outputs, got {}",
                self.layers.len(),
                outputs.len()
            )));
        }
        let last = self.layers.len() - 1;
        let mut delta = self.loss.output_error(&outputs[last], y)?;

        for n in (0..last).rev() {
            let (weights_grad, biases_grad) = self.layers[n + 1].compute_gradients(&outputs[n], &delta)?;
            optimizer.step(&mut self.layers[n + 1], &weights_grad, &biases_grad)?;

            // Propagate δ through the (updated) weights into layer n's activation space.
            let weights_t = self.layers[n + 1].weights()?.transpose();
            let layer_input = if n == 0 { x } else { &outputs[n - 1] };
            let act_derivative = self.layers[n].gradient(layer_input)?;
            delta = delta.prod(&weights_t)?.hadamard(&act_derivative)?;
        }

        let (weights_grad, biases_grad) = self.layers[0].compute_gradients(x, &delta)?;
        optimizer.step(&mut self.layers[0], &weights_grad, &biases_grad)
    }

    /// Trains for `epochs` full-batch epochs starting from learning rate `alpha`.
    ///
    /// `learning_rate` is called once per epoch with the previous rate and
    /// returns the rate for that epoch; see `optim::schedule`.
    pub fn fit<F>(&mut self, x: &Matrix, y: &Matrix, learning_rate: F, alpha: f64, epochs: usize) -> Result<Vec<EpochStats>>
    where
        F: FnMut(f64) -> f64,
    {
        train_loop(self, x, y, learning_rate, &TrainConfig::new(alpha, epochs))
    }

    /// Same as `fit`, with a progress channel and stop flag taken from `config`.
    pub fn fit_with_config<F>(&mut self, x: &Matrix, y: &Matrix, learning_rate: F, config: &TrainConfig) -> Result<Vec<EpochStats>>
    where
        F: FnMut(f64) -> f64,
    {
        train_loop(self, x, y, learning_rate, config)
    }

    /// Forward pass keeping only the final output, of shape `(x.rows, n_outputs)`.
    pub fn predict(&self, x: &Matrix) -> Result<Matrix> {
        self.ensure_compiled()?;
        let (first, rest) = match self.layers.split_first() {
            Some(split) => split,
            None => return Err(Error::InvalidArgument("model has no layers".into())),
        };
        let mut output = first.eval(x)?;
        for layer in rest {
            output = layer.eval(&output)?;
        }
        Ok(output)
    }

    /// Loss of the model's predictions for `x` against `y`, by the model's loss kind.
    pub fn evaluate(&self, x: &Matrix, y: &Matrix) -> Result<f64> {
        let predicted = self.predict(x)?;
        self.loss.loss(&predicted, y)
    }

    /// Per-layer activation, width and weight count.
    pub fn summary(&self) -> Result<ModelSummary> {
        self.ensure_compiled()?;
        let layers = self.layers.iter().enumerate()
            .map(|(i, layer)| LayerSummary {
                index: i + 1,
                activation: layer.activation(),
                units: layer.units(),
                parameters: layer.parameter_count(),
            })
            .collect();
        Ok(ModelSummary { layers, loss: self.loss })
    }

    /// Verifies that a model built from untrusted data chains correctly.
    fn validate(&self) -> Result<()> {
        if self.layers.is_empty() {
            return Err(Error::InvalidArgument("a model needs at least one layer".into()));
        }
        let mut n_inputs = self.n_inputs;
        for layer in &self.layers {
            match (self.compiled, layer.is_compiled()) {
                (false, false) => {}
                (true, true) => {
                    let weights = layer.weights()?;
                    if weights.shape() != (n_inputs, layer.units()) {
                        return Err(Error::ShapeMismatch {
                            op: "layer chain",
                            left: weights.shape(),
                            right: (n_inputs, layer.units()),
                        });
                    }
                    let biases = layer.biases()?;
                    if biases.shape() != (layer.units(), 1) {
                        return Err(Error::ShapeMismatch {
                            op: "layer biases",
                            left: biases.shape(),
                            right: (layer.units(), 1),
                        });
                    }
                }
                _ => {
                    return Err(Error::InvalidArgument(
                        "compiled flag disagrees with layer parameters".into(),
                    ))
                }
            }
            n_inputs = layer.units();
        }
        Ok(())
    }

    /// Serializes the model, weights included, to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a model from a JSON file previously written by `save_json`.
    pub fn load_json(path: &str) -> Result<Sequential> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let model: Sequential = serde_json::from_reader(reader)?;
        model.validate()?;
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::activation::ActivationFunction;
    use crate::random::prng::StdPrng;
    use approx::assert_relative_eq;

    fn m(rows: Vec<Vec<f64>>) -> Matrix {
        Matrix::from_rows(rows).unwrap()
    }

    fn model() -> Sequential {
        Sequential::new(
            vec![
                Layer::new(4, ActivationFunction::Tanh),
                Layer::new(3, ActivationFunction::ReLU),
                Layer::new(2, ActivationFunction::Softmax),
            ],
            5,
            LossType::MultiClassCrossEntropy,
        )
        .unwrap()
    }

    #[test]
    fn empty_model_is_rejected() {
        assert!(Sequential::new(vec![], 3, LossType::SquaredError).is_err());
    }

    #[test]
    fn compile_chains_layer_shapes() {
        let mut model = model();
        model.compile(Some(&mut StdPrng::from_seed(1))).unwrap();
        let shapes: Vec<(usize, usize)> = model.layers().iter()
            .map(|l| l.weights().unwrap().shape())
            .collect();
        assert_eq!(shapes, vec![(5, 4), (4, 3), (3, 2)]);
        assert_eq!(model.layers()[2].biases().unwrap().shape(), (2, 1));
    }

    #[test]
    fn compile_twice_is_an_error() {
        let mut model = model();
        model.compile(None).unwrap();
        assert!(matches!(model.compile(None), Err(Error::AlreadyCompiled)));
    }

    #[test]
    fn uncompiled_model_refuses_to_work() {
        let mut model = model();
        let x = Matrix::zeros(2, 5);
        let y = Matrix::zeros(2, 2);
        assert!(matches!(model.predict(&x), Err(Error::NotCompiled)));
        assert!(matches!(model.summary(), Err(Error::NotCompiled)));
        assert!(matches!(model.fit(&x, &y, |r| r, 0.1, 3), Err(Error::NotCompiled)));
        assert!(!model.is_compiled());
    }

    #[test]
    fn predict_shape() {
        let mut model = model();
        model.compile(Some(&mut StdPrng::from_seed(2))).unwrap();
        let out = model.predict(&Matrix::zeros(7, 5)).unwrap();
        assert_eq!(out.shape(), (7, 2));
        assert!(model.predict(&Matrix::zeros(7, 4)).is_err());
    }

    #[test]
    fn forward_caches_every_layer() {
        let mut model = model();
        model.compile(Some(&mut StdPrng::from_seed(3))).unwrap();
        let x = Matrix::from_vec(2, 5, vec![0.5; 10]).unwrap();
        let outputs = model.forward(&x).unwrap();
        let shapes: Vec<(usize, usize)> = outputs.iter().map(Matrix::shape).collect();
        assert_eq!(shapes, vec![(2, 4), (2, 3), (2, 2)]);
        assert_eq!(outputs[2], model.predict(&x).unwrap());
    }

    #[test]
    fn backward_moves_against_the_gradient() {
        // single linear layer, zero init: grad_w = xᵀ(0 - y)/m, grad_b = mean(0 - y)
        let mut model = Sequential::new(
            vec![Layer::new(1, ActivationFunction::Linear)],
            2,
            LossType::SquaredError,
        )
        .unwrap();
        model.compile(None).unwrap();
        let x = m(vec![vec![1.0, 0.0], vec![0.0, 2.0]]);
        let y = m(vec![vec![1.0], vec![3.0]]);
        let outputs = model.forward(&x).unwrap();
        model.backward(&x, &outputs, &y, &GradientDescent::new(0.5)).unwrap();

        let w = model.layers()[0].weights().unwrap();
        // -(0.5) * [(1*-1)/2, (2*-3)/2]
        assert_relative_eq!(w[(0, 0)], 0.25);
        assert_relative_eq!(w[(1, 0)], 1.5);
        assert_relative_eq!(model.layers()[0].biases().unwrap()[(0, 0)], 1.0);
    }

    #[test]
    fn backward_updates_hidden_layers() {
        let mut model = Sequential::new(
            vec![
                Layer::new(3, ActivationFunction::Sigmoid),
                Layer::new(1, ActivationFunction::Sigmoid),
            ],
            2,
            LossType::SquaredError,
        )
        .unwrap();
        model.compile(Some(&mut StdPrng::from_seed(4))).unwrap();
        let before = model.layers()[0].weights().unwrap().clone();
        let x = m(vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
        let y = m(vec![vec![1.0], vec![0.0]]);
        let outputs = model.forward(&x).unwrap();
        model.backward(&x, &outputs, &y, &GradientDescent::new(1.0)).unwrap();
        assert_ne!(model.layers()[0].weights().unwrap(), &before);
    }

    #[test]
    fn summary_counts_weights_only() {
        let mut model = model();
        model.compile(None).unwrap();
        let summary = model.summary().unwrap();
        let counts: Vec<usize> = summary.layers.iter().map(|l| l.parameters).collect();
        assert_eq!(counts, vec![20, 12, 6]);
        assert_eq!(summary.layers[2].index, 3);
        assert_eq!(summary.layers[2].activation, ActivationFunction::Softmax);
        assert_eq!(summary.total_parameters(), 38);
    }

    #[test]
    fn json_round_trip_keeps_weights() {
        let mut model = model();
        model.compile(Some(&mut StdPrng::from_seed(6))).unwrap();
        let path = std::env::temp_dir().join(format!("ferrite_ml_model_{}.json", std::process::id()));
        let path = path.to_str().unwrap();
        model.save_json(path).unwrap();
        let loaded = Sequential::load_json(path).unwrap();
        std::fs::remove_file(path).unwrap();

        let x = Matrix::from_vec(3, 5, (0..15).map(|v| v as f64 / 10.0).collect()).unwrap();
        let (a, b) = (loaded.predict(&x).unwrap(), model.predict(&x).unwrap());
        for (p, q) in a.as_slice().iter().zip(b.as_slice()) {
            assert_relative_eq!(*p, *q, epsilon = 1e-12);
        }
        assert_eq!(loaded.loss(), LossType::MultiClassCrossEntropy);
    }

    #[test]
    fn validate_rejects_broken_chains() {
        let mut model = model();
        model.compile(None).unwrap();
        model.n_inputs = 6;
        assert!(model.validate().is_err());

        let mut uncompiled = self::model();
        uncompiled.compiled = true;
        assert!(uncompiled.validate().is_err());
    }

    #[test]
    fn load_json_rejects_corrupted_biases() {
        let mut model = Sequential::new(
            vec![Layer::new(2, ActivationFunction::Linear)],
            2,
            LossType::SquaredError,
        )
        .unwrap();
        model.compile(Some(&mut StdPrng::from_seed(12))).unwrap();

        let mut value = serde_json::to_value(&model).unwrap();
        value["layers"][0]["params"]["biases"] = serde_json::json!({ "rows": 1, "cols": 1, "data": [0.5] });

        let path = std::env::temp_dir().join(format!("ferrite_ml_bad_bias_{}.json", std::process::id()));
        let path = path.to_str().unwrap();
        std::fs::write(path, value.to_string()).unwrap();
        let loaded = Sequential::load_json(path);
        std::fs::remove_file(path).unwrap();

        assert!(loaded.is_err());
    }
}
