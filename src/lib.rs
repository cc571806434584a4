pub mod error;
pub mod math;
pub mod random;
pub mod activation;
pub mod layers;
pub mod network;
pub mod loss;
pub mod optim;
pub mod train;
pub mod metrics;
pub mod data;

// Convenience re-exports
pub use error::{Error, Result};
pub use math::matrix::Matrix;
pub use math::linalg::LuDecomposition;
pub use random::prng::{Prng, StdPrng};
pub use activation::activation::ActivationFunction;
pub use layers::dense::Layer;
pub use network::sequential::Sequential;
pub use network::summary::ModelSummary;
pub use loss::loss_type::LossType;
pub use optim::gradient_descent::GradientDescent;
pub use train::{EpochStats, TrainConfig};
pub use metrics::{class_metrics, regression_metrics};
