pub mod classification;
pub mod regression;

pub use classification::{class_metrics, overall_accuracy, ClassMetrics};
pub use regression::{regression_metrics, RegressionMetrics};
