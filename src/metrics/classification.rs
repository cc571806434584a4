use serde::{Serialize, Deserialize};

use crate::error::Result;
use crate::math::matrix::Matrix;

/// Per-class scores derived from a confusion matrix. Index `c` is class `c`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: Vec<f64>,
    pub recall: Vec<f64>,
    /// (tp + tn) / total, one-vs-rest.
    pub accuracy: Vec<f64>,
    pub f1: Vec<f64>,
}

/// Scores one-hot predictions `yhat` against one-hot targets `y`.
///
/// Any ratio whose denominator is zero is reported as 0.
pub fn class_metrics(yhat: &Matrix, y: &Matrix) -> Result<ClassMetrics> {
    let conf = Matrix::confusion(yhat, y)?;
    let n = conf.rows();
    let total: f64 = conf.as_slice().iter().sum();

    let ratio = |num: f64, den: f64| if den != 0.0 { num / den } else { 0.0 };

    let mut metrics = ClassMetrics {
        precision: Vec::with_capacity(n),
        recall: Vec::with_capacity(n),
        accuracy: Vec::with_capacity(n),
        f1: Vec::with_capacity(n),
    };
    for c in 0..n {
        let tp = conf[(c, c)];
        let fn_ = conf.row(c).iter().sum::<f64>() - tp;
        let fp = (0..n).map(|k| conf[(k, c)]).sum::<f64>() - tp;
        let tn = total - (tp + fn_ + fp);

        let precision = ratio(tp, tp + fp);
        let recall = ratio(tp, tp + fn_);
        metrics.precision.push(precision);
        metrics.recall.push(recall);
        metrics.accuracy.push(ratio(tp + tn, total));
        metrics.f1.push(ratio(2.0 * precision * recall, precision + recall));
    }
    Ok(metrics)
}

/// Fraction of rows whose predicted class matches the target class.
pub fn overall_accuracy(yhat: &Matrix, y: &Matrix) -> Result<f64> {
    let conf = Matrix::confusion(yhat, y)?;
    let total: f64 = conf.as_slice().iter().sum();
    if total == 0.0 {
        return Ok(0.0);
    }
    Ok(conf.trace() / total)
}
