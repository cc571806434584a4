use serde::{Serialize, Deserialize};

use crate::error::{Error, Result};
use crate::math::matrix::Matrix;

/// Error measures of continuous predictions.
///
/// Averages divide by the number of rows, so they are per-sample for
/// single-output models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    pub mae: f64,
    pub mse: f64,
    pub rmse: f64,
    pub r_squared: f64,
    pub adjusted_r_squared: f64,
    /// Percent.
    pub mape: f64,
    /// Percent.
    pub smape: f64,
    pub huber: f64,
    pub explained_variance: f64,
    pub median_absolute_error: f64,
}

fn huber(delta: f64, threshold: f64) -> f64 {
    if delta.abs() <= threshold {
        0.5 * delta * delta
    } else {
        threshold * (delta.abs() - 0.5 * threshold)
    }
}

fn median(mut values: Vec<f64>) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let n = values.len();
    if n % 2 == 0 {
        0.5 * (values[n / 2 - 1] + values[n / 2])
    } else {
        values[n / 2]
    }
}

/// Compares predictions `yhat` with targets `y`.
///
/// `n_predictors` is the number of independent variables used by the
/// adjusted R²; `huber_threshold` is the Huber loss δ.
pub fn regression_metrics(
    yhat: &Matrix,
    y: &Matrix,
    n_predictors: usize,
    huber_threshold: f64,
) -> Result<RegressionMetrics> {
    if yhat.shape() != y.shape() {
        return Err(Error::ShapeMismatch {
            op: "regression metrics",
            left: yhat.shape(),
            right: y.shape(),
        });
    }
    if y.rows() == 0 {
        return Err(Error::InvalidArgument("no samples to score".into()));
    }
    let n = y.rows() as f64;
    let pairs = || yhat.as_slice().iter().zip(y.as_slice()).map(|(&p, &t)| (p, t));

    let y_mean = pairs().map(|(_, t)| t).sum::<f64>() / n;
    let y_var = pairs().map(|(_, t)| t * t).sum::<f64>() / n - y_mean * y_mean;
    let delta_mean = pairs().map(|(p, t)| p - t).sum::<f64>() / n;
    let delta_var = pairs().map(|(p, t)| (p - t) * (p - t)).sum::<f64>() / n - delta_mean * delta_mean;

    let mae = pairs().map(|(p, t)| (p - t).abs()).sum::<f64>() / n;
    let mse = pairs().map(|(p, t)| (p - t) * (p - t)).sum::<f64>() / n;
    let spread = pairs().map(|(_, t)| (t - y_mean) * (t - y_mean)).sum::<f64>() / n;
    let mape = pairs().map(|(p, t)| ((p - t) / t).abs()).sum::<f64>() * 100.0 / n;
    let smape = pairs().map(|(p, t)| 2.0 * (p - t).abs() / (t.abs() + p.abs())).sum::<f64>() * 100.0 / n;
    let huber = pairs().map(|(p, t)| huber(p - t, huber_threshold)).sum::<f64>();

    let r_squared = 1.0 - mse / spread;
    let adjusted_r_squared = 1.0 - (1.0 - r_squared) * (n - 1.0) / (n - n_predictors as f64 - 1.0);

    Ok(RegressionMetrics {
        mae,
        mse,
        rmse: mse.sqrt(),
        r_squared,
        adjusted_r_squared,
        mape,
        smape,
        huber,
        explained_variance: 1.0 - delta_var / y_var,
        median_absolute_error: median(pairs().map(|(p, t)| (p - t).abs()).collect()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn col(values: &[f64]) -> Matrix {
        Matrix::from_vec(values.len(), 1, values.to_vec()).unwrap()
    }

    #[test]
    fn exact_predictions() {
        let y = col(&[1.0, 2.0, 3.0, 4.0]);
        let r = regression_metrics(&y, &y, 1, 1.0).unwrap();
        assert_eq!(r.mae, 0.0);
        assert_eq!(r.mse, 0.0);
        assert_eq!(r.r_squared, 1.0);
        assert_eq!(r.median_absolute_error, 0.0);
        assert_eq!(r.explained_variance, 1.0);
    }

    #[test]
    fn known_errors() {
        let y = col(&[1.0, 2.0, 3.0, 4.0]);
        let yhat = col(&[1.5, 2.0, 2.0, 4.0]);
        let r = regression_metrics(&yhat, &y, 1, 0.6).unwrap();

        assert_relative_eq!(r.mae, 1.5 / 4.0);
        assert_relative_eq!(r.mse, 1.25 / 4.0);
        assert_relative_eq!(r.rmse, (1.25f64 / 4.0).sqrt());
        // variance of y is 1.25
        assert_relative_eq!(r.r_squared, 1.0 - 0.3125 / 1.25);
        assert_relative_eq!(r.adjusted_r_squared, 1.0 - (1.0 - r.r_squared) * 3.0 / 2.0);
        assert_relative_eq!(r.mape, (0.5 + 1.0 / 3.0) * 100.0 / 4.0);
        // 0.5 is inside δ, 1.0 is not
        assert_relative_eq!(r.huber, 0.5 * 0.25 + 0.6 * (1.0 - 0.3));
        // |err| = [0.5, 0, 1, 0] -> sorted [0, 0, 0.5, 1]
        assert_relative_eq!(r.median_absolute_error, 0.25);
    }

    #[test]
    fn shape_mismatch_is_rejected() {
        assert!(regression_metrics(&col(&[1.0]), &col(&[1.0, 2.0]), 1, 1.0).is_err());
        assert!(regression_metrics(&Matrix::zeros(0, 1), &Matrix::zeros(0, 1), 1, 1.0).is_err());
    }
}
