use crate::error::Result;
use crate::math::matrix::Matrix;

pub struct MseLoss;

impl MseLoss {
    /// Half mean squared error over the batch: sum((predicted - expected)²) / (2m),
    /// where m is the number of rows.
    pub fn loss(predicted: &Matrix, expected: &Matrix) -> Result<f64> {
        let diff = predicted.dif(expected)?;
        let m = predicted.rows().max(1) as f64;
        Ok(diff.as_slice().iter().map(|d| d * d).sum::<f64>() / (2.0 * m))
    }
}
