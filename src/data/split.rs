use crate::error::{Error, Result};
use crate::math::matrix::Matrix;
use crate::random::prng::Prng;

/// Train / validation / test partition of a dataset, as `(x, y)` pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub train: (Matrix, Matrix),
    pub validation: (Matrix, Matrix),
    pub test: (Matrix, Matrix),
}

/// Partitions the rows of `x` and `y`.
///
/// Validation and test sizes are `fraction * rows` truncated; the training
/// set takes the rest. Rows keep their order unless a `prng` is supplied,
/// in which case they are shuffled first (the same permutation for `x`
/// and `y`).
///
/// # Errors
/// `Error::ShapeMismatch` when `x` and `y` have different row counts and
/// `Error::InvalidArgument` when a fraction is negative or they sum to 1
/// or more.
pub fn split(
    x: &Matrix,
    y: &Matrix,
    val_fraction: f64,
    test_fraction: f64,
    prng: Option<&mut dyn Prng>,
) -> Result<Split> {
    if x.rows() != y.rows() {
        return Err(Error::ShapeMismatch {
            op: "data split",
            left: x.shape(),
            right: y.shape(),
        });
    }
    if !(val_fraction >= 0.0 && test_fraction >= 0.0) || val_fraction + test_fraction >= 1.0 {
        return Err(Error::InvalidArgument(format!(
            "split fractions must be non-negative and sum below 1, got {} and {}",
            val_fraction, test_fraction
        )));
    }

    let n = x.rows();
    let val_size = (val_fraction * n as f64) as usize;
    let test_size = (test_fraction * n as f64) as usize;
    let train_size = n - val_size - test_size;

    let order = match prng {
        Some(prng) => prng.shuffle_indices(n),
        None => (0..n).collect(),
    };
    let (train_idx, rest) = order.split_at(train_size);
    let (val_idx, test_idx) = rest.split_at(val_size);

    Ok(Split {
        train: (gather(x, train_idx), gather(y, train_idx)),
        validation: (gather(x, val_idx), gather(y, val_idx)),
        test: (gather(x, test_idx), gather(y, test_idx)),
    })
}

/// New matrix made of the rows of `m` listed in `indices`, in that order.
fn gather(m: &Matrix, indices: &[usize]) -> Matrix {
    let mut out = Matrix::zeros(indices.len(), m.cols());
    for (i, &src) in indices.iter().enumerate() {
        for j in 0..m.cols() {
            out[(i, j)] = m[(src, j)];
        }
    }
    out
}
