use thiserror::Error;

/// Errors reported by the matrix engine, layers and models.
///
/// Every fallible operation in the crate returns one of these instead of a
/// partially built value; the `Display` text is the diagnostic.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{op}: incompatible shapes ({}, {}) and ({}, {})", left.0, left.1, right.0, right.1)]
    ShapeMismatch {
        op: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },

    #[error("matrix should be square, got ({rows}, {cols})")]
    NotSquare { rows: usize, cols: usize },

    #[error("the matrix is singular")]
    Singular,

    #[error("index ({row}, {col}) is outside of the matrix dimension ({rows}, {cols})")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("layer has no weights; compile it first")]
    LayerNotCompiled,

    #[error("the model should be compiled first")]
    NotCompiled,

    #[error("the model is already compiled")]
    AlreadyCompiled,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
