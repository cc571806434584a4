pub mod matrix;
pub mod linalg;

pub use matrix::Matrix;
pub use linalg::{LuDecomposition, TOLERANCE};
