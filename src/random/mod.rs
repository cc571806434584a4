pub mod prng;

pub use prng::{Prng, StdPrng};
