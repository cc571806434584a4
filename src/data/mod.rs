pub mod csv;
pub mod split;

pub use csv::{parse_csv, read_csv};
pub use split::{split, Split};
