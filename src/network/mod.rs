pub mod sequential;
pub mod summary;

pub use sequential::Sequential;
pub use summary::{LayerSummary, ModelSummary};
