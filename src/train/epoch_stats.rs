use serde::{Serialize, Deserialize};

/// Per-epoch training statistics emitted by `train_loop`.
///
/// One value is recorded at the end of every completed epoch. When a
/// `progress_tx` channel is configured in `TrainConfig` the same value is also
/// sent over it, so a caller on another thread can follow training live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    /// Total epochs requested for this run.
    pub total_epochs: usize,
    /// Learning rate used for this epoch's update.
    pub learning_rate: f64,
    /// Loss over the whole training set after the update.
    pub loss: f64,
    /// Wall-clock duration of this single epoch in milliseconds.
    pub elapsed_ms: u64,
}
