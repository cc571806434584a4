use std::sync::mpsc;
use std::sync::{Arc, atomic::AtomicBool};
use crate::train::epoch_stats::EpochStats;

/// Configuration for a `train_loop` run.
///
/// # Fields
/// - `alpha`      : initial learning rate, handed to the schedule on the first epoch
/// - `epochs`     : number of full-batch updates
/// - `progress_tx`: optional channel sender; one `EpochStats` is sent per
///                   completed epoch.  If the receiver is dropped the loop
///                   terminates early.
/// - `stop_flag`  : optional atomic flag; when set to `true` from another
///                   thread the loop terminates before the next epoch.
pub struct TrainConfig {
    pub alpha: f64,
    pub epochs: usize,
    pub progress_tx: Option<mpsc::Sender<EpochStats>>,
    pub stop_flag: Option<Arc<AtomicBool>>,
}

impl TrainConfig {
    /// Creates a minimal `TrainConfig` with no progress channel and no stop flag.
    pub fn new(alpha: f64, epochs: usize) -> Self {
        TrainConfig {
            alpha,
            epochs,
            progress_tx: None,
            stop_flag: None,
        }
    }
}
