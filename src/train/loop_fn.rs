use std::sync::atomic::Ordering;
use std::time::Instant;

use crate::error::Result;
use crate::math::matrix::Matrix;
use crate::network::sequential::Sequential;
use crate::optim::gradient_descent::GradientDescent;
use crate::train::epoch_stats::EpochStats;
use crate::train::train_config::TrainConfig;

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Trains `model` by full-batch gradient descent and returns one `EpochStats`
/// per completed epoch.
///
/// # Arguments
/// - `model`        : compiled model; its weights are updated in place
/// - `x`            : training inputs, one sample per row, `n_inputs` columns
/// - `y`            : targets, one row per sample, as wide as the output layer
/// - `learning_rate`: schedule; called once per epoch with the previous rate
///                     (starting at `config.alpha`) and returns the rate to use
/// - `config`       : epochs, optional progress channel, optional stop flag
///
/// # Early termination
/// The loop breaks early if:
/// - the `progress_tx` receiver has been dropped, **or**
/// - `config.stop_flag` is set to `true`.
///
/// # Errors
/// `Error::NotCompiled` for an uncompiled model and `Error::ShapeMismatch`
/// when `x`/`y` do not fit the model; the model is left untouched in both cases.
pub fn train_loop<F>(
    model: &mut Sequential,
    x: &Matrix,
    y: &Matrix,
    mut learning_rate: F,
    config: &TrainConfig,
) -> Result<Vec<EpochStats>>
where
    F: FnMut(f64) -> f64,
{
    model.check_training_data(x, y)?;

    let mut history = Vec::with_capacity(config.epochs);
    let mut rate = config.alpha;

    for epoch in 1..=config.epochs {
        if stop_requested(config) {
            break;
        }

        let t_start = Instant::now();

        // ── Forward: per-layer outputs, kept for the backward pass ─────────
        let cache = model.forward(x)?;

        // ── Backward + update ─────────────────────────────────────────────
        rate = learning_rate(rate);
        model.backward(x, &cache, y, &GradientDescent::new(rate))?;
        drop(cache);

        // ── Loss after the update ─────────────────────────────────────────
        let loss = model.evaluate(x, y)?;

        let stats = EpochStats {
            epoch,
            total_epochs: config.epochs,
            learning_rate: rate,
            loss,
            elapsed_ms: t_start.elapsed().as_millis() as u64,
        };
        history.push(stats.clone());

        if let Some(ref tx) = config.progress_tx {
            // If the receiver has been dropped, stop training.
            if tx.send(stats).is_err() {
                break;
            }
        }
    }

    Ok(history)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn stop_requested(config: &TrainConfig) -> bool {
    config
        .stop_flag
        .as_ref()
        .map_or(false, |flag| flag.load(Ordering::Relaxed))
}
