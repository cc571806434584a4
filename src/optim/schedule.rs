//! Learning-rate schedules.
//!
//! `Sequential::fit` takes any `FnMut(f64) -> f64`: called once per epoch with
//! the current rate, it returns the rate for that epoch's update.

/// Keeps the rate unchanged.
pub fn constant(rate: f64) -> f64 {
    rate
}

/// Multiplies the rate by `factor` every epoch; `factor < 1` decays it.
pub fn decay(factor: f64) -> impl Fn(f64) -> f64 {
    move |rate| rate * factor
}
