use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

/// Source of random numbers consumed by weight initialization and data
/// shuffling. Passed explicitly; the crate keeps no global random state.
pub trait Prng {
    /// Sample from N(mean, std_dev²).
    fn normal(&mut self, mean: f64, std_dev: f64) -> f64;

    /// Sample uniformly from [a, b).
    fn uniform(&mut self, a: f64, b: f64) -> f64;

    /// A uniformly random permutation of `0..n` (Fisher-Yates).
    fn shuffle_indices(&mut self, n: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..n).collect();
        for i in (1..n).rev() {
            let j = (self.uniform(0.0, (i + 1) as f64) as usize).min(i);
            indices.swap(i, j);
        }
        indices
    }
}

/// Seedable `Prng` backed by `rand`'s `StdRng`.
#[derive(Debug, Clone)]
pub struct StdPrng {
    seed: u64,
    rng: StdRng,
}

impl StdPrng {
    /// Reproducible generator.
    pub fn from_seed(seed: u64) -> StdPrng {
        StdPrng {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generator seeded from the operating system's entropy source.
    pub fn from_entropy() -> StdPrng {
        StdPrng::from_seed(rand::random())
    }

    /// Seed this generator was built from; reuse it to replay a run.
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Prng for StdPrng {
    fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        if std_dev == 0.0 {
            return mean;
        }
        let z: f64 = self.rng.sample(StandardNormal);
        mean + std_dev * z
    }

    fn uniform(&mut self, a: f64, b: f64) -> f64 {
        a + self.rng.gen::<f64>() * (b - a)
    }
}
