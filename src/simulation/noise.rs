use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

use crate::bfp::{from_pcm, to_pcm};
use crate::constants::WIRE_EXP;
use crate::error::{FirError, Result};

/// Additive Gaussian noise
#[derive(Clone, Debug, serde::Deserialize)]
pub struct NoiseConfig {
    /// Standard deviation, full scale being 1.0
    pub std_dev: f64,
    pub seed: Option<u64>,
}

impl NoiseConfig {
    pub fn new(std_dev: f64) -> Self {
        Self {
            std_dev,
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => rand::make_rng(),
    }
}

fn normal(std_dev: f64) -> Result<Normal<f64>> {
    Normal::new(0.0, std_dev)
        .map_err(|e| FirError::Config(format!("invalid noise level {std_dev}: {e}")))
}

/// Gaussian white noise, saturated to the PCM range
pub fn white_noise(len: usize, config: &NoiseConfig) -> Result<Vec<i32>> {
    let mut rng = create_rng(config.seed);
    let dist = normal(config.std_dev)?;
    Ok((0..len)
        .map(|_| to_pcm(dist.sample(&mut rng), WIRE_EXP))
        .collect())
}

/// Add Gaussian noise to `signal` in place, saturating
pub fn add_noise(signal: &mut [i32], config: &NoiseConfig) -> Result<()> {
    let mut rng = create_rng(config.seed);
    let dist = normal(config.std_dev)?;
    for s in signal.iter_mut() {
        *s = to_pcm(from_pcm(*s, WIRE_EXP) + dist.sample(&mut rng), WIRE_EXP);
    }
    Ok(())
}
