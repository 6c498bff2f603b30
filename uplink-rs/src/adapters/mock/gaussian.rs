use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use crate::models::errors::UplinkError;

/// Additive Gaussian noise for replayed readings.
#[derive(Clone, Debug)]
pub(super) struct GaussianNoise {
    normal: Normal<f32>,
}

impl GaussianNoise {
    pub(super) fn new(mean: f32, stdev: f32) -> Result<Self, UplinkError> {
        let normal = Normal::new(mean, stdev)
            .map_err(|e| UplinkError::InvalidConfig(format!("Invalid noise: {}", e)))?;
        Ok(Self { normal })
    }

    pub(super) fn add_noise(&self, rng: &mut StdRng, values: &mut [f32]) {
        for v in values.iter_mut() {
            *v += self.normal.sample(rng);
        }
    }
}
