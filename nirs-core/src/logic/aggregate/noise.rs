//! Forecast Noise collaborator
//!
//! Per-day perturbation applied on top of the deterministic baseline.
//! `FlatNoise` for reproducible output, `SeededNoise` for jitter.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::logic::error::CollaboratorError;

/// Additive risk delta and relative volume delta for one day
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NoiseSample {
    pub risk: f64,
    pub volume: f64,
}

impl NoiseSample {
    pub fn is_finite(&self) -> bool {
        self.risk.is_finite() && self.volume.is_finite()
    }
}

pub trait ForecastNoise: Send + Sync {
    fn sample(&self, day: u32) -> Result<NoiseSample, CollaboratorError>;
}

impl<F> ForecastNoise for F
where
    F: Fn(u32) -> Result<NoiseSample, CollaboratorError> + Send + Sync,
{
    fn sample(&self, day: u32) -> Result<NoiseSample, CollaboratorError> {
        self(day)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FlatNoise;

impl ForecastNoise for FlatNoise {
    fn sample(&self, _day: u32) -> Result<NoiseSample, CollaboratorError> {
        Ok(NoiseSample::default())
    }
}

/// Uniform jitter: risk in ±`risk_spread`, volume in ±`volume_spread`
pub struct SeededNoise {
    rng: Mutex<StdRng>,
    risk_spread: f64,
    volume_spread: f64,
}

impl SeededNoise {
    pub fn new(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            rng: Mutex::new(rng),
            risk_spread: 0.1,
            volume_spread: 0.5,
        }
    }

    pub fn with_spread(mut self, risk: f64, volume: f64) -> Self {
        self.risk_spread = risk.abs();
        self.volume_spread = volume.abs();
        self
    }
}

impl std::fmt::Debug for SeededNoise {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeededNoise")
            .field("risk_spread", &self.risk_spread)
            .field("volume_spread", &self.volume_spread)
            .finish()
    }
}

impl ForecastNoise for SeededNoise {
    fn sample(&self, _day: u32) -> Result<NoiseSample, CollaboratorError> {
        let mut rng = self.rng.lock();
        Ok(NoiseSample {
            risk: rng.gen_range(-self.risk_spread..=self.risk_spread),
            volume: rng.gen_range(-self.volume_spread..=self.volume_spread),
        })
    }
}

/// One day's sample; failures and non-finite values contribute no perturbation
pub fn sample_day(noise: &dyn ForecastNoise, day: u32) -> NoiseSample {
    match noise.sample(day) {
        Ok(sample) if sample.is_finite() => sample,
        Ok(sample) => {
            log::warn!("Forecast noise for day {} is not finite: {:?}", day, sample);
            NoiseSample::default()
        }
        Err(e) => {
            log::warn!("Forecast noise failed for day {}: {}", day, e);
            NoiseSample::default()
        }
    }
}

/// Samples days `1..=horizon`
pub fn sample_horizon(noise: &dyn ForecastNoise, horizon: u32) -> Vec<NoiseSample> {
    (1..=horizon).map(|day| sample_day(noise, day)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_noise_is_zero() {
        let samples = sample_horizon(&FlatNoise, 3);
        assert_eq!(samples, vec![NoiseSample::default(); 3]);
    }

    #[test]
    fn test_seeded_noise_is_reproducible() {
        let a = sample_horizon(&SeededNoise::new(7), 10);
        let b = sample_horizon(&SeededNoise::new(7), 10);
        assert_eq!(a, b);
        assert!(a.iter().all(|s| s.risk.abs() <= 0.1 && s.volume.abs() <= 0.5));
    }

    #[test]
    fn test_failing_day_falls_back_to_zero() {
        let noise = |day: u32| -> Result<NoiseSample, CollaboratorError> {
            if day == 2 {
                Err(CollaboratorError::Unavailable("down".into()))
            } else {
                Ok(NoiseSample { risk: 0.05, volume: 0.1 })
            }
        };
        let samples = sample_horizon(&noise, 3);
        assert_eq!(samples[1], NoiseSample::default());
        assert_eq!(samples[2].risk, 0.05);
    }

    #[test]
    fn test_non_finite_day_falls_back_to_zero() {
        let noise = |day: u32| -> Result<NoiseSample, CollaboratorError> {
            Ok(match day {
                1 => NoiseSample { risk: f64::NAN, volume: 0.1 },
                2 => NoiseSample { risk: 0.0, volume: f64::INFINITY },
                _ => NoiseSample { risk: 0.02, volume: 1e30 },
            })
        };
        let samples = sample_horizon(&noise, 3);
        assert_eq!(samples[0], NoiseSample::default());
        assert_eq!(samples[1], NoiseSample::default());
        // Finite, however large, is passed through
        assert_eq!(samples[2].volume, 1e30);
    }
}
