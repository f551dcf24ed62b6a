//! Pluggable jitter for charger telemetry.

use rand::{Rng, SeedableRng, rngs::StdRng};

/// Source of uniform jitter in `[0, 1)`.
pub trait NoiseSource {
    fn unit(&mut self) -> f32;
}

/// Reproducible noise from a seeded RNG.
///
/// # Examples
///
/// ```
/// use depot_orchestrator::sim::noise::{NoiseSource, SeededNoise};
///
/// let mut a = SeededNoise::new(7);
/// let mut b = SeededNoise::new(7);
/// assert_eq!(a.unit(), b.unit());
/// ```
#[derive(Debug, Clone)]
pub struct SeededNoise {
    rng: StdRng,
}

impl SeededNoise {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl NoiseSource for SeededNoise {
    fn unit(&mut self) -> f32 {
        self.rng.random::<f32>()
    }
}

/// Constant noise, for tests that need exact telemetry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedNoise(pub f32);

impl NoiseSource for FixedNoise {
    fn unit(&mut self) -> f32 {
        self.0.clamp(0.0, 1.0 - f32::EPSILON)
    }
}

impl<N: NoiseSource + ?Sized> NoiseSource for &mut N {
    fn unit(&mut self) -> f32 {
        (**self).unit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_noise_stays_in_unit_interval() {
        let mut noise = SeededNoise::new(42);
        for _ in 0..1000 {
            let r = noise.unit();
            assert!((0.0..1.0).contains(&r));
        }
    }

    #[test]
    fn fixed_noise_is_clamped() {
        assert_eq!(FixedNoise(0.25).unit(), 0.25);
        assert_eq!(FixedNoise(-1.0).unit(), 0.0);
        assert!(FixedNoise(2.0).unit() < 1.0);
    }
}
