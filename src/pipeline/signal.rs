//! Sample generation and transformation.
//!
//! Both stages treat their numeric function as opaque: the producer asks a
//! [`SampleGenerator`] for the value at a given elapsed time, the processor hands every
//! drained sample to a [`SampleTransform`]. Closures implement both traits, which keeps
//! tests free of boilerplate.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::TAU;
use std::time::Duration;

use crate::config::GeneratorConfig;
use crate::data::Sample;

/// Produces the sample for a point in time.
pub trait SampleGenerator: Send {
    /// Value at `elapsed` since the start of the current cycle run.
    fn sample(&mut self, elapsed: Duration) -> Sample;
}

impl<F> SampleGenerator for F
where
    F: FnMut(Duration) -> Sample + Send,
{
    fn sample(&mut self, elapsed: Duration) -> Sample {
        self(elapsed)
    }
}

/// Maps one drained sample to one result.
pub trait SampleTransform: Send {
    /// Transformed value.
    fn apply(&mut self, sample: Sample) -> Sample;
}

impl<F> SampleTransform for F
where
    F: FnMut(Sample) -> Sample + Send,
{
    fn apply(&mut self, sample: Sample) -> Sample {
        self(sample)
    }
}

/// `amplitude * sin(2π f t)`, optionally with seeded uniform noise.
#[derive(Debug)]
pub struct SineGenerator {
    amplitude: f64,
    frequency_hz: f64,
    noise: f64,
    rng: StdRng,
}

impl SineGenerator {
    /// Noise-free sine wave.
    pub fn new(amplitude: f64, frequency_hz: f64) -> Self {
        Self {
            amplitude,
            frequency_hz,
            noise: 0.0,
            rng: StdRng::seed_from_u64(0),
        }
    }

    /// Add uniform noise in `[-noise, noise)`, reproducible for a given seed.
    pub fn with_noise(mut self, noise: f64, seed: u64) -> Self {
        self.noise = noise;
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Build from the `acquisition.generator` settings.
    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self::new(config.amplitude, config.frequency_hz).with_noise(config.noise, config.seed)
    }
}

impl SampleGenerator for SineGenerator {
    fn sample(&mut self, elapsed: Duration) -> Sample {
        let clean = self.amplitude * (TAU * self.frequency_hz * elapsed.as_secs_f64()).sin();
        if self.noise > 0.0 {
            clean + self.rng.gen_range(-self.noise..self.noise)
        } else {
            clean
        }
    }
}

/// Multiplies every sample by a constant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gain(pub f64);

impl SampleTransform for Gain {
    fn apply(&mut self, sample: Sample) -> Sample {
        sample * self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sine_hits_quarter_period_peak() {
        let mut sine = SineGenerator::new(2.0, 1.0);
        assert!(sine.sample(Duration::ZERO).abs() < 1e-12);
        assert!((sine.sample(Duration::from_millis(250)) - 2.0).abs() < 1e-9);
        assert!((sine.sample(Duration::from_millis(750)) + 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_noise_is_bounded_and_reproducible() {
        let mut a = SineGenerator::new(0.0, 1.0).with_noise(0.5, 7);
        let mut b = SineGenerator::new(0.0, 1.0).with_noise(0.5, 7);
        for i in 0..100 {
            let t = Duration::from_millis(i);
            let (va, vb) = (a.sample(t), b.sample(t));
            assert_eq!(va, vb);
            assert!((-0.5..0.5).contains(&va));
        }
    }

    #[test]
    fn test_gain_and_closures() {
        assert_eq!(Gain(2.0).apply(1.25), 2.5);

        let mut offset = |s: Sample| s + 1.0;
        assert_eq!(offset.apply(1.0), 2.0);

        let mut ramp = |t: Duration| t.as_secs_f64();
        assert_eq!(ramp.sample(Duration::from_secs(3)), 3.0);
    }
}
