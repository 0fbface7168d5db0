mod bursty;
mod constant;
mod exponential_burst;
mod periodic;
mod poisson;
mod wave;

use rand::rngs::StdRng;
use rand::Rng;

use crate::models::{TrafficParams, TrafficPattern, TrafficSpike};

pub use bursty::{BurstyGenerator, MAX_BURST_SIZE_MEAN};
pub use constant::ConstantGenerator;
pub use exponential_burst::{ExponentialBurstGenerator, MAX_MEAN_BURST_SIZE};
pub use periodic::PeriodicGenerator;
pub use poisson::PoissonGenerator;
pub use wave::WaveGenerator;

pub const DEFAULT_PERIODIC_AMPLITUDE: f64 = 0.5;
pub const DEFAULT_WAVE_AMPLITUDE: f64 = 0.8;

pub trait TrafficGenerator {
    /// Gap until the next arrival, measured from `now`. `f64::INFINITY`
    /// means no arrival is coming.
    fn next_arrival_delay(&mut self, now: f64) -> f64;

    fn rate_at(&self, now: f64) -> f64;
}

#[derive(Clone, Debug)]
pub struct RateProfile {
    base_rate: f64,
    spikes: Vec<TrafficSpike>,
}

impl RateProfile {
    pub fn new(base_rate: f64, mut spikes: Vec<TrafficSpike>) -> Self {
        // Stable: spikes sharing a start keep their configured order.
        spikes.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
        Self { base_rate, spikes }
    }

    pub fn base_rate(&self) -> f64 {
        self.base_rate
    }

    pub fn spikes(&self) -> &[TrafficSpike] {
        &self.spikes
    }

    /// First spike covering `time` replaces `rate` with `base_rate * multiplier`.
    pub fn apply(&self, rate: f64, time: f64) -> f64 {
        self.spikes
            .iter()
            .find(|spike| spike.contains(time))
            .map(|spike| self.base_rate * spike.intensity_multiplier)
            .unwrap_or(rate)
    }
}

/// Exponential inter-arrival draw at `rate`; infinite when the rate is not positive.
pub(crate) fn exponential_delay(rng: &mut StdRng, rate: f64) -> f64 {
    if rate <= 0.0 {
        return f64::INFINITY;
    }
    let mut u = rng.gen::<f64>();
    if u <= f64::MIN_POSITIVE {
        u = f64::MIN_POSITIVE;
    }
    -u.ln() / rate
}

pub fn build_generator(
    pattern: TrafficPattern,
    base_rate: f64,
    params: &TrafficParams,
    spikes: Vec<TrafficSpike>,
    rng: StdRng,
) -> Box<dyn TrafficGenerator> {
    let profile = RateProfile::new(base_rate, spikes);
    match pattern {
        TrafficPattern::Poisson => Box::new(PoissonGenerator::new(profile, rng)),
        TrafficPattern::Constant => Box::new(ConstantGenerator::new(profile)),
        TrafficPattern::Periodic => Box::new(PeriodicGenerator::new(
            profile,
            params.period,
            params.amplitude_factor.unwrap_or(DEFAULT_PERIODIC_AMPLITUDE),
            rng,
        )),
        TrafficPattern::Wave => Box::new(WaveGenerator::new(
            profile,
            params.wave_period,
            params.amplitude_factor.unwrap_or(DEFAULT_WAVE_AMPLITUDE),
            params.wave_type,
            rng,
        )),
        TrafficPattern::Bursty => Box::new(BurstyGenerator::new(
            profile,
            params.burst_size_mean,
            params.burst_interval,
            rng,
        )),
        TrafficPattern::ExponentialBurst => Box::new(ExponentialBurstGenerator::new(
            profile,
            params.burst_rate,
            params.mean_burst_size,
            rng,
        )),
    }
}
