use rand::rngs::StdRng;
use std::f64::consts::PI;

use crate::traffic::{exponential_delay, RateProfile, TrafficGenerator};

/// Cosine-modulated rate, evaluated once per draw rather than thinned.
pub struct PeriodicGenerator {
    profile: RateProfile,
    period: f64,
    amplitude: f64,
    rng: StdRng,
}

impl PeriodicGenerator {
    pub fn new(profile: RateProfile, period: f64, amplitude: f64, rng: StdRng) -> Self {
        Self {
            profile,
            period,
            amplitude,
            rng,
        }
    }
}

impl TrafficGenerator for PeriodicGenerator {
    fn next_arrival_delay(&mut self, now: f64) -> f64 {
        let rate = self.rate_at(now);
        exponential_delay(&mut self.rng, rate)
    }

    fn rate_at(&self, now: f64) -> f64 {
        let cycle = (2.0 * PI * now / self.period).cos();
        let rate = self.profile.base_rate() * (1.0 + self.amplitude * cycle);
        self.profile.apply(rate, now).max(0.0)
    }
}
