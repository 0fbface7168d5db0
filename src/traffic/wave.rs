use rand::rngs::StdRng;
use std::f64::consts::PI;

use crate::models::WaveType;
use crate::traffic::{exponential_delay, RateProfile, TrafficGenerator};

pub struct WaveGenerator {
    profile: RateProfile,
    period: f64,
    amplitude: f64,
    shape: WaveType,
    rng: StdRng,
}

impl WaveGenerator {
    pub fn new(
        profile: RateProfile,
        period: f64,
        amplitude: f64,
        shape: WaveType,
        rng: StdRng,
    ) -> Self {
        Self {
            profile,
            period,
            amplitude,
            shape,
            rng,
        }
    }

    fn wave(&self, now: f64) -> f64 {
        let phase = (2.0 * PI * now / self.period).sin();
        match self.shape {
            WaveType::Sine => phase,
            WaveType::Square => {
                if phase >= 0.0 {
                    1.0
                } else {
                    -1.0
                }
            }
        }
    }
}

impl TrafficGenerator for WaveGenerator {
    fn next_arrival_delay(&mut self, now: f64) -> f64 {
        let rate = self.rate_at(now);
        exponential_delay(&mut self.rng, rate)
    }

    fn rate_at(&self, now: f64) -> f64 {
        let rate = self.profile.base_rate() * (1.0 + self.amplitude * self.wave(now));
        self.profile.apply(rate, now).max(0.0)
    }
}
