use rand::rngs::StdRng;

use crate::traffic::{exponential_delay, RateProfile, TrafficGenerator};

pub struct PoissonGenerator {
    profile: RateProfile,
    rng: StdRng,
}

impl PoissonGenerator {
    pub fn new(profile: RateProfile, rng: StdRng) -> Self {
        Self { profile, rng }
    }
}

impl TrafficGenerator for PoissonGenerator {
    fn next_arrival_delay(&mut self, now: f64) -> f64 {
        let rate = self.rate_at(now);
        exponential_delay(&mut self.rng, rate)
    }

    fn rate_at(&self, now: f64) -> f64 {
        self.profile.apply(self.profile.base_rate(), now)
    }
}
