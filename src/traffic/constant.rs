use crate::traffic::{RateProfile, TrafficGenerator};

/// Evenly spaced arrivals. Draws no randomness.
pub struct ConstantGenerator {
    profile: RateProfile,
}

impl ConstantGenerator {
    pub fn new(profile: RateProfile) -> Self {
        Self { profile }
    }
}

impl TrafficGenerator for ConstantGenerator {
    fn next_arrival_delay(&mut self, now: f64) -> f64 {
        let rate = self.rate_at(now);
        if rate <= 0.0 {
            return f64::INFINITY;
        }
        1.0 / rate
    }

    fn rate_at(&self, now: f64) -> f64 {
        self.profile.apply(self.profile.base_rate(), now)
    }
}
