use rand::rngs::StdRng;
use rand::Rng;
use std::collections::VecDeque;

use crate::traffic::{RateProfile, TrafficGenerator};

/// Largest accepted `mean_burst_size`. Bursts are queued up front, so the
/// mean bounds memory per burst.
pub const MAX_MEAN_BURST_SIZE: f64 = 500.0;

const U_EPSILON: f64 = 1e-10;
const MAX_BURST_DELAY: f64 = 1e10;
// -ln(1e-10) * MAX_MEAN_BURST_SIZE is about 11.5k.
const MAX_BURST_LEN: usize = 16_384;

/// Like [`BurstyGenerator`](super::BurstyGenerator) but with exponentially
/// distributed burst sizes, which gives a heavier tail.
pub struct ExponentialBurstGenerator {
    profile: RateProfile,
    burst_rate: f64,
    mean_burst_size: f64,
    pending: VecDeque<f64>,
    next_burst_delay: f64,
    rng: StdRng,
}

impl ExponentialBurstGenerator {
    pub fn new(profile: RateProfile, burst_rate: f64, mean_burst_size: f64, rng: StdRng) -> Self {
        let mut generator = Self {
            profile,
            burst_rate,
            mean_burst_size,
            pending: VecDeque::new(),
            next_burst_delay: 0.0,
            rng,
        };
        generator.next_burst_delay = generator.draw_burst_delay();
        generator
    }

    fn clamped_uniform(&mut self) -> f64 {
        self.rng.gen::<f64>().clamp(U_EPSILON, 1.0 - U_EPSILON)
    }

    fn draw_burst_delay(&mut self) -> f64 {
        if self.burst_rate <= 0.0 {
            return f64::INFINITY;
        }
        let u = self.clamped_uniform();
        (-u.ln() / self.burst_rate).min(MAX_BURST_DELAY)
    }

    fn draw_burst_size(&mut self) -> usize {
        let u = self.clamped_uniform();
        ((-self.mean_burst_size * u.ln()).floor() as usize).clamp(1, MAX_BURST_LEN)
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

impl TrafficGenerator for ExponentialBurstGenerator {
    fn next_arrival_delay(&mut self, now: f64) -> f64 {
        if let Some(delay) = self.pending.pop_front() {
            return delay;
        }

        let burst_delay = self.next_burst_delay;
        let size = self.draw_burst_size();
        let rate = self.rate_at(now);
        if rate > 0.0 {
            for _ in 0..size {
                let u = self.clamped_uniform();
                self.pending.push_back(-u.ln() / rate);
            }
        }
        self.next_burst_delay = self.draw_burst_delay();
        burst_delay
    }

    fn rate_at(&self, now: f64) -> f64 {
        self.profile.apply(self.profile.base_rate(), now)
    }
}
