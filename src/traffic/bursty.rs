use rand::rngs::StdRng;
use rand::Rng;
use std::collections::VecDeque;

use crate::traffic::{exponential_delay, RateProfile, TrafficGenerator};

/// Largest Poisson mean the inversion sampler accepts; `e^-mean` underflows past ~745.
pub const MAX_BURST_SIZE_MEAN: f64 = 500.0;

/// Two-stage arrivals: an exponential burst clock, and Poisson-sized bursts
/// of exponential gaps queued up when the clock fires.
pub struct BurstyGenerator {
    profile: RateProfile,
    burst_size_mean: f64,
    burst_interval: f64,
    pending: VecDeque<f64>,
    next_burst_delay: f64,
    rng: StdRng,
}

impl BurstyGenerator {
    pub fn new(
        profile: RateProfile,
        burst_size_mean: f64,
        burst_interval: f64,
        rng: StdRng,
    ) -> Self {
        let mut generator = Self {
            profile,
            burst_size_mean,
            burst_interval,
            pending: VecDeque::new(),
            next_burst_delay: 0.0,
            rng,
        };
        generator.next_burst_delay = generator.draw_burst_delay();
        generator
    }

    fn draw_burst_delay(&mut self) -> f64 {
        if self.burst_interval <= 0.0 {
            return f64::INFINITY;
        }
        exponential_delay(&mut self.rng, 1.0 / self.burst_interval)
    }

    /// Poisson draw by cumulative-probability inversion, at least 1.
    fn draw_burst_size(&mut self) -> usize {
        let mean = self.burst_size_mean;
        let mut count = 0usize;
        let mut prob = (-mean).exp();
        let mut cumulative = prob;
        let u = self.rng.gen::<f64>();

        while u > cumulative && prob > 0.0 {
            count += 1;
            prob *= mean / count as f64;
            cumulative += prob;
        }

        count.max(1)
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

impl TrafficGenerator for BurstyGenerator {
    fn next_arrival_delay(&mut self, now: f64) -> f64 {
        if let Some(delay) = self.pending.pop_front() {
            return delay;
        }

        let burst_delay = self.next_burst_delay;
        let size = self.draw_burst_size();
        let rate = self.rate_at(now);
        if rate > 0.0 {
            for _ in 0..size {
                let gap = exponential_delay(&mut self.rng, rate);
                self.pending.push_back(gap);
            }
        }
        self.next_burst_delay = self.draw_burst_delay();
        burst_delay
    }

    fn rate_at(&self, now: f64) -> f64 {
        self.profile.apply(self.profile.base_rate(), now)
    }
}
