use rand::Rng;

use crate::algorithms::{Selection, SelectionContext, SelectionStrategy};
use crate::server::Server;

const SLOTS_PER_UNIT_WEIGHT: f64 = 10.0;

/// Uniform pick from a virtual pool where server `i` holds
/// `max(1, round(weight_i * 10))` slots, halves rounding to even.
/// Servers without a configured weight get weight 1.0.
#[derive(Default)]
pub struct WeightedRoundRobinStrategy {
    weights: Vec<f64>,
    total_slots: u64,
    prefix_sums: Vec<u64>,
    cached_len: usize,
}

impl WeightedRoundRobinStrategy {
    pub fn new(weights: Vec<f64>) -> Self {
        Self {
            weights,
            ..Self::default()
        }
    }

    fn slots_for(&self, idx: usize) -> u64 {
        let weight = self.weights.get(idx).copied().unwrap_or(1.0);
        ((weight * SLOTS_PER_UNIT_WEIGHT).round_ties_even() as u64).max(1)
    }

    fn rebuild_cache(&mut self, servers: &[Server]) {
        self.total_slots = 0;
        self.prefix_sums.clear();
        self.prefix_sums.reserve(servers.len());

        for (idx, server) in servers.iter().enumerate() {
            if server.is_available() {
                self.total_slots += self.slots_for(idx);
            }
            self.prefix_sums.push(self.total_slots);
        }

        self.cached_len = servers.len();
    }
}

impl SelectionStrategy for WeightedRoundRobinStrategy {
    fn select(&mut self, ctx: &mut SelectionContext) -> Option<Selection> {
        if self.prefix_sums.is_empty() || self.cached_len != ctx.servers.len() {
            self.rebuild_cache(ctx.servers);
        }
        if self.total_slots == 0 {
            return None;
        }

        let target = ctx.rng.gen_range(0..self.total_slots);
        let selected = self
            .prefix_sums
            .binary_search_by(|sum| {
                if *sum > target {
                    std::cmp::Ordering::Greater
                } else {
                    std::cmp::Ordering::Less
                }
            })
            .unwrap_or_else(|idx| idx);

        Some(Selection {
            server_id: selected,
            score: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn servers(count: usize) -> Vec<Server> {
        (0..count).map(|id| Server::test_server(id, 1, 100.0)).collect()
    }

    #[test]
    fn slots_follow_weights_with_floor_of_one() {
        let strategy = WeightedRoundRobinStrategy::new(vec![2.0, 0.01, 0.26]);
        assert_eq!(strategy.slots_for(0), 20);
        assert_eq!(strategy.slots_for(1), 1);
        assert_eq!(strategy.slots_for(2), 3);
        assert_eq!(strategy.slots_for(3), 10);
    }

    #[test]
    fn half_slots_round_to_even() {
        let strategy = WeightedRoundRobinStrategy::new(vec![0.25, 0.45, 1.25, 0.35]);
        assert_eq!(strategy.slots_for(0), 2);
        assert_eq!(strategy.slots_for(1), 4);
        assert_eq!(strategy.slots_for(2), 12);
        assert_eq!(strategy.slots_for(3), 4);
    }

    #[test]
    fn weighted_round_robin_respects_weights() {
        let servers = servers(2);
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);
        let mut strategy = WeightedRoundRobinStrategy::new(vec![3.0, 1.0]);
        let mut ctx = SelectionContext {
            servers: &servers,
            time: 0.0,
            rng: &mut rng,
        };

        let mut counts = [0usize; 2];
        for _ in 0..4_000 {
            let pick = strategy.select(&mut ctx).expect("selection").server_id;
            counts[pick] += 1;
        }
        let share = counts[0] as f64 / 4_000.0;
        assert!((share - 0.75).abs() < 0.05, "share was {}", share);
    }

    #[test]
    fn weighted_round_robin_rebuilds_cache_on_server_change() {
        let servers_v1 = servers(1);
        let servers_v2 = servers(2);
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);
        let mut strategy = WeightedRoundRobinStrategy::new(vec![1.0, 1.0]);
        {
            let mut ctx_v1 = SelectionContext {
                servers: &servers_v1,
                time: 0.0,
                rng: &mut rng,
            };
            assert_eq!(strategy.select(&mut ctx_v1).map(|s| s.server_id), Some(0));
        }

        let mut ctx_v2 = SelectionContext {
            servers: &servers_v2,
            time: 0.0,
            rng: &mut rng,
        };
        let picks: Vec<usize> = (0..200)
            .map(|_| strategy.select(&mut ctx_v2).expect("selection").server_id)
            .collect();
        assert_eq!(strategy.total_slots, 20);
        assert!(picks.contains(&1));
    }
}
