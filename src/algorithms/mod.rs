mod cpu_aware;
mod least_connections;
mod least_response_time;
mod random;
mod round_robin;
mod weighted_round_robin;

use rand::RngCore;

use crate::models::BalancingStrategy;
use crate::server::Server;

pub use cpu_aware::CpuAwareStrategy;
pub use least_connections::LeastConnectionsStrategy;
pub use least_response_time::LeastResponseTimeStrategy;
pub use random::RandomStrategy;
pub use round_robin::RoundRobinStrategy;
pub use weighted_round_robin::WeightedRoundRobinStrategy;

pub trait SelectionStrategy {
    fn select(&mut self, ctx: &mut SelectionContext) -> Option<Selection>;
}

pub struct SelectionContext<'a> {
    pub servers: &'a [Server],
    pub time: f64,
    pub rng: &'a mut dyn RngCore,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Selection {
    pub server_id: usize,
    pub score: Option<f64>,
}

pub fn build_strategy(strategy: BalancingStrategy, weights: &[f64]) -> Box<dyn SelectionStrategy> {
    match strategy {
        BalancingStrategy::RoundRobin => Box::new(RoundRobinStrategy::default()),
        BalancingStrategy::LeastConnections => Box::new(LeastConnectionsStrategy),
        BalancingStrategy::WeightedRoundRobin => {
            Box::new(WeightedRoundRobinStrategy::new(weights.to_vec()))
        }
        BalancingStrategy::LeastResponseTime => Box::new(LeastResponseTimeStrategy),
        BalancingStrategy::Random => Box::new(RandomStrategy),
        BalancingStrategy::CpuAware => Box::new(CpuAwareStrategy),
    }
}

/// Lowest-scoring available server; ties go to the lowest index.
pub(crate) fn min_by_score<F>(servers: &[Server], score: F) -> Option<Selection>
where
    F: Fn(&Server) -> f64,
{
    let mut best: Option<Selection> = None;
    for (idx, server) in servers.iter().enumerate() {
        if !server.is_available() {
            continue;
        }
        let value = score(server);
        let better = match best {
            Some(Selection {
                score: Some(current),
                ..
            }) => value < current,
            _ => true,
        };
        if better {
            best = Some(Selection {
                server_id: idx,
                score: Some(value),
            });
        }
    }
    best
}
