use crate::algorithms::{min_by_score, Selection, SelectionContext, SelectionStrategy};

/// Penalizes backlog first and historical latency second.
#[derive(Default)]
pub struct CpuAwareStrategy;

impl SelectionStrategy for CpuAwareStrategy {
    fn select(&mut self, ctx: &mut SelectionContext) -> Option<Selection> {
        min_by_score(ctx.servers, |server| {
            server.queue_length() as f64 + server.mean_response_time() / 100.0
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::Server;
    use rand::SeedableRng;

    #[test]
    fn cpu_aware_adds_scaled_latency_to_queue() {
        let servers = vec![
            Server::test_server(0, 1, 100.0).with_load(1, &[250.0]),
            Server::test_server(1, 1, 100.0).with_load(2, &[10.0]),
            Server::test_server(2, 1, 100.0).with_load(1, &[20.0]),
        ];
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);
        let mut strategy = CpuAwareStrategy;
        let mut ctx = SelectionContext {
            servers: &servers,
            time: 0.0,
            rng: &mut rng,
        };

        let selection = strategy.select(&mut ctx).expect("selection");
        assert_eq!(selection.server_id, 2);
        assert_eq!(selection.score, Some(1.2));
    }
}
