use rand::Rng;

use crate::algorithms::{Selection, SelectionContext, SelectionStrategy};

#[derive(Default)]
pub struct RandomStrategy;

impl SelectionStrategy for RandomStrategy {
    fn select(&mut self, ctx: &mut SelectionContext) -> Option<Selection> {
        let candidates: Vec<usize> = ctx
            .servers
            .iter()
            .enumerate()
            .filter(|(_, server)| server.is_available())
            .map(|(idx, _)| idx)
            .collect();
        if candidates.is_empty() {
            return None;
        }
        let pick = ctx.rng.gen_range(0..candidates.len());
        Some(Selection {
            server_id: candidates[pick],
            score: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::Server;
    use rand::SeedableRng;

    fn picks(seed: u64, servers: &[Server], count: usize) -> Vec<usize> {
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        let mut strategy = RandomStrategy;
        let mut ctx = SelectionContext {
            servers,
            time: 0.0,
            rng: &mut rng,
        };
        (0..count)
            .map(|_| strategy.select(&mut ctx).expect("selection").server_id)
            .collect()
    }

    #[test]
    fn random_is_reproducible_under_a_seed() {
        let servers: Vec<Server> = (0..4).map(|id| Server::test_server(id, 1, 100.0)).collect();
        assert_eq!(picks(42, &servers, 32), picks(42, &servers, 32));
    }

    #[test]
    fn random_matches_uniform_index_draw() {
        let servers: Vec<Server> = (0..3).map(|id| Server::test_server(id, 1, 100.0)).collect();
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let expected: Vec<usize> = (0..5).map(|_| rng.gen_range(0..3)).collect();
        assert_eq!(picks(7, &servers, 5), expected);
    }

    #[test]
    fn random_covers_every_server() {
        let servers: Vec<Server> = (0..3).map(|id| Server::test_server(id, 1, 100.0)).collect();
        let seen = picks(11, &servers, 300);
        for idx in 0..3 {
            assert!(seen.contains(&idx));
        }
    }
}
