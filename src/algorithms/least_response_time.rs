use crate::algorithms::{min_by_score, Selection, SelectionContext, SelectionStrategy};
use crate::server::Server;

#[derive(Default)]
pub struct LeastResponseTimeStrategy;

fn score(server: &Server) -> f64 {
    let queue_length = server.queue_length() as f64;
    if server.has_history() {
        queue_length * server.mean_response_time()
    } else {
        queue_length
    }
}

impl SelectionStrategy for LeastResponseTimeStrategy {
    fn select(&mut self, ctx: &mut SelectionContext) -> Option<Selection> {
        min_by_score(ctx.servers, score)
    }
}
