use crate::algorithms::{min_by_score, Selection, SelectionContext, SelectionStrategy};

#[derive(Default)]
pub struct LeastConnectionsStrategy;

impl SelectionStrategy for LeastConnectionsStrategy {
    fn select(&mut self, ctx: &mut SelectionContext) -> Option<Selection> {
        min_by_score(ctx.servers, |server| server.queue_length() as f64)
    }
}
