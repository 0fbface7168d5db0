use crate::algorithms::{Selection, SelectionContext, SelectionStrategy};

#[derive(Default)]
pub struct RoundRobinStrategy {
    next_idx: usize,
}

impl SelectionStrategy for RoundRobinStrategy {
    fn select(&mut self, ctx: &mut SelectionContext) -> Option<Selection> {
        let len = ctx.servers.len();
        for _ in 0..len {
            let idx = self.next_idx % len;
            self.next_idx = (idx + 1) % len;
            if ctx.servers[idx].is_available() {
                return Some(Selection {
                    server_id: idx,
                    score: None,
                });
            }
        }
        None
    }
}
