use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashSet};

use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct EventId(u64);

#[derive(Clone, Debug)]
pub struct ScheduledEvent<E> {
    pub time: f64,
    pub id: EventId,
    pub event: E,
}

impl<E> ScheduledEvent<E> {
    pub fn new(time: f64, id: EventId, event: E) -> Self {
        Self { time, id, event }
    }
}

impl<E> PartialEq for ScheduledEvent<E> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<E> Eq for ScheduledEvent<E> {}

impl<E> Ord for ScheduledEvent<E> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .total_cmp(&other.time)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl<E> PartialOrd for ScheduledEvent<E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Events fire in ascending `(time, id)` order; ids are handed out in
/// insertion order, so events scheduled for the same instant dispatch FIFO.
pub struct Scheduler<E> {
    now: f64,
    next_id: u64,
    events: BinaryHeap<Reverse<ScheduledEvent<E>>>,
    cancelled: HashSet<EventId>,
    dispatched: u64,
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Scheduler<E> {
    pub fn new() -> Self {
        Self {
            now: 0.0,
            next_id: 0,
            events: BinaryHeap::new(),
            cancelled: HashSet::new(),
            dispatched: 0,
        }
    }

    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }

    pub fn pending(&self) -> usize {
        self.events.len().saturating_sub(self.cancelled.len())
    }

    /// An infinite delay is accepted and never fires.
    pub fn schedule_after(&mut self, delay: f64, event: E) -> Result<EventId> {
        if delay.is_nan() || delay < 0.0 {
            return Err(Error::InvariantViolation(format!(
                "cannot schedule an event {} units after t={}",
                delay, self.now
            )));
        }
        let id = EventId(self.next_id);
        self.next_id += 1;
        self.events
            .push(Reverse(ScheduledEvent::new(self.now + delay, id, event)));
        Ok(id)
    }

    /// Returns false if the event was already cancelled.
    pub fn cancel(&mut self, id: EventId) -> bool {
        if id.0 >= self.next_id {
            return false;
        }
        self.cancelled.insert(id)
    }

    /// Advances the clock to the next live event due strictly before `until`.
    pub fn next_due(&mut self, until: f64) -> Option<E> {
        loop {
            let due = match self.events.peek() {
                Some(Reverse(scheduled)) => scheduled.time < until,
                None => false,
            };
            if !due {
                return None;
            }
            let Reverse(scheduled) = self.events.pop()?;
            if self.cancelled.remove(&scheduled.id) {
                continue;
            }
            self.now = scheduled.time;
            self.dispatched += 1;
            return Some(scheduled.event);
        }
    }

    pub fn run_until<F>(&mut self, until: f64, mut handler: F) -> Result<()>
    where
        F: FnMut(&mut Self, E) -> Result<()>,
    {
        while let Some(event) = self.next_due(until) {
            handler(self, event)?;
        }
        Ok(())
    }

    pub fn run<F>(&mut self, handler: F) -> Result<()>
    where
        F: FnMut(&mut Self, E) -> Result<()>,
    {
        self.run_until(f64::INFINITY, handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatches_in_time_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_after(3.0, "c").expect("schedule");
        scheduler.schedule_after(1.0, "a").expect("schedule");
        scheduler.schedule_after(2.0, "b").expect("schedule");

        let mut seen = Vec::new();
        scheduler
            .run(|sched, event| {
                seen.push((sched.now(), event));
                Ok(())
            })
            .expect("run should succeed");
        assert_eq!(seen, vec![(1.0, "a"), (2.0, "b"), (3.0, "c")]);
    }

    #[test]
    fn equal_timestamps_dispatch_in_schedule_order() {
        let mut scheduler = Scheduler::new();
        for label in ["first", "second", "third"] {
            scheduler.schedule_after(5.0, label).expect("schedule");
        }
        let mut seen = Vec::new();
        scheduler
            .run(|_, event| {
                seen.push(event);
                Ok(())
            })
            .expect("run should succeed");
        assert_eq!(seen, vec!["first", "second", "third"]);
    }

    #[test]
    fn run_until_stops_before_horizon() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_after(1.0, 1).expect("schedule");
        scheduler.schedule_after(10.0, 10).expect("schedule");

        let mut seen = Vec::new();
        scheduler
            .run_until(10.0, |_, event| {
                seen.push(event);
                Ok(())
            })
            .expect("run should succeed");
        assert_eq!(seen, vec![1]);
        assert_eq!(scheduler.now(), 1.0);
        assert_eq!(scheduler.pending(), 1);
    }

    #[test]
    fn cancelled_events_never_fire() {
        let mut scheduler = Scheduler::new();
        let keep = scheduler.schedule_after(1.0, "keep").expect("schedule");
        let dropped = scheduler.schedule_after(1.0, "drop").expect("schedule");
        assert!(scheduler.cancel(dropped));
        assert!(!scheduler.cancel(dropped));
        assert_ne!(keep, dropped);

        let mut seen = Vec::new();
        scheduler
            .run(|_, event| {
                seen.push(event);
                Ok(())
            })
            .expect("run should succeed");
        assert_eq!(seen, vec!["keep"]);
        assert_eq!(scheduler.dispatched(), 1);
    }

    #[test]
    fn infinite_delay_never_fires() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_after(f64::INFINITY, "never").expect("schedule");
        scheduler.schedule_after(0.5, "soon").expect("schedule");

        let mut seen = Vec::new();
        scheduler
            .run(|_, event| {
                seen.push(event);
                Ok(())
            })
            .expect("run should succeed");
        assert_eq!(seen, vec!["soon"]);
    }

    #[test]
    fn handlers_can_schedule_follow_ups() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_after(1.0, 0u32).expect("schedule");

        let mut seen = Vec::new();
        scheduler
            .run_until(4.5, |sched, hop| {
                seen.push((sched.now(), hop));
                sched.schedule_after(1.0, hop + 1)?;
                Ok(())
            })
            .expect("run should succeed");
        assert_eq!(seen, vec![(1.0, 0), (2.0, 1), (3.0, 2), (4.0, 3)]);
    }

    #[test]
    fn negative_or_nan_delays_are_rejected() {
        let mut scheduler = Scheduler::new();
        for delay in [-1.0, f64::NAN, f64::NEG_INFINITY] {
            match scheduler.schedule_after(delay, "bad") {
                Err(Error::InvariantViolation(message)) => {
                    assert!(message.contains("cannot schedule"), "{}", message)
                }
                other => panic!("unexpected result: {:?}", other),
            }
        }
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(scheduler.now(), 0.0);
    }
}
