//! Logical clock and timer queue.
//!
//! Every delayed effect (end of invulnerability, a poison tick, a cooldown)
//! is a [`TimerEvent`] scheduled on the [`Scheduler`]. The arena drains due
//! events at the start of each tick and each handler checks that its target
//! still exists and is alive, so timers never need to be cancelled when an
//! entity dies.

use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeSet, BinaryHeap};

use crate::entity::EntityId;

/// Milliseconds on the logical clock.
pub type Millis = u64;

/// Cancellation handle returned by [`Scheduler::schedule`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimerHandle(u64);

/// Delayed effects.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TimerEvent {
    InvulnerabilityEnded(EntityId),
    HitStunEnded(EntityId),
    RecentSourceExpired {
        target: EntityId,
        source: EntityId,
    },
    PoisonTick {
        target: EntityId,
        source: EntityId,
        damage: i32,
    },
    SlowExpired {
        target: EntityId,
        generation: u32,
    },
    FieldCooldownExpired {
        field: EntityId,
        target: EntityId,
    },
    /// Lifetime of a field or an armed trap ran out.
    Expired(EntityId),
    GeneratorReady(EntityId),
    WanderReady(EntityId),
    DashEnded(EntityId),
    DashReady(EntityId),
}

#[derive(Debug)]
struct Scheduled {
    due: Millis,
    seq: u64,
    event: TimerEvent,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Scheduled {}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due, self.seq).cmp(&(other.due, other.seq))
    }
}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Min-heap of timers keyed by due time, ties broken by scheduling order.
#[derive(Debug, Default)]
pub struct Scheduler {
    now: Millis,
    next_seq: u64,
    queue: BinaryHeap<Reverse<Scheduled>>,
    cancelled: BTreeSet<u64>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Millis {
        self.now
    }

    /// Schedules `event` to fire `delay` milliseconds from now.
    pub fn schedule(&mut self, delay: Millis, event: TimerEvent) -> TimerHandle {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse(Scheduled {
            due: self.now.saturating_add(delay),
            seq,
            event,
        }));
        TimerHandle(seq)
    }

    /// Cancels a pending timer. Cancelling a fired or unknown timer is a no-op.
    pub fn cancel(&mut self, handle: TimerHandle) {
        if handle.0 < self.next_seq {
            self.cancelled.insert(handle.0);
        }
    }

    /// Advances the clock to `now` and returns every event due by then, in
    /// due order.
    pub fn drain_due(&mut self, now: Millis) -> Vec<TimerEvent> {
        self.now = self.now.max(now);
        let mut due = Vec::new();
        while let Some(Reverse(next)) = self.queue.peek() {
            if next.due > self.now {
                break;
            }
            let Some(Reverse(scheduled)) = self.queue.pop() else {
                break;
            };
            if self.cancelled.remove(&scheduled.seq) {
                continue;
            }
            due.push(scheduled.event);
        }
        due
    }

    /// Number of timers still queued, cancelled ones included.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_fire_in_due_order() {
        let mut timers = Scheduler::new();
        timers.schedule(300, TimerEvent::InvulnerabilityEnded(EntityId(1)));
        timers.schedule(200, TimerEvent::HitStunEnded(EntityId(1)));

        assert!(timers.drain_due(100).is_empty());
        assert_eq!(
            timers.drain_due(250),
            vec![TimerEvent::HitStunEnded(EntityId(1))]
        );
        assert_eq!(
            timers.drain_due(300),
            vec![TimerEvent::InvulnerabilityEnded(EntityId(1))]
        );
    }

    #[test]
    fn ties_keep_scheduling_order() {
        let mut timers = Scheduler::new();
        timers.schedule(10, TimerEvent::WanderReady(EntityId(2)));
        timers.schedule(10, TimerEvent::WanderReady(EntityId(1)));
        assert_eq!(
            timers.drain_due(10),
            vec![
                TimerEvent::WanderReady(EntityId(2)),
                TimerEvent::WanderReady(EntityId(1)),
            ]
        );
    }

    #[test]
    fn cancelled_timers_never_fire() {
        let mut timers = Scheduler::new();
        let handle = timers.schedule(50, TimerEvent::DashReady(EntityId(4)));
        timers.cancel(handle);
        assert!(timers.drain_due(100).is_empty());
        assert_eq!(timers.pending(), 0);
    }

    #[test]
    fn delays_are_relative_to_the_clock() {
        let mut timers = Scheduler::new();
        timers.drain_due(1000);
        timers.schedule(500, TimerEvent::Expired(EntityId(9)));
        assert!(timers.drain_due(1499).is_empty());
        assert_eq!(timers.drain_due(1500).len(), 1);
    }
}
