//! Timer queue for deferred engine work (fuses, post-turn delay, flight time)

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

/// Deferred engine work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Task {
    /// Begin the next turn for the current team
    StartTurn,
    /// Impact-fused projectile reached its impact point
    ResolveShot,
    /// Fuse ran out
    Detonate,
    /// Projectile left the field
    ShotLost,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Scheduled {
    due: u64,
    seq: u64,
    task: Task,
}

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

/// Min-queue of tasks ordered by (due time, insertion order)
#[derive(Debug, Clone, Default)]
pub struct TimerQueue {
    heap: BinaryHeap<Reverse<Scheduled>>,
    next_seq: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due: u64, task: Task) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(Scheduled { due, seq, task }));
    }

    /// Due time of the earliest task
    pub fn next_due(&self) -> Option<u64> {
        self.heap.peek().map(|Reverse(s)| s.due)
    }

    /// Remove the earliest task if it is due at or before `now`
    pub fn pop_due(&mut self, now: u64) -> Option<(u64, Task)> {
        if self.next_due()? > now {
            return None;
        }
        self.heap.pop().map(|Reverse(s)| (s.due, s.task))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pops_in_time_then_insertion_order() {
        let mut q = TimerQueue::new();
        q.schedule(500, Task::Detonate);
        q.schedule(100, Task::StartTurn);
        q.schedule(500, Task::ShotLost);
        assert_eq!(q.next_due(), Some(100));

        assert_eq!(q.pop_due(99), None);
        assert_eq!(q.pop_due(1_000), Some((100, Task::StartTurn)));
        assert_eq!(q.pop_due(1_000), Some((500, Task::Detonate)));
        assert_eq!(q.pop_due(1_000), Some((500, Task::ShotLost)));
        assert_eq!(q.next_due(), None);
        assert_eq!(q.pop_due(u64::MAX), None);
    }

    #[test]
    fn test_due_exactly_now() {
        let mut q = TimerQueue::new();
        q.schedule(10, Task::ResolveShot);
        assert_eq!(q.pop_due(9), None);
        assert_eq!(q.pop_due(10), Some((10, Task::ResolveShot)));
    }
}
