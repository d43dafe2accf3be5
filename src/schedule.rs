use std::time::Duration;

use crate::item::Edge;

/// Bumped on every reload. Tasks from an older generation are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

/// Send the paired card toward `edge`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoResolve {
    pub item_id: String,
    pub edge: Edge,
    pub generation: Generation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    AutoResolve(AutoResolve),
    PrepareNext { generation: Generation },
}

impl Task {
    pub fn generation(&self) -> Generation {
        match self {
            Task::AutoResolve(auto) => auto.generation,
            Task::PrepareNext { generation } => *generation,
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    due: Duration,
    seq: u64,
    task: Task,
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    now: Duration,
    seq: u64,
    pending: Vec<Entry>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, delay: Duration, task: Task) {
        let entry = Entry {
            due: self.now.saturating_add(delay),
            seq: self.seq,
            task,
        };
        self.seq += 1;
        // Equal deadlines fire in scheduling order.
        let at = self
            .pending
            .partition_point(|e| (e.due, e.seq) <= (entry.due, entry.seq));
        self.pending.insert(at, entry);
    }

    /// Moves the clock forward and returns every task now due.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<Task> {
        self.now = self.now.saturating_add(elapsed);
        let ready = self.pending.partition_point(|e| e.due <= self.now);
        self.pending.drain(..ready).map(|e| e.task).collect()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn next_due_in(&self) -> Option<Duration> {
        self.pending
            .first()
            .map(|e| e.due.saturating_sub(self.now))
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prepare(generation: u64) -> Task {
        Task::PrepareNext {
            generation: Generation(generation),
        }
    }

    #[test]
    fn tasks_fire_when_due_in_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(Duration::from_millis(300), prepare(3));
        scheduler.schedule(Duration::from_millis(100), prepare(1));
        scheduler.schedule(Duration::from_millis(100), prepare(2));

        assert!(scheduler.advance(Duration::from_millis(50)).is_empty());
        assert_eq!(scheduler.next_due_in(), Some(Duration::from_millis(50)));

        let fired = scheduler.advance(Duration::from_millis(50));
        assert_eq!(fired, vec![prepare(1), prepare(2)]);

        let fired = scheduler.advance(Duration::from_secs(1));
        assert_eq!(fired, vec![prepare(3)]);
        assert!(scheduler.is_idle());
        assert_eq!(scheduler.now(), Duration::from_millis(1100));
    }

    #[test]
    fn zero_delay_fires_on_next_advance() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(Duration::ZERO, prepare(0));
        assert_eq!(scheduler.pending_len(), 1);
        assert_eq!(scheduler.advance(Duration::ZERO), vec![prepare(0)]);
    }

    #[test]
    fn generation_advances() {
        let gen = Generation::default();
        assert_eq!(gen.next().value(), 1);
        assert!(gen.next() > gen);
    }
}
