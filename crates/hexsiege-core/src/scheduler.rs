//! Delayed-task queue on a logical millisecond clock.
//!
//! The core never reads a wall clock. A host advances the scheduler by
//! elapsed time and runs whatever falls due; tasks with the same deadline
//! run in scheduling order.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

/// Handle returned by [`Scheduler::after`], used to cancel the task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

#[derive(Debug)]
struct Scheduled<T> {
    deadline: u64,
    sequence: u64,
    task: T,
}

impl<T> PartialEq for Scheduled<T> {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.sequence == other.sequence
    }
}

impl<T> Eq for Scheduled<T> {}

impl<T> PartialOrd for Scheduled<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Scheduled<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Earliest deadline first, then FIFO; reversed for the max-heap.
        (other.deadline, other.sequence).cmp(&(self.deadline, self.sequence))
    }
}

#[derive(Debug)]
pub struct Scheduler<T> {
    now: u64,
    next_sequence: u64,
    heap: BinaryHeap<Scheduled<T>>,
    cancelled: HashSet<u64>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            now: 0,
            next_sequence: 0,
            heap: BinaryHeap::new(),
            cancelled: HashSet::new(),
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current logical time in milliseconds.
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Run `task` once `delay_ms` has elapsed.
    pub fn after(&mut self, delay_ms: u64, task: T) -> TaskHandle {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(Scheduled {
            deadline: self.now + delay_ms,
            sequence,
            task,
        });
        TaskHandle(sequence)
    }

    /// Cancel a pending task. Returns false if it already ran or was
    /// cancelled.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let pending = self.heap.iter().any(|s| s.sequence == handle.0);
        pending && self.cancelled.insert(handle.0)
    }

    /// Drop every pending task.
    pub fn cancel_all(&mut self) {
        self.heap.clear();
        self.cancelled.clear();
    }

    /// Number of live pending tasks.
    pub fn pending(&self) -> usize {
        self.heap
            .iter()
            .filter(|s| !self.cancelled.contains(&s.sequence))
            .count()
    }

    /// Pop the next task due at or before `until`, moving the clock to its
    /// deadline.
    pub fn pop_due(&mut self, until: u64) -> Option<T> {
        self.discard_cancelled();
        if self.heap.peek()?.deadline > until {
            return None;
        }
        let next = self.heap.pop()?;
        self.now = self.now.max(next.deadline);
        Some(next.task)
    }

    /// Move the clock forward without running anything. Never moves back.
    pub fn advance_to(&mut self, time: u64) {
        self.now = self.now.max(time);
    }

    fn discard_cancelled(&mut self) {
        while let Some(top) = self.heap.peek() {
            if !self.cancelled.remove(&top.sequence) {
                break;
            }
            self.heap.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(scheduler: &mut Scheduler<&'static str>, until: u64) -> Vec<&'static str> {
        let mut ran = Vec::new();
        while let Some(task) = scheduler.pop_due(until) {
            ran.push(task);
        }
        scheduler.advance_to(until);
        ran
    }

    #[test]
    fn test_deadline_order() {
        let mut scheduler = Scheduler::new();
        scheduler.after(300, "c");
        scheduler.after(100, "a");
        scheduler.after(200, "b");
        assert_eq!(drain(&mut scheduler, 1000), vec!["a", "b", "c"]);
        assert_eq!(scheduler.now(), 1000);
    }

    #[test]
    fn test_same_deadline_is_fifo() {
        let mut scheduler = Scheduler::new();
        scheduler.after(0, "first");
        scheduler.after(0, "second");
        scheduler.after(0, "third");
        assert_eq!(drain(&mut scheduler, 0), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_only_due_tasks_run() {
        let mut scheduler = Scheduler::new();
        scheduler.after(500, "late");
        scheduler.after(100, "early");
        assert_eq!(drain(&mut scheduler, 250), vec!["early"]);
        assert_eq!(scheduler.pending(), 1);
        // Delays are relative to the advanced clock.
        scheduler.after(100, "next");
        assert_eq!(drain(&mut scheduler, 400), vec!["next"]);
    }

    #[test]
    fn test_cancel() {
        let mut scheduler = Scheduler::new();
        let handle = scheduler.after(100, "cancelled");
        scheduler.after(200, "kept");
        assert!(scheduler.cancel(handle));
        assert!(!scheduler.cancel(handle));
        assert_eq!(scheduler.pending(), 1);
        assert_eq!(drain(&mut scheduler, 1000), vec!["kept"]);
        assert!(!scheduler.cancel(handle));
    }

    #[test]
    fn test_cancel_all() {
        let mut scheduler = Scheduler::new();
        scheduler.after(10, "a");
        scheduler.after(20, "b");
        scheduler.cancel_all();
        assert_eq!(scheduler.pending(), 0);
        assert!(drain(&mut scheduler, 100).is_empty());
    }
}
