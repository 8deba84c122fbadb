//! Deferred callbacks over a caller-supplied millisecond clock.
//!
//! The host passes `now_ms` into every call, so tests drive time explicitly
//! and nothing fires behind the session's back. A cancelled handle is gone
//! for good: `pop_due` only ever yields entries that are still scheduled.

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// One-second countdown step.
    CountdownTick,
    /// Commit of the pending viewport page.
    CommitPage,
    /// End of the results fade-in.
    FadeComplete,
}

#[derive(Debug, Clone)]
struct Entry {
    handle: TaskHandle,
    task: Task,
    due_ms: u64,
    period_ms: Option<u64>,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    entries: Vec<Entry>,
    next_id: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule_once(&mut self, now_ms: u64, delay_ms: u64, task: Task) -> TaskHandle {
        self.push(now_ms.saturating_add(delay_ms), None, task)
    }

    pub fn schedule_repeating(&mut self, now_ms: u64, period_ms: u64, task: Task) -> TaskHandle {
        let period_ms = period_ms.max(1);
        self.push(now_ms.saturating_add(period_ms), Some(period_ms), task)
    }

    fn push(&mut self, due_ms: u64, period_ms: Option<u64>, task: Task) -> TaskHandle {
        self.next_id += 1;
        let handle = TaskHandle(self.next_id);
        self.entries.push(Entry {
            handle,
            task,
            due_ms,
            period_ms,
        });
        handle
    }

    /// Idempotent. Returns whether something was actually removed.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.handle != handle);
        self.entries.len() != before
    }

    pub fn is_scheduled(&self, handle: TaskHandle) -> bool {
        self.entries.iter().any(|e| e.handle == handle)
    }

    pub fn pending_count(&self) -> usize {
        self.entries.len()
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.entries.iter().map(|e| e.due_ms).min()
    }

    /// Takes the earliest entry due at or before `now_ms`. Repeating entries
    /// are re-armed one period later, so a late caller sees every missed
    /// period in order.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<(TaskHandle, Task)> {
        let idx = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due_ms <= now_ms)
            .min_by_key(|(_, e)| (e.due_ms, e.handle))
            .map(|(idx, _)| idx)?;

        let entry = &mut self.entries[idx];
        let fired = (entry.handle, entry.task);
        match entry.period_ms {
            Some(period) => entry.due_ms = entry.due_ms.saturating_add(period),
            None => {
                self.entries.remove(idx);
            }
        }
        Some(fired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_once_fires_after_delay_and_only_once() {
        let mut scheduler = Scheduler::new();
        let handle = scheduler.schedule_once(100, 150, Task::CommitPage);

        assert_eq!(scheduler.pop_due(249), None);
        assert_eq!(scheduler.pop_due(250), Some((handle, Task::CommitPage)));
        assert_eq!(scheduler.pop_due(10_000), None);
        assert!(!scheduler.is_scheduled(handle));
    }

    #[test]
    fn test_repeating_catches_up_in_order() {
        let mut scheduler = Scheduler::new();
        let handle = scheduler.schedule_repeating(0, 1_000, Task::CountdownTick);

        let mut fired = 0;
        while scheduler.pop_due(3_500).is_some() {
            fired += 1;
        }

        assert_eq!(fired, 3);
        assert_eq!(scheduler.next_deadline(), Some(4_000));
        assert!(scheduler.is_scheduled(handle));
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut scheduler = Scheduler::new();
        let handle = scheduler.schedule_repeating(0, 1_000, Task::CountdownTick);

        assert!(scheduler.cancel(handle));
        assert!(!scheduler.cancel(handle));
        assert_eq!(scheduler.pop_due(5_000), None);
    }

    #[test]
    fn test_cancel_never_scheduled_handle_is_noop() {
        let mut scheduler = Scheduler::new();
        let keep = scheduler.schedule_once(0, 10, Task::CommitPage);

        assert!(!scheduler.cancel(TaskHandle(999)));
        assert!(scheduler.is_scheduled(keep));
    }

    #[test]
    fn test_earliest_due_wins() {
        let mut scheduler = Scheduler::new();
        let tick = scheduler.schedule_repeating(0, 1_000, Task::CountdownTick);
        let commit = scheduler.schedule_once(900, 150, Task::CommitPage);

        assert_eq!(scheduler.pop_due(1_100), Some((tick, Task::CountdownTick)));
        assert_eq!(scheduler.pop_due(1_100), Some((commit, Task::CommitPage)));
        assert_eq!(scheduler.pop_due(1_100), None);
    }
}
