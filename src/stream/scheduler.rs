//! Timer heap used to interleave work on a single task.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::fmt;
use std::time::Duration;

use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;

const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Handle to a scheduled entry, used with [`Scheduler::cancel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

struct Entry<T> {
    deadline: Instant,
    id: u64,
    payload: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.id == other.id
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    // Reversed so that `BinaryHeap` pops the earliest deadline first. Ties go to the entry
    // scheduled first.
    fn cmp(&self, other: &Self) -> Ordering {
        (other.deadline, other.id).cmp(&(self.deadline, self.id))
    }
}

/// Min-heap of payloads keyed by wake-up time.
///
/// Cancellation is lazy: cancelled entries stay in the heap and are dropped when they reach
/// the top.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use reddit_client_sdk::stream::Scheduler;
///
/// let mut scheduler = Scheduler::new();
/// let later = scheduler.schedule_after(Duration::from_secs(5), "later");
/// scheduler.schedule_after(Duration::from_secs(1), "sooner");
///
/// assert!(scheduler.cancel(later));
/// assert_eq!(scheduler.len(), 1);
/// ```
pub struct Scheduler<T> {
    heap: BinaryHeap<Entry<T>>,
    pending: HashSet<u64>,
    next_id: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            heap: BinaryHeap::new(),
            pending: HashSet::new(),
            next_id: 0,
        }
    }
}

impl<T> fmt::Debug for Scheduler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}

impl<T> Scheduler<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule_at(&mut self, deadline: Instant, payload: T) -> TimerId {
        let id = self.next_id;
        self.next_id += 1;
        self.pending.insert(id);
        self.heap.push(Entry {
            deadline,
            id,
            payload,
        });
        TimerId(id)
    }

    /// Schedules `payload` after `delay`. Delays too large to represent are clamped to roughly
    /// thirty years, like [`tokio::time::sleep`] does.
    pub fn schedule_after(&mut self, delay: Duration, payload: T) -> TimerId {
        let now = Instant::now();
        let deadline = now
            .checked_add(delay)
            .unwrap_or_else(|| now + FAR_FUTURE);

        self.schedule_at(deadline, payload)
    }

    /// Cancels a pending entry. Returns `false` if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.pending.remove(&id.0)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Deadline of the earliest live entry.
    pub fn next_deadline(&mut self) -> Option<Instant> {
        self.discard_cancelled();
        self.heap.peek().map(|entry| entry.deadline)
    }

    /// Removes and returns the earliest live entry if its deadline is at or before `now`.
    pub fn pop_due(&mut self, now: Instant) -> Option<(TimerId, T)> {
        if self.next_deadline()? > now {
            return None;
        }

        self.pop()
    }

    /// Waits for the earliest entry to come due and returns its payload.
    ///
    /// Returns `None` once the schedule is empty or `token` is cancelled.
    pub async fn next(&mut self, token: &CancellationToken) -> Option<T> {
        let deadline = self.next_deadline()?;

        tokio::select! {
            biased;
            () = token.cancelled() => None,
            () = sleep_until(deadline) => self.pop().map(|(_, payload)| payload),
        }
    }

    fn pop(&mut self) -> Option<(TimerId, T)> {
        self.discard_cancelled();
        let entry = self.heap.pop()?;
        self.pending.remove(&entry.id);
        Some((TimerId(entry.id), entry.payload))
    }

    fn discard_cancelled(&mut self) {
        while let Some(entry) = self.heap.peek() {
            if self.pending.contains(&entry.id) {
                break;
            }
            self.heap.pop();
        }
    }
}
