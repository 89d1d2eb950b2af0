//! Insertion-ordered set with a fixed capacity.

use std::collections::{HashSet, VecDeque};
use std::hash::Hash;

/// An insertion-ordered set that never holds more than `capacity` elements.
///
/// Adding a new element to a full set evicts the element that was inserted first. Lookups
/// do not refresh an element's position: eviction order is FIFO, not LRU.
///
/// [`Stream`](super::Stream) uses this as its memory of already emitted item identities.
///
/// # Example
///
/// ```
/// use reddit_client_sdk::stream::BoundedSet;
///
/// let mut set = BoundedSet::with_items(3, ["a", "b", "c", "d"]);
/// assert!(!set.contains(&"a"));
///
/// set.insert("e");
/// assert_eq!(set.iter().copied().collect::<Vec<_>>(), ["c", "d", "e"]);
/// ```
#[derive(Debug, Clone)]
pub struct BoundedSet<T> {
    capacity: usize,
    order: VecDeque<T>,
    members: HashSet<T>,
}

impl<T> BoundedSet<T> {
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterates from the oldest to the most recently inserted element.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.order.iter()
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.members.clear();
    }
}

impl<T: Hash + Eq + Clone> BoundedSet<T> {
    /// Creates an empty set holding at most `capacity` elements.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity),
            members: HashSet::with_capacity(capacity),
        }
    }

    /// Creates a set seeded from `items`.
    ///
    /// When `items` yields more than `capacity` distinct elements only the last `capacity`
    /// of them survive, in the order they were yielded.
    #[must_use]
    pub fn with_items<I: IntoIterator<Item = T>>(capacity: usize, items: I) -> Self {
        let mut set = Self::new(capacity);
        set.extend(items);
        set
    }

    #[must_use]
    pub fn contains(&self, value: &T) -> bool {
        self.members.contains(value)
    }

    /// Inserts `value`, evicting the oldest element when the set is full.
    ///
    /// Returns `false` if `value` was already present, in which case its position is left
    /// unchanged.
    pub fn insert(&mut self, value: T) -> bool {
        if self.capacity == 0 || self.members.contains(&value) {
            return false;
        }

        if self.order.len() == self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.members.remove(&oldest);
            }
        }

        self.members.insert(value.clone());
        self.order.push_back(value);
        true
    }
}

impl<T: Hash + Eq + Clone> Extend<T> for BoundedSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contents<T: Hash + Eq + Clone + Copy>(set: &BoundedSet<T>) -> Vec<T> {
        set.iter().copied().collect()
    }

    #[test]
    fn insert_past_capacity_evicts_oldest() {
        let mut set = BoundedSet::new(2);

        assert!(set.insert(1));
        assert!(set.insert(2));
        assert!(set.insert(3));

        assert_eq!(contents(&set), [2, 3]);
        assert!(!set.contains(&1));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn duplicate_insert_keeps_position() {
        let mut set = BoundedSet::new(3);
        set.extend([1, 2, 3]);

        assert!(!set.insert(1));
        set.insert(4);

        // 1 was not refreshed by the duplicate insert, so it is still the oldest
        assert_eq!(contents(&set), [2, 3, 4]);
    }

    #[test]
    fn contains_does_not_refresh() {
        let mut set = BoundedSet::new(2);
        set.extend(["a", "b"]);

        assert!(set.contains(&"a"));
        set.insert("c");

        assert!(!set.contains(&"a"));
    }

    #[test]
    fn seeding_keeps_most_recent_elements() {
        let set = BoundedSet::with_items(3, 1..=10);

        assert_eq!(contents(&set), [8, 9, 10]);
        assert_eq!(set.capacity(), 3);
    }

    #[test]
    fn seeding_below_capacity_keeps_everything() {
        let set = BoundedSet::with_items(10, [5, 6, 7]);

        assert_eq!(contents(&set), [5, 6, 7]);
    }

    #[test]
    fn zero_capacity_holds_nothing() {
        let mut set = BoundedSet::new(0);

        assert!(!set.insert(1));
        assert!(set.is_empty());
    }

    #[test]
    fn clear_empties_set() {
        let mut set = BoundedSet::with_items(4, ["x", "y"]);
        set.clear();

        assert!(set.is_empty());
        assert!(!set.contains(&"x"));
    }
}
