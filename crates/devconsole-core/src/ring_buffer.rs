//! Bounded ring buffer
//!
//! Fixed-capacity FIFO used for every growable panel category. Pushing past
//! capacity evicts the oldest element first.

use serde::{Serialize, Serializer};
use std::collections::VecDeque;

/// Fixed-capacity FIFO collection.
///
/// Invariant: `len() <= capacity()` at all times.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
    /// Items ever pushed, evicted ones included
    pushed: u64,
}

impl<T> RingBuffer<T> {
    /// Create an empty buffer holding at most `capacity` items
    pub fn new(capacity: usize) -> Self {
        Self {
            // Don't pre-allocate huge capacities from config typos
            items: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
            pushed: 0,
        }
    }

    /// Create a buffer from an iterator, keeping only the last `capacity` items
    pub fn from_iter_bounded(capacity: usize, items: impl IntoIterator<Item = T>) -> Self {
        let mut buffer = Self::new(capacity);
        buffer.extend(items);
        buffer
    }

    /// Append an item, evicting the oldest one when full.
    ///
    /// Returns the evicted item, if any.
    pub fn push(&mut self, item: T) -> Option<T> {
        self.pushed += 1;
        if self.capacity == 0 {
            return Some(item);
        }
        let evicted = if self.items.len() >= self.capacity {
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(item);
        evicted
    }

    /// Append every item in order
    pub fn extend(&mut self, items: impl IntoIterator<Item = T>) {
        for item in items {
            self.push(item);
        }
    }

    /// Replace the contents wholesale (keeps the last `capacity` items)
    pub fn replace(&mut self, items: impl IntoIterator<Item = T>) {
        self.items.clear();
        self.extend(items);
    }

    /// Change the capacity, trimming the oldest items if it shrank
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        while self.items.len() > capacity {
            self.items.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total number of pushes over the buffer's lifetime.
    ///
    /// Renderers diff this to find the entries added since they last looked.
    pub fn total_pushed(&self) -> u64 {
        self.pushed
    }

    /// Iterate oldest to newest
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.items.iter()
    }

    /// Oldest item still retained
    pub fn first(&self) -> Option<&T> {
        self.items.front()
    }

    /// Most recently pushed item
    pub fn last(&self) -> Option<&T> {
        self.items.back()
    }
}

// Equality is about contents; the push counter is bookkeeping
impl<T: PartialEq> PartialEq for RingBuffer<T> {
    fn eq(&self, other: &Self) -> bool {
        self.capacity == other.capacity && self.items == other.items
    }
}

impl<T: Eq> Eq for RingBuffer<T> {}

impl<T: Clone> RingBuffer<T> {
    /// Copy the contents out, oldest first
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}

impl<'a, T> IntoIterator for &'a RingBuffer<T> {
    type Item = &'a T;
    type IntoIter = std::collections::vec_deque::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: Serialize> Serialize for RingBuffer<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.items.iter())
    }
}


#[cfg(test)]
mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        /// N inserts into capacity C leave min(N, C) items: the last C, in order
        #[test]
        fn proptest_keeps_last_c_in_order(
            items in proptest::collection::vec(any::<u32>(), 0..300),
            capacity in 0usize..64
        ) {
            let mut buffer = RingBuffer::new(capacity);
            for item in &items {
                buffer.push(*item);
            }

            let expected_len = items.len().min(capacity);
            prop_assert_eq!(buffer.len(), expected_len);

            let expected: Vec<u32> = items[items.len() - expected_len..].to_vec();
            prop_assert_eq!(buffer.to_vec(), expected);
        }
    }
}
