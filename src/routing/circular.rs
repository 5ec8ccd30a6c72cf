//! Round-robin rotation over a fixed set of replica names.

use std::sync::atomic::{AtomicUsize, Ordering};
use crate::routing::error::RoutingError;

/// Fixed, ordered, non-empty rotation.
/// Stores an internal cursor that always points at the next item to hand out.
#[derive(Debug)]
pub struct CircularSelector<T> {
    items: Vec<T>,
    cursor: AtomicUsize,
}

impl<T> CircularSelector<T> {
    /// Create a selector over `items` in the given order.
    pub fn new(items: Vec<T>) -> Result<Self, RoutingError> {
        if items.is_empty() {
            return Err(RoutingError::InvalidConfiguration(
                "circular selector requires at least one item".to_string(),
            ));
        }
        Ok(Self {
            items,
            cursor: AtomicUsize::new(0),
        })
    }

    /// Return the item under the cursor and advance the cursor by one.
    ///
    /// The read and the advance happen in a single compare-and-swap, so two
    /// concurrent callers never hand out the same slot of a cycle.
    pub fn next(&self) -> &T {
        let len = self.items.len();
        let mut current = self.cursor.load(Ordering::Relaxed);
        loop {
            let advanced = (current + 1) % len;
            match self.cursor.compare_exchange_weak(
                current, advanced, Ordering::AcqRel, Ordering::Relaxed
            ) {
                Ok(_) => break,
                Err(x) => current = x,
            }
        }
        &self.items[current]
    }

    /// Number of items in the rotation.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items in rotation order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Snapshot of the cursor, for diagnostics only.
    pub fn position(&self) -> usize {
        self.cursor.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_rejected() {
        let err = CircularSelector::<String>::new(Vec::new()).unwrap_err();
        assert!(matches!(err, RoutingError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_rotation_wraps_in_input_order() {
        let selector = CircularSelector::new(vec!["c", "a", "b"]).unwrap();

        let first_cycle: Vec<_> = (0..3).map(|_| *selector.next()).collect();
        assert_eq!(first_cycle, vec!["c", "a", "b"]);

        // 4th call wraps back to the first item
        assert_eq!(*selector.next(), "c");
    }

    #[test]
    fn test_period_is_exactly_len() {
        for n in 1..=7usize {
            let selector = CircularSelector::new((0..n).collect::<Vec<_>>()).unwrap();
            let first = *selector.next();
            for k in 1..(3 * n) {
                let value = *selector.next();
                assert_eq!(value == first, k % n == 0, "n={} k={}", n, k);
            }
        }
    }

    #[test]
    fn test_single_item_always_returned() {
        let selector = CircularSelector::new(vec!["only"]).unwrap();
        for _ in 0..5 {
            assert_eq!(*selector.next(), "only");
            assert_eq!(selector.position(), 0);
        }
    }

    #[test]
    fn test_cursor_stays_in_range() {
        let selector = CircularSelector::new(vec![1, 2, 3]).unwrap();
        for _ in 0..100 {
            selector.next();
            assert!(selector.position() < selector.len());
        }
    }

    #[test]
    fn test_concurrent_full_cycle_is_distinct() {
        use std::collections::HashSet;
        use std::sync::{Arc, Barrier};

        let n = 8;
        let selector = Arc::new(CircularSelector::new((0..n).collect::<Vec<usize>>()).unwrap());
        let barrier = Arc::new(Barrier::new(n));

        let handles: Vec<_> = (0..n)
            .map(|_| {
                let selector = selector.clone();
                let barrier = barrier.clone();
                std::thread::spawn(move || {
                    barrier.wait();
                    *selector.next()
                })
            })
            .collect();

        let seen: HashSet<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(seen.len(), n);
        assert_eq!(selector.position(), 0);
    }
}
