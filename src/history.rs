use std::collections::VecDeque;

/// a fixed-capacity first-in first-out series of samples.
///
/// once full, each push evicts the oldest sample.
#[derive(Clone, Debug, PartialEq)]
pub struct History<T> {
    capacity: usize,
    samples: VecDeque<T>,
}

// === impl History ===

impl<T> History<T> {
    /// creates an empty history. the capacity is at least one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, sample: T) {
        let Self { capacity, samples } = self;

        if samples.len() == *capacity {
            samples.pop_front();
        }
        samples.push_back(sample);
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// the most recent sample.
    pub fn latest(&self) -> Option<&T> {
        self.samples.back()
    }

    /// iterates from oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.samples.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_to_capacity() {
        let mut history = History::new(3);
        history.push(1);
        history.push(2);
        assert_eq!(history.len(), 2);
        assert_eq!(history.latest(), Some(&2));
    }

    #[test]
    fn evicts_oldest() {
        let mut history = History::new(3);
        for n in 1..=4 {
            history.push(n);
        }

        assert_eq!(history.len(), 3);
        assert_eq!(history.iter().copied().collect::<Vec<_>>(), [2, 3, 4]);
    }

    #[test]
    fn never_exceeds_capacity() {
        let mut history = History::new(60);
        for n in 0..1000 {
            history.push(n);
            assert!(history.len() <= history.capacity());
        }
        assert_eq!(history.iter().next(), Some(&940));
    }

    #[test]
    fn zero_capacity_holds_one() {
        let mut history = History::new(0);
        history.push('a');
        history.push('b');
        assert_eq!(history.capacity(), 1);
        assert_eq!(history.iter().collect::<Vec<_>>(), [&'b']);
    }
}
