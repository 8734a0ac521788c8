use crate::stats::CtStat;

use std::collections::VecDeque;

/// First-in, first-out queue whose length is tracked over simulated time.
///
/// Every mutation records the new length into a [`CtStat`], so [`mean()`] is the time-average number in queue rather
/// than an average over the moments items happened to arrive.
///
/// [`mean()`]: FifoQueue::mean
#[derive(Debug, Clone)]
pub struct FifoQueue<Item> {
    items: VecDeque<Item>,
    length_stat: CtStat,
}

impl<Item> Default for FifoQueue<Item> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Item> FifoQueue<Item> {
    /// An empty queue.
    pub fn new() -> Self {
        Self {
            items: VecDeque::new(),
            length_stat: CtStat::default(),
        }
    }

    /// Append `item` to the tail at time `now`.
    pub fn add(&mut self, item: Item, now: f64) {
        self.items.push_back(item);
        self.length_stat.record(self.items.len() as f64, now);
    }

    /// Take the oldest item at time `now`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyQueue`] if there is nothing to remove.
    ///
    /// [`Error::EmptyQueue`]: crate::Error::EmptyQueue
    pub fn remove(&mut self, now: f64) -> crate::Result<Item> {
        let item = self.items.pop_front().ok_or(crate::Error::EmptyQueue)?;
        self.length_stat.record(self.items.len() as f64, now);
        Ok(item)
    }

    /// The oldest item, if any.
    pub fn front(&self) -> Option<&Item> {
        self.items.front()
    }

    /// Iterate from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    /// Number of items waiting.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is waiting.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Time-average number in queue through `now`.
    pub fn mean(&self, now: f64) -> f64 {
        self.length_stat.mean(now)
    }

    /// The underlying length statistic.
    pub fn length_stat(&self) -> &CtStat {
        &self.length_stat
    }

    pub(crate) fn clear_stat(&mut self, now: f64) {
        self.length_stat.clear(now);
    }

    /// Drop every waiting item and restart the statistic at `now`.
    pub(crate) fn reset(&mut self, now: f64) {
        self.items.clear();
        self.length_stat.reset(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn items_leave_in_arrival_order() {
        let mut queue = FifoQueue::new();
        for (time, item) in ["a", "b", "c"].into_iter().enumerate() {
            queue.add(item, time as f64);
        }
        assert_eq!(Some(&"a"), queue.front());
        assert_eq!(Ok("a"), queue.remove(3.0));
        assert_eq!(Ok("b"), queue.remove(3.0));
        assert_eq!(1, queue.len());
    }

    #[test]
    fn empty_queue_refuses_removal() {
        let mut queue: FifoQueue<u8> = FifoQueue::new();
        assert_eq!(Err(crate::Error::EmptyQueue), queue.remove(0.0));
        assert!(queue.is_empty());
    }

    #[test]
    fn mean_is_time_average_length() {
        let mut queue = FifoQueue::new();
        queue.add(1, 0.0);
        queue.add(2, 1.0);
        queue.remove(3.0).unwrap();
        queue.remove(4.0).unwrap();
        // length 1 for 1 unit, 2 for 2 units, 1 for 1 unit, 0 afterward
        assert_eq!(6.0 / 5.0, queue.mean(5.0));
        assert_eq!(2.0, queue.length_stat().max());
    }

    #[test]
    fn reset_empties_queue() {
        let mut queue = FifoQueue::new();
        queue.add('x', 2.0);
        queue.reset(0.0);
        assert!(queue.is_empty());
        assert_eq!(0.0, queue.mean(10.0));
    }
}
