use ordered_float::NotNan;
use std::cmp::Ordering;

/// Heap entry behind [`EventCalendar`](super::EventCalendar).
///
/// Two holders compare by execution time and then by the sequence number the calendar stamped on them when they were
/// scheduled, so notices due at the same instant come out in the order they went in. The payload is ignored.
#[derive(Debug)]
pub(super) struct NoticeHolder<Kind> {
    pub execution_time: NotNan<f64>,
    pub kind: Kind,
    pub insertion_sequence: u64,
}

impl<Kind> NoticeHolder<Kind> {
    fn sort_key(&self) -> (NotNan<f64>, u64) {
        (self.execution_time, self.insertion_sequence)
    }
}

impl<Kind> PartialEq for NoticeHolder<Kind> {
    fn eq(&self, other: &Self) -> bool {
        self.sort_key() == other.sort_key()
    }
}

impl<Kind> Eq for NoticeHolder<Kind> {}

impl<Kind> PartialOrd for NoticeHolder<Kind> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<Kind> Ord for NoticeHolder<Kind> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}
