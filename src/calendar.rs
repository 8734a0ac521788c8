mod notice_holder;

use notice_holder::NoticeHolder;
use ordered_float::NotNan;

use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// A request for something to happen at a specific simulated time.
///
/// The `kind` is a discriminated tag chosen by the caller, typically an enum whose variants carry whatever entity the
/// event concerns. A notice is immutable once it has been handed to an [`EventCalendar`] and is consumed exactly once
/// by [`EventCalendar::remove()`].
#[derive(Debug, Clone, PartialEq)]
pub struct EventNotice<Kind> {
    time: f64,
    kind: Kind,
}

impl<Kind> EventNotice<Kind> {
    /// Create a notice for `kind` at absolute simulated time `time`.
    pub fn new(time: f64, kind: Kind) -> Self {
        Self { time, kind }
    }

    /// The simulated time at which this notice is due.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Shared access to the event kind.
    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    /// Consume the notice, keeping only its kind.
    pub fn into_kind(self) -> Kind {
        self.kind
    }
}

/// Time-ordered set of pending [`EventNotice`]s.
///
/// Notices come back out of [`remove()`] in ascending order of execution time, with ties broken by the order in which
/// they were scheduled. Statistics recorded at equal-time events depend on this ordering, so the tie-break is stable
/// and deterministic rather than left to the heap.
///
/// The calendar also owns the simulation clock: removing a notice advances the clock to that notice's time, and the
/// clock never moves backward within a replication because every scheduling method refuses times earlier than the
/// current clock.
///
/// # Errors
///
/// Attempting to schedule a notice for a time that is already past results in an [`Error::BackInTime`] without
/// modifying the calendar, and a NaN time results in an [`Error::NotANumber`]. Both indicate that client code
/// probably has a logical error, such as drawing a negative delay.
///
/// [`remove()`]: EventCalendar::remove
/// [`Error::BackInTime`]: crate::Error::BackInTime
/// [`Error::NotANumber`]: crate::Error::NotANumber
#[derive(Debug)]
pub struct EventCalendar<Kind> {
    notices: BinaryHeap<Reverse<NoticeHolder<Kind>>>,
    clock: f64,
    notices_added: u64,
}

impl<Kind> Default for EventCalendar<Kind> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Kind> EventCalendar<Kind> {
    /// Construct a new [`EventCalendar`] with no pending notices and a clock of zero.
    pub fn new() -> Self {
        Self {
            notices: BinaryHeap::default(),
            clock: 0.0,
            notices_added: 0,
        }
    }

    /// Insert `notice`, preserving ascending-time order and insertion-order stability.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BackInTime`] if the notice's time is earlier than the current clock, or
    /// [`Error::NotANumber`] if it is NaN. The calendar is unchanged in either case.
    ///
    /// [`Error::BackInTime`]: crate::Error::BackInTime
    /// [`Error::NotANumber`]: crate::Error::NotANumber
    pub fn schedule(&mut self, notice: EventNotice<Kind>) -> crate::Result {
        let execution_time = NotNan::new(notice.time).map_err(|_| crate::Error::NotANumber)?;
        if notice.time < self.clock {
            return Err(crate::Error::BackInTime {
                time: notice.time,
                clock: self.clock,
            });
        }

        let insertion_sequence = self.increment_notice_count();
        self.notices.push(Reverse(NoticeHolder {
            execution_time,
            kind: notice.kind,
            insertion_sequence,
        }));
        Ok(())
    }

    /// Schedule `kind` at absolute time `time`.
    ///
    /// # Errors
    ///
    /// See [`schedule()`](EventCalendar::schedule).
    pub fn schedule_at(&mut self, kind: Kind, time: f64) -> crate::Result {
        self.schedule(EventNotice::new(time, kind))
    }

    /// Schedule `kind` to execute `delay` time units after the current clock. A delay of zero places the notice after
    /// every notice already pending for the current time.
    ///
    /// # Errors
    ///
    /// A negative delay yields [`Error::BackInTime`]; a NaN delay yields [`Error::NotANumber`].
    ///
    /// [`Error::BackInTime`]: crate::Error::BackInTime
    /// [`Error::NotANumber`]: crate::Error::NotANumber
    pub fn schedule_with_delay(&mut self, kind: Kind, delay: f64) -> crate::Result {
        if delay.is_nan() {
            return Err(crate::Error::NotANumber);
        }
        if delay < 0.0 {
            return Err(crate::Error::BackInTime {
                time: self.clock + delay,
                clock: self.clock,
            });
        }
        self.schedule_at(kind, self.clock + delay)
    }

    /// Helper function to make sure incrementing the internal count of added notices occurs the same way across all
    /// scheduling methods.
    fn increment_notice_count(&mut self) -> u64 {
        let count = self.notices_added;
        self.notices_added += 1;
        count
    }

    /// Extract the earliest pending notice and advance the clock to its time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyCalendar`] if nothing is pending.
    ///
    /// [`Error::EmptyCalendar`]: crate::Error::EmptyCalendar
    pub fn remove(&mut self) -> crate::Result<EventNotice<Kind>> {
        let Reverse(holder) = self.notices.pop().ok_or(crate::Error::EmptyCalendar)?;
        let time = holder.execution_time.into_inner();
        debug_assert!(time >= self.clock, "calendar clock moved backward");
        self.clock = time;
        Ok(EventNotice::new(time, holder.kind))
    }

    /// Time of the earliest pending notice, if any, without removing it.
    pub fn peek_time(&self) -> Option<f64> {
        self.notices.peek().map(|Reverse(holder)| holder.execution_time.into_inner())
    }

    /// Number of pending notices.
    pub fn len(&self) -> usize {
        self.notices.len()
    }

    /// Whether no notices are pending.
    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }

    /// The current simulation clock: the time of the most recently removed notice, or zero after [`clear()`].
    ///
    /// [`clear()`]: EventCalendar::clear
    pub fn current_time(&self) -> f64 {
        self.clock
    }

    /// Drop every pending notice and rewind the clock to zero, ready for a new replication.
    pub fn clear(&mut self) {
        self.notices.clear();
        self.clock = 0.0;
        self.notices_added = 0;
    }
}

impl<Kind> std::fmt::Display for EventCalendar<Kind> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            formatter,
            "EventCalendar with {} pending notices at current time {}",
            self.notices.len(),
            self.clock
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn notices_leave_in_time_order() {
        let mut calendar = EventCalendar::new();
        calendar.schedule_at("late", 30.0).unwrap();
        calendar.schedule_at("early", 10.0).unwrap();
        calendar.schedule_at("mid", 20.0).unwrap();

        let order: Vec<_> = (0..3).map(|_| calendar.remove().unwrap().into_kind()).collect();
        assert_eq!(vec!["early", "mid", "late"], order, "notices did not leave in time order");
        assert_eq!(30.0, calendar.current_time(), "clock did not follow the last removal");
    }

    #[test]
    fn ties_leave_in_insertion_order() {
        let mut calendar = EventCalendar::new();
        for value in 0..5 {
            calendar.schedule_at(value, 4.0).unwrap();
        }
        calendar.schedule_at(-1, 1.0).unwrap();

        let order: Vec<i32> = (0..6).map(|_| calendar.remove().unwrap().into_kind()).collect();
        assert_eq!(vec![-1, 0, 1, 2, 3, 4], order, "equal-time notices were reordered");
    }

    #[test]
    fn zero_delay_runs_after_existing_notices_for_now() {
        let mut calendar = EventCalendar::new();
        calendar.schedule_at("first", 2.0).unwrap();
        calendar.schedule_at("second", 2.0).unwrap();
        calendar.remove().unwrap();
        calendar.schedule_with_delay("immediate", 0.0).unwrap();

        assert_eq!("second", calendar.remove().unwrap().into_kind());
        assert_eq!("immediate", calendar.remove().unwrap().into_kind());
    }

    #[test]
    fn scheduling_in_the_past_is_rejected() {
        let mut calendar = EventCalendar::new();
        calendar.schedule_at((), 5.0).unwrap();
        calendar.remove().unwrap();

        assert_eq!(
            Err(Error::BackInTime { time: 4.0, clock: 5.0 }),
            calendar.schedule_at((), 4.0),
            "past time should be rejected"
        );
        assert_eq!(
            Err(Error::BackInTime { time: 4.5, clock: 5.0 }),
            calendar.schedule_with_delay((), -0.5),
            "negative delay should be rejected"
        );
        assert!(calendar.is_empty(), "rejected notices should not be stored");
    }

    #[test]
    fn nan_times_are_rejected() {
        let mut calendar = EventCalendar::new();
        assert_eq!(Err(Error::NotANumber), calendar.schedule_at((), f64::NAN));
        assert_eq!(Err(Error::NotANumber), calendar.schedule_with_delay((), f64::NAN));
        assert_eq!(0, calendar.len());
    }

    #[test]
    fn removing_from_empty_calendar_fails() {
        let mut calendar: EventCalendar<()> = EventCalendar::new();
        assert_eq!(Err(Error::EmptyCalendar), calendar.remove());
    }

    #[test]
    fn clear_rewinds_clock_and_drops_notices() {
        let mut calendar = EventCalendar::new();
        calendar.schedule_at(1, 7.0).unwrap();
        calendar.schedule_at(2, 9.0).unwrap();
        calendar.remove().unwrap();
        calendar.clear();

        assert_eq!(0.0, calendar.current_time());
        assert_eq!(None, calendar.peek_time());
        calendar.schedule_at(3, 1.0).expect("time 1.0 should be valid after clearing");
    }

    #[test]
    fn display_reports_pending_count() {
        let mut calendar = EventCalendar::new();
        calendar.schedule_at('a', 1.5).unwrap();
        assert_eq!(
            "EventCalendar with 1 pending notices at current time 0",
            calendar.to_string()
        );
    }
}
