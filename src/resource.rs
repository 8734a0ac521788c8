use crate::stats::CtStat;

/// A pool of identical, capacity-bounded units that events seize and free.
///
/// The number of busy units is tracked over time in a [`CtStat`], so [`mean()`] reports the time-average number busy
/// (divide by capacity for utilization). A [`Resource`] never queues requests on its own: when [`seize()`] reports
/// failure the model decides where the requester waits.
///
/// [`mean()`]: Resource::mean
/// [`seize()`]: Resource::seize
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    capacity: u32,
    busy: u32,
    busy_stat: CtStat,
    seized_since_reset: bool,
}

impl Resource {
    /// A resource with `capacity` units, all idle.
    pub fn new(capacity: u32) -> Self {
        Self {
            capacity,
            busy: 0,
            busy_stat: CtStat::default(),
            seized_since_reset: false,
        }
    }

    /// Change the number of units.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityLocked`] once any unit has been seized since the last [`reset()`]; capacity is a
    /// per-replication setting.
    ///
    /// [`Error::CapacityLocked`]: crate::Error::CapacityLocked
    /// [`reset()`]: Resource::reset
    pub fn set_capacity(&mut self, capacity: u32) -> crate::Result {
        if self.seized_since_reset {
            return Err(crate::Error::CapacityLocked);
        }
        self.capacity = capacity;
        Ok(())
    }

    /// Try to take `units` units at time `now`. Succeeds only if that many are idle; on failure nothing changes.
    pub fn seize(&mut self, units: u32, now: f64) -> bool {
        if self.capacity - self.busy < units {
            return false;
        }
        self.busy += units;
        self.seized_since_reset = true;
        self.busy_stat.record(f64::from(self.busy), now);
        true
    }

    /// Try to return `units` units at time `now`. Succeeds only if at least that many are busy; on failure nothing
    /// changes.
    pub fn free(&mut self, units: u32, now: f64) -> bool {
        if self.busy < units {
            return false;
        }
        self.busy -= units;
        self.busy_stat.record(f64::from(self.busy), now);
        true
    }

    /// Number of units.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Number of units currently seized.
    pub fn busy(&self) -> u32 {
        self.busy
    }

    /// Number of units currently idle.
    pub fn available(&self) -> u32 {
        self.capacity - self.busy
    }

    /// Time-average number of busy units through `now`.
    pub fn mean(&self, now: f64) -> f64 {
        self.busy_stat.mean(now)
    }

    /// The underlying busy-count statistic.
    pub fn busy_stat(&self) -> &CtStat {
        &self.busy_stat
    }

    /// Restart the busy-count statistic at `now` without touching occupancy.
    pub(crate) fn clear_stat(&mut self, now: f64) {
        self.busy_stat.clear(now);
    }

    /// Free every unit and restart the statistic at `now`. Capacity may be changed again afterward.
    pub(crate) fn reset(&mut self, now: f64) {
        self.busy = 0;
        self.seized_since_reset = false;
        self.busy_stat.reset(now);
    }
}
