use crate::calendar::EventCalendar;
use crate::entity::Entity;
use crate::queue::FifoQueue;
use crate::resource::Resource;
use crate::rng::Streams;
use crate::stats::{CtStat, DtStat, LevelOnClear};

use std::fmt::Formatter;

/// What a calendar entry asks the driver to do.
///
/// Model events are wrapped in [`Model`]; the other two variants are reserved for the driver, which schedules them
/// itself from the [`RunConfig`] at the start of every replication.
///
/// [`Model`]: EventKind::Model
/// [`RunConfig`]: crate::RunConfig
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind<Event> {
    /// A model event, handed to [`Model::handle()`](crate::Model::handle) when due.
    Model(Event),
    /// End of the warm-up period: every registered statistic is cleared, occupancy is left alone.
    WarmUp,
    /// End of the run: the replication stops without dispatching anything further.
    EndOfRun,
}

macro_rules! registry_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(usize);

        impl $name {
            /// Position of the handle in its registry, in registration order.
            pub fn index(self) -> usize {
                self.0
            }
        }
    };
}

registry_handle!(
    /// Handle to a [`Resource`] registered with a [`SimulationContext`].
    ResourceId
);
registry_handle!(
    /// Handle to a [`FifoQueue`] registered with a [`SimulationContext`].
    QueueId
);
registry_handle!(
    /// Handle to a [`CtStat`] registered with a [`SimulationContext`].
    CtStatId
);
registry_handle!(
    /// Handle to a [`DtStat`] registered with a [`SimulationContext`].
    DtStatId
);

/// Everything a replication mutates, in one place: the clock and event calendar, the random-number streams, and the
/// registries of resources, queues and statistics.
///
/// Models register their resources, queues and statistics once, keep the returned handles, and drive them through
/// the context so that every change is stamped with the current clock. Because the context owns every instance, the
/// driver can clear or reset all of them between warm-up and measurement, and between replications, without any
/// per-instance wiring.
///
/// Handles are only meaningful for the context that issued them; using one with another context panics or refers to
/// an unrelated instance.
pub struct SimulationContext<Event, Tag = ()> {
    calendar: EventCalendar<EventKind<Event>>,
    streams: Streams,
    resources: Vec<Resource>,
    queues: Vec<FifoQueue<Entity<Tag>>>,
    ct_stats: Vec<CtStat>,
    dt_stats: Vec<DtStat>,
}

impl<Event, Tag> Default for SimulationContext<Event, Tag> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Event, Tag> SimulationContext<Event, Tag> {
    /// An empty context at time zero using the default stream seeds.
    pub fn new() -> Self {
        Self::with_streams(Streams::new())
    }

    /// An empty context at time zero drawing from `streams`.
    pub fn with_streams(streams: Streams) -> Self {
        Self {
            calendar: EventCalendar::new(),
            streams,
            resources: Vec::new(),
            queues: Vec::new(),
            ct_stats: Vec::new(),
            dt_stats: Vec::new(),
        }
    }

    /// The current simulation clock.
    pub fn now(&self) -> f64 {
        self.calendar.current_time()
    }

    /// Schedule `event` to happen `delay` time units from now.
    ///
    /// # Errors
    ///
    /// A negative delay yields [`Error::BackInTime`]; a NaN delay yields [`Error::NotANumber`].
    ///
    /// [`Error::BackInTime`]: crate::Error::BackInTime
    /// [`Error::NotANumber`]: crate::Error::NotANumber
    pub fn schedule(&mut self, event: Event, delay: f64) -> crate::Result {
        self.calendar.schedule_with_delay(EventKind::Model(event), delay)
    }

    /// Schedule `event` at absolute time `time`.
    ///
    /// # Errors
    ///
    /// A time before the current clock yields [`Error::BackInTime`]; a NaN time yields [`Error::NotANumber`].
    ///
    /// [`Error::BackInTime`]: crate::Error::BackInTime
    /// [`Error::NotANumber`]: crate::Error::NotANumber
    pub fn schedule_at(&mut self, event: Event, time: f64) -> crate::Result {
        self.calendar.schedule_at(EventKind::Model(event), time)
    }

    pub(crate) fn schedule_kind_at(&mut self, kind: EventKind<Event>, time: f64) -> crate::Result {
        self.calendar.schedule_at(kind, time)
    }

    /// Read-only view of the pending events.
    pub fn calendar(&self) -> &EventCalendar<EventKind<Event>> {
        &self.calendar
    }

    pub(crate) fn calendar_mut(&mut self) -> &mut EventCalendar<EventKind<Event>> {
        &mut self.calendar
    }

    /// Number of pending events, including the driver's own.
    pub fn pending(&self) -> usize {
        self.calendar.len()
    }

    /// The random-number streams, for drawing variates.
    pub fn rng(&mut self) -> &mut Streams {
        &mut self.streams
    }

    /// Shared access to the random-number streams.
    pub fn streams(&self) -> &Streams {
        &self.streams
    }

    /// Swap in a different set of streams, returning the previous one.
    pub fn replace_streams(&mut self, streams: Streams) -> Streams {
        std::mem::replace(&mut self.streams, streams)
    }

    /// A new entity stamped with the current clock.
    pub fn new_entity(&self, tag: Tag) -> Entity<Tag> {
        Entity::new(tag, self.now())
    }

    /// Register a resource with `capacity` units.
    pub fn add_resource(&mut self, capacity: u32) -> ResourceId {
        self.resources.push(Resource::new(capacity));
        ResourceId(self.resources.len() - 1)
    }

    /// Shared access to a registered resource.
    pub fn resource(&self, id: ResourceId) -> &Resource {
        &self.resources[id.0]
    }

    /// Change a resource's capacity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityLocked`] if the resource has already been seized this replication.
    ///
    /// [`Error::CapacityLocked`]: crate::Error::CapacityLocked
    pub fn set_capacity(&mut self, id: ResourceId, capacity: u32) -> crate::Result {
        self.resources[id.0].set_capacity(capacity)
    }

    /// Seize `units` units of a resource now; `false` if not enough are idle.
    pub fn seize(&mut self, id: ResourceId, units: u32) -> bool {
        let now = self.now();
        self.resources[id.0].seize(units, now)
    }

    /// Free `units` units of a resource now; `false` if not that many are busy.
    pub fn free(&mut self, id: ResourceId, units: u32) -> bool {
        let now = self.now();
        self.resources[id.0].free(units, now)
    }

    /// Time-average number of busy units of a resource through now.
    pub fn resource_mean(&self, id: ResourceId) -> f64 {
        self.resources[id.0].mean(self.now())
    }

    /// Register an empty queue.
    pub fn add_queue(&mut self) -> QueueId {
        self.queues.push(FifoQueue::new());
        QueueId(self.queues.len() - 1)
    }

    /// Shared access to a registered queue.
    pub fn queue(&self, id: QueueId) -> &FifoQueue<Entity<Tag>> {
        &self.queues[id.0]
    }

    /// Append `entity` to the tail of a queue now.
    pub fn enqueue(&mut self, id: QueueId, entity: Entity<Tag>) {
        let now = self.now();
        self.queues[id.0].add(entity, now);
    }

    /// Take the oldest entity from a queue now.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyQueue`] if the queue is empty.
    ///
    /// [`Error::EmptyQueue`]: crate::Error::EmptyQueue
    pub fn dequeue(&mut self, id: QueueId) -> crate::Result<Entity<Tag>> {
        let now = self.now();
        self.queues[id.0].remove(now)
    }

    /// Number of entities waiting in a queue.
    pub fn queue_len(&self, id: QueueId) -> usize {
        self.queues[id.0].len()
    }

    /// Time-average number in a queue through now.
    pub fn queue_mean(&self, id: QueueId) -> f64 {
        self.queues[id.0].mean(self.now())
    }

    /// Register a time-weighted statistic with the given warm-up behavior.
    pub fn add_ct_stat(&mut self, on_clear: LevelOnClear) -> CtStatId {
        self.ct_stats.push(CtStat::new(on_clear));
        CtStatId(self.ct_stats.len() - 1)
    }

    /// Shared access to a registered time-weighted statistic.
    pub fn ct_stat(&self, id: CtStatId) -> &CtStat {
        &self.ct_stats[id.0]
    }

    /// Record that the quantity tracked by a time-weighted statistic changed to `value` now.
    pub fn record_level(&mut self, id: CtStatId, value: f64) {
        let now = self.now();
        self.ct_stats[id.0].record(value, now);
    }

    /// Time-average of a time-weighted statistic through now.
    pub fn ct_mean(&self, id: CtStatId) -> f64 {
        self.ct_stats[id.0].mean(self.now())
    }

    /// Register an observation statistic.
    pub fn add_dt_stat(&mut self) -> DtStatId {
        self.dt_stats.push(DtStat::new());
        DtStatId(self.dt_stats.len() - 1)
    }

    /// Shared access to a registered observation statistic.
    pub fn dt_stat(&self, id: DtStatId) -> &DtStat {
        &self.dt_stats[id.0]
    }

    /// Add one observation to an observation statistic.
    pub fn record(&mut self, id: DtStatId, x: f64) {
        self.dt_stats[id.0].record(x);
    }

    /// Clear every registered statistic at the current clock, as at the end of a warm-up period. Queue contents and
    /// busy counts are untouched, and the statistics embedded in queues and resources keep their current level.
    pub fn clear_statistics(&mut self) {
        let now = self.now();
        for stat in &mut self.ct_stats {
            stat.clear(now);
        }
        for stat in &mut self.dt_stats {
            stat.clear();
        }
        for queue in &mut self.queues {
            queue.clear_stat(now);
        }
        for resource in &mut self.resources {
            resource.clear_stat(now);
        }
    }

    /// Return every mutable piece of replication state to its starting point: clock at zero, calendar empty, queues
    /// empty, resources idle, statistics reset. Streams are left as they are so that successive
    /// replications draw fresh values.
    pub(crate) fn reset(&mut self) {
        self.calendar.clear();
        let now = self.now();
        for queue in &mut self.queues {
            queue.reset(now);
        }
        for resource in &mut self.resources {
            resource.reset(now);
        }
        for stat in &mut self.ct_stats {
            stat.reset(now);
        }
        for stat in &mut self.dt_stats {
            stat.clear();
        }
    }

    /// Number of registered resources, queues, time-weighted and observation statistics, in that order.
    pub fn registry_sizes(&self) -> (usize, usize, usize, usize) {
        (
            self.resources.len(),
            self.queues.len(),
            self.ct_stats.len(),
            self.dt_stats.len(),
        )
    }
}

impl<Event, Tag> std::fmt::Debug for SimulationContext<Event, Tag> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        f.debug_struct("SimulationContext")
            .field("now", &self.now())
            .field("pending", &self.calendar.len())
            .field("resources", &self.resources.len())
            .field("queues", &self.queues.len())
            .field("ct_stats", &self.ct_stats.len())
            .field("dt_stats", &self.dt_stats.len())
            .finish()
    }
}
