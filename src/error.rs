/// Errors that may be encountered while building or executing a simulation.
///
/// The scheduling variants ([`BackInTime`] and [`NotANumber`]) originate from the [`EventCalendar`] and indicate
/// that an event's execution time could not be placed on the calendar. These likely correspond to a logical bug on
/// the client side, e.g. drawing a negative delay or forgetting to add an offset to the current time.
///
/// The underflow variants ([`EmptyCalendar`] and [`EmptyQueue`]) mean that a model asked for something that was not
/// there. A correctly written model checks [`FifoQueue::len()`] before removing, so the driver treats these as fatal
/// and aborts the replication.
///
/// Capacity shortfalls on a [`Resource`] are not represented here: [`Resource::seize()`] and
/// [`Resource::free()`] report them through a `bool` so that models can route the requester to a queue.
///
/// The [`BadExecution`] variant originates from client code, providing a wrapper that can pass through
/// [`Simulation::run_replication()`] in a type-safe manner. Invoking [`std::error::Error::source()`] on this variant
/// will acquire a shared reference to the wrapped [`std::error::Error`] for handling on the client side.
///
/// [`BackInTime`]: Error::BackInTime
/// [`NotANumber`]: Error::NotANumber
/// [`EmptyCalendar`]: Error::EmptyCalendar
/// [`EmptyQueue`]: Error::EmptyQueue
/// [`BadExecution`]: Error::BadExecution
/// [`EventCalendar`]: crate::EventCalendar
/// [`FifoQueue::len()`]: crate::FifoQueue::len
/// [`Resource`]: crate::Resource
/// [`Resource::seize()`]: crate::Resource::seize
/// [`Resource::free()`]: crate::Resource::free
/// [`Simulation::run_replication()`]: crate::Simulation::run_replication
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The calendar rejected an event that would have been scheduled for a time that has already passed.
    #[error("event time {time} is less than current simulation time {clock}")]
    BackInTime {
        /// Requested execution time.
        time: f64,
        /// Simulation clock when the request was made.
        clock: f64,
    },
    /// A schedule time or delay was NaN and so has no place in the calendar's ordering.
    #[error("event time is not a number")]
    NotANumber,
    /// A removal was attempted on an event calendar with no pending notices.
    #[error("event calendar is empty")]
    EmptyCalendar,
    /// A removal was attempted on an empty FIFO queue.
    #[error("queue is empty")]
    EmptyQueue,
    /// A random-number stream index outside of `1..=100` was requested.
    #[error("stream index {0} is outside of 1..=100")]
    InvalidStream(usize),
    /// A run configuration or model parameter was rejected.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A resource's capacity was changed after it had already been seized in the current replication.
    #[error("resource capacity cannot change after the first seize of a replication")]
    CapacityLocked,
    /// Parameters handed to a variate generator do not describe a valid distribution.
    #[error("invalid distribution: {0}")]
    InvalidDistribution(String),
    /// A client-generated error was encountered while executing an event. Call [`source()`] or unpack this value to
    /// handle it directly.
    ///
    /// [`source()`]: #method.source
    #[error("error while executing event: {0}")]
    BadExecution(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Error::BackInTime { time: t1, clock: c1 },
                Error::BackInTime { time: t2, clock: c2 },
            ) => t1 == t2 && c1 == c2,
            (Error::NotANumber, Error::NotANumber)
            | (Error::EmptyCalendar, Error::EmptyCalendar)
            | (Error::EmptyQueue, Error::EmptyQueue)
            | (Error::CapacityLocked, Error::CapacityLocked) => true,
            (Error::InvalidStream(s1), Error::InvalidStream(s2)) => s1 == s2,
            (Error::InvalidConfig(m1), Error::InvalidConfig(m2))
            | (Error::InvalidDistribution(m1), Error::InvalidDistribution(m2)) => m1 == m2,
            (Error::BadExecution(e1), Error::BadExecution(e2)) => {
                let e1: *const dyn std::error::Error = e1.as_ref();
                let e2: *const dyn std::error::Error = e2.as_ref();
                std::ptr::eq(e1, e2)
            },
            _ => false,
        }
    }
}

impl Error {
    /// Wrap a model-level error so that it can be returned from [`Model::handle()`].
    ///
    /// [`Model::handle()`]: crate::Model::handle
    pub fn execution<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::BadExecution(Box::new(error))
    }
}

/// [`std::result::Result`]`<T, `[`simkernel::Error`]`>`, defaulting to `T = ()`.
///
/// A type alias that simplifies the signatures of various functions in simkernel.
///
/// [`simkernel::Error`]: Error
pub type Result<T = ()> = std::result::Result<T, Error>;
