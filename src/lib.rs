//! # Overview
//!
//! simkernel is a kernel for next-event discrete-event simulations: the bookkeeping every such model needs, leaving
//! only the model's own event logic to write. It provides:
//!
//! * An [`EventCalendar`] that keeps pending events ordered by time, breaking ties in scheduling order, and owns the
//!   simulation clock so that time can only move forward.
//! * 100 independent, reproducible random-number [`Streams`] based on a prime-modulus multiplicative congruential
//!   generator, with uniform, exponential, Erlang, triangular, normal, lognormal and discrete variates.
//! * Time-weighted ([`CtStat`]) and observation-based ([`DtStat`]) statistics, a [`FifoQueue`] that tracks its own
//!   time-average length, and a counted [`Resource`] that tracks its own time-average busy units.
//! * A [`SimulationContext`] that owns all of the above for one replication, handing out typed handles so models never
//!   hold on to the instances themselves.
//! * A [`Simulation`] driver that resets the context, lets a [`Model`] schedule its initial events, and dispatches
//!   events until the end of the run, clearing statistics once at the end of an optional warm-up period.
//!
//! Because one context owns every piece of mutable replication state, two replications never share anything they do
//! not explicitly hand to each other. [`parallel::replicate_parallel()`] builds on this to run replications on several
//! threads, each with its own non-overlapping block of random numbers.
//!
//! # Example
//!
//! A single server fed by exponential arrivals, reporting the average number of busy servers:
//!
//! ```
//! use simkernel::{Model, ResourceId, RunConfig, Simulation, SimulationContext, StreamId};
//!
//! #[derive(Debug)]
//! enum Event {
//!     Arrival,
//!     Departure,
//! }
//!
//! struct Server {
//!     server: ResourceId,
//!     waiting: u32,
//! }
//!
//! impl Model for Server {
//!     type Event = Event;
//!     type Tag = ();
//!
//!     fn start(&mut self, ctx: &mut SimulationContext<Event>) -> simkernel::Result {
//!         self.waiting = 0;
//!         let delay = ctx.rng().exponential(1.0, StreamId::new(1)?);
//!         ctx.schedule(Event::Arrival, delay)
//!     }
//!
//!     fn handle(&mut self, event: Event, ctx: &mut SimulationContext<Event>) -> simkernel::Result {
//!         match event {
//!             Event::Arrival => {
//!                 let delay = ctx.rng().exponential(1.0, StreamId::new(1)?);
//!                 ctx.schedule(Event::Arrival, delay)?;
//!                 if ctx.seize(self.server, 1) {
//!                     let service = ctx.rng().exponential(0.8, StreamId::new(2)?);
//!                     ctx.schedule(Event::Departure, service)?;
//!                 } else {
//!                     self.waiting += 1;
//!                 }
//!             },
//!             Event::Departure => {
//!                 if self.waiting > 0 {
//!                     self.waiting -= 1;
//!                     let service = ctx.rng().exponential(0.8, StreamId::new(2)?);
//!                     ctx.schedule(Event::Departure, service)?;
//!                 } else {
//!                     ctx.free(self.server, 1);
//!                 }
//!             },
//!         }
//!         Ok(())
//!     }
//! }
//!
//! # fn main() -> simkernel::Result {
//! let mut sim = Simulation::<Server>::build(RunConfig::new(1000.0), |ctx| {
//!     Ok(Server { server: ctx.add_resource(1), waiting: 0 })
//! })?;
//! sim.run_replication()?;
//! let utilization = sim.context().resource_mean(sim.model().server);
//! assert!(utilization > 0.0 && utilization < 1.0);
//! # Ok(())
//! # }
//! ```

mod calendar;
mod config;
mod context;
mod entity;
mod error;
pub mod parallel;
mod queue;
mod resource;
mod rng;
mod simulation;
mod stats;

pub use calendar::{EventCalendar, EventNotice};
pub use config::RunConfig;
pub use context::{CtStatId, DtStatId, EventKind, QueueId, ResourceId, SimulationContext};
pub use entity::Entity;
pub use error::{Error, Result};
pub use queue::FifoQueue;
pub use resource::Resource;
pub use rng::{StreamId, StreamSnapshot, Streams, STREAM_COUNT};
pub use simulation::{Model, Phase, ReplicationReport, Simulation, Termination};
pub use stats::{CtStat, DtStat, LevelOnClear};
