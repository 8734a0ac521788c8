//! An M/M/1 queue that prints arrival and service event logs
//! to stdout. Arrival times are distributed with a mean
//! spacing of thirty minutes, and services times with a mean
//! spacing of twenty minutes.
//!
//! The simulation runs for nine hours before terminating,
//! and so could represent a small, service-oriented
//! business's typical workday. At closing time it prints
//! the average line length, server utilization, and time
//! customers spent waiting in line.
//!
//! Arrivals seize the server if it is idle. If not, the
//! arriving customer gets in line. Either way, a new
//! Arrival event is also scheduled.
//!
//! Departures hand the server to the customer at the
//! head of the line, or free it if the line is empty.

use simkernel::{
    DtStatId, Entity, Model, QueueId, ResourceId, RunConfig, Simulation, SimulationContext, StreamId,
};

#[derive(Debug)]
enum Event {
    Arrival,
    Departure,
}

/// Handles to the store's single clerk, its checkout
/// line, and the waiting-time statistic, plus the
/// streams arrival and service times are drawn from.
struct Store {
    clerk: ResourceId,
    line: QueueId,
    waits: DtStatId,
    arrivals: StreamId,
    services: StreamId,
}

impl Store {
    /// Draw an exponential service time with mean 20.0 and
    /// schedule the matching departure.
    fn begin_service(&self, customer: Entity, ctx: &mut SimulationContext<Event>) -> simkernel::Result {
        ctx.record(self.waits, customer.age(ctx.now()));
        let service_length = ctx.rng().exponential(20.0, self.services);
        ctx.schedule(Event::Departure, service_length)
    }

    /// Draw an exponential spacing with mean 30.0 and
    /// schedule the next arrival.
    fn schedule_arrival(&self, ctx: &mut SimulationContext<Event>) -> simkernel::Result {
        let next_arrival_delay = ctx.rng().exponential(30.0, self.arrivals);
        ctx.schedule(Event::Arrival, next_arrival_delay)
    }
}

impl Model for Store {
    type Event = Event;
    type Tag = ();

    fn start(&mut self, ctx: &mut SimulationContext<Event>) -> simkernel::Result {
        self.schedule_arrival(ctx)
    }

    fn handle(&mut self, event: Event, ctx: &mut SimulationContext<Event>) -> simkernel::Result {
        match event {
            Event::Arrival => {
                println!("Handling customer arrival at time {:.3}...", ctx.now());
                let customer = ctx.new_entity(());
                if ctx.seize(self.clerk, 1) {
                    println!("Server is idle; moving to counter.");
                    self.begin_service(customer, ctx)?;
                } else {
                    println!(
                        "Server is occupied with prior customer. Getting in line behind {} other customers.",
                        ctx.queue_len(self.line),
                    );
                    ctx.enqueue(self.line, customer);
                }
                self.schedule_arrival(ctx)
            },
            Event::Departure => {
                println!("Completed service for customer. Checking queue at time {:.3}...", ctx.now());
                if ctx.queue_len(self.line) == 0 {
                    println!("Queue empty! Waiting for next arrival.");
                    ctx.free(self.clerk, 1);
                    Ok(())
                } else {
                    let customer = ctx.dequeue(self.line)?;
                    println!(
                        "Beginning service for next customer. {} remain in the queue.",
                        ctx.queue_len(self.line),
                    );
                    self.begin_service(customer, ctx)
                }
            },
        }
    }
}

/// Open the store from 8 to 5, then print the day's
/// summary. Events print to stdout as they execute.
fn main() -> simkernel::Result {
    let mut sim = Simulation::<Store>::build(RunConfig::new(540.0), |ctx| {
        Ok(Store {
            clerk: ctx.add_resource(1),
            line: ctx.add_queue(),
            waits: ctx.add_dt_stat(),
            arrivals: StreamId::new(1)?,
            services: StreamId::new(2)?,
        })
    })?;
    let report = sim.run_replication()?;

    let ctx = sim.context();
    let store = sim.model();
    println!();
    println!("Closed at time {:.3} after {} events.", report.end_time, report.events_dispatched);
    println!("Average line length: {:.3}", ctx.queue_mean(store.line));
    println!("Server utilization: {:.3}", ctx.resource_mean(store.clerk));
    println!(
        "Average wait over {} customers: {:.3}",
        ctx.dt_stat(store.waits).count(),
        ctx.dt_stat(store.waits).mean()
    );
    Ok(())
}
