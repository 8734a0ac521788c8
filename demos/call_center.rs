//! A call center with two kinds of caller: financial questions and contract questions.
//!
//! Calls arrive with exponential spacing (mean one minute). Each caller then spends between six and twelve seconds in
//! a menu before revealing their type: 59% financial, 41% contract. Each type has its own pool of agents and its own
//! FIFO queue. Service times are Erlang with mean five minutes, two phases for financial calls and three for contract
//! calls.
//!
//! Every replication runs for 500 minutes and reports the average time a caller spends in the system, from revealing
//! their type to hanging up. The program prints the grand mean over all replications and its standard error.
//!
//! Run with `RUST_LOG=simkernel=debug` to watch replications start and end.

use clap::Parser;
use simkernel::{
    parallel, DtStatId, Model, QueueId, ResourceId, RunConfig, Simulation, SimulationContext, StreamId, Streams,
};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "call_center")]
#[command(about = "Two-class call center with separate agent pools")]
struct Args {
    /// Number of replications
    #[arg(long, default_value = "200")]
    replications: usize,

    /// Length of each replication, in minutes
    #[arg(long, default_value = "500")]
    run_length: f64,

    /// Discard statistics gathered before this time
    #[arg(long)]
    warm_up: Option<f64>,

    /// Agents answering financial calls
    #[arg(long, default_value = "4")]
    finance_agents: u32,

    /// Agents answering contract calls
    #[arg(long, default_value = "3")]
    contract_agents: u32,

    /// Spread replications over this many threads
    #[arg(long)]
    threads: Option<usize>,

    /// Report the probability that a call takes longer than this many minutes
    #[arg(long, default_value = "10")]
    threshold: f64,

    /// Write every caller's time in system to this file, one line per replication
    #[arg(long)]
    tis_log: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallType {
    Finance,
    Contract,
}

impl CallType {
    fn index(self) -> usize {
        match self {
            Self::Finance => 0,
            Self::Contract => 1,
        }
    }
}

#[derive(Debug)]
enum Event {
    Arrival,
    SelectType,
    EndOfService(simkernel::Entity<CallType>),
}

const ARRIVAL_MEAN: f64 = 1.0;
const SERVICE_MEAN: f64 = 5.0;
const SERVICE_PHASES: [u32; 2] = [2, 3];
const FINANCE_PROBABILITY: f64 = 0.59;

struct CallCenter {
    agents: [ResourceId; 2],
    queues: [QueueId; 2],
    time_in_system: DtStatId,
    over_threshold: DtStatId,
    threshold: f64,
    tis_records: Vec<f64>,
    arrivals: StreamId,
    menu: StreamId,
    service: [StreamId; 2],
}

impl CallCenter {
    fn new(ctx: &mut SimulationContext<Event, CallType>, args: &Args) -> simkernel::Result<Self> {
        Ok(Self {
            agents: [ctx.add_resource(args.finance_agents), ctx.add_resource(args.contract_agents)],
            queues: [ctx.add_queue(), ctx.add_queue()],
            time_in_system: ctx.add_dt_stat(),
            over_threshold: ctx.add_dt_stat(),
            threshold: args.threshold,
            tis_records: Vec::new(),
            arrivals: StreamId::new(1)?,
            menu: StreamId::new(2)?,
            service: [StreamId::new(3)?, StreamId::new(4)?],
        })
    }

    fn start_service(
        &self,
        caller: simkernel::Entity<CallType>,
        ctx: &mut SimulationContext<Event, CallType>,
    ) -> simkernel::Result {
        let which = caller.tag().index();
        let service = ctx.rng().erlang(SERVICE_PHASES[which], SERVICE_MEAN, self.service[which]);
        ctx.schedule(Event::EndOfService(caller), service)
    }
}

impl Model for CallCenter {
    type Event = Event;
    type Tag = CallType;

    fn start(&mut self, ctx: &mut SimulationContext<Event, CallType>) -> simkernel::Result {
        self.tis_records.clear();
        let delay = ctx.rng().exponential(ARRIVAL_MEAN, self.arrivals);
        ctx.schedule(Event::Arrival, delay)
    }

    fn handle(&mut self, event: Event, ctx: &mut SimulationContext<Event, CallType>) -> simkernel::Result {
        match event {
            Event::Arrival => {
                let delay = ctx.rng().exponential(ARRIVAL_MEAN, self.arrivals);
                ctx.schedule(Event::Arrival, delay)?;
                let menu_time = ctx.rng().uniform(0.1, 0.2, self.menu);
                ctx.schedule(Event::SelectType, menu_time)
            },
            Event::SelectType => {
                let call_type = if ctx.rng().uniform01(self.menu) < FINANCE_PROBABILITY {
                    CallType::Finance
                } else {
                    CallType::Contract
                };
                let caller = ctx.new_entity(call_type);
                if ctx.seize(self.agents[call_type.index()], 1) {
                    self.start_service(caller, ctx)
                } else {
                    ctx.enqueue(self.queues[call_type.index()], caller);
                    Ok(())
                }
            },
            Event::EndOfService(caller) => {
                let time_in_system = caller.age(ctx.now());
                ctx.record(self.time_in_system, time_in_system);
                ctx.record(self.over_threshold, if time_in_system > self.threshold { 1.0 } else { 0.0 });
                self.tis_records.push(time_in_system);

                let which = caller.tag().index();
                if ctx.queue_len(self.queues[which]) > 0 {
                    let next = ctx.dequeue(self.queues[which])?;
                    self.start_service(next, ctx)
                } else {
                    ctx.free(self.agents[which], 1);
                    Ok(())
                }
            },
        }
    }

    fn on_warm_up(&mut self, _: &mut SimulationContext<Event, CallType>) -> simkernel::Result {
        self.tis_records.clear();
        Ok(())
    }
}

/// What one replication contributes.
struct Summary {
    mean_tis: f64,
    exceed_probability: f64,
    tis_records: Vec<f64>,
}

fn summarize(sim: &mut Simulation<CallCenter>) -> Summary {
    let ctx = sim.context();
    let mean_tis = ctx.dt_stat(sim.model().time_in_system).mean();
    let exceed_probability = ctx.dt_stat(sim.model().over_threshold).mean();
    Summary {
        mean_tis,
        exceed_probability,
        tis_records: std::mem::take(&mut sim.model_mut().tis_records),
    }
}

/// Sample mean and standard error of the mean.
fn mean_and_error(values: impl Iterator<Item = f64> + Clone) -> (f64, f64) {
    let count = values.clone().count() as f64;
    let mean = values.clone().sum::<f64>() / count;
    let variance = values.map(|value| (value - mean).powi(2)).sum::<f64>() / (count - 1.0).max(1.0);
    (mean, (variance / count).sqrt())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let mut config = RunConfig::new(args.run_length).with_replications(args.replications);
    if let Some(warm_up) = args.warm_up {
        config = config.with_warm_up(warm_up);
    }

    let results = match args.threads {
        Some(threads) => parallel::replicate_parallel::<CallCenter, _, _, _>(
            &config,
            &Streams::new(),
            1_000_000,
            threads,
            |ctx| CallCenter::new(ctx, &args),
            |sim, _| summarize(sim),
        )?,
        None => {
            let mut sim = Simulation::<CallCenter>::build(config, |ctx| CallCenter::new(ctx, &args))?;
            sim.replicate(|sim, _| summarize(sim))?
        },
    };

    if let Some(path) = &args.tis_log {
        let mut writer = BufWriter::new(File::create(path)?);
        for summary in &results {
            let line: Vec<String> = summary.tis_records.iter().map(f64::to_string).collect();
            writeln!(writer, "{}", line.join(","))?;
        }
        writer.flush()?;
    }

    let (mean_tis, tis_error) = mean_and_error(results.iter().map(|summary| summary.mean_tis));
    let (exceed, exceed_error) = mean_and_error(results.iter().map(|summary| summary.exceed_probability));
    println!("Mean time in system is {mean_tis:.4} minutes (standard error {tis_error:.4}).");
    println!(
        "Probability a call exceeds {} minutes is {exceed:.4} (standard error {exceed_error:.4}).",
        args.threshold
    );
    Ok(())
}
