mod util;

use simkernel::*;

#[derive(Debug)]
enum Event {
    Arrival,
    EndOfService(Entity<f64>),
}

/// Single server fed by exponential arrivals (mean 1.0) with Erlang service (2 phases, mean 5.0). Each entity's tag
/// holds its own service time.
struct Shop {
    server: ResourceId,
    line: QueueId,
    time_in_system: DtStatId,
    tis_log: Vec<f64>,
}

impl Shop {
    fn new(ctx: &mut SimulationContext<Event, f64>) -> Result<Self> {
        Ok(Self {
            server: ctx.add_resource(1),
            line: ctx.add_queue(),
            time_in_system: ctx.add_dt_stat(),
            tis_log: Vec::new(),
        })
    }

    fn begin_service(mut customer: Entity<f64>, ctx: &mut SimulationContext<Event, f64>) -> Result {
        let service = ctx.rng().erlang(2, 5.0, StreamId::new(2)?);
        *customer.tag_mut() = service;
        ctx.schedule(Event::EndOfService(customer), service)
    }
}

impl Model for Shop {
    type Event = Event;
    type Tag = f64;

    fn start(&mut self, ctx: &mut SimulationContext<Event, f64>) -> Result {
        self.tis_log.clear();
        let delay = ctx.rng().exponential(1.0, StreamId::new(1)?);
        ctx.schedule(Event::Arrival, delay)
    }

    fn handle(&mut self, event: Event, ctx: &mut SimulationContext<Event, f64>) -> Result {
        match event {
            Event::Arrival => {
                let delay = ctx.rng().exponential(1.0, StreamId::new(1)?);
                ctx.schedule(Event::Arrival, delay)?;
                let customer = ctx.new_entity(0.0);
                if ctx.seize(self.server, 1) {
                    Self::begin_service(customer, ctx)
                } else {
                    ctx.enqueue(self.line, customer);
                    Ok(())
                }
            },
            Event::EndOfService(customer) => {
                let time_in_system = customer.age(ctx.now());
                assert!(
                    time_in_system >= *customer.tag() - 1e-9,
                    "time in system {time_in_system} shorter than service time {}",
                    customer.tag()
                );
                ctx.record(self.time_in_system, time_in_system);
                self.tis_log.push(time_in_system);

                if ctx.queue_len(self.line) > 0 {
                    let next = ctx.dequeue(self.line)?;
                    Self::begin_service(next, ctx)
                } else {
                    ctx.free(self.server, 1);
                    Ok(())
                }
            },
        }
    }

    fn on_warm_up(&mut self, _: &mut SimulationContext<Event, f64>) -> Result {
        self.tis_log.clear();
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Summary {
    mean_tis: f64,
    observations: u64,
    queue_mean: f64,
    busy_mean: f64,
    tis_log: Vec<f64>,
}

fn summarize(sim: &mut Simulation<Shop>, _: &ReplicationReport) -> Summary {
    let ctx = sim.context();
    let shop = sim.model();
    Summary {
        mean_tis: ctx.dt_stat(shop.time_in_system).mean(),
        observations: ctx.dt_stat(shop.time_in_system).count(),
        queue_mean: ctx.queue_mean(shop.line),
        busy_mean: ctx.resource_mean(shop.server),
        tis_log: shop.tis_log.clone(),
    }
}

fn shop(config: RunConfig) -> Simulation<Shop> {
    Simulation::<Shop>::build(config, Shop::new).expect("shop configuration should be valid")
}

#[test]
fn time_in_system_statistic_matches_exported_log() {
    let mut sim = shop(RunConfig::new(500.0));
    let report = sim.run_replication().unwrap();
    let summary = summarize(&mut sim, &report);

    assert!(!summary.tis_log.is_empty(), "no customer finished service");
    assert_eq!(summary.tis_log.len() as u64, summary.observations);
    let log_mean = summary.tis_log.iter().sum::<f64>() / summary.tis_log.len() as f64;
    assert_floats_near_equal!(log_mean, summary.mean_tis, "statistic disagrees with the exported log");
    // arrivals outpace the server, so it should hardly ever idle
    assert!(summary.busy_mean > 0.9, "server was busy only {} of the time", summary.busy_mean);
}

#[test]
fn identical_runs_are_bit_identical() {
    let first = shop(RunConfig::new(500.0).with_replications(3)).replicate(summarize).unwrap();
    let second = shop(RunConfig::new(500.0).with_replications(3)).replicate(summarize).unwrap();
    assert_eq!(first, second, "the same seeds should reproduce the same replications");
}

#[test]
fn replications_draw_fresh_numbers() {
    let summaries = shop(RunConfig::new(500.0).with_replications(2)).replicate(summarize).unwrap();
    assert_ne!(summaries[0].tis_log, summaries[1].tis_log, "second replication repeated the first");
}

#[test]
fn warm_up_discards_early_observations() {
    let mut cold = shop(RunConfig::new(500.0));
    let cold_report = cold.run_replication().unwrap();
    let cold_summary = summarize(&mut cold, &cold_report);

    let mut warm = shop(RunConfig::new(500.0).with_warm_up(100.0));
    let warm_report = warm.run_replication().unwrap();
    let warm_summary = summarize(&mut warm, &warm_report);

    // same draws, so the warm run's log is exactly the tail of the cold run's
    let skipped = cold_summary.tis_log.len() - warm_summary.tis_log.len();
    assert!(skipped > 0, "warm-up should discard some observations");
    assert_eq!(&cold_summary.tis_log[skipped..], &warm_summary.tis_log[..]);
    assert_eq!(warm_summary.tis_log.len() as u64, warm_summary.observations);
    assert_eq!(cold_report.events_dispatched, warm_report.events_dispatched);

    let line = warm.model().line;
    assert_eq!(100.0, warm.context().queue(line).length_stat().clear_time());
}

#[test]
fn parallel_replications_match_sequential_substreams() {
    let config = RunConfig::new(200.0).with_replications(5);
    let base = Streams::new();
    let spacing = 100_000;

    let parallel = parallel::replicate_parallel::<Shop, _, _, _>(&config, &base, spacing, 3, Shop::new, summarize)
        .expect("parallel replications should succeed");

    let mut sim = shop(RunConfig::new(200.0));
    let sequential: Vec<Summary> = base
        .substreams(5, spacing)
        .into_iter()
        .map(|streams| {
            sim.context_mut().replace_streams(streams);
            let report = sim.run_replication().unwrap();
            summarize(&mut sim, &report)
        })
        .collect();

    assert_eq!(sequential, parallel, "thread scheduling changed replication results");
}

#[test]
fn parallel_replications_reject_zero_threads() {
    let result = parallel::replicate_parallel::<Shop, _, _, _>(
        &RunConfig::new(10.0),
        &Streams::new(),
        1_000,
        0,
        Shop::new,
        summarize,
    );
    assert!(matches!(result, Err(Error::InvalidConfig(_))));
}

#[test]
fn stream_snapshot_survives_serialization() {
    let mut streams = Streams::new();
    let stream = StreamId::new(7).unwrap();
    for _ in 0..10 {
        streams.uniform01(stream);
    }

    let json = serde_json::to_string(&streams.snapshot()).unwrap();
    let snapshot: StreamSnapshot = serde_json::from_str(&json).unwrap();
    let mut restored = Streams::new();
    restored.restore(&snapshot).unwrap();

    assert_eq!(streams, restored);
    assert_eq!(streams.uniform01(stream), restored.uniform01(stream));
}

#[test]
fn run_config_round_trips_through_json() {
    let config = RunConfig::new(690.0).with_warm_up(90.0).with_replications(20);
    let json = serde_json::to_value(&config).unwrap();
    assert_eq!(serde_json::json!({ "run_length": 690.0, "warm_up": 90.0, "replications": 20 }), json);
    assert_eq!(config, serde_json::from_value::<RunConfig>(json).unwrap());
}
