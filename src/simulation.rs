use crate::config::RunConfig;
use crate::context::{EventKind, SimulationContext};

use std::fmt::{Debug, Formatter};
use tracing::{debug, info, trace, warn};

/// The model-specific half of a simulation: its event handlers and whatever state they keep outside the
/// [`SimulationContext`].
///
/// The associated [`Event`] type is a closed set of event kinds, typically an enum whose variants carry the entity
/// each event concerns. The driver matches on its own reserved kinds (warm-up, end of run) and hands everything else
/// to [`handle()`], where the model can match exhaustively on its own variants.
///
/// [`Event`]: Model::Event
/// [`handle()`]: Model::handle
pub trait Model {
    /// Closed set of event kinds this model schedules. [`Debug`] is required so dispatches can be traced.
    type Event: Debug;
    /// Model-owned tag carried by entities in the context's queues.
    type Tag;

    /// Schedule the initial events of a replication. Called after the context has been reset and before the driver
    /// schedules its own warm-up and end-of-run events, so initial events win ties with them.
    ///
    /// # Errors
    ///
    /// Any error returned here aborts the replication before the first event executes.
    fn start(&mut self, context: &mut SimulationContext<Self::Event, Self::Tag>) -> crate::Result;

    /// Carry out `event`. The context's clock has already advanced to the event's time. Handlers may seize and free
    /// resources, move entities between queues, record statistics and schedule further events.
    ///
    /// # Errors
    ///
    /// Returning an error aborts the replication; [`Simulation::run_replication()`] passes it back to the caller
    /// unchanged. Use [`Error::execution()`] to wrap model-level errors.
    ///
    /// [`Error::execution()`]: crate::Error::execution
    fn handle(&mut self, event: Self::Event, context: &mut SimulationContext<Self::Event, Self::Tag>) -> crate::Result;

    /// Called right after the driver clears every registered statistic at the end of the warm-up period, so a model
    /// can reset counters it keeps outside the context. The default does nothing.
    ///
    /// # Errors
    ///
    /// Any error returned here aborts the replication.
    #[allow(unused_variables)]
    fn on_warm_up(&mut self, context: &mut SimulationContext<Self::Event, Self::Tag>) -> crate::Result {
        Ok(())
    }

    /// Reports whether the replication should stop before its end-of-run event. This method will be invoked before
    /// removing each event from the calendar: `true` makes the driver terminate the replication.
    ///
    /// The default implementation always returns false, so replications end at the configured run length.
    // expect that other implementations will make use of the
    // argument even though this one doesn't
    #[allow(unused_variables)]
    fn is_complete(&self, current_time: f64) -> bool {
        false
    }
}

/// Where a [`Simulation`] is in its per-replication life cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Clock, calendar, queues, resources and statistics are at their starting point.
    Reset,
    /// Events are being dispatched.
    Running,
    /// The replication has finished and its statistics are ready to read.
    Terminated,
}

/// Why a replication stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The end-of-run event was reached.
    EndOfRun,
    /// [`Model::is_complete()`] returned true.
    ModelComplete,
    /// Nothing was left on the calendar, which can only happen if the end-of-run event was never reached.
    CalendarDrained,
}

/// Summary of one finished replication.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplicationReport {
    /// Zero-based index of the replication within its batch.
    pub replication: usize,
    /// Clock value when the replication stopped.
    pub end_time: f64,
    /// Number of model events handed to [`Model::handle()`].
    pub events_dispatched: u64,
    /// Why the replication stopped.
    pub termination: Termination,
}

/// Owns a model, its [`SimulationContext`] and the [`RunConfig`] that bounds each replication.
///
/// The expected workflow for a Simulation is:
///
/// 1. Create a [`SimulationContext`] and register the model's resources, queues and statistics with it.
/// 2. Build the model around the returned handles.
/// 3. Pass config, context and model to [`new()`] (or let [`build()`] do steps 1 to 3).
/// 4. Call [`run_replication()`] or [`replicate()`]. Handle any error it might return.
/// 5. Read results through [`context()`] and [`model()`] while the phase is [`Phase::Terminated`].
///
/// [`new()`]: Simulation::new
/// [`build()`]: Simulation::build
/// [`run_replication()`]: Simulation::run_replication
/// [`replicate()`]: Simulation::replicate
/// [`context()`]: Simulation::context
/// [`model()`]: Simulation::model
pub struct Simulation<M>
where
    M: Model,
{
    model: M,
    context: SimulationContext<M::Event, M::Tag>,
    config: RunConfig,
    phase: Phase,
    replications_run: usize,
}

impl<M> Simulation<M>
where
    M: Model,
{
    /// Combine a model with the context holding its registered instances.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `config` fails [`RunConfig::validate()`].
    ///
    /// [`Error::InvalidConfig`]: crate::Error::InvalidConfig
    pub fn new(config: RunConfig, context: SimulationContext<M::Event, M::Tag>, model: M) -> crate::Result<Self> {
        config.validate()?;
        Ok(Self {
            model,
            context,
            config,
            phase: Phase::Reset,
            replications_run: 0,
        })
    }

    /// Create a fresh context, let `build_model` register its instances in it, and wrap both up.
    ///
    /// # Errors
    ///
    /// Returns any error from `build_model`, or [`Error::InvalidConfig`] for an invalid `config`.
    ///
    /// [`Error::InvalidConfig`]: crate::Error::InvalidConfig
    pub fn build<F>(config: RunConfig, build_model: F) -> crate::Result<Self>
    where
        F: FnOnce(&mut SimulationContext<M::Event, M::Tag>) -> crate::Result<M>,
    {
        let mut context = SimulationContext::new();
        let model = build_model(&mut context)?;
        Self::new(config, context, model)
    }

    /// Run one replication from a clean state.
    ///
    /// Follows this sequence:
    ///
    /// 1. Reset: clock to zero, calendar emptied, every registered queue emptied, every resource idled, every
    ///    statistic reset. The random-number streams carry on from where the previous replication left them.
    /// 2. Let the model schedule its initial events, then schedule the warm-up event (if configured) and the
    ///    end-of-run event.
    /// 3. While the calendar is non-empty and [`Model::is_complete()`] is false, remove the earliest event, advance
    ///    the clock to its time and dispatch it: end of run breaks the loop, warm-up clears every statistic, and
    ///    model events go to [`Model::handle()`].
    ///
    /// # Errors
    ///
    /// The first error returned by a model hook, or by the calendar, is passed back unchanged and the replication is
    /// abandoned. The phase stays [`Phase::Running`] in that case; the next call resets everything anyway.
    pub fn run_replication(&mut self) -> crate::Result<ReplicationReport> {
        let replication = self.replications_run;
        self.context.reset();
        self.phase = Phase::Reset;
        debug!(replication, "replication reset");

        self.model.start(&mut self.context)?;
        if let Some(warm_up) = self.config.warm_up {
            self.context.schedule_kind_at(EventKind::WarmUp, warm_up)?;
        }
        self.context.schedule_kind_at(EventKind::EndOfRun, self.config.run_length)?;
        self.phase = Phase::Running;

        let mut events_dispatched = 0;
        let termination = loop {
            if self.model.is_complete(self.context.now()) {
                break Termination::ModelComplete;
            }
            if self.context.calendar().is_empty() {
                warn!(replication, clock = self.context.now(), "calendar drained before end of run");
                break Termination::CalendarDrained;
            }

            let notice = self.context.calendar_mut().remove()?;
            trace!(time = notice.time(), kind = ?notice.kind(), "dispatching event");
            match notice.into_kind() {
                EventKind::EndOfRun => break Termination::EndOfRun,
                EventKind::WarmUp => {
                    self.context.clear_statistics();
                    self.model.on_warm_up(&mut self.context)?;
                    debug!(replication, clock = self.context.now(), "warm-up statistics cleared");
                },
                EventKind::Model(event) => {
                    self.model.handle(event, &mut self.context)?;
                    events_dispatched += 1;
                },
            }
        };

        self.phase = Phase::Terminated;
        self.replications_run += 1;
        let report = ReplicationReport {
            replication,
            end_time: self.context.now(),
            events_dispatched,
            termination,
        };
        debug!(
            replication,
            end_time = report.end_time,
            events_dispatched,
            pending = self.context.pending(),
            ?termination,
            "replication terminated"
        );
        Ok(report)
    }

    /// Run [`RunConfig::replications`] replications back to back, calling `summarize` after each one (in the
    /// [`Phase::Terminated`] phase) to pull out whatever that replication contributes to the experiment.
    ///
    /// # Errors
    ///
    /// Stops at, and returns, the first replication error.
    pub fn replicate<R, F>(&mut self, mut summarize: F) -> crate::Result<Vec<R>>
    where
        F: FnMut(&mut Self, &ReplicationReport) -> R,
    {
        let count = self.config.replications;
        info!(replications = count, run_length = self.config.run_length, "starting replications");
        let mut results = Vec::with_capacity(count);
        for _ in 0..count {
            let report = self.run_replication()?;
            results.push(summarize(self, &report));
        }
        info!(replications = count, "replications finished");
        Ok(results)
    }

    /// Shared access to the model.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Exclusive access to the model.
    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// Shared access to the context.
    pub fn context(&self) -> &SimulationContext<M::Event, M::Tag> {
        &self.context
    }

    /// Exclusive access to the context.
    pub fn context_mut(&mut self) -> &mut SimulationContext<M::Event, M::Tag> {
        &mut self.context
    }

    /// The configuration bounding each replication.
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Current life-cycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Number of replications completed so far.
    pub fn replications_run(&self) -> usize {
        self.replications_run
    }

    /// Number the next replication as `replication`, for batches split across several simulations.
    pub(crate) fn set_next_replication(&mut self, replication: usize) {
        self.replications_run = replication;
    }
}

impl<M> Debug for Simulation<M>
where
    M: Model + Debug,
{
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("model", &self.model)
            .field("context", &self.context)
            .field("config", &self.config)
            .field("phase", &self.phase)
            .field("replications_run", &self.replications_run)
            .finish()
    }
}

impl<M> std::fmt::Display for Simulation<M>
where
    M: Model,
{
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Simulation at time {} ({:?})", self.context.now(), self.phase)
    }
}
