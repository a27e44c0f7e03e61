//! The simulation kernel.
//!
//! `Simulator` owns the event queue, the simulated clock, the engine
//! options, a model configuration record and a model state record. The
//! run loop pops the earliest event, advances the clock, fires the hook
//! slots and executes the event; execution may mutate state and insert
//! further events. The loop is purely synchronous and single-threaded,
//! so one event's effects are always fully visible before the next
//! event is dequeued.

use std::time::Instant;

use tracing::{debug, trace};

use crate::error::{SimError, SimResult};
use crate::event::Event;
use crate::queue::EventQueue;
use crate::time::{format_significant, SimTime};

const DEFAULT_TIME_PRECISION: usize = 3;

// ── Options ──────────────────────────────────────────────────────────

/// Engine-wide options for one simulation run: how time is rendered and
/// where report lines go.
pub struct SimOptions {
    time_unit: String,
    time_precision: usize,
    report: Option<Box<dyn FnMut(&str)>>,
}

impl SimOptions {
    /// Options with the given time-unit label, the default precision of
    /// 3 significant digits, and no report sink.
    pub fn new(time_unit: impl Into<String>) -> Self {
        SimOptions {
            time_unit: time_unit.into(),
            time_precision: DEFAULT_TIME_PRECISION,
            report: None,
        }
    }

    /// Override the significant-digit precision used for time rendering.
    pub fn with_precision(mut self, digits: usize) -> Self {
        self.time_precision = digits;
        self
    }

    /// Attach a report sink. Without one, `report` is a no-op.
    pub fn with_report(mut self, sink: impl FnMut(&str) + 'static) -> Self {
        self.report = Some(Box::new(sink));
        self
    }

    /// The configured time-unit label.
    pub fn time_unit(&self) -> &str {
        &self.time_unit
    }

    /// The configured significant-digit precision.
    pub fn time_precision(&self) -> usize {
        self.time_precision
    }
}

impl std::fmt::Debug for SimOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimOptions")
            .field("time_unit", &self.time_unit)
            .field("time_precision", &self.time_precision)
            .field("report", &self.report.is_some())
            .finish()
    }
}

// ── Run result ───────────────────────────────────────────────────────

/// What `run` hands back once the loop ends.
pub struct RunResult<C, S> {
    /// The clock when the loop ended: the last executed event's time, or
    /// the clock's prior position if no event ran.
    pub final_time: SimTime,
    /// Events executed during this run.
    pub events_processed: u64,
    /// The last event executed, if any.
    pub last_event: Option<Box<dyn Event<C, S>>>,
    /// Wall-clock duration of the loop itself. Informational only; it
    /// never affects simulated results.
    pub runtime_ms: u64,
}

impl<C, S> std::fmt::Debug for RunResult<C, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunResult")
            .field("final_time", &self.final_time)
            .field("events_processed", &self.events_processed)
            .field("last_event", &self.last_event.as_ref().map(|e| e.time()))
            .field("runtime_ms", &self.runtime_ms)
            .finish()
    }
}

// ── Hook slots ───────────────────────────────────────────────────────

type SetupFn<C, S> = Box<dyn FnOnce(&mut Simulator<C, S>)>;
type ReachedTimeHook<C, S> = Box<dyn FnMut(&mut Simulator<C, S>, SimTime, &dyn Event<C, S>)>;
type EventsHandledHook<C, S> = Box<dyn FnMut(&mut Simulator<C, S>, u64, &dyn Event<C, S>)>;

// ── Simulator ────────────────────────────────────────────────────────

/// The discrete-event simulation kernel, generic over a model
/// configuration record `C` and a model state record `S`.
///
/// A model seeds the queue in its setup hook, then `run` drives the
/// timeline: `sim.setup().run()`. Events observe the kernel through
/// `now`, `config`, `state`/`state_mut`, `report`, `insert` and `stop`.
pub struct Simulator<C, S> {
    options: SimOptions,
    config: C,
    state: S,
    events: EventQueue<C, S>,
    time: SimTime,
    setup_fn: Option<SetupFn<C, S>>,
    reached_time: Option<ReachedTimeHook<C, S>>,
    events_handled: Option<EventsHandledHook<C, S>>,
}

impl<C, S: Default> Simulator<C, S> {
    /// A kernel with default-initialized model state.
    pub fn new(options: SimOptions, config: C) -> Self {
        Self::with_state(options, config, S::default())
    }

    /// Replace the model state. The updater receives the previous state
    /// and returns its successor. Models that prefer in-place mutation
    /// use [`state_mut`](Simulator::state_mut) instead; both are legal.
    pub fn set_state(&mut self, updater: impl FnOnce(S) -> S) {
        let previous = std::mem::take(&mut self.state);
        self.state = updater(previous);
    }
}

impl<C, S> Simulator<C, S> {
    /// A kernel with an explicit initial model state.
    pub fn with_state(options: SimOptions, config: C, state: S) -> Self {
        Simulator {
            options,
            config,
            state,
            events: EventQueue::new(),
            time: SimTime::ZERO,
            setup_fn: None,
            reached_time: None,
            events_handled: None,
        }
    }

    /// Attach the model's initialization hook; [`setup`](Simulator::setup)
    /// invokes it once to seed the initial event set.
    pub fn with_setup(mut self, setup: impl FnOnce(&mut Self) + 'static) -> Self {
        self.setup_fn = Some(Box::new(setup));
        self
    }

    /// Attach the reached-time hook, invoked after the clock advances to
    /// a dequeued event's time and before the event executes. Defaults
    /// to a no-op.
    pub fn on_reached_time(
        mut self,
        hook: impl FnMut(&mut Self, SimTime, &dyn Event<C, S>) + 'static,
    ) -> Self {
        self.reached_time = Some(Box::new(hook));
        self
    }

    /// Attach the events-handled hook, invoked after each event executes
    /// with the running count of events processed in this run. Defaults
    /// to a no-op.
    pub fn on_events_handled(
        mut self,
        hook: impl FnMut(&mut Self, u64, &dyn Event<C, S>) + 'static,
    ) -> Self {
        self.events_handled = Some(Box::new(hook));
        self
    }

    /// The engine options.
    pub fn options(&self) -> &SimOptions {
        &self.options
    }

    /// The model configuration record.
    pub fn config(&self) -> &C {
        &self.config
    }

    /// The model state record.
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Mutable access to the model state record.
    pub fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }

    /// The current clock value.
    pub fn now(&self) -> SimTime {
        self.time
    }

    /// The current clock rendered like a report prefix, e.g. `"4.00 ticks"`.
    pub fn now_string(&self) -> String {
        self.to_time_string(self.time)
    }

    /// Render an arbitrary time with the configured precision and unit.
    pub fn to_time_string(&self, time: SimTime) -> String {
        format!(
            "{}{}",
            format_significant(time.value(), self.options.time_precision),
            self.options.time_unit
        )
    }

    /// Emit `"<time><unit>: <text>"` to the report sink, if one is
    /// configured. Silently does nothing otherwise.
    pub fn report(&mut self, text: &str) {
        if self.options.report.is_none() {
            return;
        }
        let line = format!("{}: {}", self.now_string(), text);
        if let Some(sink) = self.options.report.as_mut() {
            sink(&line);
        }
    }

    /// Enqueue an event. Valid at any point, including from inside
    /// another event's execution; that is how models build their future.
    pub fn insert(&mut self, event: impl Event<C, S> + 'static) {
        self.events.insert(Box::new(event));
    }

    /// Number of pending events.
    pub fn events_pending(&self) -> usize {
        self.events.len()
    }

    /// Discard every pending event. A model's terminal event calls this
    /// to end the run without consulting the remainder of the queue.
    pub fn stop(&mut self) {
        debug!(discarded = self.events.len(), "stop requested, clearing event queue");
        self.events.clear();
    }

    /// Invoke the model's initialization hook, seeding the initial event
    /// set. Returns the kernel for chaining into [`run`](Simulator::run).
    pub fn setup(&mut self) -> &mut Self {
        if let Some(setup) = self.setup_fn.take() {
            setup(self);
        }
        self
    }

    /// The event loop. Pops the earliest event, advances the clock,
    /// fires the reached-time hook, executes the event, fires the
    /// events-handled hook; repeats until the queue is empty.
    ///
    /// A dequeued time strictly before the previously processed time is
    /// a fatal ordering violation and aborts the run with
    /// [`SimError::TimeRegression`]. The first event of a run has no
    /// predecessor and is never a violation.
    pub fn run(&mut self) -> SimResult<RunResult<C, S>> {
        let started = Instant::now();
        debug!(pending = self.events.len(), "run started");

        let mut last_time: Option<SimTime> = None;
        let mut last_event: Option<Box<dyn Event<C, S>>> = None;
        let mut event_count: u64 = 0;

        while let Some(event) = self.events.remove_first() {
            event_count += 1;
            let time = event.time();

            if let Some(previous) = last_time {
                if time < previous {
                    return Err(SimError::TimeRegression {
                        current: previous.value(),
                        event: time.value(),
                    });
                }
            }
            self.time = time;
            last_time = Some(time);
            trace!(time = time.value(), "dispatching event");

            if let Some(mut hook) = self.reached_time.take() {
                hook(self, time, event.as_ref());
                self.reached_time = Some(hook);
            }

            event.execute(self);

            if let Some(mut hook) = self.events_handled.take() {
                hook(self, event_count, event.as_ref());
                self.events_handled = Some(hook);
            }

            last_event = Some(event);
        }

        let runtime_ms = started.elapsed().as_millis() as u64;
        debug!(
            events = event_count,
            final_time = self.time.value(),
            "run finished"
        );

        Ok(RunResult {
            final_time: self.time,
            events_processed: event_count,
            last_event,
            runtime_ms,
        })
    }
}

impl<C, S> std::fmt::Debug for Simulator<C, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulator")
            .field("time", &self.time)
            .field("pending", &self.events.len())
            .field("options", &self.options)
            .finish()
    }
}
