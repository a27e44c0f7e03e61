//! The producer/consumer queueing model.
//!
//! Items arrive on a Poisson-like stream and wait in a queue. Consumers
//! take batches of waiting items and serve them for an exponentially
//! distributed time. A consumer that stays idle past the configured
//! maximum goes to sleep for a fixed duration and wakes up on its own.
//! A terminal event stops the run and reports aggregate statistics.
//!
//! Everything recurring is expressed as events inserting further events:
//! each arrival schedules the next arrival, each finished batch either
//! re-batches or idles its consumer, each wake-up schedules the next
//! sleep check.

use crate::error::{SimError, SimResult};
use crate::event::Event;
use crate::random::{Exponential, ThreadRngSource, VariateSource};
use crate::simulation::{SimOptions, Simulator};
use crate::time::SimTime;

/// The queueing model's kernel type.
pub type Sim = Simulator<ProducerConsumerConfig, ProducerConsumerState>;

// ── Configuration ────────────────────────────────────────────────────

/// Idle-timeout sleeping. Only consumers with a policy ever sleep.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct SleepPolicy {
    /// Idle duration after which a consumer goes to sleep.
    pub max_idle_time: f64,
    /// How long a sleeping consumer stays asleep.
    pub sleep_time: f64,
}

/// Consumer-side configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct ConsumerConfig {
    /// Number of consumers.
    pub count: usize,
    /// Largest batch a consumer takes at once.
    pub batch_size: u64,
    /// Service time distribution for one batch.
    pub service: Exponential,
    /// Idle-timeout sleeping, or `None` to keep consumers always awake.
    pub sleep: Option<SleepPolicy>,
}

/// Queueing model configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct ProducerConsumerConfig {
    /// Consumer-side configuration.
    pub consumers: ConsumerConfig,
    /// Inter-arrival time distribution of produced items.
    pub arrivals: Exponential,
    /// When the terminal event fires.
    pub end_time: f64,
}

// ── State ────────────────────────────────────────────────────────────

/// What a consumer is doing at one simulated instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum ConsumerState {
    /// Awake and available for a batch.
    Idle,
    /// Serving a batch.
    Consuming,
    /// Asleep after an idle timeout; unavailable until its wake-up.
    Sleeping,
}

/// One consumer.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Consumer {
    /// Current state.
    pub state: ConsumerState,
    /// Last time this consumer was assigned or finished work.
    pub last_activity: Option<SimTime>,
}

impl Consumer {
    /// Consumers start asleep; the setup phase wakes them at time 0.
    fn new() -> Self {
        Consumer {
            state: ConsumerState::Sleeping,
            last_activity: None,
        }
    }

    /// Whether a sleep check at `now` should put this consumer to
    /// sleep: it must still be idle and must not have had any activity
    /// for at least the policy's idle timeout.
    fn should_sleep(&self, now: SimTime, policy: SleepPolicy) -> bool {
        if self.state != ConsumerState::Idle {
            return false;
        }
        match self.last_activity {
            None => true,
            Some(last) => last.value() + policy.max_idle_time <= now.value(),
        }
    }
}

/// Mutable model state: the consumers plus the aggregate counters the
/// terminal event reports.
pub struct ProducerConsumerState {
    /// All consumers, indexed by id.
    pub consumers: Vec<Consumer>,
    /// Count of consumers currently in the `Idle` state.
    pub num_consumers_idle: usize,
    /// Idle-to-sleeping transitions across the whole run.
    pub consumer_sleep_count: u64,
    /// Items produced.
    pub num_items_produced: u64,
    /// Items consumed (in finished batches).
    pub num_items_consumed: u64,
    /// Items waiting to be batched.
    pub num_items_waiting: u64,
    /// Largest waiting-queue length observed.
    pub max_queue_len: u64,
    /// Largest finished batch observed.
    pub max_batch_size: u64,
    variates: Box<dyn VariateSource>,
}

impl ProducerConsumerState {
    fn new(consumer_count: usize, variates: Box<dyn VariateSource>) -> Self {
        ProducerConsumerState {
            consumers: (0..consumer_count).map(|_| Consumer::new()).collect(),
            num_consumers_idle: 0,
            consumer_sleep_count: 0,
            num_items_produced: 0,
            num_items_consumed: 0,
            num_items_waiting: 0,
            max_queue_len: 0,
            max_batch_size: 0,
            variates,
        }
    }
}

/// First idle consumer, if any.
fn idle_consumer(state: &ProducerConsumerState) -> Option<usize> {
    if state.num_consumers_idle == 0 {
        return None;
    }
    state
        .consumers
        .iter()
        .position(|c| c.state == ConsumerState::Idle)
}

// ── Events ───────────────────────────────────────────────────────────

/// An item arrives. If a consumer is idle it immediately takes a batch;
/// otherwise the item waits. Either way the next arrival is scheduled.
struct ItemProduced {
    time: SimTime,
}

impl ItemProduced {
    fn schedule(sim: &mut Sim) {
        let arrivals = sim.config().arrivals;
        let delay = sim.state_mut().variates.exponential(&arrivals);
        let time = sim.now().plus(delay);
        sim.insert(ItemProduced { time });
    }
}

impl Event<ProducerConsumerConfig, ProducerConsumerState> for ItemProduced {
    fn time(&self) -> SimTime {
        self.time
    }

    fn execute(&self, sim: &mut Sim) {
        let batch_limit = sim.config().consumers.batch_size;

        let state = sim.state_mut();
        state.num_items_produced += 1;
        state.num_items_waiting += 1;
        if state.num_items_waiting > state.max_queue_len {
            state.max_queue_len = state.num_items_waiting;
        }

        match idle_consumer(state) {
            Some(id) => {
                let idle = state.num_consumers_idle;
                let batch_size = state.num_items_waiting.min(batch_limit);

                state.consumers[id].state = ConsumerState::Consuming;
                state.num_consumers_idle -= 1;
                state.num_items_waiting -= batch_size;
                state.consumers[id].last_activity = Some(self.time);

                sim.report(&format!(
                    "Item produced. {} consumers idle, assign to #{}.",
                    idle, id
                ));
                BatchConsumed::schedule(id, batch_size, sim);
            }
            None => {
                sim.report("Item produced. No consumers idle.");
            }
        }

        ItemProduced::schedule(sim);
    }
}

/// A consumer finishes a batch. With items still waiting it immediately
/// starts the next batch; otherwise it returns to idle.
struct BatchConsumed {
    consumer: usize,
    batch_size: u64,
    time: SimTime,
}

impl BatchConsumed {
    fn schedule(consumer: usize, batch_size: u64, sim: &mut Sim) {
        let service = sim.config().consumers.service;
        let delay = sim.state_mut().variates.exponential(&service);
        let time = sim.now().plus(delay);
        sim.insert(BatchConsumed {
            consumer,
            batch_size,
            time,
        });
    }
}

impl Event<ProducerConsumerConfig, ProducerConsumerState> for BatchConsumed {
    fn time(&self) -> SimTime {
        self.time
    }

    fn execute(&self, sim: &mut Sim) {
        let batch_limit = sim.config().consumers.batch_size;

        let waiting = sim.state().num_items_waiting;
        sim.report(&format!(
            "Batch of size {} finished by #{}. {} items waiting.",
            self.batch_size, self.consumer, waiting
        ));

        let state = sim.state_mut();
        state.consumers[self.consumer].last_activity = Some(self.time);
        state.num_items_consumed += self.batch_size;
        if self.batch_size > state.max_batch_size {
            state.max_batch_size = self.batch_size;
        }

        if state.num_items_waiting > 0 {
            let batch_size = state.num_items_waiting.min(batch_limit);
            state.num_items_waiting -= batch_size;
            state.consumers[self.consumer].state = ConsumerState::Consuming;
            BatchConsumed::schedule(self.consumer, batch_size, sim);
        } else {
            state.consumers[self.consumer].state = ConsumerState::Idle;
            state.num_consumers_idle += 1;
        }
    }
}

/// A sleeping consumer wakes up and, when sleeping is configured,
/// schedules its next sleep check one idle timeout from now.
struct ConsumerWakeUp {
    consumer: usize,
    time: SimTime,
}

impl Event<ProducerConsumerConfig, ProducerConsumerState> for ConsumerWakeUp {
    fn time(&self) -> SimTime {
        self.time
    }

    fn execute(&self, sim: &mut Sim) {
        sim.report(&format!("Consumer {} is waking up.", self.consumer));

        let state = sim.state_mut();
        state.consumers[self.consumer].state = ConsumerState::Idle;
        state.num_consumers_idle += 1;

        if let Some(policy) = sim.config().consumers.sleep {
            sim.insert(ConsumerStartSleep {
                consumer: self.consumer,
                time: self.time.plus(policy.max_idle_time),
            });
        }
    }
}

/// A sleep check. The consumer may have been assigned work since the
/// check was scheduled; in that case the check is simply dropped.
struct ConsumerStartSleep {
    consumer: usize,
    time: SimTime,
}

impl Event<ProducerConsumerConfig, ProducerConsumerState> for ConsumerStartSleep {
    fn time(&self) -> SimTime {
        self.time
    }

    fn execute(&self, sim: &mut Sim) {
        let policy = match sim.config().consumers.sleep {
            Some(policy) => policy,
            None => return,
        };

        let state = sim.state_mut();
        if !state.consumers[self.consumer].should_sleep(self.time, policy) {
            return;
        }

        state.consumers[self.consumer].state = ConsumerState::Sleeping;
        state.num_consumers_idle -= 1;
        state.consumer_sleep_count += 1;

        sim.report(&format!(
            "Consumer {} is going to sleep because of inactivity.",
            self.consumer
        ));
        sim.insert(ConsumerWakeUp {
            consumer: self.consumer,
            time: self.time.plus(policy.sleep_time),
        });
    }
}

/// The terminal event: discards everything still pending and reports the
/// aggregate statistics.
struct End {
    time: SimTime,
}

impl Event<ProducerConsumerConfig, ProducerConsumerState> for End {
    fn time(&self) -> SimTime {
        self.time
    }

    fn execute(&self, sim: &mut Sim) {
        sim.stop();

        let state = sim.state();
        let stats = format!(
            "Statistics:\n\
             \t# Produced       : {}\n\
             \t# Consumed       : {}\n\
             \t# Sleep          : {}\n\
             \t# Items Waiting  : {}\n\
             \tMax Queue Length : {}\n\
             \tMax Batch Size   : {}\n",
            state.num_items_produced,
            state.num_items_consumed,
            state.consumer_sleep_count,
            state.num_items_waiting,
            state.max_queue_len,
            state.max_batch_size,
        );
        sim.report(&stats);
    }
}

// ── Construction ─────────────────────────────────────────────────────

fn validate(config: &ProducerConsumerConfig) -> SimResult<()> {
    if config.consumers.count == 0 {
        return Err(SimError::InvalidModel(
            "at least one consumer is required".into(),
        ));
    }
    if config.consumers.batch_size == 0 {
        return Err(SimError::InvalidModel(
            "batch size must be at least 1".into(),
        ));
    }
    if config.end_time <= 0.0 {
        return Err(SimError::InvalidModel(format!(
            "end time must be strictly positive, got {}",
            config.end_time
        )));
    }
    if let Some(policy) = config.consumers.sleep {
        if policy.max_idle_time <= 0.0 || policy.sleep_time <= 0.0 {
            return Err(SimError::InvalidModel(
                "sleep policy durations must be strictly positive".into(),
            ));
        }
    }
    Ok(())
}

/// A kernel running the queueing model with real randomness.
pub fn build(options: SimOptions, config: ProducerConsumerConfig) -> SimResult<Sim> {
    build_with_variates(options, config, Box::new(ThreadRngSource))
}

/// A kernel running the queueing model with the given variate source.
///
/// Setup wakes every consumer at time 0, schedules the terminal event at
/// the configured end time, and schedules the first arrival.
pub fn build_with_variates(
    options: SimOptions,
    config: ProducerConsumerConfig,
    variates: Box<dyn VariateSource>,
) -> SimResult<Sim> {
    validate(&config)?;
    let state = ProducerConsumerState::new(config.consumers.count, variates);

    Ok(Simulator::with_state(options, config, state).with_setup(|sim| {
        for consumer in 0..sim.config().consumers.count {
            sim.insert(ConsumerWakeUp {
                consumer,
                time: SimTime::ZERO,
            });
        }

        let end_time = sim.config().end_time;
        sim.insert(End {
            time: SimTime::new(end_time),
        });

        ItemProduced::schedule(sim);
    }))
}
