//! # Eventide - a deterministic discrete-event simulation kernel
//!
//! A single-threaded engine for simulated timelines. The kernel owns a
//! priority queue of events and a simulated clock; it repeatedly pops
//! the earliest event, advances the clock to the event's time, and lets
//! the event mutate shared model state and schedule further events. No
//! threads, no wall-clock pacing: one event runs to completion before
//! the next is considered, which makes every run exactly reproducible
//! given the same variates.
//!
//! ## Architecture
//!
//! ```text
//! +----------------------------+
//! |   Models                   |  beep, counter, decay,
//! |  +----------------------+  |  producer/consumer
//! |  |  Simulator<C, S>     |  |  run loop, clock, hooks, report
//! |  |  +----------------+  |  |
//! |  |  |  EventQueue    |  |  |  min-heap by event time
//! |  |  +----------------+  |  |
//! |  |  +----------------+  |  |
//! |  |  |  Event trait   |  |  |  timestamp + behavior
//! |  |  +----------------+  |  |
//! |  |  +----------------+  |  |
//! |  |  |  SimTime       |  |  |  f64 clock values
//! |  |  +----------------+  |  |
//! |  +----------------------+  |
//! +----------------------------+
//! ```
//!
//! ## Example
//!
//! ```rust
//! use eventide::models::counter::{self, CounterConfig};
//! use eventide::SimOptions;
//!
//! let options = SimOptions::new(" ticks").with_report(|line| println!("{line}"));
//! let mut sim = counter::build(
//!     options,
//!     CounterConfig {
//!         upper_bound: 5.0,
//!         increment: 1.0,
//!     },
//! )
//! .unwrap();
//! let result = sim.setup().run().unwrap();
//! assert_eq!(result.events_processed, 6);
//! ```

pub mod error;
pub mod event;
pub mod models;
pub mod queue;
pub mod random;
pub mod simulation;
pub mod time;

// Re-exports for convenience.
pub use error::{SimError, SimResult};
pub use event::{Event, Marker};
pub use queue::EventQueue;
pub use random::{ExpParams, Exponential, FixedMeanSource, ThreadRngSource, VariateSource};
pub use simulation::{RunResult, SimOptions, Simulator};
pub use time::{format_significant, SimTime};
