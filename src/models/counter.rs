//! The counter model: a self-rescheduling event.
//!
//! Each count event reports and inserts its successor one increment
//! later, until the upper bound is reached. Recurrence needs no kernel
//! support; it is just an event inserting the next one.

use crate::error::{SimError, SimResult};
use crate::event::Event;
use crate::simulation::{SimOptions, Simulator};
use crate::time::SimTime;

/// Counter model configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct CounterConfig {
    /// Counting stops once an event at or past this time has fired.
    pub upper_bound: f64,
    /// Spacing between consecutive count events.
    pub increment: f64,
}

struct CountEvent {
    time: SimTime,
}

impl Event<CounterConfig, ()> for CountEvent {
    fn time(&self) -> SimTime {
        self.time
    }

    fn execute(&self, sim: &mut Simulator<CounterConfig, ()>) {
        sim.report("Count");

        if self.time.value() < sim.config().upper_bound {
            sim.insert(CountEvent {
                time: self.time.plus(sim.config().increment),
            });
        }
    }
}

/// A kernel counting from time 0 to the configured upper bound.
///
/// The increment must be strictly positive; a non-positive increment
/// would re-count the same instant forever.
pub fn build(options: SimOptions, config: CounterConfig) -> SimResult<Simulator<CounterConfig, ()>> {
    if config.increment <= 0.0 {
        return Err(SimError::InvalidModel(format!(
            "counter increment must be strictly positive, got {}",
            config.increment
        )));
    }

    Ok(Simulator::new(options, config).with_setup(|sim| {
        sim.insert(CountEvent {
            time: SimTime::ZERO,
        });
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn counting_sim(
        config: CounterConfig,
    ) -> (Rc<RefCell<Vec<String>>>, Simulator<CounterConfig, ()>) {
        let lines = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&lines);
        let options =
            SimOptions::new(" ticks").with_report(move |line| sink.borrow_mut().push(line.into()));
        (lines, build(options, config).unwrap())
    }

    #[test]
    fn test_counts_zero_through_upper_bound() {
        let (lines, mut sim) = counting_sim(CounterConfig {
            upper_bound: 5.0,
            increment: 1.0,
        });

        let result = sim.setup().run().unwrap();

        assert_eq!(result.events_processed, 6);
        assert_eq!(result.final_time, SimTime::new(5.0));
        assert_eq!(
            *lines.borrow(),
            vec![
                "0.00 ticks: Count",
                "1.00 ticks: Count",
                "2.00 ticks: Count",
                "3.00 ticks: Count",
                "4.00 ticks: Count",
                "5.00 ticks: Count",
            ]
        );
    }

    #[test]
    fn test_instances_are_independent() {
        let config = CounterConfig {
            upper_bound: 5.0,
            increment: 1.0,
        };
        let (lines_a, mut a) = counting_sim(config);
        let (lines_b, mut b) = counting_sim(config);

        // Run one instance while the other holds its un-run queue; the
        // second run must be unaffected by the first.
        let result_a = sim_run(&mut a);
        let result_b = sim_run(&mut b);

        assert_eq!(result_a, result_b);
        assert_eq!(*lines_a.borrow(), *lines_b.borrow());
    }

    fn sim_run(sim: &mut Simulator<CounterConfig, ()>) -> (u64, f64) {
        let result = sim.setup().run().unwrap();
        (result.events_processed, result.final_time.value())
    }

    #[test]
    fn test_non_positive_increment_is_rejected() {
        let err = build(
            SimOptions::new("s"),
            CounterConfig {
                upper_bound: 5.0,
                increment: 0.0,
            },
        )
        .unwrap_err();
        assert!(matches!(err, SimError::InvalidModel(_)));
    }
}
