//! The beep model: one notification per configured timestamp.
//!
//! The smallest possible model. It demonstrates that execution order is
//! time order, regardless of the order events were inserted in.

use crate::event::Event;
use crate::simulation::{SimOptions, Simulator};
use crate::time::SimTime;

/// Beep model configuration.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct BeepConfig {
    /// Timestamps to beep at, in any order.
    pub times: Vec<f64>,
}

struct Beep {
    time: SimTime,
}

impl Event<BeepConfig, ()> for Beep {
    fn time(&self) -> SimTime {
        self.time
    }

    fn execute(&self, sim: &mut Simulator<BeepConfig, ()>) {
        sim.report("Beep");
    }
}

/// A kernel that beeps at every configured timestamp.
pub fn build(options: SimOptions, config: BeepConfig) -> Simulator<BeepConfig, ()> {
    Simulator::new(options, config).with_setup(|sim| {
        let times = sim.config().times.clone();
        for time in times {
            sim.insert(Beep {
                time: SimTime::new(time),
            });
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_beeps_in_time_order_regardless_of_insertion_order() {
        let lines = Rc::new(RefCell::new(Vec::<String>::new()));
        let sink = Rc::clone(&lines);
        let options =
            SimOptions::new("s").with_report(move |line| sink.borrow_mut().push(line.into()));

        let mut sim = build(
            options,
            BeepConfig {
                times: vec![7.0, 2.0, 11.0],
            },
        );
        let result = sim.setup().run().unwrap();

        assert_eq!(result.events_processed, 3);
        assert_eq!(
            *lines.borrow(),
            vec!["2.00s: Beep", "7.00s: Beep", "11.0s: Beep"]
        );
    }

    #[test]
    fn test_report_prefix_at_high_precision() {
        let lines = Rc::new(RefCell::new(Vec::<String>::new()));
        let sink = Rc::clone(&lines);
        let options = SimOptions::new("a")
            .with_precision(4)
            .with_report(move |line| sink.borrow_mut().push(line.into()));

        let mut sim = build(options, BeepConfig { times: vec![5730.0] });
        sim.setup().run().unwrap();

        assert_eq!(*lines.borrow(), vec!["5730a: Beep"]);
    }

    #[test]
    fn test_empty_times_run_does_nothing() {
        let mut sim = build(SimOptions::new("s"), BeepConfig::default());
        let result = sim.setup().run().unwrap();
        assert_eq!(result.events_processed, 0);
        assert!(result.last_event.is_none());
    }
}
