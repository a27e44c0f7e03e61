//! The radioactive decay model.
//!
//! Each nucleus is one payload-free marker event scheduled at an
//! exponentially distributed lifetime. The model never defines an event
//! behavior of its own; it observes the timeline entirely through the
//! kernel's hook slots, reporting decay percentiles from the
//! events-handled hook and the 10-half-life milestone from the
//! reached-time hook.

use std::f64::consts::LN_2;

use crate::error::{SimError, SimResult};
use crate::event::Marker;
use crate::random::{Exponential, VariateSource};
use crate::simulation::{SimOptions, Simulator};
use crate::time::{format_significant, SimTime};

/// Mean lifetime of a nucleus with the given half-life.
pub fn mean_lifetime_from_half_life(half_life: f64) -> f64 {
    half_life / LN_2
}

/// Decay model configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct DecayConfig {
    /// Initial population size.
    pub num_items: u64,
    /// Lifetime distribution of a single nucleus.
    pub lifetime: Exponential,
    /// Fractions of the population to report on, each in `[0, 1]`.
    pub percentiles: Vec<f64>,
}

/// Decay model bookkeeping.
pub struct DecayState {
    percentiles: Vec<f64>,
    percentile_counts: Vec<u64>,
    next_percentile: usize,
    ten_half_lives_reached: bool,
    variates: Box<dyn VariateSource>,
}

/// A kernel decaying `num_items` nuclei.
pub fn build(
    options: SimOptions,
    config: DecayConfig,
    variates: Box<dyn VariateSource>,
) -> SimResult<Simulator<DecayConfig, DecayState>> {
    if let Some(&p) = config
        .percentiles
        .iter()
        .find(|p| !(0.0..=1.0).contains(*p))
    {
        return Err(SimError::InvalidModel(format!(
            "decay percentile must lie in [0, 1], got {}",
            p
        )));
    }

    let mut percentiles = config.percentiles.clone();
    percentiles.sort_by(f64::total_cmp);
    let percentile_counts = percentiles
        .iter()
        .map(|p| (p * config.num_items as f64).floor() as u64)
        .collect();

    let half_life = config.lifetime.mean() * LN_2;
    let ten_half_lives = half_life * 10.0;

    let state = DecayState {
        percentiles,
        percentile_counts,
        next_percentile: 0,
        ten_half_lives_reached: false,
        variates,
    };

    let sim = Simulator::with_state(options, config, state)
        .with_setup(|sim| {
            let lifetime = sim.config().lifetime;
            let population = sim.config().num_items;
            for _ in 0..population {
                let lived = sim.state_mut().variates.exponential(&lifetime);
                sim.insert(Marker::at(SimTime::new(lived)));
            }
        })
        .on_reached_time(move |sim, time, _event| {
            if !sim.state().ten_half_lives_reached && time.value() >= ten_half_lives {
                sim.state_mut().ten_half_lives_reached = true;
                sim.report("Reached 10 half-lives.");
            }
        })
        .on_events_handled(|sim, count, _event| {
            let state = sim.state();
            if state.next_percentile >= state.percentile_counts.len() {
                return;
            }
            if state.percentile_counts[state.next_percentile] != count {
                return;
            }

            let percentile = state.percentiles[state.next_percentile];
            sim.state_mut().next_percentile += 1;
            sim.report(&format!(
                "{}% of all nuclei decayed.",
                format_significant(percentile * 100.0, 5)
            ));
        });

    Ok(sim)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Hands out scripted lifetimes in order.
    struct SequenceSource {
        values: Vec<f64>,
        next: usize,
    }

    impl VariateSource for SequenceSource {
        fn exponential(&mut self, _dist: &Exponential) -> f64 {
            let value = self.values[self.next];
            self.next += 1;
            value
        }
    }

    fn scripted_sim(
        lifetimes: Vec<f64>,
        config: DecayConfig,
    ) -> (Rc<RefCell<Vec<String>>>, Simulator<DecayConfig, DecayState>) {
        let lines = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&lines);
        let options =
            SimOptions::new("s").with_report(move |line| sink.borrow_mut().push(line.into()));
        let source = Box::new(SequenceSource {
            values: lifetimes,
            next: 0,
        });
        (lines, build(options, config, source).unwrap())
    }

    #[test]
    fn test_percentiles_fire_at_exact_event_counts() {
        let (lines, mut sim) = scripted_sim(
            vec![5.0, 1.0, 9.0, 3.0],
            DecayConfig {
                num_items: 4,
                lifetime: Exponential::from_mean(1.0).unwrap(),
                percentiles: vec![1.0, 0.5],
            },
        );

        let result = sim.setup().run().unwrap();

        assert_eq!(result.events_processed, 4);
        let lines = lines.borrow();
        // Decays happen at 1, 3, 5, 9: the 50th percentile after the
        // second event, the 100th after the fourth.
        assert!(lines.contains(&"3.00s: 50.000% of all nuclei decayed.".to_string()));
        assert!(lines.contains(&"9.00s: 100.00% of all nuclei decayed.".to_string()));
    }

    #[test]
    fn test_ten_half_life_milestone_fires_once() {
        // Mean lifetime 1 puts 10 half-lives at 10 ln 2, roughly 6.93.
        let (lines, mut sim) = scripted_sim(
            vec![1.0, 3.0, 7.0, 9.0],
            DecayConfig {
                num_items: 4,
                lifetime: Exponential::from_mean(1.0).unwrap(),
                percentiles: vec![],
            },
        );

        sim.setup().run().unwrap();

        let milestone: Vec<_> = lines
            .borrow()
            .iter()
            .filter(|line| line.contains("Reached 10 half-lives."))
            .cloned()
            .collect();
        assert_eq!(milestone, vec!["7.00s: Reached 10 half-lives."]);
    }

    #[test]
    fn test_out_of_range_percentile_is_rejected() {
        let err = build(
            SimOptions::new("s"),
            DecayConfig {
                num_items: 10,
                lifetime: Exponential::from_mean(1.0).unwrap(),
                percentiles: vec![0.5, 1.5],
            },
            Box::new(SequenceSource {
                values: vec![],
                next: 0,
            }),
        )
        .unwrap_err();
        assert!(matches!(err, SimError::InvalidModel(_)));
    }

    #[test]
    fn test_mean_lifetime_from_half_life() {
        let mean = mean_lifetime_from_half_life(5730.0);
        assert!((mean * LN_2 - 5730.0).abs() < 1e-9);
    }
}
