use eventide::models::counter::{self, CounterConfig};
use eventide::models::decay::{self, mean_lifetime_from_half_life, DecayConfig};
use eventide::models::producer_consumer::{
    self, ConsumerConfig, ProducerConsumerConfig, SleepPolicy,
};
use eventide::{Exponential, SimOptions, SimResult, ThreadRngSource};

fn main() -> SimResult<()> {
    tracing_subscriber::fmt::init();

    println!("=======================================================");
    println!("  Eventide - simulated timelines, three ways");
    println!("=======================================================");
    println!();

    println!("-- Counter: one event every tick ----------------------");
    let mut sim = counter::build(
        SimOptions::new(" ticks").with_report(|line| println!("  {line}")),
        CounterConfig {
            upper_bound: 5.0,
            increment: 1.0,
        },
    )?;
    let result = sim.setup().run()?;
    println!(
        "  ({} events, finished at {}, {} ms)",
        result.events_processed,
        sim.to_time_string(result.final_time),
        result.runtime_ms
    );
    println!();

    println!("-- Decay: carbon-14, half-life 5730 years -------------");
    let mut sim = decay::build(
        SimOptions::new(" years")
            .with_precision(4)
            .with_report(|line| println!("  {line}")),
        DecayConfig {
            num_items: 10_000,
            lifetime: Exponential::from_mean(mean_lifetime_from_half_life(5730.0))?,
            percentiles: vec![0.25, 0.5, 0.75, 0.99],
        },
        Box::new(ThreadRngSource),
    )?;
    let result = sim.setup().run()?;
    println!(
        "  ({} nuclei decayed, last at {}, {} ms)",
        result.events_processed,
        sim.to_time_string(result.final_time),
        result.runtime_ms
    );
    println!();

    println!("-- Producer/consumer: 2 consumers, batches of 5 -------");
    let mut sim = producer_consumer::build(
        SimOptions::new("s").with_report(|line| println!("  {line}")),
        ProducerConsumerConfig {
            consumers: ConsumerConfig {
                count: 2,
                batch_size: 5,
                service: Exponential::from_mean(4.0)?,
                sleep: Some(SleepPolicy {
                    max_idle_time: 10.0,
                    sleep_time: 30.0,
                }),
            },
            arrivals: Exponential::from_mean(2.0)?,
            end_time: 100.0,
        },
    )?;
    let result = sim.setup().run()?;
    println!(
        "  ({} events, stopped at {}, {} ms)",
        result.events_processed,
        sim.to_time_string(result.final_time),
        result.runtime_ms
    );

    Ok(())
}
