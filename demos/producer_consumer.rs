//! Producer/consumer session with timestamped progress output
//!
//! Runs the sample configuration (capacity 5, two producers, two consumers,
//! ten items) unless counts are given on the command line. Producers pause
//! 50ms and consumers 75ms between items so the interleaving is visible.
//!
//! Run with: cargo run --example producer_consumer [capacity producers consumers items]
//!
//! Set `RUST_LOG=debug` to also see the coordinator's log output.

use rust_bounded_buffer::prelude::*;
use std::sync::Arc;
use std::time::Duration;

fn parse_arg(args: &[String], index: usize, name: &str, default: usize) -> Result<usize> {
    match args.get(index) {
        Some(raw) => raw
            .parse()
            .map_err(|_| BufferError::invalid_config(name, format!("'{}' is not a count", raw))),
        None => Ok(default),
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let sample = RunConfig::sample();
    let config = RunConfig::new(
        parse_arg(&args, 0, "capacity", sample.capacity)?,
        parse_arg(&args, 1, "num_producers", sample.num_producers)?,
        parse_arg(&args, 2, "num_consumers", sample.num_consumers)?,
        parse_arg(&args, 3, "total_items", sample.total_items)?,
    )
    .with_producer_delay(Duration::from_millis(50))
    .with_consumer_delay(Duration::from_millis(75));

    println!("=== Bounded Buffer - Producer/Consumer Demo ===\n");
    println!(
        "Buffer capacity: {}, producers: {}, consumers: {}, items: {}\n",
        config.capacity, config.num_producers, config.num_consumers, config.total_items
    );

    let hook: EventHook<u64> = Arc::new(|event: &WorkerEvent<'_, u64>| {
        let time = event.timestamp.format("%H:%M:%S%.3f");
        match event.kind {
            EventKind::Produced(item) => println!("[{}] {} produced {}", time, event.worker, item),
            EventKind::Consumed(item) => println!("[{}] {} consumed {}", time, event.worker, item),
            EventKind::Finished { count } => {
                println!("[{}] {} finished after {} items", time, event.worker, count)
            }
            EventKind::Cancelled { count } => {
                println!("[{}] {} cancelled after {} items", time, event.worker, count)
            }
        }
    });

    let output = Coordinator::new(config)?.with_hook(hook).run()?;

    println!("\n{}", output.report);
    println!("Sink contents: {:?}", output.sink);

    if !output.report.success {
        std::process::exit(1);
    }
    Ok(())
}
