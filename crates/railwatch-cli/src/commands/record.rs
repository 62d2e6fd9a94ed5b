//! `railwatch record` — headless sampling loop with export at the end.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use railwatch_core::{Monitor, PmicAdcSource, PowerSource};

use super::RunConfig;

pub fn run(cfg: RunConfig) -> i32 {
    let source = PmicAdcSource::new();
    if !source.is_available() {
        eprintln!("Error: vcgencmd not found; PMIC telemetry needs a Raspberry Pi");
        return 1;
    }

    let rails = match super::resolve_rails(&source, cfg.rails_filter.as_deref()) {
        Ok(rails) => rails,
        Err(e) => {
            eprintln!("Error: {e}");
            return 1;
        }
    };

    let mut monitor = Monitor::new(Box::new(source), rails, cfg.interval);

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    if let Err(e) = ctrlc::set_handler(move || r.store(false, Ordering::SeqCst)) {
        eprintln!("Error setting Ctrl+C handler: {e}");
        return 1;
    }

    println!("Recording power draw");
    println!("  Rails:    {}", monitor.rails().join(", "));
    println!("  Interval: {}ms", cfg.interval.as_millis());
    match cfg.duration {
        Some(d) => println!("  Duration: {}s", d.as_secs()),
        None => println!("  Duration: until Ctrl+C"),
    }
    println!("  Output:   {}", cfg.output.display());
    println!();

    log::info!("record: {} rails at {:?}", monitor.rails().len(), cfg.interval);

    monitor.start();
    let start = Instant::now();

    while running.load(Ordering::SeqCst) {
        if let Some(max) = cfg.duration
            && start.elapsed() >= max
        {
            break;
        }

        let total = monitor.tick().total;
        print!(
            "\r  Ticks: {:<6} Total: {:>8.3} W   Elapsed: {:.1}s",
            monitor.history().len(),
            total,
            start.elapsed().as_secs_f64()
        );
        let _ = std::io::Write::flush(&mut std::io::stdout());

        // Cancellable wait: Ctrl+C wakes within one slice instead of
        // sitting out the rest of the interval.
        let deadline = Instant::now() + cfg.interval;
        while Instant::now() < deadline && running.load(Ordering::SeqCst) {
            thread::sleep(Duration::from_millis(10));
        }
    }

    monitor.stop();
    println!();
    println!();

    super::finish_run(&monitor, &cfg)
}
