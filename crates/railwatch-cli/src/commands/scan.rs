//! `railwatch scan` — probe the PMIC and list the rails it reports.

use railwatch_core::{PmicAdcSource, PowerSource};

pub fn run() -> i32 {
    let source = PmicAdcSource::new();
    if !source.is_available() {
        eprintln!("Error: vcgencmd not found; PMIC telemetry needs a Raspberry Pi");
        return 1;
    }

    let rails = match source.detect_rails() {
        Ok(rails) => rails,
        Err(e) => {
            eprintln!("Error: {e}");
            return 1;
        }
    };

    println!("{} rails reported by {}:", rails.len(), source.name());
    let mut total = 0.0;
    for (rail, result) in source.read_many(&rails) {
        match result {
            Ok(reading) => {
                total += reading.watts;
                println!("  {rail:<12} {:>10.4} W", reading.watts);
            }
            Err(e) => println!("  {rail:<12} {:>10}   ({e})", "-"),
        }
    }
    println!("  {:<12} {total:>10.4} W", "total");
    0
}
