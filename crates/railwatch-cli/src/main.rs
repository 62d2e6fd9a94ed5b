//! CLI for railwatch — live power rail dashboard for the Raspberry Pi PMIC.

mod commands;
mod tui;

use clap::{Parser, Subcommand};

use commands::RunConfig;

#[derive(Parser)]
#[command(name = "railwatch")]
#[command(about = "railwatch — watch your Pi's power rails, live and on a chart")]
#[command(version = railwatch_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Live TUI dashboard; exports the chart when you quit
    Monitor {
        /// Sampling interval in seconds
        #[arg(long, default_value = "1.0")]
        interval: f64,

        /// Path for the exported SVG chart
        #[arg(long, default_value = "power_report.svg")]
        output: String,

        /// Comma-separated rail name filter (substring match, e.g. "core,ddr")
        #[arg(long)]
        rails: Option<String>,

        /// Stop after this long (e.g. "30s", "5m", "1h")
        #[arg(long)]
        duration: Option<String>,

        /// Also write the run's summary statistics as JSON
        #[arg(long)]
        summary: Option<String>,
    },

    /// Headless sampling loop (Ctrl-C to stop); exports the chart at the end
    Record {
        /// Sampling interval in seconds
        #[arg(long, default_value = "1.0")]
        interval: f64,

        /// Path for the exported SVG chart
        #[arg(long, default_value = "power_report.svg")]
        output: String,

        /// Comma-separated rail name filter (substring match)
        #[arg(long)]
        rails: Option<String>,

        /// Stop after this long (e.g. "30s", "5m", "1h")
        #[arg(long)]
        duration: Option<String>,

        /// Also write the run's summary statistics as JSON
        #[arg(long)]
        summary: Option<String>,
    },

    /// Probe the PMIC and list the rails it reports
    Scan,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let code = match cli.command {
        Commands::Monitor {
            interval,
            output,
            rails,
            duration,
            summary,
        } => match RunConfig::build(interval, output, rails, duration, summary) {
            Ok(cfg) => commands::monitor::run(cfg),
            Err(msg) => {
                eprintln!("Error: {msg}");
                2
            }
        },
        Commands::Record {
            interval,
            output,
            rails,
            duration,
            summary,
        } => match RunConfig::build(interval, output, rails, duration, summary) {
            Ok(cfg) => commands::record::run(cfg),
            Err(msg) => {
                eprintln!("Error: {msg}");
                2
            }
        },
        Commands::Scan => commands::scan::run(),
    };

    std::process::exit(code);
}
