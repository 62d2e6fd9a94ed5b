//! `railwatch monitor` — live TUI dashboard, chart export on quit.

use railwatch_core::{Monitor, PmicAdcSource, PowerSource};

use super::RunConfig;
use crate::tui::app::App;

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

    log::info!("monitor: {} rails at {:?}", rails.len(), cfg.interval);

    let monitor = Monitor::new(Box::new(source), rails, cfg.interval);
    let mut app = App::new(monitor, cfg.interval, cfg.duration);
    let tui_result = app.run();

    // The chart is flushed even when the terminal died under us.
    let mut code = super::finish_run(app.monitor(), &cfg);
    if let Err(e) = tui_result {
        eprintln!("Terminal error: {e}");
        code = 1;
    }
    code
}
