//! TUI application state and event loop.
//!
//! Single thread of control: draw, poll the keyboard for up to 50 ms, tick
//! when the interval has elapsed. The input poll doubles as the interval
//! wait, so a quit key (or Ctrl-C, which raw mode delivers as a key event)
//! never waits out the remainder of a tick.

use std::io;
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;

use railwatch_core::{Monitor, Sample};

/// How long each input poll blocks; the ceiling on interrupt latency.
const POLL_SLICE: Duration = Duration::from_millis(50);

/// Ticks of total-power history shown in the dashboard chart.
const CHART_WINDOW: usize = 240;

pub struct App {
    monitor: Monitor,
    interval: Duration,
    max_duration: Option<Duration>,
    running: bool,
    paused: bool,
}

impl App {
    pub fn new(monitor: Monitor, interval: Duration, max_duration: Option<Duration>) -> Self {
        Self {
            monitor,
            interval,
            max_duration,
            running: true,
            paused: false,
        }
    }

    pub fn monitor(&self) -> &Monitor {
        &self.monitor
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn latest(&self) -> Option<&Sample> {
        self.monitor.history().last()
    }

    /// Recent total-power points for the dashboard chart.
    pub fn total_window(&self) -> Vec<(f64, f64)> {
        let samples = self.monitor.history().samples();
        let skip = samples.len().saturating_sub(CHART_WINDOW);
        samples[skip..]
            .iter()
            .map(|s| (s.elapsed_secs, s.total))
            .collect()
    }

    /// Run the dashboard until the user quits, the duration limit is hit, or
    /// the terminal dies. The monitor is stopped in every exit path, so the
    /// caller can always export whatever was recorded.
    pub fn run(&mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        // Restore the terminal before printing any panic.
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen, crossterm::cursor::Show);
            original_hook(info);
        }));

        let result = self.run_loop(&mut terminal);

        self.monitor.stop();

        let _ = std::panic::take_hook();
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            crossterm::cursor::Show
        )?;

        result
    }

    fn run_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> io::Result<()> {
        self.monitor.start();
        self.monitor.tick();
        let mut last_tick = Instant::now();

        while self.running {
            terminal.draw(|f| super::ui::draw(f, self))?;

            if event::poll(POLL_SLICE)?
                && let Event::Key(key) = event::read()?
                && key.kind == KeyEventKind::Press
            {
                self.handle_key(key);
            }

            if let Some(max) = self.max_duration
                && self.monitor.elapsed() >= max
            {
                self.running = false;
            }

            if !self.paused && last_tick.elapsed() >= self.interval {
                self.monitor.tick();
                last_tick = Instant::now();
            }
        }

        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.running = false;
            }
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Char('p') => self.paused = !self.paused,
            KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Char(']') => {
                let secs = (self.interval.as_secs_f64() / 2.0).max(0.1);
                self.interval = Duration::from_secs_f64(secs);
            }
            KeyCode::Char('-') | KeyCode::Char('[') => {
                let secs = (self.interval.as_secs_f64() * 2.0).min(30.0);
                self.interval = Duration::from_secs_f64(secs);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use railwatch_core::MockPowerSource;

    fn app() -> App {
        let source =
            MockPowerSource::new(&["core"]).with_frames(vec![vec![Some(1.0)], vec![Some(2.0)]]);
        let monitor = Monitor::new(
            Box::new(source),
            vec!["core".into()],
            Duration::from_secs(1),
        );
        App::new(monitor, Duration::from_secs(1), None)
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn quit_keys_stop_the_loop() {
        for code in [KeyCode::Char('q'), KeyCode::Esc] {
            let mut a = app();
            a.handle_key(press(code));
            assert!(!a.running);
        }

        let mut a = app();
        a.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(!a.running);
    }

    #[test]
    fn plain_c_does_not_quit() {
        let mut a = app();
        a.handle_key(press(KeyCode::Char('c')));
        assert!(a.running);
    }

    #[test]
    fn pause_toggles() {
        let mut a = app();
        a.handle_key(press(KeyCode::Char('p')));
        assert!(a.paused());
        a.handle_key(press(KeyCode::Char('p')));
        assert!(!a.paused());
    }

    #[test]
    fn interval_adjust_is_bounded() {
        let mut a = app();
        for _ in 0..10 {
            a.handle_key(press(KeyCode::Char('+')));
        }
        assert!(a.interval() >= Duration::from_millis(100));

        for _ in 0..20 {
            a.handle_key(press(KeyCode::Char('-')));
        }
        assert!(a.interval() <= Duration::from_secs(30));
    }

    #[test]
    fn total_window_reflects_ticks() {
        let mut a = app();
        a.monitor.start();
        a.monitor.tick();
        a.monitor.tick();
        let window = a.total_window();
        assert_eq!(window.len(), 2);
        assert!((window[0].1 - 1.0).abs() < 1e-9);
        assert!((window[1].1 - 2.0).abs() < 1e-9);
    }
}
