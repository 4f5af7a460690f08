mod app;
mod bucket;
mod helpers;
mod terminal;
mod timer;
mod types;

use crate::{app::App, helpers::parse_args, terminal::TerminalSurface, timer::IntervalTimer};

use anyhow::Context;
use log::info;
use ratatui::{
    crossterm::{
        event::{self, Event, KeyCode},
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    },
    prelude::*,
};
use std::{
    fs::File,
    io::{self, Stdout},
    path::Path,
    time::{Duration, Instant},
};

const IDLE_POLL_MS: u64 = 200;

fn main() -> anyhow::Result<()> {
    let (settings, log_file) = parse_args()?;
    init_logging(log_file.as_deref())?;

    info!(
        "Starting ascii-bucket: interval {:?}, line height {}, {} overlay rows",
        settings.interval,
        settings.line_height,
        settings.overlay.len()
    );

    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.hide_cursor()?;

    let result = TerminalSurface::measure()
        .and_then(|surface| App::new(surface, IntervalTimer::new(), settings))
        .and_then(|mut app| run(&mut terminal, &mut app));

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App<TerminalSurface, IntervalTimer>,
) -> anyhow::Result<()> {
    loop {
        terminal.draw(|frame| app.draw_ui(frame))?;

        let timeout = app
            .next_deadline()
            .map(|due| due.saturating_duration_since(Instant::now()))
            .unwrap_or(Duration::from_millis(IDLE_POLL_MS));

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => match key.code {
                    KeyCode::Esc | KeyCode::Char('q') => break,
                    _ => {}
                },
                Event::Resize(_, _) => app.resize()?,
                _ => {}
            }
        }

        app.pump(Instant::now());
    }

    Ok(())
}

fn init_logging(log_file: Option<&Path>) -> anyhow::Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    builder.format_timestamp_micros();

    if let Some(path) = log_file {
        let file = File::create(path)
            .with_context(|| format!("Failed to create log file at {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.init();

    Ok(())
}
