mod app;
mod ui;

use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend as RatatuiBackend, Terminal};
use term_sampler::{pump, queue, CrosstermBackend, InputError, Sampler};
use tracing_subscriber::EnvFilter;

use crate::app::App;

/// How long the consumer waits before redrawing anyway (keeps the clock fresh).
const REDRAW_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Parser)]
#[command(
    name = "term-sampler",
    about = "Show the normalized terminal event stream live"
)]
struct Cli {
    /// Capacity of the event queue between the input thread and the UI
    #[arg(long, default_value_t = queue::DEFAULT_CAPACITY)]
    capacity: usize,

    /// Capture mouse reports
    #[arg(long)]
    mouse: bool,

    /// Enable bracketed paste, so pastes arrive as one event
    #[arg(long)]
    paste: bool,

    /// Number of events kept on screen
    #[arg(long, default_value_t = 500)]
    history: usize,

    /// Write logs to this file (the terminal belongs to the UI)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.capacity == 0 {
        bail!("--capacity must be at least 1");
    }
    init_logging(&cli)?;

    // ── Terminal setup ──────────────────────────────────────────
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    if cli.mouse {
        execute!(stdout, EnableMouseCapture)?;
    }
    if cli.paste {
        execute!(stdout, EnableBracketedPaste)?;
    }
    let backend = RatatuiBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Panic hook: restore terminal before printing the panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = restore_terminal(&mut io::stdout());
        original_hook(info);
    }));

    // ── Run ─────────────────────────────────────────────────────
    let result = run(&mut terminal, &cli);

    // ── Terminal teardown ───────────────────────────────────────
    restore_terminal(terminal.backend_mut())?;

    result
}

fn init_logging(cli: &Cli) -> Result<()> {
    let Some(path) = &cli.log_file else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&cli.log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_thread_names(true)
        .init();
    Ok(())
}

fn restore_terminal(out: &mut impl io::Write) -> io::Result<()> {
    disable_raw_mode()?;
    // Disabling modes that were never enabled is harmless.
    execute!(
        out,
        DisableBracketedPaste,
        DisableMouseCapture,
        LeaveAlternateScreen
    )
}

fn run(terminal: &mut Terminal<RatatuiBackend<io::Stdout>>, cli: &Cli) -> Result<()> {
    let mut app = App::new(cli.history);
    let (tx, mut rx) = queue::bounded(cli.capacity);

    // ── Input thread ────────────────────────────────────────────
    let input = pump::spawn(CrosstermBackend, Sampler::new(), tx)?;
    tracing::info!(capacity = cli.capacity, "event viewer started");

    // ── Main event loop ─────────────────────────────────────────
    terminal.draw(|frame| ui::draw(frame, &app))?;

    let outcome = loop {
        match rx.recv_timeout(REDRAW_INTERVAL) {
            Ok(Some(event)) => {
                app.handle(event);
                // Batch whatever else is already queued into this frame.
                for event in rx.drain() {
                    app.handle(event);
                }
            }
            Ok(None) => {}
            Err(err) => break Err(err),
        }

        if app.should_quit {
            break Ok(());
        }

        terminal.draw(|frame| ui::draw(frame, &app))?;
    };

    // The input thread may be parked on a full queue; hang up before joining.
    drop(rx);
    let joined = input.shutdown();
    tracing::info!(received = app.received, "event viewer stopped");

    match outcome.and(joined) {
        Ok(()) | Err(InputError::Closed) => Ok(()),
        Err(err) => Err(err).context("terminal input stopped"),
    }
}
