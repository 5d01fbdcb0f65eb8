use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Frame, Terminal,
};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use nodemon::config::parse_setting;
use nodemon::data::export::write_export;
use nodemon::{
    events, shutdown, ui, App, DashboardConfig, DisplayState, HttpFetcher, Scheduler,
    StatusFetcher,
};

/// Minimum terminal size for a usable table.
const MIN_WIDTH: u16 = 80;
const MIN_HEIGHT: u16 = 10;

/// Redraw at least this often so clocks and spinners advance.
const TICK: Duration = Duration::from_millis(250);

#[derive(Parser, Debug)]
#[command(name = "nodemon")]
#[command(about = "Live terminal dashboard for node status")]
struct Args {
    /// Path to the configuration file (JSON, TOML or YAML)
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Polling interval, overriding the configuration (e.g. "120s", "5m")
    #[arg(short, long)]
    interval: Option<String>,

    /// Per-node fetch timeout, overriding the configuration (e.g. "10s")
    #[arg(short, long)]
    timeout: Option<String>,

    /// Run a single polling pass, write the table as JSON and exit
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Log file path
    #[arg(long, default_value = "nodemon.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Set up file-based tracing; stdout belongs to the TUI.
///
/// The returned guard flushes pending log lines when dropped.
fn setup_tracing(args: &Args) -> WorkerGuard {
    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("nodemon={log_level}")));

    let log_dir = match args.log_file.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let log_filename = args
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("nodemon.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true),
        )
        .init();

    guard
}

fn load_config(args: &Args) -> Result<DashboardConfig> {
    let mut config = DashboardConfig::load(&args.config)
        .with_context(|| format!("failed to load {}", args.config.display()))?;

    if let Some(ref value) = args.interval {
        config = config.with_interval(parse_setting("interval", value)?)?;
    }
    if let Some(ref value) = args.timeout {
        config = config.with_timeout(parse_setting("timeout", value)?)?;
    }
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = setup_tracing(&args);

    let config = load_config(&args)?;
    info!(
        nodes = config.nodes.len(),
        interval_secs = config.interval.as_secs_f64(),
        timeout_secs = config.timeout.as_secs_f64(),
        "configuration loaded"
    );

    let rt = tokio::runtime::Runtime::new()?;
    let shutdown_rx = shutdown::spawn_listener(rt.handle());

    let fetcher = HttpFetcher::builder().timeout(config.timeout).build()?;
    let source_description = fetcher.description().to_string();

    let (writer, reader) = DisplayState::channel(&config.nodes);
    let mut scheduler = Scheduler::new(
        Arc::clone(&config.nodes),
        Arc::new(fetcher),
        writer,
        config.interval,
    );

    // Handle export mode (non-interactive)
    if let Some(export_path) = args.export {
        // A signal during the pass lets it finish; one before it skips the export.
        if shutdown::requested(&shutdown_rx) {
            info!("shutdown requested before the export pass");
            return Ok(());
        }
        let summary = rt.block_on(scheduler.run_once());
        write_export(&reader.read(), &export_path)?;
        println!(
            "Exported {} of {} nodes to: {}",
            summary.succeeded,
            config.nodes.len(),
            export_path.display()
        );
        return Ok(());
    }

    let handle = {
        let _enter = rt.enter();
        scheduler.spawn()
    };

    let app = App::new(reader, &source_description, config.interval).with_shutdown(shutdown_rx);
    let result = run_tui(app);

    info!("waiting for the polling task to stop");
    if let Err(e) = rt.block_on(handle.shutdown()) {
        warn!(error = %e, "polling task ended abnormally");
    }

    result
}

/// Run the TUI on the current thread until the user quits.
fn run_tui(mut app: App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    let mut dirty = true;
    let mut last_draw = Instant::now();

    while app.is_running() {
        if app.sync_display() {
            dirty = true;
        }

        if dirty || last_draw.elapsed() >= TICK {
            terminal.draw(|frame| draw(frame, app))?;
            dirty = false;
            last_draw = Instant::now();
        }

        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    events::handle_key_event(app, key)
                }
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse),
                _ => {}
            }
            dirty = true;
        }
    }

    Ok(())
}

fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        ui::common::render_too_small(frame, area, MIN_WIDTH, MIN_HEIGHT);
        return;
    }

    let chunks = Layout::vertical([
        Constraint::Length(1), // Header bar
        Constraint::Min(6),    // Node table
        Constraint::Length(1), // Status bar
    ])
    .split(area);

    ui::common::render_header(frame, app, chunks[0]);
    ui::table::render(frame, app, chunks[1]);
    ui::common::render_status_bar(frame, app, chunks[2]);

    if app.show_help {
        ui::common::render_help(frame, app, area);
    }
}
