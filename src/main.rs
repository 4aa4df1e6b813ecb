use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Terminal,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use energy_dashboard::data::DashboardData;
use energy_dashboard::{
    events, ui, App, DashboardOptions, DataSource, FileSource, Settings, StoreEvent, StreamSource,
    Tariff,
};

const DEFAULT_LOG_FILTER: &str = "energy_dashboard=info,meter_types=info";

/// Poll interval for push sources; they only forward what has arrived.
const STREAM_POLL: Duration = Duration::from_millis(100);

/// The header clock shows minutes only.
const CLOCK_TICK: Duration = Duration::from_secs(60);

#[derive(Parser, Debug)]
#[command(name = "energy-dashboard")]
#[command(about = "Terminal dashboard for hierarchical energy-metering snapshots")]
struct Args {
    /// Path to an energy_data JSON export [default: energy_data.json]
    #[arg(short, long, conflicts_with = "connect")]
    file: Option<PathBuf>,

    /// Connect to a TCP endpoint streaming newline-delimited snapshots (host:port)
    #[arg(short, long)]
    connect: Option<String>,

    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// File poll interval (e.g., "1s", "500ms") [default: 1s]
    #[arg(short, long)]
    refresh: Option<String>,

    /// Treat this day as "today" (YYYY-MM-DD) instead of the local date
    #[arg(short, long)]
    date: Option<NaiveDate>,

    /// Tariff per kWh used to show costs
    #[arg(long)]
    rate: Option<f64>,

    /// Currency shown next to costs
    #[arg(long, requires = "rate")]
    currency: Option<String>,

    /// Log file used while the TUI owns the terminal
    #[arg(long, default_value = "energy-dashboard.log")]
    log_file: PathBuf,

    /// Aggregate once, write the result to this JSON file and exit
    #[arg(short, long, conflicts_with = "connect")]
    export: Option<PathBuf>,
}

impl Args {
    /// Apply command-line overrides on top of the loaded settings.
    fn apply(&self, settings: &mut Settings) -> Result<()> {
        if let Some(ref file) = self.file {
            settings.source.file = file.clone();
            settings.source.connect = None;
        }
        if let Some(ref connect) = self.connect {
            settings.source.connect = Some(connect.clone());
        }
        if let Some(ref refresh) = self.refresh {
            settings.source.refresh = refresh.clone();
        }
        if let Some(rate) = self.rate {
            let currency = self
                .currency
                .clone()
                .or_else(|| settings.tariff.as_ref().map(|t| t.currency.clone()))
                .unwrap_or_default();
            settings.tariff = Some(Tariff {
                rate_per_kwh: rate,
                currency,
            });
        }
        settings.validate()
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // The TUI owns stdout/stderr, so interactive runs log to a file
    let log_target = if args.export.is_some() {
        None
    } else {
        Some(args.log_file.as_path())
    };
    init_logging(log_target)?;

    let mut settings = Settings::load(args.config.as_deref())?;
    args.apply(&mut settings)?;
    let options = settings.dashboard_options();

    // Handle export mode (non-interactive)
    if let Some(ref export_path) = args.export {
        return export_to_file(&settings.source.file, export_path, args.date, &options);
    }

    // Handle TCP connection mode
    if let Some(ref addr) = settings.source.connect {
        return run_with_tcp(addr, options, args.date);
    }

    // Default: file-based mode
    let refresh = settings.refresh_interval()?;
    let source = Box::new(FileSource::new(&settings.source.file));
    run_tui(source, options, args.date, refresh)
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .init();
        }
    }
    Ok(())
}

/// Run with a TCP stream data source
fn run_with_tcp(addr: &str, options: DashboardOptions, date: Option<NaiveDate>) -> Result<()> {
    // The runtime must outlive the TUI: it drives the reader task
    let rt = tokio::runtime::Runtime::new()?;

    let source = rt.block_on(async {
        use tokio::net::TcpStream;

        println!("Connecting to {}...", addr);
        let stream = TcpStream::connect(addr)
            .await
            .with_context(|| format!("Failed to connect to {}", addr))?;
        info!("Connected to {}", addr);
        Ok::<_, anyhow::Error>(Box::new(StreamSource::spawn(stream, addr)) as Box<dyn DataSource>)
    })?;

    run_tui(source, options, date, STREAM_POLL)
}

/// Run the TUI with the given data source
fn run_tui(
    source: Box<dyn DataSource>,
    options: DashboardOptions,
    date: Option<NaiveDate>,
    refresh_interval: Duration,
) -> Result<()> {
    info!(
        source = source.description(),
        "Starting dashboard (refresh every {:?})", refresh_interval
    );

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Restore the terminal before printing a panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    let mut app = App::new(source, options, Local::now().naive_local(), date);
    app.reload_data();

    let result = run_app(&mut terminal, &mut app, refresh_interval);

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

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    refresh_interval: Duration,
) -> Result<()> {
    let mut last_refresh = Instant::now();
    let mut last_tick = Instant::now();

    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 60;
    const MIN_HEIGHT: u16 = 16;

    while app.running {
        terminal.draw(|frame| {
            let area = frame.area();

            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = Paragraph::new(msg)
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(Color::Yellow));
                let top = (area.height / 2).saturating_sub(2);
                let centered = Rect::new(0, top, area.width, 5.min(area.height - top));
                frame.render_widget(paragraph, centered);
                return;
            }

            ui::render(frame, app);
        })?;

        // Poll for events with a short timeout
        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse),
                // Redrawn on the next iteration
                Event::Resize(_, _) => {}
                _ => {}
            }
        }

        if last_refresh.elapsed() >= refresh_interval {
            app.reload_data();
            last_refresh = Instant::now();
        }

        if last_tick.elapsed() >= CLOCK_TICK {
            app.tick_clock(Local::now().naive_local());
            last_tick = Instant::now();
        }
    }

    Ok(())
}

/// Aggregate the file once and write the dashboard values as JSON
fn export_to_file(
    data_path: &Path,
    export_path: &Path,
    date: Option<NaiveDate>,
    options: &DashboardOptions,
) -> Result<()> {
    let mut source = FileSource::new(data_path);
    let snapshot = match source.poll() {
        Some(StoreEvent::Changed(snapshot)) => snapshot,
        Some(StoreEvent::Failed(error)) => {
            anyhow::bail!("Failed to load {}: {}", data_path.display(), error)
        }
        None => anyhow::bail!("No data in {}", data_path.display()),
    };
    if snapshot.is_empty() {
        warn!("{} holds no readings", data_path.display());
    }

    let today = date.unwrap_or_else(|| Local::now().date_naive());
    let data = DashboardData::from_snapshot(&snapshot, today, today.year(), options);
    let currency = options.tariff.as_ref().map(|t| t.currency.as_str());

    let json = serde_json::to_string_pretty(&data.export(currency))?;
    std::fs::write(export_path, json)
        .with_context(|| format!("Failed to write {}", export_path.display()))?;

    info!(
        records = snapshot.record_count(),
        "Exported dashboard for {} to {}",
        today,
        export_path.display()
    );
    println!("Exported energy summary to: {}", export_path.display());
    Ok(())
}
