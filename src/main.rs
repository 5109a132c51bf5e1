use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use qqsync_webui::app::{resolve_theme, App, AppContext};
use qqsync_webui::client::{ApiClient, PreferenceStore};
use qqsync_webui::config::{Settings, DEFAULT_CONFIG_FILE};
use qqsync_webui::{events, server, ui, FileBridge, MessageLog};

#[derive(Parser, Debug)]
#[command(name = "qqsync-webui")]
#[command(about = "Web dashboard and terminal client for the QQSync chat-bridge plugin")]
struct Args {
    /// Configuration file (JSON or TOML)
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the dashboard over HTTP
    Serve {
        /// Address to bind (overrides server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (overrides server.port)
        #[arg(short, long)]
        port: Option<u16>,

        /// State document published by the plugin (overrides bridge.state_file)
        #[arg(long)]
        state_file: Option<PathBuf>,

        /// Directory of daily message logs (overrides bridge.message_dir)
        #[arg(long)]
        message_dir: Option<PathBuf>,
    },

    /// Watch a running dashboard from the terminal
    Watch {
        /// Dashboard base URL (overrides client.base_url)
        #[arg(short, long)]
        url: Option<String>,

        /// Seconds between status polls (overrides client.poll_interval_secs)
        #[arg(short, long)]
        interval: Option<u64>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Command::Serve {
            host,
            port,
            state_file,
            message_dir,
        } => {
            init_stderr_logging();
            let mut settings = load_settings(&args.config)?;
            if let Some(host) = host {
                settings.server.host = host;
            }
            if let Some(port) = port {
                settings.server.port = port;
            }
            if let Some(state_file) = state_file {
                settings.bridge.state_file = state_file;
            }
            if let Some(message_dir) = message_dir {
                settings.bridge.message_dir = message_dir;
            }
            report_problems(&settings);
            run_server(settings)
        }
        Command::Watch { url, interval } => {
            let _guard = init_file_logging()?;
            let mut settings = load_settings(&args.config)?;
            if let Some(url) = url {
                settings.client.base_url = url;
            }
            if let Some(interval) = interval {
                settings.client.poll_interval_secs = interval;
            }
            report_problems(&settings);
            run_client(settings)
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Server logs go to stderr.
fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(io::stderr)
        .init();
}

/// The terminal client owns the screen, so its logs go to a file.
fn init_file_logging() -> Result<WorkerGuard> {
    let dir = dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("qqsync-webui");
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(&dir, "watch.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Ok(guard)
}

fn load_settings(path: &Path) -> Result<Settings> {
    if let Err(e) = Settings::write_default_if_missing(path) {
        warn!(path = %path.display(), error = %e, "Could not write default configuration");
    }
    Settings::load(Some(path))
        .with_context(|| format!("Failed to load configuration from {}", path.display()))
}

fn report_problems(settings: &Settings) {
    for problem in settings.validate() {
        warn!(problem = %problem, "Configuration problem");
    }
}

/// Run the HTTP dashboard until Ctrl+C.
fn run_server(settings: Settings) -> Result<()> {
    let bridge = Arc::new(FileBridge::new(&settings.bridge.state_file));
    let messages = MessageLog::new(&settings.bridge.message_dir);
    let addr = settings.server.bind_addr();
    let state = Arc::new(server::AppState::new(bridge, messages, settings));

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(server::serve(state, &addr))
}

/// Run the terminal client against a running dashboard.
fn run_client(settings: Settings) -> Result<()> {
    let api = ApiClient::new(&settings.client.base_url)?;
    let prefs = match &settings.client.prefs_file {
        Some(path) => PreferenceStore::new(path),
        None => PreferenceStore::platform_default(),
    };

    // Background tasks run on the runtime while the UI loop owns this thread
    let rt = tokio::runtime::Runtime::new()?;
    let _enter = rt.enter();

    // Read the saved theme before the terminal enters raw mode
    let theme = resolve_theme(&prefs);
    let (ctx, rx) = AppContext::new(Arc::new(api));
    let mut app = App::new(ctx, rx, prefs, theme, settings.client.about_url.clone())
        .with_server_label(settings.client.base_url.clone());

    info!(url = %settings.client.base_url, "Starting terminal client");
    let poller = app.start_status_poller(settings.client.poll_interval());
    app.refresh();

    let result = run_tui(&mut app);
    poller.abort();
    result
}

fn run_tui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        // Panics in background tasks are reported through the app
        if std::thread::current().name() != Some("main") {
            tracing::error!(panic = %panic, "Background task panicked");
            return;
        }
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    let result = run_app(&mut terminal, app);

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
    while app.running {
        app.drain_events();

        terminal.draw(|frame| ui::render(frame, app))?;

        // New notifications were painted in their entering state; advance them
        app.tick(Instant::now());

        // Poll for events with a short timeout
        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    events::handle_key_event(app, key)
                }
                Event::Mouse(mouse) => {
                    // Rows start after header, tabs, block border and table header
                    events::handle_mouse_event(app, mouse, ui::CONTENT_START_ROW + 1);
                }
                Event::Resize(_, _) => {
                    // Terminal will redraw on next iteration
                }
                _ => {}
            }
        }
    }

    Ok(())
}
