mod app;
mod audio;
mod cli;
mod config;
mod events;
mod library;
mod ui;

use std::fs::{self, File};
use std::io::{self, stdout, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use app::App;
use cli::Cli;
use config::AppConfig;
use events::Action;
use library::PlayQueue;

/// Longest the loop blocks on input when no tick is scheduled
const IDLE_POLL: Duration = Duration::from_millis(100);

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_path = cli.log_file.clone().unwrap_or_else(default_log_path);
    init_logging(&log_path)?;

    let mut config = AppConfig::discover(cli.config.as_deref())?;
    config.apply_cli(&cli)?;
    log::debug!("Config: {:?}", config);

    let mut queue = PlayQueue::from_paths(&cli.paths, config.repeat);
    queue.set_shuffle(config.shuffle);
    log::info!("Queued {} track(s)", queue.len());

    // Create app before touching the terminal so setup errors print normally
    let mut app = App::new(config, queue)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        log::error!("{:#}", e);
        eprintln!("Error: {:#}", e);
    }

    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    while app.running {
        // Draw UI
        terminal.draw(|frame| {
            ui::render(app, frame.area(), frame.buffer_mut());
        })?;

        app.process_player_events();
        app.check_track_ended();

        // Handle input until the next visualizer tick is due
        let timeout = app.timer.timeout(Instant::now(), IDLE_POLL);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press events (not release)
                if key.kind == KeyEventKind::Press {
                    app.handle_action(Action::from_key_event(key));
                }
            }
        }

        if app.timer.poll(Instant::now()) {
            let outcome = app.on_tick();
            log::trace!("Spectrum tick: {:?}", outcome);
        }
    }

    Ok(())
}

fn default_log_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("sonar")
        .join("sonar.log")
}

/// Logs go to a file; the terminal belongs to the UI
fn init_logging(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create log directory {}", parent.display()))?;
    }
    let file = File::create(path)
        .with_context(|| format!("Cannot open log file {}", path.display()))?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {:<5} {}: {}",
                buf.timestamp_millis(),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();

    log::info!("Logging to {}", path.display());
    Ok(())
}
