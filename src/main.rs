mod app;
mod config;
mod error;
mod events;
mod library;
mod spotify;
mod ui;
#[cfg(test)]
mod tests;

use anyhow::Result;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use crate::{app::App, config::Config};

#[tokio::main]
async fn main() -> Result<()> {
    // ── Logging setup ────────────────────────────────────────────────────────
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("likeshelf=info"));
    // the TUI owns stdout, so logs go to a file
    let log_path = std::env::temp_dir().join("likeshelf.log");
    if let Ok(file) = std::fs::File::create(&log_path) {
        fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(file))
            .init();
    }

    // ── Load config ──────────────────────────────────────────────────────────
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {e}");
            eprintln!("\x1b[31mlikeshelf:\x1b[0m {e}");
            eprintln!("Set SPOTIFY_CLIENT_ID, SPOTIFY_CLIENT_SECRET and SPOTIFY_REDIRECT_URI (a .env file works too).");
            std::process::exit(2);
        }
    };
    info!(data_dir = %config.data_dir.display(), "Starting likeshelf");

    // ── Terminal setup ────────────────────────────────────────────────────────
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // ── Panic hook to restore terminal on crash ──────────────────────────────
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        disable_raw_mode().ok();
        execute!(io::stdout(), LeaveAlternateScreen).ok();
        original_hook(panic_info);
    }));

    // ── Run the app ──────────────────────────────────────────────────────────
    let result = {
        let mut app = App::new(config);
        app.run(&mut terminal).await
    };

    // ── Restore terminal ─────────────────────────────────────────────────────
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        error!("App error: {e:?}");
        eprintln!("\n\x1b[31mlikeshelf crashed:\x1b[0m {e}");
        eprintln!("Check {} for details", log_path.display());
        std::process::exit(1);
    }

    Ok(())
}
