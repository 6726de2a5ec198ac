//! OrgBot TUI Entry Point
//!
//! Launches the terminal UI for OrgBot.
//!
//! Usage:
//!   orgbot-tui [OPTIONS]
//!
//! Options:
//!   -c, --config <FILE>          Configuration file
//!       --catalog <FILE>         Catalog file instead of the built-in one
//!       --resolution-delay-ms    Delay before a reply appears
//!       --reveal-tick-ms         Delay between revealed code characters
//!       --log-file <FILE>        Where logs go (the terminal is busy)

use std::io;
use std::panic;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use orgbot_core::{load_config_from_path, ConfigOverrides};
use orgbot_tui::assistant_client::AssistantClient;
use orgbot_tui::clipboard::system_clipboard;
use orgbot_tui::App;

/// OrgBot - cloud-governance demo assistant
#[derive(Parser, Debug)]
#[command(name = "orgbot-tui")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short = 'c', long, env = "ORGBOT_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Catalog file to load instead of the built-in catalog
    #[arg(long, value_name = "FILE")]
    catalog: Option<PathBuf>,

    /// Delay before a reply appears, in milliseconds
    #[arg(long, value_name = "MS")]
    resolution_delay_ms: Option<u64>,

    /// Delay between revealed code characters, in milliseconds
    #[arg(long, value_name = "MS")]
    reveal_tick_ms: Option<u64>,

    /// Log file path
    #[arg(long, env = "ORGBOT_LOG_FILE", value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, env = "ORGBOT_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides::new();
        if let Some(ms) = self.resolution_delay_ms {
            overrides = overrides.with_resolution_delay_ms(ms);
        }
        if let Some(ms) = self.reveal_tick_ms {
            overrides = overrides.with_reveal_tick_ms(ms);
        }
        if let Some(path) = &self.catalog {
            overrides = overrides.with_catalog_path(path.clone());
        }
        overrides
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Check if we have a TTY before attempting initialization
    use std::io::IsTerminal;

    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        eprintln!("Error: orgbot-tui requires a terminal (TTY)");
        eprintln!();
        eprintln!("This usually means:");
        eprintln!("  - Running in a non-interactive environment (CI, container)");
        eprintln!("  - SSH without -t flag");
        eprintln!("  - Piped stdin/stdout");
        std::process::exit(1);
    }

    init_logging(&args)?;

    // Configuration problems are reported before the screen is taken over
    let mut config = load_config_from_path(args.config.clone())?;
    args.overrides().apply(&mut config);
    config.validate()?;
    let catalog = Arc::new(config.load_catalog()?);
    tracing::info!(
        source = %config.source(),
        entries = catalog.len(),
        "Configuration loaded"
    );

    let client = AssistantClient::new(catalog, config, system_clipboard());

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Restore terminal before printing panic
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Run the app
    let mut app = App::new(client);
    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Show goodbye message after TUI closes
    if let Some(goodbye) = app.goodbye() {
        println!("\n\x1b[34mOrgBot:\x1b[0m {goodbye}\n");
    }

    // Propagate any errors
    result
}

/// Send logs to a file, since the terminal belongs to the UI
fn init_logging(args: &Args) -> anyhow::Result<()> {
    let path = args
        .log_file
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("orgbot-tui.log"));
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "orgbot_tui={level},orgbot_core={level}",
            level = args.log_level
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();

    Ok(())
}
