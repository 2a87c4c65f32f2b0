//! satchi - a terminal client for the tech-fest event platform.
//!
//! Browse events and register teams, manage the event hierarchy, record
//! evaluations and backdated registrations from a keyboard-driven UI.

mod app;
mod ui;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use satchi_core::auth::CredentialStore;
use satchi_core::profile::{registration_summary, Profile};
use satchi_core::validation::check_email_domain;
use satchi_core::{ApiClient, Config, SessionStore};

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Log file written inside the cache directory
const LOG_FILE_NAME: &str = "satchi.log";

const USAGE: &str = "\
Usage: satchi [OPTION]

  (none)            start the terminal UI
  --signup          start the terminal UI on the signup form
  --login           log in from the command line and save the session
  --logout          end the saved session
  --registrations   print your registrations
  --help            show this message";

/// Initialize tracing to a log file so output never lands on the terminal.
/// `RUST_LOG` controls the level (default `warn`).
fn init_tracing(cache_dir: &Path) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    if std::fs::create_dir_all(cache_dir).is_err() {
        return None;
    }
    let appender = tracing_appender::rolling::never(cache_dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();
    Some(guard)
}

fn cache_dir_for(config: &Config) -> PathBuf {
    config.cache_dir().unwrap_or_else(|_| PathBuf::from("./cache"))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = Config::load().unwrap_or_default();
    let _log_guard = init_tracing(&cache_dir_for(&config));

    let args: Vec<String> = std::env::args().collect();
    let start_signup = match args.get(1).map(String::as_str) {
        None => false,
        Some("--signup") => true,
        Some("--login") => return login_cli(config).await,
        Some("--logout") => return logout_cli(config).await,
        Some("--registrations") => return registrations_cli(config).await,
        Some("--help" | "-h") => {
            println!("{}", USAGE);
            return Ok(());
        }
        Some(other) => {
            eprintln!("Unknown option: {}\n\n{}", other, USAGE);
            std::process::exit(2);
        }
    };

    info!("satchi starting");

    let mut app = App::new(config).await?;
    if start_signup {
        app.start_signup();
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("satchi shutting down");
    Ok(())
}

async fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| render(f, app))?;

        // Requests queued by the last key press run after their "in progress"
        // state has been drawn
        if app.has_pending() {
            app.run_pending().await;
            continue;
        }

        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }
                if handle_input(app, key).await? {
                    return Ok(());
                }
            }
        }

        app.check_background_tasks();

        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}

// ============================================================================
// Command-line actions
// ============================================================================

fn session_store(config: &Config) -> Result<SessionStore<ApiClient>> {
    let api = ApiClient::from_config(config).context("Failed to create API client")?;
    Ok(SessionStore::new(api, cache_dir_for(config)))
}

fn prompt(label: &str, default: Option<&str>) -> Result<String> {
    match default {
        Some(d) => print!("{} [{}]: ", label, d),
        None => print!("{}: ", label),
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();
    Ok(match (input.is_empty(), default) {
        (true, Some(d)) => d.to_string(),
        _ => input.to_string(),
    })
}

async fn login_cli(mut config: Config) -> Result<()> {
    println!("\n=== satchi login ===\n");

    let env_email = std::env::var("SATCHI_EMAIL").ok();
    let default_email = env_email.as_deref().or(config.last_email.as_deref());
    let email = prompt("Email", default_email)?;
    check_email_domain(&email, &config.email_domain)?;

    let remembered = CredentialStore::get_password(&email).ok();
    let password = match (std::env::var("SATCHI_PASSWORD").ok(), remembered) {
        (Some(p), _) => p,
        (None, Some(p)) if prompt("Use stored password? [Y/n]", None)?.to_lowercase() != "n" => p,
        _ => rpassword::prompt_password("Password: ")?,
    };

    println!("\nAuthenticating...");
    let mut store = session_store(&config)?;
    let identity = store
        .login(&email, &password)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;
    let name = identity.user.display_name().to_string();

    if let Err(e) = CredentialStore::store(&email, &password) {
        eprintln!("Warning: could not remember password: {}", e);
    }
    config.last_email = Some(email);
    config.save().context("Failed to save config")?;

    println!("Logged in as {}.\n", name);
    Ok(())
}

async fn logout_cli(config: Config) -> Result<()> {
    let mut store = session_store(&config)?;
    if !store.hydrate().await {
        println!("No active session.");
        return Ok(());
    }
    store.logout().await;
    if let Some(email) = config.last_email.as_deref() {
        CredentialStore::delete(email)?;
    }
    println!("Logged out.");
    Ok(())
}

async fn registrations_cli(config: Config) -> Result<()> {
    let mut store = session_store(&config)?;
    if !store.hydrate().await {
        anyhow::bail!("No saved session. Run `satchi --login` first.");
    }

    let profile = Profile::load(store.backend()).await?;
    println!("{}\n", profile.greeting());
    if profile.registrations.is_empty() {
        println!("No registrations yet.");
        return Ok(());
    }
    for reg in &profile.registrations {
        let [team, trail, role, date] = registration_summary(reg);
        println!("{:<24} {:<48} {:<12} {}", team, trail, role, date);
    }
    Ok(())
}
