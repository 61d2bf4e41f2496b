//! `vitrine`: terminal admin console for a storefront's products and
//! promotions.
//!
//! # Usage
//!
//! ```
//! vitrine --url http://localhost:8000/api --email admin@example.com
//! vitrine --config ~/.config/vitrine/config.toml
//! vitrine --logout
//! ```

mod app;
mod client;
mod config;
mod notifier;
mod session;
mod ui;

use std::{
  fs::{self, OpenOptions},
  io::{self, BufRead, Write},
  path::PathBuf,
  sync::Mutex,
  time::Duration,
};

use anyhow::{Context, Result, bail};
use app::App;
use clap::Parser;
use client::ApiClient;
use crossterm::{
  event::{self, Event, KeyEventKind},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use notifier::StatusNotifier;
use ratatui::{Terminal, backend::CrosstermBackend};
use session::{Session, SessionStore, User};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use vitrine_core::{activity::ValueFormatter, remote::NetworkError};

use crate::config::{Overrides, Settings};

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "vitrine", version, about = "Terminal admin console for products and promotions")]
struct Args {
  /// Path to a TOML config file.
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the REST service (default: http://localhost:8000/api).
  #[arg(long, env = "VITRINE_URL")]
  url: Option<String>,

  /// Login email.
  #[arg(long, env = "VITRINE_EMAIL")]
  email: Option<String>,

  /// Login password. Prompted for when absent.
  #[arg(long, env = "VITRINE_PASSWORD", hide_env_values = true)]
  password: Option<String>,

  /// ISO 4217 code used to display prices (default: BRL).
  #[arg(long)]
  currency: Option<String>,

  /// End the stored session and exit.
  #[arg(long)]
  logout: bool,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  let settings = Settings::load(args.config.as_deref(), &Overrides {
    url:      args.url,
    email:    args.email,
    password: args.password,
    currency: args.currency,
  })?;

  init_logging(&settings)?;

  let client = ApiClient::new(&settings.url, Duration::from_secs(settings.timeout_secs))?;
  let Some(session_path) = settings.session_path() else {
    bail!("cannot locate a session file; set session_path or HOME");
  };
  let store = SessionStore::new(session_path);

  if args.logout {
    return logout(&client, &store).await;
  }

  let formatter = ValueFormatter::from_code(&settings.currency)
    .with_context(|| format!("unsupported currency {:?}", settings.currency))?;
  let user = authenticate(&client, &store, &settings).await?;

  let mut app = App::new(client, StatusNotifier::new(), formatter, Some(user));

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  app.reload().await;
  let run_result = run_event_loop(&mut terminal, &mut app).await;

  // Restore terminal regardless of result.
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  if app.session_expired {
    store.clear()?;
    eprintln!("Session expired. Run vitrine again to log in.");
  }

  run_result
}

/// Log to a file; the terminal belongs to the UI.
fn init_logging(settings: &Settings) -> Result<()> {
  let Some(path) = settings.log_path() else {
    return Ok(());
  };
  if let Some(dir) = path.parent() {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
  }
  let file = OpenOptions::new()
    .create(true)
    .append(true)
    .open(&path)
    .with_context(|| format!("opening log file {}", path.display()))?;

  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_ansi(false)
    .with_writer(Mutex::new(file))
    .init();
  Ok(())
}

// ─── Session ──────────────────────────────────────────────────────────────────

/// Resume the stored session if the service still accepts it, otherwise log
/// in with configured or prompted credentials.
async fn authenticate(
  client: &ApiClient,
  store: &SessionStore,
  settings: &Settings,
) -> Result<User> {
  if let Some(session) = store.load()? {
    client.set_token(Some(session.token.clone()));
    match client.me().await {
      Ok(user) => {
        tracing::info!(user = %user.email, "resumed session");
        return Ok(user);
      }
      Err(NetworkError::Unauthorized) => {
        tracing::info!("stored session rejected");
        client.set_token(None);
        store.clear()?;
      }
      Err(error) => return Err(error).context("checking stored session"),
    }
  }

  let email = match &settings.email {
    Some(email) => email.clone(),
    None => prompt("Email: ")?,
  };
  let password = match &settings.password {
    Some(password) => password.clone(),
    None => prompt("Password: ")?,
  };

  let session: Session = match client.login(&email, &password).await {
    Ok(session) => session,
    Err(NetworkError::Unauthorized) => bail!("invalid email or password"),
    Err(error) => return Err(error).context("logging in"),
  };
  store.save(&session)?;
  Ok(session.user)
}

async fn logout(client: &ApiClient, store: &SessionStore) -> Result<()> {
  if let Some(session) = store.load()? {
    client.set_token(Some(session.token));
    if let Err(error) = client.logout().await {
      tracing::warn!(%error, "logout request failed");
    }
  }
  store.clear()?;
  println!("Logged out.");
  Ok(())
}

/// Read one line from stdin after printing `label`.
fn prompt(label: &str) -> Result<String> {
  print!("{label}");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line.trim_end_matches(['\n', '\r']).to_string())
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App<ApiClient>,
) -> Result<()> {
  loop {
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event
      && key.kind == KeyEventKind::Press
      && !app.handle_key(key).await?
    {
      break;
    }
  }

  Ok(())
}
