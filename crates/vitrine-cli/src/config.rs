//! Layered settings: command-line flags over `VITRINE_*` environment
//! variables over an optional TOML file over built-in defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

pub const DEFAULT_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_CURRENCY: &str = "BRL";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
  /// Base URL of the REST service, including any `/api` prefix.
  pub url:          String,
  pub email:        Option<String>,
  pub password:     Option<String>,
  /// ISO 4217 code used to display money.
  pub currency:     String,
  pub timeout_secs: u64,
  pub session_path: Option<PathBuf>,
  pub log_path:     Option<PathBuf>,
}

/// Values given on the command line; `None` defers to lower layers.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
  pub url:      Option<String>,
  pub email:    Option<String>,
  pub password: Option<String>,
  pub currency: Option<String>,
}

impl Settings {
  /// Load settings from `file` (or the default config path when `None`)
  /// and the process environment.
  pub fn load(file: Option<&Path>, overrides: &Overrides) -> Result<Self> {
    Self::load_from(file, Environment::with_prefix("VITRINE"), overrides)
  }

  fn load_from(
    file: Option<&Path>,
    environment: Environment,
    overrides: &Overrides,
  ) -> Result<Self> {
    let mut builder = Config::builder()
      .set_default("url", DEFAULT_URL)?
      .set_default("currency", DEFAULT_CURRENCY)?
      .set_default("timeout_secs", DEFAULT_TIMEOUT_SECS)?;

    // An explicit file must exist; the default one is optional.
    match file {
      Some(path) => {
        builder = builder.add_source(File::from(path).required(true));
      }
      None => {
        if let Some(path) = default_config_path() {
          builder = builder.add_source(File::from(path).required(false));
        }
      }
    }

    let settings = builder
      .add_source(environment.try_parsing(true))
      .set_override_option("url", overrides.url.clone())?
      .set_override_option("email", overrides.email.clone())?
      .set_override_option("password", overrides.password.clone())?
      .set_override_option("currency", overrides.currency.clone())?
      .build()
      .context("failed to read configuration")?;

    settings
      .try_deserialize()
      .context("failed to deserialise settings")
  }

  pub fn session_path(&self) -> Option<PathBuf> {
    self
      .session_path
      .as_deref()
      .map(expand_tilde)
      .or_else(|| state_dir().map(|dir| dir.join("session.json")))
  }

  pub fn log_path(&self) -> Option<PathBuf> {
    self
      .log_path
      .as_deref()
      .map(expand_tilde)
      .or_else(|| state_dir().map(|dir| dir.join("vitrine.log")))
  }
}

/// `$XDG_CONFIG_HOME/vitrine/config.toml`, falling back to `~/.config`.
pub fn default_config_path() -> Option<PathBuf> {
  xdg_dir("XDG_CONFIG_HOME", ".config").map(|d| d.join("vitrine").join("config.toml"))
}

/// `$XDG_STATE_HOME/vitrine`, falling back to `~/.local/state`.
pub fn state_dir() -> Option<PathBuf> {
  xdg_dir("XDG_STATE_HOME", ".local/state").map(|d| d.join("vitrine"))
}

fn xdg_dir(var: &str, fallback: &str) -> Option<PathBuf> {
  std::env::var_os(var)
    .filter(|v| !v.is_empty())
    .map(PathBuf::from)
    .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(fallback)))
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
