//! The logged-in user and their API token, persisted between runs.

use std::{
  fs,
  io,
  path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id:    u64,
  pub name:  String,
  pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
  pub token: String,
  pub user:  User,
}

/// A session file on disk. Written with owner-only permissions.
#[derive(Debug, Clone)]
pub struct SessionStore {
  path: PathBuf,
}

impl SessionStore {
  pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

  pub fn path(&self) -> &Path { &self.path }

  /// The stored session, or `None` when there is no session file.
  pub fn load(&self) -> Result<Option<Session>> {
    let raw = match fs::read_to_string(&self.path) {
      Ok(raw) => raw,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
      Err(e) => {
        return Err(e)
          .with_context(|| format!("reading session file {}", self.path.display()));
      }
    };
    let session = serde_json::from_str(&raw)
      .with_context(|| format!("parsing session file {}", self.path.display()))?;
    Ok(Some(session))
  }

  pub fn save(&self, session: &Session) -> Result<()> {
    if let Some(parent) = self.path.parent() {
      fs::create_dir_all(parent)
        .with_context(|| format!("creating {}", parent.display()))?;
    }
    let raw = serde_json::to_string_pretty(session)?;
    fs::write(&self.path, raw)
      .with_context(|| format!("writing session file {}", self.path.display()))?;
    restrict_permissions(&self.path)
  }

  /// Remove the session file. A missing file is not an error.
  pub fn clear(&self) -> Result<()> {
    match fs::remove_file(&self.path) {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
      Err(e) => Err(e)
        .with_context(|| format!("removing session file {}", self.path.display())),
    }
  }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
  use std::os::unix::fs::PermissionsExt;
  fs::set_permissions(path, fs::Permissions::from_mode(0o600))
    .with_context(|| format!("restricting permissions on {}", path.display()))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> { Ok(()) }
