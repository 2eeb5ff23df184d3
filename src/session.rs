//! Persisted session state.
//!
//! Stands in for the device's secure key/value storage: a small TOML file
//! holding the token, user id, role, and department written at login and
//! removed at logout. Every authenticated screen re-reads it at dispatch
//! time, so a logout (or a deleted file) takes effect on the next command.

use crate::model::Role;
use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The four values persisted across restarts until explicit logout.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub role: Role,
    #[serde(default)]
    pub department: Option<String>,
}

/// Single typed accessor for the session file. Screens never read ambient
/// storage directly; they go through a store handed to them at construction.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location under the user's home directory.
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("could not determine home directory")?;
        Ok(home.join(".tally").join("session.toml"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist a session, creating the parent directory if needed.
    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(session)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    /// Read the persisted session. `Ok(None)` means signed out; `Err` means
    /// the file exists but cannot be read or parsed, which callers treat as
    /// an invalid session (redirect to login), not a transient fault.
    pub fn load(&self) -> Result<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read session file {}", self.path.display()))?;
        let session: Session = toml::from_str(&content)
            .with_context(|| format!("corrupt session file {}", self.path.display()))?;
        Ok(Some(session))
    }

    /// Remove the session file. All four values go together; a failed
    /// delete still ends the session from the user's point of view, so the
    /// caller redirects to login regardless of the result.
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}
