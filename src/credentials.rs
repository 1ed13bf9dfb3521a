//! File-backed session provider used by the CLI.
//!
//! The token comes from `PLANBOARD_TOKEN` when set, otherwise from
//! `credentials.json` in the client home, written by `planboard login`.
//! Signing out removes the file and points the user back at the login page.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::gateway::{Session, SessionProvider};

pub const TOKEN_ENV_VAR: &str = "PLANBOARD_TOKEN";

#[derive(Debug, Serialize, Deserialize)]
struct StoredCredentials {
    access_token: String,
    #[serde(default)]
    subject: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CredentialFileProvider {
    path: PathBuf,
    login_url: String,
    open_browser: bool,
}

impl CredentialFileProvider {
    pub fn new(path: impl Into<PathBuf>, login_url: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            login_url: login_url.into(),
            open_browser: false,
        }
    }

    pub fn with_open_browser(mut self, open_browser: bool) -> Self {
        self.open_browser = open_browser;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn login_url(&self) -> &str {
        &self.login_url
    }

    /// Persist `session` for later invocations.
    pub fn store(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let stored = StoredCredentials {
            access_token: session.access_token.clone(),
            subject: session.subject.clone(),
        };
        let content =
            serde_json::to_string_pretty(&stored).context("Failed to serialize credentials")?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write credentials: {}", self.path.display()))?;
        restrict_permissions(&self.path)?;
        Ok(())
    }

    fn read(&self) -> Result<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read credentials: {}", self.path.display()))?;
        let stored: StoredCredentials = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse credentials: {}", self.path.display()))?;
        Ok(Some(Session {
            access_token: stored.access_token,
            subject: stored.subject,
        }))
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .with_context(|| format!("Failed to set permissions on {}", path.display()))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

#[async_trait]
impl SessionProvider for CredentialFileProvider {
    async fn current_session(&self) -> Result<Option<Session>> {
        if let Ok(token) = std::env::var(TOKEN_ENV_VAR)
            && !token.trim().is_empty()
        {
            debug!("Using session from {}", TOKEN_ENV_VAR);
            return Ok(Some(Session::new(token.trim())));
        }
        self.read()
    }

    async fn sign_out(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Removed stored credentials"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to remove credentials: {}", self.path.display())
                });
            }
        }

        info!(login_url = %self.login_url, "Signed out");
        eprintln!("Signed out. Log in again at {}", self.login_url);
        if self.open_browser
            && let Err(e) = open::that(&self.login_url)
        {
            warn!(error = %e, "Failed to open login page");
        }
        Ok(())
    }
}
