//! Secret injection for Repoident
//!
//! Build and release tooling that consumes a repository identity usually
//! also needs an access token for the hosting endpoint (tagging, changelog
//! uploads, CI metadata). Tokens are stored separately from any other
//! configuration; the secrets file lives at
//! `~/.config/repoident/secrets.toml` and must have restrictive permissions
//! (0600 on Unix).
//!
//! Loading priority:
//! 1. Environment variable (REPOIDENT_TOKEN)
//! 2. Secrets file (~/.config/repoident/secrets.toml)
//!
//! This module only ever reads; it never creates or modifies files.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result};

/// Secrets structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Secrets {
    /// Access tokens keyed by hosting endpoint (e.g., "github.com")
    pub tokens: HashMap<String, String>,
}

impl Secrets {
    /// Load secrets from the default location
    ///
    /// Returns default (empty) secrets if the file doesn't exist
    pub fn load() -> Result<Self> {
        let secrets_path = Self::default_secrets_path();

        if let Some(path) = secrets_path {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load secrets from a specific file with permission checking
    pub fn load_from_file(path: &Path) -> Result<Self> {
        // Check file permissions on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let metadata = std::fs::metadata(path).map_err(Error::Io)?;
            let mode = metadata.permissions().mode();

            // Check if file is readable by group or others (mode & 0o077)
            if mode & 0o077 != 0 {
                return Err(Error::Config(format!(
                    "Secrets file {} has insecure permissions {:o}. \
                     Please run: chmod 600 {}",
                    path.display(),
                    mode & 0o777,
                    path.display()
                )));
            }

            debug!(path = %path.display(), mode = format!("{:o}", mode & 0o777), "Secrets file permissions OK");
        }

        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        let mut secrets: Secrets = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse secrets: {}", e)))?;

        // Trim whitespace from tokens
        for token in secrets.tokens.values_mut() {
            *token = token.trim().to_string();
        }

        Ok(secrets)
    }

    /// Get the default secrets file path
    ///
    /// Returns `~/.config/repoident/secrets.toml` on Unix
    pub fn default_secrets_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("repoident").join("secrets.toml"))
    }

    /// Get the access token for an endpoint with environment variable override
    ///
    /// Priority: REPOIDENT_TOKEN env var > secrets file entry for the endpoint
    pub fn token_for(&self, endpoint: &str) -> Option<String> {
        // Check environment variable first
        if let Ok(token) = std::env::var("REPOIDENT_TOKEN") {
            let token = token.trim().to_string();
            if !token.is_empty() {
                debug!("Using token from REPOIDENT_TOKEN environment variable");
                return Some(token);
            }
        }

        // Fall back to secrets file
        if let Some(token) = self.tokens.get(endpoint) {
            if !token.is_empty() {
                debug!(endpoint = endpoint, "Using token from secrets file");
                return Some(token.clone());
            }
        }

        None
    }
}
