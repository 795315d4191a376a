//! Git repository identity value type

use std::fmt;
use std::path::{Path, PathBuf};

use super::remote_url::RemoteUrl;
use super::resolver::{self, ResolveOptions};
use crate::Result;

/// The canonical remote-hosting identity of a git repository
///
/// Instances are immutable and are created either from a remote URL string
/// or by resolving a local working directory. The local fields
/// (`local_directory`, `head`) are present only on the local path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitRepository {
    endpoint: String,
    identifier: String,
    local_directory: Option<PathBuf>,
    head: Option<String>,
    branch: Option<String>,
}

impl GitRepository {
    /// Construct a repository identity from a remote URL
    pub fn from_url(url: &str) -> Result<Self> {
        let remote = RemoteUrl::parse(url)?;

        Ok(Self {
            endpoint: remote.endpoint,
            identifier: remote.identifier,
            local_directory: None,
            head: None,
            branch: None,
        })
    }

    /// Construct a repository identity from a remote URL with an explicit branch
    pub fn from_url_with_branch(url: &str, branch: impl Into<String>) -> Result<Self> {
        Ok(Self {
            branch: Some(branch.into()),
            ..Self::from_url(url)?
        })
    }

    /// Resolve the repository containing the given local directory
    ///
    /// Walks upward to the repository root, follows linked-worktree
    /// indirection, reads HEAD and the configured remote URL from disk,
    /// and normalizes the remote URL into (endpoint, identifier).
    pub fn from_directory(path: impl AsRef<Path>, options: &ResolveOptions) -> Result<Self> {
        let found = resolver::discover(path.as_ref(), options)?;
        let remote = RemoteUrl::parse(&found.remote_url)?;

        Ok(Self {
            endpoint: remote.endpoint,
            identifier: remote.identifier,
            local_directory: Some(found.root),
            head: Some(found.head),
            // An explicit branch always wins over the checked-out one.
            branch: options.branch.clone().or(found.branch),
        })
    }

    /// Host portion of the remote address (e.g., "github.com")
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Path identifying the repository on its endpoint (e.g., "org/repo")
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Repository root directory, when resolved from a local directory
    pub fn local_directory(&self) -> Option<&Path> {
        self.local_directory.as_deref()
    }

    /// Raw first line of the HEAD file, when resolved from a local directory
    ///
    /// Either a symbolic-ref string or a commit hash (detached HEAD).
    pub fn head(&self) -> Option<&str> {
        self.head.as_deref()
    }

    /// Checked-out branch; absent for a detached HEAD or the from-URL path
    pub fn branch(&self) -> Option<&str> {
        self.branch.as_deref()
    }

    /// Return a copy of this identity with only the branch replaced
    pub fn with_branch(&self, branch: impl Into<String>) -> Self {
        Self {
            branch: Some(branch.into()),
            ..self.clone()
        }
    }

    /// HTTPS-style URL form
    pub fn https_url(&self) -> String {
        format!("https://{}/{}.git", self.endpoint, self.identifier)
    }

    /// SSH-style URL form
    pub fn ssh_url(&self) -> String {
        format!("git@{}:{}.git", self.endpoint, self.identifier)
    }
}

impl fmt::Display for GitRepository {
    /// The HTTPS form without its ".git" suffix
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let url = self.https_url();
        f.write_str(url.strip_suffix(".git").unwrap_or(&url))
    }
}
