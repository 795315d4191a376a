//! Repoident Core - canonical repository identity for build tooling
//!
//! This crate determines the remote-hosting identity of a git repository,
//! an (endpoint, identifier) pair such as ("github.com", "org/project"),
//! either from a remote URL string or by inspecting a local working
//! directory. It reads repository metadata files directly and never
//! invokes a git binary.

pub mod error;
pub mod git;
pub mod secrets;

pub use error::{Error, Result};
pub use git::{GitRepository, RemoteUrl, ResolveOptions};
