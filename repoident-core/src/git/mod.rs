//! Git repository identity for Repoident
//!
//! This module provides remote URL normalization and local repository
//! resolution, both producing the same (endpoint, identifier) model.

mod remote_url;
mod repository;
mod resolver;

pub use remote_url::RemoteUrl;
pub use repository::GitRepository;
pub use resolver::ResolveOptions;
