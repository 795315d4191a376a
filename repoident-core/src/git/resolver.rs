//! Local repository resolution
//!
//! Walks the filesystem to find a repository root, follows linked-worktree
//! indirection, and reads HEAD and the remote configuration directly from
//! disk. No git binary is invoked and nothing is ever written.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{Error, Result};

/// Name of the remote used when none is requested explicitly
const DEFAULT_REMOTE: &str = "origin";

/// Options for resolving a repository from a local directory
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Remote whose URL determines the hosting identity (defaults to "origin")
    pub remote: Option<String>,
    /// Explicit branch override; always wins over the checked-out branch
    pub branch: Option<String>,
}

/// Raw on-disk state gathered during resolution
#[derive(Debug, Clone)]
pub(crate) struct Discovered {
    /// Repository root (the directory containing the `.git` entry)
    pub root: PathBuf,
    /// First line of the HEAD file, verbatim
    pub head: String,
    /// Branch name, if HEAD is a branch reference
    pub branch: Option<String>,
    /// URL configured for the requested remote
    pub remote_url: String,
}

/// Git metadata locations for a checkout
///
/// For a primary checkout both paths are the `.git` directory itself. For a
/// linked worktree the worktree-local directory holds this checkout's HEAD
/// while the shared (common) directory holds the remote configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
struct GitDirs {
    common: PathBuf,
    worktree: PathBuf,
}

/// Resolve the repository containing `start`
pub(crate) fn discover(start: &Path, options: &ResolveOptions) -> Result<Discovered> {
    let start = fs::canonicalize(start)?;
    let root = find_root(&start)?;
    debug!(root = %root.display(), "found repository root");

    let dirs = locate_git_dirs(&root)?;
    let (head, branch) = read_head(&dirs.worktree)?;

    let remote = options.remote.as_deref().unwrap_or(DEFAULT_REMOTE);
    let remote_url = read_remote_url(&dirs.common.join("config"), remote)?;
    debug!(remote = remote, url = %remote_url, "resolved remote url");

    Ok(Discovered {
        root,
        head,
        branch,
        remote_url,
    })
}

/// Walk upward from `start` until a directory containing a `.git` entry
/// (file or directory) is found
fn find_root(start: &Path) -> Result<PathBuf> {
    for dir in start.ancestors() {
        if dir.join(".git").exists() {
            return Ok(dir.to_path_buf());
        }
    }

    Err(Error::NotFound(format!(
        "No git repository found in {} or any parent directory",
        start.display()
    )))
}

/// Locate the shared and worktree-local git metadata directories for `root`
fn locate_git_dirs(root: &Path) -> Result<GitDirs> {
    let dot_git = root.join(".git");

    // Primary checkout: HEAD and remote configuration share one directory.
    if dot_git.is_dir() {
        return Ok(GitDirs {
            common: dot_git.clone(),
            worktree: dot_git,
        });
    }

    // Linked worktree: `.git` is a file holding a single "gitdir: <path>"
    // line pointing at this worktree's metadata directory.
    let contents = fs::read_to_string(&dot_git)?;
    let pointer = contents
        .lines()
        .next()
        .and_then(|line| line.strip_prefix("gitdir:"))
        .map(str::trim)
        .ok_or_else(|| {
            Error::NotFound(format!(
                "Malformed worktree pointer in {}",
                dot_git.display()
            ))
        })?;

    let worktree = if Path::new(pointer).is_absolute() {
        PathBuf::from(pointer)
    } else {
        root.join(pointer)
    };

    // Worktree metadata lives at <shared>/worktrees/<name>, so the shared
    // directory is two levels up.
    let common = worktree
        .parent()
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .ok_or_else(|| {
            Error::NotFound(format!(
                "Cannot locate shared git directory from {}",
                worktree.display()
            ))
        })?;
    debug!(worktree = %worktree.display(), common = %common.display(), "resolved linked worktree");

    Ok(GitDirs { common, worktree })
}

/// Read the first line of HEAD in the worktree-local metadata directory
///
/// Returns the raw line plus the branch name when the line is a
/// `ref: refs/heads/<name>` reference; a detached HEAD yields no branch.
fn read_head(worktree_dir: &Path) -> Result<(String, Option<String>)> {
    let head_path = worktree_dir.join("HEAD");
    let contents = fs::read_to_string(&head_path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            Error::NotFound(format!("No HEAD file at {}", head_path.display()))
        } else {
            Error::Io(e)
        }
    })?;

    let head = contents.lines().next().unwrap_or("").trim().to_string();
    let branch = head.strip_prefix("ref: refs/heads/").map(str::to_string);

    Ok((head, branch))
}

/// Scan the repository configuration for the URL of the requested remote
///
/// The scan is a minimal linear pass over trimmed lines: skip until the
/// `[remote "<name>"]` header, collect until the next section header, and
/// require exactly one `url =` line within the collected block.
fn read_remote_url(config_path: &Path, remote: &str) -> Result<String> {
    let contents = fs::read_to_string(config_path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            Error::NotFound(format!("No git config at {}", config_path.display()))
        } else {
            Error::Io(e)
        }
    })?;

    let header = format!("[remote \"{}\"]", remote);
    let mut lines = contents.lines().map(str::trim).skip_while(|l| *l != header);

    if lines.next().is_none() {
        return Err(Error::NotFound(format!(
            "Remote '{}' is not configured in {}",
            remote,
            config_path.display()
        )));
    }

    let urls: Vec<&str> = lines
        .take_while(|l| !l.starts_with('['))
        .filter(|l| l.starts_with("url ="))
        .filter_map(|l| l.split_once('=').map(|(_, value)| value.trim()))
        .collect();

    match urls.as_slice() {
        [] => Err(Error::NotFound(format!(
            "Remote '{}' has no url entry in {}",
            remote,
            config_path.display()
        ))),
        [url] => Ok((*url).to_string()),
        _ => Err(Error::AmbiguousConfig {
            remote: remote.to_string(),
            path: config_path.to_path_buf(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(git_dir: &Path, remote: &str, url: &str) {
        let config = format!(
            "[core]\n\trepositoryformatversion = 0\n\tbare = false\n\
             [remote \"{}\"]\n\turl = {}\n\tfetch = +refs/heads/*:refs/remotes/{}/*\n",
            remote, url, remote
        );
        fs::write(git_dir.join("config"), config).unwrap();
    }

    fn init_primary(root: &Path, branch: &str, url: &str) {
        let git_dir = root.join(".git");
        fs::create_dir_all(&git_dir).unwrap();
        fs::write(git_dir.join("HEAD"), format!("ref: refs/heads/{}\n", branch)).unwrap();
        write_config(&git_dir, "origin", url);
    }

    #[test]
    fn test_discover_primary_checkout() {
        let tmp = TempDir::new().unwrap();
        init_primary(tmp.path(), "main", "git@github.com:org/repo.git");

        let found = discover(tmp.path(), &ResolveOptions::default()).unwrap();
        assert_eq!(found.remote_url, "git@github.com:org/repo.git");
        assert_eq!(found.branch.as_deref(), Some("main"));
        assert_eq!(found.head, "ref: refs/heads/main");
    }

    #[test]
    fn test_discover_from_nested_directory() {
        let tmp = TempDir::new().unwrap();
        init_primary(tmp.path(), "main", "https://github.com/org/repo.git");
        let nested = tmp.path().join("src").join("deeply").join("nested");
        fs::create_dir_all(&nested).unwrap();

        let found = discover(&nested, &ResolveOptions::default()).unwrap();
        assert_eq!(found.root, fs::canonicalize(tmp.path()).unwrap());
    }

    #[test]
    fn test_discover_detached_head() {
        let tmp = TempDir::new().unwrap();
        init_primary(tmp.path(), "main", "https://github.com/org/repo.git");
        fs::write(
            tmp.path().join(".git").join("HEAD"),
            "0123456789abcdef0123456789abcdef01234567\n",
        )
        .unwrap();

        let found = discover(tmp.path(), &ResolveOptions::default()).unwrap();
        assert_eq!(found.head, "0123456789abcdef0123456789abcdef01234567");
        assert!(found.branch.is_none());
    }

    #[test]
    fn test_discover_linked_worktree() {
        let tmp = TempDir::new().unwrap();
        let primary = tmp.path().join("primary");
        init_primary(&primary, "main", "git@github.com:org/repo.git");

        // Worktree metadata lives under <shared>/worktrees/<name>.
        let wt_meta = primary.join(".git").join("worktrees").join("feature");
        fs::create_dir_all(&wt_meta).unwrap();
        fs::write(wt_meta.join("HEAD"), "ref: refs/heads/feature/foo\n").unwrap();

        let linked = tmp.path().join("linked");
        fs::create_dir_all(&linked).unwrap();
        fs::write(
            linked.join(".git"),
            format!("gitdir: {}\n", wt_meta.display()),
        )
        .unwrap();

        let found = discover(&linked, &ResolveOptions::default()).unwrap();
        assert_eq!(found.remote_url, "git@github.com:org/repo.git");
        assert_eq!(found.branch.as_deref(), Some("feature/foo"));
        assert_eq!(found.root, fs::canonicalize(&linked).unwrap());
    }

    #[test]
    fn test_missing_repository() {
        let tmp = TempDir::new().unwrap();
        let result = discover(tmp.path(), &ResolveOptions::default());
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_missing_head_file() {
        let tmp = TempDir::new().unwrap();
        let git_dir = tmp.path().join(".git");
        fs::create_dir_all(&git_dir).unwrap();
        write_config(&git_dir, "origin", "https://github.com/org/repo.git");

        let result = discover(tmp.path(), &ResolveOptions::default());
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_missing_remote_section() {
        let tmp = TempDir::new().unwrap();
        init_primary(tmp.path(), "main", "https://github.com/org/repo.git");

        let options = ResolveOptions {
            remote: Some("upstream".to_string()),
            ..Default::default()
        };
        let result = discover(tmp.path(), &options);
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_non_default_remote() {
        let tmp = TempDir::new().unwrap();
        let git_dir = tmp.path().join(".git");
        fs::create_dir_all(&git_dir).unwrap();
        fs::write(git_dir.join("HEAD"), "ref: refs/heads/main\n").unwrap();
        let config = "[remote \"origin\"]\n\turl = git@github.com:org/fork.git\n\
                      [remote \"upstream\"]\n\turl = git@github.com:org/repo.git\n";
        fs::write(git_dir.join("config"), config).unwrap();

        let options = ResolveOptions {
            remote: Some("upstream".to_string()),
            ..Default::default()
        };
        let found = discover(tmp.path(), &options).unwrap();
        assert_eq!(found.remote_url, "git@github.com:org/repo.git");
    }

    #[test]
    fn test_ambiguous_remote_config() {
        let tmp = TempDir::new().unwrap();
        let git_dir = tmp.path().join(".git");
        fs::create_dir_all(&git_dir).unwrap();
        fs::write(git_dir.join("HEAD"), "ref: refs/heads/main\n").unwrap();
        let config = "[remote \"origin\"]\n\
                      \turl = git@github.com:org/repo.git\n\
                      \turl = git@github.com:org/other.git\n";
        fs::write(git_dir.join("config"), config).unwrap();

        let result = discover(tmp.path(), &ResolveOptions::default());
        assert!(matches!(result, Err(Error::AmbiguousConfig { .. })));
    }

    #[test]
    fn test_missing_url_entry() {
        let tmp = TempDir::new().unwrap();
        let git_dir = tmp.path().join(".git");
        fs::create_dir_all(&git_dir).unwrap();
        fs::write(git_dir.join("HEAD"), "ref: refs/heads/main\n").unwrap();
        let config = "[remote \"origin\"]\n\tfetch = +refs/heads/*:refs/remotes/origin/*\n";
        fs::write(git_dir.join("config"), config).unwrap();

        let result = discover(tmp.path(), &ResolveOptions::default());
        assert!(matches!(result, Err(Error::NotFound(_))));
    }
}
