//! Version-control abstraction: repository roots, tracking status, and
//! baseline content.
//!
//! One `VcsClient` implementation per backend, selected through `VcsKind`.
//! Every query runs fresh per reformat invocation; nothing here is cached,
//! so status can never go stale across edits.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Git backend with index-stage conflict detection and per-side eol flags.
pub mod git;
/// Mercurial backend (no staging area; approximations documented in-module).
pub mod hg;

pub use git::GitClient;
pub use hg::HgClient;

/// Backend selector, as it appears in config files and on the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VcsKind {
    Git,
    #[serde(alias = "mercurial")]
    Hg,
}

impl VcsKind {
    /// Instantiate the backend this selector names.
    pub fn client(self) -> Box<dyn VcsClient> {
        match self {
            VcsKind::Git => Box::new(GitClient::default()),
            VcsKind::Hg => Box::new(HgClient::default()),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VcsKind::Git => "git",
            VcsKind::Hg => "hg",
        }
    }
}

impl std::str::FromStr for VcsKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "git" => Ok(VcsKind::Git),
            "hg" | "mercurial" => Ok(VcsKind::Hg),
            other => Err(format!("unknown vcs backend `{other}` (expected git or hg)")),
        }
    }
}

/// One version-control working copy, pinned for a single invocation.
///
/// All relative-path computations for the invocation go through this root;
/// it is established once and never changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryHandle {
    root: PathBuf,
}

impl RepositoryHandle {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Strip the root prefix from an absolute path under this repository.
    ///
    /// Precondition: `path` lies under the root. A path outside it is a
    /// programming error in the caller, not a recoverable condition.
    pub fn relativize(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.root)
            .unwrap_or_else(|_| {
                panic!(
                    "path {} is not under repository root {}",
                    path.display(),
                    self.root.display()
                )
            })
            .to_path_buf()
    }
}

/// Line-ending classification for one side of the index/worktree split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEndings {
    Lf,
    CrLf,
    Mixed,
    /// No line terminators present.
    None,
    /// Content treated as binary; eol flags are meaningless.
    Binary,
}

impl LineEndings {
    /// Parse a git `--eol` flag value such as `lf`, `crlf`, `mixed`,
    /// `none`, or `-text`.
    pub fn from_flag(flag: &str) -> Option<Self> {
        match flag {
            "lf" => Some(Self::Lf),
            "crlf" => Some(Self::CrLf),
            "mixed" => Some(Self::Mixed),
            "none" => Some(Self::None),
            "-text" => Some(Self::Binary),
            _ => None,
        }
    }
}

/// Classification of one path within a repository, produced fresh per
/// invocation and never mutated.
///
/// `conflicted` implies `tracked`; for an untracked path only
/// `relative_path` is meaningful.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileStatus {
    pub tracked: bool,
    pub conflicted: bool,
    pub relative_path: PathBuf,
    /// Content id of the index entry, when the backend has one.
    pub object_id: Option<String>,
    /// Octal mode bits of the index entry, when the backend has them.
    pub mode: Option<u32>,
    /// Line endings recorded on the index side.
    pub index_eol: Option<LineEndings>,
    /// Line endings observed in the working copy.
    pub worktree_eol: Option<LineEndings>,
}

impl FileStatus {
    /// Status for a path the backend does not know about.
    pub fn untracked(relative_path: PathBuf) -> Self {
        Self {
            tracked: false,
            conflicted: false,
            relative_path,
            object_id: None,
            mode: None,
            index_eol: None,
            worktree_eol: None,
        }
    }
}

/// Backend-level failures.
#[derive(Debug, Error)]
pub enum VcsError {
    #[error("{vcs}: {path} is not inside a repository")]
    NotInRepository { vcs: &'static str, path: PathBuf },

    #[error("{vcs}: baseline unavailable for {path}: {detail}")]
    BaselineUnavailable { vcs: &'static str, path: PathBuf, detail: String },

    #[error("{vcs} `{operation}` failed (exit {code:?}): {stderr}")]
    CommandFailed { vcs: &'static str, operation: &'static str, code: Option<i32>, stderr: String },

    #[error("{vcs}: could not parse `{operation}` output: {detail}")]
    ParseFailed { vcs: &'static str, operation: &'static str, detail: String },

    #[error(transparent)]
    Spawn(#[from] anyhow::Error),
}

/// Capability set every backend implements.
///
/// `resolve_root` tolerates file paths (it searches from the containing
/// directory). `classify` and `fetch_baseline` take paths that must lie
/// under the handle's root.
pub trait VcsClient {
    fn name(&self) -> &'static str;

    /// Find the working-copy root containing `path`.
    fn resolve_root(&self, path: &Path) -> Result<RepositoryHandle, VcsError>;

    /// Determine tracked/conflicted status and baseline metadata.
    fn classify(&self, repo: &RepositoryHandle, path: &Path) -> Result<FileStatus, VcsError>;

    /// Retrieve the comparison-point content of `path`, split into lines.
    fn fetch_baseline(&self, repo: &RepositoryHandle, path: &Path) -> Result<Vec<String>, VcsError>;
}

/// Directory to start a root search from: the path itself if it is a
/// directory, otherwise its parent.
pub(crate) fn search_dir(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.to_path_buf()
    } else {
        path.parent().map_or_else(|| PathBuf::from("."), Path::to_path_buf)
    }
}

/// Split raw baseline bytes into separator-free lines.
///
/// Mirrors the document-buffer convention: a trailing newline yields a
/// final empty line, so joining with the document's separator reproduces
/// the original byte length. Trailing CRs are stripped per line.
pub(crate) fn split_baseline(text: &str) -> Vec<String> {
    text.split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relativize_strips_root_prefix() {
        let repo = RepositoryHandle::new(PathBuf::from("/repo"));
        assert_eq!(
            repo.relativize(Path::new("/repo/src/main.rs")),
            PathBuf::from("src/main.rs")
        );
    }

    #[test]
    #[should_panic(expected = "not under repository root")]
    fn relativize_panics_outside_root() {
        let repo = RepositoryHandle::new(PathBuf::from("/repo"));
        repo.relativize(Path::new("/elsewhere/file.rs"));
    }

    #[test]
    fn split_baseline_keeps_trailing_empty_line() {
        assert_eq!(split_baseline("a\nb\n"), vec!["a", "b", ""]);
        assert_eq!(split_baseline("a\r\nb"), vec!["a", "b"]);
    }

    #[test]
    fn vcs_kind_parses_aliases() {
        assert_eq!("git".parse::<VcsKind>().unwrap(), VcsKind::Git);
        assert_eq!("mercurial".parse::<VcsKind>().unwrap(), VcsKind::Hg);
        assert!("svn".parse::<VcsKind>().is_err());
    }

    #[test]
    fn eol_flags_parse() {
        assert_eq!(LineEndings::from_flag("lf"), Some(LineEndings::Lf));
        assert_eq!(LineEndings::from_flag("-text"), Some(LineEndings::Binary));
        assert_eq!(LineEndings::from_flag("bogus"), None);
    }
}
