//! Mercurial backend.
//!
//! Mercurial has no staging area, so two of the git-side concepts are
//! approximated rather than reproduced — deliberately, not as a bug:
//! - `conflicted` is always reported false: the dirstate does not expose
//!   index stages, and merge-state inspection is out of this backend's
//!   contract,
//! - line-ending flags are synthesized as `lf`/`lf` since `hg status`
//!   carries no eol information.
//!
//! The baseline is the parent-revision content (`hg cat`), the closest
//! analogue to git's index-side comparison point.

use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::core::vcs::{
    FileStatus, LineEndings, RepositoryHandle, VcsClient, VcsError, search_dir, split_baseline,
};
use crate::infra::process;

#[derive(Debug, Default)]
pub struct HgClient;

const VCS: &str = "hg";

impl VcsClient for HgClient {
    fn name(&self) -> &'static str {
        VCS
    }

    fn resolve_root(&self, path: &Path) -> Result<RepositoryHandle, VcsError> {
        let dir = search_dir(path);
        let out = process::run(VCS, &["root"], &dir)?;
        if !out.success {
            return Err(VcsError::NotInRepository { vcs: VCS, path: path.to_path_buf() });
        }
        let raw = out.stdout_lines().into_iter().next().ok_or(VcsError::ParseFailed {
            vcs: VCS,
            operation: "root",
            detail: "empty output".into(),
        })?;
        let root = PathBuf::from(raw);
        let root = dunce::canonicalize(&root).unwrap_or(root);
        debug!(root = %root.display(), "resolved mercurial repository root");
        Ok(RepositoryHandle::new(root))
    }

    fn classify(&self, repo: &RepositoryHandle, path: &Path) -> Result<FileStatus, VcsError> {
        let rel = repo.relativize(path);
        let relspec = rel.to_string_lossy().into_owned();
        // -A lists clean files too, so a tracked-but-unmodified path still
        // produces a status line.
        let out = process::run(VCS, &["status", "-A", "--", &relspec], repo.root())?;
        if !out.success {
            return Err(VcsError::CommandFailed {
                vcs: VCS,
                operation: "status",
                code: out.code,
                stderr: out.stderr_brief().to_string(),
            });
        }

        let Some(code) = out.stdout_lines().into_iter().find_map(|l| status_code(&l)) else {
            trace!(path = %rel.display(), "path unknown to mercurial");
            return Ok(FileStatus::untracked(rel));
        };

        if !is_tracked(code) {
            trace!(path = %rel.display(), %code, "path is untracked");
            return Ok(FileStatus::untracked(rel));
        }
        debug!(path = %rel.display(), %code, "classified tracked path");

        Ok(FileStatus {
            tracked: true,
            // Accepted approximation: no merge-state inspection.
            conflicted: false,
            relative_path: rel,
            object_id: None,
            mode: None,
            // Synthesized defaults; hg status carries no eol data.
            index_eol: Some(LineEndings::Lf),
            worktree_eol: Some(LineEndings::Lf),
        })
    }

    fn fetch_baseline(&self, repo: &RepositoryHandle, path: &Path) -> Result<Vec<String>, VcsError> {
        let rel = repo.relativize(path);
        let relspec = rel.to_string_lossy().into_owned();
        let out = process::run(VCS, &["cat", "--", &relspec], repo.root())?;
        if !out.success {
            return Err(VcsError::BaselineUnavailable {
                vcs: VCS,
                path: rel,
                detail: out.stderr_brief().to_string(),
            });
        }
        Ok(split_baseline(&out.stdout))
    }
}

/// Extract the one-letter status code from an `hg status` line.
fn status_code(line: &str) -> Option<char> {
    let mut chars = line.chars();
    let code = chars.next()?;
    // Status lines are "<code> <path>".
    matches!(chars.next(), Some(' ')).then_some(code)
}

/// Dirstate codes: M/C (modified/clean) are tracked with a baseline in the
/// parent revision; R/! (removed/missing) still have one. A (added) has no
/// parent-revision content, so it is classified untracked and gets the
/// whole-document format path, same as a brand-new file under git with
/// nothing staged. ? and I are unknown/ignored.
fn is_tracked(code: char) -> bool {
    matches!(code, 'M' | 'C' | 'R' | '!')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_line_parses() {
        assert_eq!(status_code("M src/lib.rs"), Some('M'));
        assert_eq!(status_code("? notes.txt"), Some('?'));
        assert_eq!(status_code(""), None);
        assert_eq!(status_code("Mnospace"), None);
    }

    #[test]
    fn tracked_codes() {
        assert!(is_tracked('M'));
        assert!(is_tracked('C'));
        assert!(!is_tracked('A'));
        assert!(!is_tracked('?'));
        assert!(!is_tracked('I'));
    }
}
