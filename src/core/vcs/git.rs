//! Git backend: subprocess-driven, literal-pathspec-safe.
//!
//! Three plumbing calls cover the whole capability set:
//! - `git rev-parse --show-toplevel` for root resolution,
//! - `git ls-files -s --eol -z` for tracking status, index stages, and
//!   per-side line-ending flags,
//! - `git show :0:<path>` for the index-side baseline.
//!
//! All invocations run with the working directory pinned to the repository
//! root (or the search directory for root resolution) and pass
//! `--literal-pathspecs` plus a `--` sentinel so a path that looks like a
//! flag or glob is never misinterpreted.

use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::core::vcs::{
    FileStatus, LineEndings, RepositoryHandle, VcsClient, VcsError, search_dir, split_baseline,
};
use crate::infra::process;

#[derive(Debug, Default)]
pub struct GitClient;

const VCS: &str = "git";

impl VcsClient for GitClient {
    fn name(&self) -> &'static str {
        VCS
    }

    fn resolve_root(&self, path: &Path) -> Result<RepositoryHandle, VcsError> {
        let dir = search_dir(path);
        let out = process::run(VCS, &["rev-parse", "--show-toplevel"], &dir)?;
        if !out.success {
            // rev-parse failing here means "not a repository", which the
            // caller treats as recoverable.
            return Err(VcsError::NotInRepository { vcs: VCS, path: path.to_path_buf() });
        }
        let raw = out.stdout_lines().into_iter().next().ok_or(VcsError::ParseFailed {
            vcs: VCS,
            operation: "rev-parse --show-toplevel",
            detail: "empty output".into(),
        })?;
        let root = PathBuf::from(raw);
        let root = dunce::canonicalize(&root).unwrap_or(root);
        debug!(root = %root.display(), "resolved git repository root");
        Ok(RepositoryHandle::new(root))
    }

    fn classify(&self, repo: &RepositoryHandle, path: &Path) -> Result<FileStatus, VcsError> {
        let rel = repo.relativize(path);
        let relspec = pathspec(&rel);
        let out = process::run(
            VCS,
            &[
                "--literal-pathspecs",
                "-c",
                "core.quotepath=off",
                "ls-files",
                "--full-name",
                "-s",
                "--eol",
                "-z",
                "--",
                &relspec,
            ],
            repo.root(),
        )?;
        if !out.success {
            return Err(VcsError::CommandFailed {
                vcs: VCS,
                operation: "ls-files",
                code: out.code,
                stderr: out.stderr_brief().to_string(),
            });
        }

        let entries: Vec<IndexEntry> = out
            .stdout
            .split('\0')
            .filter(|e| !e.is_empty())
            .map(parse_index_entry)
            .collect::<Result<_, _>>()?;

        if entries.is_empty() {
            trace!(path = %rel.display(), "path is untracked");
            return Ok(FileStatus::untracked(rel));
        }

        // During an unresolved merge the index holds stage-1..3 entries
        // instead of a single stage-0 entry; stage 1 alone is just the
        // merge base.
        let conflicted = entries.iter().any(|e| e.stage > 1);
        let primary = entries.iter().find(|e| e.stage == 0).unwrap_or(&entries[0]);
        debug!(path = %rel.display(), conflicted, entries = entries.len(), "classified tracked path");

        Ok(FileStatus {
            tracked: true,
            conflicted,
            relative_path: rel,
            object_id: Some(primary.object_id.clone()),
            mode: Some(primary.mode),
            index_eol: primary.index_eol,
            worktree_eol: primary.worktree_eol,
        })
    }

    fn fetch_baseline(&self, repo: &RepositoryHandle, path: &Path) -> Result<Vec<String>, VcsError> {
        let rel = repo.relativize(path);
        // The `:0:<path>` spec names the stage-0 index entry; forward
        // slashes keep the rev syntax valid on every platform.
        let spec = format!(":0:{}", pathspec(&rel));
        let out = process::run(VCS, &["--literal-pathspecs", "show", &spec], repo.root())?;
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

/// Repository-relative path rendered with forward slashes.
fn pathspec(rel: &Path) -> String {
    rel.to_string_lossy().replace('\\', "/")
}

/// One parsed `ls-files -s --eol` entry.
#[derive(Debug, PartialEq, Eq)]
struct IndexEntry {
    mode: u32,
    object_id: String,
    stage: u32,
    index_eol: Option<LineEndings>,
    worktree_eol: Option<LineEndings>,
    path: String,
}

/// Parse one NUL-terminated `ls-files -s --eol` record.
///
/// Layout is tab-separated: `<mode> <oid> <stage>`, an optional
/// `i/<eol> w/<eol> attr/<attrs>` block, then the path. Field widths in
/// the eol block are padded, so tokens are split on whitespace.
fn parse_index_entry(entry: &str) -> Result<IndexEntry, VcsError> {
    let parse_err = |detail: String| VcsError::ParseFailed {
        vcs: VCS,
        operation: "ls-files",
        detail,
    };

    let fields: Vec<&str> = entry.split('\t').collect();
    if fields.len() < 2 {
        return Err(parse_err(format!("expected tab-separated fields in {entry:?}")));
    }

    let mut head = fields[0].split_whitespace();
    let mode = head
        .next()
        .and_then(|m| u32::from_str_radix(m, 8).ok())
        .ok_or_else(|| parse_err(format!("bad mode in {entry:?}")))?;
    let object_id = head
        .next()
        .ok_or_else(|| parse_err(format!("missing object id in {entry:?}")))?
        .to_string();
    let stage = head
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| parse_err(format!("bad stage in {entry:?}")))?;

    let (mut index_eol, mut worktree_eol) = (None, None);
    if fields.len() > 2 {
        for token in fields[1].split_whitespace() {
            if let Some(flag) = token.strip_prefix("i/") {
                index_eol = LineEndings::from_flag(flag);
            } else if let Some(flag) = token.strip_prefix("w/") {
                worktree_eol = LineEndings::from_flag(flag);
            }
        }
    }

    let path = fields
        .last()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| parse_err(format!("missing path in {entry:?}")))?
        .to_string();

    Ok(IndexEntry { mode, object_id, stage, index_eol, worktree_eol, path })
}

#[cfg(test)]
mod tests {
    use super::*;

    const OID: &str = "e69de29bb2d1d6434b8b29ae775ad8c2e48c5391";

    #[test]
    fn parses_entry_with_eol_block() {
        let entry = format!("100644 {OID} 0\ti/lf    w/crlf   attr/                 \tsrc/main.rs");
        let parsed = parse_index_entry(&entry).unwrap();
        assert_eq!(parsed.mode, 0o100644);
        assert_eq!(parsed.object_id, OID);
        assert_eq!(parsed.stage, 0);
        assert_eq!(parsed.index_eol, Some(LineEndings::Lf));
        assert_eq!(parsed.worktree_eol, Some(LineEndings::CrLf));
        assert_eq!(parsed.path, "src/main.rs");
    }

    #[test]
    fn parses_entry_without_eol_block() {
        let entry = format!("100755 {OID} 2\tscripts/run.sh");
        let parsed = parse_index_entry(&entry).unwrap();
        assert_eq!(parsed.mode, 0o100755);
        assert_eq!(parsed.stage, 2);
        assert_eq!(parsed.index_eol, None);
        assert_eq!(parsed.path, "scripts/run.sh");
    }

    #[test]
    fn stage_above_zero_marks_conflict() {
        // Simulates the three-stage layout of an unresolved merge.
        let stages: Vec<IndexEntry> = [1u32, 2, 3]
            .iter()
            .map(|s| parse_index_entry(&format!("100644 {OID} {s}\tlib.rs")).unwrap())
            .collect();
        assert!(stages.iter().all(|e| e.stage > 0));
    }

    #[test]
    fn rejects_garbage_entry() {
        assert!(parse_index_entry("not an index entry").is_err());
        assert!(parse_index_entry("zzz aaa 0\tfile").is_err());
    }

    #[test]
    fn pathspec_uses_forward_slashes() {
        assert_eq!(pathspec(Path::new("a/b.rs")), "a/b.rs");
    }
}
