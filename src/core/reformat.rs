//! The hunk-computation-and-reapplication loop.
//!
//! One invocation formats only the changed regions of a single document:
//! resolve the repository root, classify the path, fetch the baseline once,
//! then diff / dispatch-per-hunk / re-diff until a pass completes without
//! perturbing line numbering. Untracked files get one whole-document
//! format; conflicted files are left strictly alone.

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::cli::{AppContext, FmtArgs};
use crate::core::attach::AttachmentRegistry;
use crate::core::diff::{DiffEngine, SimilarDiffEngine};
use crate::core::document::{DocumentBuffer, TextDocument};
use crate::core::format::{CommandFormatter, RangeFormatter};
use crate::core::hunk::FormatRange;
use crate::core::vcs::{VcsClient, VcsError, VcsKind};
use crate::infra::config::load_config;

/// Immutable per-invocation configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, serde::Deserialize)]
pub struct SessionConfig {
    /// Which version-control backend supplies status and baseline.
    pub vcs: VcsKind,
    /// Shrink dispatch ranges past fully-blank boundary lines, skipping
    /// hunks that are blank throughout.
    pub trim_blank_lines: bool,
    /// Whether save events should trigger the loop (consumed by hosts that
    /// wire attachments to their save hooks; the loop itself ignores it).
    pub format_on_save: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { vcs: VcsKind::Git, trim_blank_lines: false, format_on_save: false }
    }
}

/// Why a reformat invocation could not run to completion.
///
/// Conflicted files are not an error: the invocation succeeds with
/// [`ReformatOutcome::SkippedConflicted`] and zero dispatches.
#[derive(Debug, Error)]
pub enum ReformatError {
    /// Root resolution failed. Non-fatal to the host: warn and move on,
    /// the document is untouched.
    #[error("document is not inside a repository")]
    NotInRepository(#[source] VcsError),

    /// The formatting backend cannot do what the loop needs. Detected
    /// before any work begins.
    #[error("formatting backend lacks required capability: {capability}")]
    UnsupportedCapability { capability: &'static str },

    /// Baseline fetch failed for a tracked file. Surfaced loudly rather
    /// than skipped, since silence could mask a real VCS problem.
    #[error("could not fetch comparison baseline")]
    BaselineUnavailable(#[source] VcsError),

    /// Status/root queries failed for an unexpected reason.
    #[error("version control query failed")]
    Vcs(#[source] VcsError),

    /// The formatting capability itself failed; never caught or retried.
    #[error("formatting dispatch failed")]
    Dispatch(#[source] anyhow::Error),
}

/// What one invocation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ReformatOutcome {
    /// Tracked file: `passes` diff passes, `dispatches` range formats.
    Formatted { passes: u32, dispatches: u32 },
    /// Untracked file: exactly one whole-document format.
    FormattedWhole,
    /// Unresolved merge conflict: deliberate no-op.
    SkippedConflicted,
}

/// Format the modified regions of `doc` (the core operation).
///
/// `path` locates the document for the VCS; `doc` supplies live content
/// and receives mutations only through `formatter`. Hunks are processed in
/// ascending position order; a dispatch that changes the buffer's line
/// count invalidates every later hunk and restarts the diff from scratch
/// against the same baseline. A dispatch that preserves line count cannot
/// shift later hunks, so the pass continues.
pub fn format_modifications(
    doc: &mut dyn DocumentBuffer,
    path: &Path,
    formatter: &mut dyn RangeFormatter,
    diff: &dyn DiffEngine,
    vcs: &dyn VcsClient,
    config: &SessionConfig,
) -> Result<ReformatOutcome, ReformatError> {
    if !formatter.supports_range() {
        return Err(ReformatError::UnsupportedCapability { capability: "range formatting" });
    }

    let repo = vcs.resolve_root(path).map_err(|e| match e {
        VcsError::NotInRepository { .. } => ReformatError::NotInRepository(e),
        other => ReformatError::Vcs(other),
    })?;

    let status = vcs.classify(&repo, path).map_err(ReformatError::Vcs)?;

    if !status.tracked {
        // A brand-new file has no meaningful baseline; formatting all of
        // it is both correct and the cheapest path.
        debug!(path = %status.relative_path.display(), "untracked: whole-document format");
        formatter.format(doc, None).map_err(ReformatError::Dispatch)?;
        return Ok(ReformatOutcome::FormattedWhole);
    }

    if status.conflicted {
        // Conflict markers make diff-based hunking meaningless; do not
        // guess, do not touch the file.
        warn!(path = %status.relative_path.display(), "unresolved merge conflict, skipping");
        return Ok(ReformatOutcome::SkippedConflicted);
    }

    let baseline = vcs
        .fetch_baseline(&repo, path)
        .map_err(ReformatError::BaselineUnavailable)?;

    let mut passes: u32 = 0;
    let mut dispatches: u32 = 0;

    loop {
        passes += 1;
        let current = doc.lines();
        let pass_line_count = current.len();
        let hunks = diff.diff(&baseline, &current);
        trace!(pass = passes, hunks = hunks.len(), "diff pass");

        let mut perturbed = false;
        for hunk in &hunks {
            if hunk.is_pure_deletion() {
                continue;
            }
            let Some(range) = FormatRange::from_hunk(hunk, &current) else {
                continue;
            };
            let range = if config.trim_blank_lines {
                match range.trim_blank_boundaries(&current) {
                    Some(r) => r,
                    // Entirely blank hunk: nothing worth dispatching.
                    None => continue,
                }
            } else {
                range
            };

            trace!(start = range.start_line, end = range.end_line, "dispatching range");
            formatter.format(doc, Some(range)).map_err(ReformatError::Dispatch)?;
            dispatches += 1;

            // Re-validate immediately: a line-count change shifts the
            // coordinates of every remaining hunk in this pass.
            if doc.line_count() as usize != pass_line_count {
                debug!(pass = passes, "line count changed, remaining hunks are stale");
                perturbed = true;
                break;
            }
        }

        if !perturbed {
            debug!(passes, dispatches, "clean pass, loop complete");
            return Ok(ReformatOutcome::Formatted { passes, dispatches });
        }
    }
}

/// Run the loop for every capability attached to `document_id`.
///
/// Convenience wrapper over prior [`AttachmentRegistry`] registrations;
/// `formatter_for` maps a capability id to its live formatter and
/// `client_for` maps each attachment's backend selector to a client, so
/// hosts (and tests) control both collaborators. Each attachment uses its
/// own config snapshot and thus may select its own backend;
/// [`VcsKind::client`] is the production `client_for`.
pub fn format_attached<F, V>(
    registry: &AttachmentRegistry,
    document_id: &str,
    doc: &mut dyn DocumentBuffer,
    path: &Path,
    diff: &dyn DiffEngine,
    mut formatter_for: F,
    mut client_for: V,
) -> Result<Vec<(String, ReformatOutcome)>, ReformatError>
where
    F: FnMut(&str) -> Option<Box<dyn RangeFormatter>>,
    V: FnMut(VcsKind) -> Box<dyn VcsClient>,
{
    let mut results = Vec::new();
    for attachment in registry.for_document(document_id) {
        let Some(mut formatter) = formatter_for(&attachment.capability) else {
            return Err(ReformatError::UnsupportedCapability {
                capability: "registered formatting capability",
            });
        };
        let vcs = client_for(attachment.config.vcs);
        let outcome = format_modifications(
            doc,
            path,
            formatter.as_mut(),
            diff,
            vcs.as_ref(),
            &attachment.config,
        )?;
        results.push((attachment.capability, outcome));
    }
    Ok(results)
}

/// CLI entry point: `hfmt fmt <file>`.
pub fn run(args: FmtArgs, ctx: &AppContext) -> Result<()> {
    let file_config = load_config().unwrap_or_default();

    let path = dunce::canonicalize(&args.file)
        .with_context(|| format!("resolve path {}", args.file.display()))?;

    let command = args
        .formatter
        .or_else(|| {
            let c = file_config.formatter.command.trim();
            (!c.is_empty()).then(|| file_config.formatter.command.clone())
        })
        .ok_or_else(|| {
            anyhow!("no formatter configured; pass --formatter or set [formatter] in hunkfmt.toml")
        })?;

    let session = SessionConfig {
        vcs: args.vcs.map_or(file_config.vcs, Into::into),
        trim_blank_lines: args.trim_blank_lines || file_config.trim_blank_lines,
        format_on_save: file_config.format_on_save,
    };

    let mut doc = TextDocument::from_path(&path)?;
    let before = doc.joined();
    let mut formatter = CommandFormatter::from_command_line(&command, &path)?;
    let engine = SimilarDiffEngine::default();
    let vcs = session.vcs.client();

    let outcome = match format_modifications(
        &mut doc,
        &path,
        &mut formatter,
        &engine,
        vcs.as_ref(),
        &session,
    ) {
        Ok(outcome) => outcome,
        Err(ReformatError::NotInRepository(cause)) => {
            // Non-fatal by design: warn and leave the document untouched.
            if !ctx.quiet {
                eprintln!("warning: {cause}; nothing formatted");
            }
            return Ok(());
        }
        Err(other) => return Err(other.into()),
    };

    let changed = doc.joined() != before;
    if changed && !ctx.dry_run {
        doc.write_to(&path)?;
    }

    report(&args_report(&path, outcome, changed, ctx), args.json, ctx);
    Ok(())
}

#[derive(Serialize)]
struct FmtReport {
    file: String,
    #[serde(flatten)]
    outcome: ReformatOutcome,
    changed: bool,
    dry_run: bool,
}

fn args_report(path: &Path, outcome: ReformatOutcome, changed: bool, ctx: &AppContext) -> FmtReport {
    FmtReport {
        file: path.display().to_string(),
        outcome,
        changed,
        dry_run: ctx.dry_run,
    }
}

fn report(r: &FmtReport, json: bool, ctx: &AppContext) {
    if json {
        // Single-line JSON for scripting, mirroring the other subcommands.
        if let Ok(line) = serde_json::to_string(r) {
            println!("{line}");
        }
        return;
    }
    if ctx.quiet {
        return;
    }
    let suffix = if r.dry_run && r.changed { " (dry-run, not written)" } else { "" };
    match r.outcome {
        ReformatOutcome::Formatted { passes, dispatches } => {
            println!(
                "{}: {} range{} formatted in {} pass{}{}",
                r.file,
                dispatches,
                if dispatches == 1 { "" } else { "s" },
                passes,
                if passes == 1 { "" } else { "es" },
                suffix
            );
        }
        ReformatOutcome::FormattedWhole => {
            println!("{}: untracked, formatted whole document{}", r.file, suffix);
        }
        ReformatOutcome::SkippedConflicted => {
            println!("{}: unresolved merge conflict, skipped", r.file);
        }
    }
}
