//! Diff engine contract and the default `similar`-backed implementation.
//!
//! The reformat loop only needs zero-context hunks: contiguous changed
//! regions with no surrounding equal lines. On top of the raw Myers output
//! this module adds two behaviors the loop depends on:
//! - end-of-line normalization: a trailing carriage return alone never
//!   produces a hunk,
//! - a deterministic indent-aware slider that re-anchors ambiguous
//!   pure-insertion/pure-deletion blocks, so repeated runs over repetitive
//!   text always pick the same boundary.

use similar::{Algorithm, DiffOp, capture_diff_slices};

use crate::core::hunk::Hunk;

/// Pure function from (baseline, current) line snapshots to ordered,
/// non-overlapping hunks sorted by position in the current content.
pub trait DiffEngine {
    fn diff(&self, baseline: &[String], current: &[String]) -> Vec<Hunk>;
}

/// Default engine: Myers diff over trailing-CR-normalized lines, zero
/// context, indent-aware anchoring for ambiguous insert/delete blocks.
#[derive(Debug, Clone, Copy)]
pub struct SimilarDiffEngine {
    algorithm: Algorithm,
}

impl Default for SimilarDiffEngine {
    fn default() -> Self {
        Self { algorithm: Algorithm::Myers }
    }
}

impl SimilarDiffEngine {
    pub fn new(algorithm: Algorithm) -> Self {
        Self { algorithm }
    }
}

impl DiffEngine for SimilarDiffEngine {
    fn diff(&self, baseline: &[String], current: &[String]) -> Vec<Hunk> {
        // Compare on keys with the trailing CR stripped so CRLF/LF drift
        // between the index and the working copy is not itself a change.
        let old_keys: Vec<&str> = baseline.iter().map(|l| strip_cr(l)).collect();
        let new_keys: Vec<&str> = current.iter().map(|l| strip_cr(l)).collect();

        let ops = capture_diff_slices(self.algorithm, &old_keys, &new_keys);
        let mut hunks = coalesce(&ops);
        for hunk in &mut hunks {
            slide_to_indent_boundary(hunk, &old_keys, &new_keys);
        }
        hunks
    }
}

fn strip_cr(line: &str) -> &str {
    line.strip_suffix('\r').unwrap_or(line)
}

/// Fold runs of adjacent non-equal ops into zero-context hunks.
///
/// `capture_diff_slices` can emit a Delete immediately followed by an
/// Insert where a Replace would do; both belong to one hunk because no
/// equal line separates them.
fn coalesce(ops: &[DiffOp]) -> Vec<Hunk> {
    let mut hunks = Vec::new();
    // Pending bounding ranges, 0-based half-open.
    let mut pending: Option<(usize, usize, usize, usize)> = None;

    for op in ops {
        if let DiffOp::Equal { .. } = op {
            if let Some(p) = pending.take() {
                hunks.push(to_hunk(p));
            }
            continue;
        }
        let (old, new) = (op.old_range(), op.new_range());
        pending = Some(match pending {
            None => (old.start, old.end, new.start, new.end),
            Some((os, _, ns, _)) => (os, old.end, ns, new.end),
        });
    }
    if let Some(p) = pending {
        hunks.push(to_hunk(p));
    }
    hunks
}

/// Convert 0-based half-open ranges to the unified-diff convention: 1-based
/// starts for non-empty ranges, after-which anchors for empty ones.
fn to_hunk((old_lo, old_hi, new_lo, new_hi): (usize, usize, usize, usize)) -> Hunk {
    let old_len = (old_hi - old_lo) as u32;
    let new_len = (new_hi - new_lo) as u32;
    Hunk {
        old_start: if old_len == 0 { old_lo as u32 } else { old_lo as u32 + 1 },
        old_len,
        new_start: if new_len == 0 { new_lo as u32 } else { new_lo as u32 + 1 },
        new_len,
    }
}

/// Re-anchor an ambiguous pure-insertion or pure-deletion block.
///
/// When the block's first and surrounding lines repeat, Myers picks an
/// arbitrary valid placement. Slide the block through every equivalent
/// position and keep the one whose boundary best matches indentation
/// structure; ties resolve to the topmost position so the choice is
/// deterministic across runs.
fn slide_to_indent_boundary(hunk: &mut Hunk, old_keys: &[&str], new_keys: &[&str]) {
    let (lines, lo, len, is_insert) = match (hunk.old_len, hunk.new_len) {
        (0, n) if n > 0 => (new_keys, (hunk.new_start - 1) as usize, n as usize, true),
        (n, 0) if n > 0 => (old_keys, (hunk.old_start - 1) as usize, n as usize, false),
        _ => return,
    };

    // Valid shift window: the block content is unchanged under each shift.
    let mut min_lo = lo;
    while min_lo > 0 && lines[min_lo - 1] == lines[min_lo + len - 1] {
        min_lo -= 1;
    }
    let mut max_lo = lo;
    while max_lo + len < lines.len() && lines[max_lo] == lines[max_lo + len] {
        max_lo += 1;
    }
    if min_lo == max_lo {
        return;
    }

    let best = (min_lo..=max_lo)
        .min_by_key(|&cand| (boundary_score(lines, cand, len), cand))
        .unwrap_or(lo);
    if best == lo {
        return;
    }

    let delta = best as i64 - lo as i64;
    if is_insert {
        hunk.new_start = (hunk.new_start as i64 + delta) as u32;
        hunk.old_start = (hunk.old_start as i64 + delta) as u32;
    } else {
        hunk.old_start = (hunk.old_start as i64 + delta) as u32;
        hunk.new_start = (hunk.new_start as i64 + delta) as u32;
    }
}

/// Lower is better. Prefers blocks that begin right after a blank line or
/// at the top of the file, then blocks whose first line is least indented.
fn boundary_score(lines: &[&str], lo: usize, len: usize) -> i64 {
    let mut score: i64 = 0;
    let after_blank = lo == 0 || lines[lo - 1].trim().is_empty();
    if !after_blank {
        score += 100;
    }
    score += indent_width(lines[lo]) as i64;
    // A blank line immediately after the block also marks a natural seam.
    let after = lo + len;
    if after < lines.len() && !lines[after].trim().is_empty() {
        score += 10;
    }
    score
}

fn indent_width(line: &str) -> usize {
    line.chars().take_while(|c| *c == ' ' || *c == '\t').count()
}
