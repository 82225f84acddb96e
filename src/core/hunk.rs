//! Hunk and format-range value types.
//!
//! A `Hunk` is one contiguous change region between baseline and current
//! content, in the coordinate system of the diff that produced it. Hunks go
//! stale the moment an earlier hunk's formatting changes buffer length; the
//! reformat loop owns that invalidation, these types stay dumb.

use serde::Serialize;

/// One contiguous change region, unified-diff style.
///
/// Starts are 1-based when the corresponding length is non-zero. For a
/// zero-length side (pure insertion or pure deletion) the start names the
/// line *after which* the change applies, so 0 means "before line 1" —
/// the same convention `@@ -l,0` / `@@ +l,0` headers use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Hunk {
    pub old_start: u32,
    pub old_len: u32,
    pub new_start: u32,
    pub new_len: u32,
}

impl Hunk {
    /// True when nothing exists on the current side (pure deletion).
    pub fn is_pure_deletion(&self) -> bool {
        self.new_len == 0
    }
}

/// Inclusive line/column span handed to a range formatter.
///
/// Lines and columns are 1-based. The end column is anchored to the full
/// width of the last line so the formatter sees whole lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FormatRange {
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
}

impl FormatRange {
    /// Derive the range covering a hunk's new side, or None for a pure
    /// deletion. `lines` is the current content the hunk was computed
    /// against; the end column spans the last line's full width.
    pub fn from_hunk(hunk: &Hunk, lines: &[String]) -> Option<Self> {
        if hunk.new_len == 0 {
            return None;
        }
        let start_line = hunk.new_start;
        let end_line = hunk.new_start + hunk.new_len - 1;
        Some(Self {
            start_line,
            start_col: 1,
            end_line,
            end_col: line_width(lines, end_line).max(1),
        })
    }

    /// Shrink the range past leading/trailing fully-blank lines.
    ///
    /// Returns None when the whole range is blank — some formatters treat a
    /// pure-blank range as an error, so the caller skips the hunk entirely.
    pub fn trim_blank_boundaries(&self, lines: &[String]) -> Option<Self> {
        let mut start = self.start_line;
        let mut end = self.end_line;
        while start <= end && is_blank(lines, start) {
            start += 1;
        }
        while end >= start && is_blank(lines, end) {
            end -= 1;
        }
        if start > end {
            return None;
        }
        Some(Self {
            start_line: start,
            start_col: 1,
            end_line: end,
            end_col: line_width(lines, end).max(1),
        })
    }
}

fn line_width(lines: &[String], line: u32) -> u32 {
    lines
        .get(line.saturating_sub(1) as usize)
        .map_or(0, |l| l.chars().count() as u32)
}

fn is_blank(lines: &[String], line: u32) -> bool {
    lines
        .get(line.saturating_sub(1) as usize)
        .is_none_or(|l| l.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn range_from_single_line_hunk() {
        let hunk = Hunk { old_start: 2, old_len: 1, new_start: 2, new_len: 1 };
        let ls = lines(&["a", "Bee", "c"]);
        let range = FormatRange::from_hunk(&hunk, &ls).unwrap();
        assert_eq!(range.start_line, 2);
        assert_eq!(range.end_line, 2);
        assert_eq!(range.start_col, 1);
        assert_eq!(range.end_col, 3);
    }

    #[test]
    fn pure_deletion_yields_no_range() {
        let hunk = Hunk { old_start: 2, old_len: 1, new_start: 1, new_len: 0 };
        assert!(FormatRange::from_hunk(&hunk, &lines(&["a", "c"])).is_none());
        assert!(hunk.is_pure_deletion());
    }

    #[test]
    fn end_col_spans_last_line_width() {
        let hunk = Hunk { old_start: 1, old_len: 2, new_start: 1, new_len: 2 };
        let ls = lines(&["short", "a longer line"]);
        let range = FormatRange::from_hunk(&hunk, &ls).unwrap();
        assert_eq!(range.end_line, 2);
        assert_eq!(range.end_col, 13);
    }

    #[test]
    fn empty_last_line_anchors_to_col_one() {
        let hunk = Hunk { old_start: 3, old_len: 0, new_start: 3, new_len: 1 };
        let ls = lines(&["a", "b", ""]);
        let range = FormatRange::from_hunk(&hunk, &ls).unwrap();
        assert_eq!(range.end_col, 1);
    }

    #[test]
    fn trim_drops_boundary_blanks_only() {
        let ls = lines(&["", "  ", "code", "more", "\t", "tail"]);
        let range = FormatRange { start_line: 1, start_col: 1, end_line: 5, end_col: 1 };
        let trimmed = range.trim_blank_boundaries(&ls).unwrap();
        assert_eq!(trimmed.start_line, 3);
        assert_eq!(trimmed.end_line, 4);
        assert_eq!(trimmed.end_col, 4);
    }

    #[test]
    fn all_blank_range_trims_to_nothing() {
        let ls = lines(&["x", "", "   ", "y"]);
        let range = FormatRange { start_line: 2, start_col: 1, end_line: 3, end_col: 3 };
        assert!(range.trim_blank_boundaries(&ls).is_none());
    }

    #[test]
    fn interior_blanks_survive_trimming() {
        let ls = lines(&["a", "", "b"]);
        let range = FormatRange { start_line: 1, start_col: 1, end_line: 3, end_col: 1 };
        let trimmed = range.trim_blank_boundaries(&ls).unwrap();
        assert_eq!((trimmed.start_line, trimmed.end_line), (1, 3));
    }
}
