//! Document buffer abstraction for the reformat loop.
//!
//! The loop never touches storage directly: it reads line snapshots through
//! `DocumentBuffer` and mutates only by asking a formatter to splice ranges.
//! `TextDocument` is the in-memory implementation used by the CLI and tests;
//! an embedding host can provide its own (editor buffer, rope, etc.).

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Read/write seam between the reformat loop and the live document.
///
/// Lines carry no separators; `line_separator` is the join convention for
/// the whole document. `splice` replaces a 1-based inclusive line range.
pub trait DocumentBuffer {
    /// Snapshot of all lines, separator-free.
    fn lines(&self) -> Vec<String>;

    /// The document's line separator convention ("\n" or "\r\n").
    fn line_separator(&self) -> &str;

    /// Full text, lines joined with the separator.
    fn joined(&self) -> String {
        self.lines().join(self.line_separator())
    }

    /// Number of lines in the buffer.
    fn line_count(&self) -> u32;

    /// Width in characters of a 1-based line, or 0 if out of bounds.
    fn line_width(&self, line: u32) -> u32;

    /// Replace lines `start..=end` (1-based, inclusive) with `replacement`.
    fn splice(&mut self, start: u32, end: u32, replacement: Vec<String>);
}

/// In-memory document with a detected line separator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDocument {
    lines: Vec<String>,
    separator: String,
}

impl TextDocument {
    /// Build from raw text, detecting CRLF vs LF from the first line break.
    pub fn from_text(text: &str) -> Self {
        let separator = detect_separator(text);
        let lines = text.split(&separator).map(str::to_string).collect();
        Self { lines, separator: separator.to_string() }
    }

    /// Read a document from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read document {}", path.display()))?;
        Ok(Self::from_text(&text))
    }

    /// Build from pre-split lines with an explicit separator.
    pub fn from_lines(lines: Vec<String>, separator: &str) -> Self {
        Self { lines, separator: separator.to_string() }
    }

    /// Write the current content back to disk.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        fs::write(path, self.joined())
            .with_context(|| format!("write document {}", path.display()))
    }
}

/// Pick "\r\n" when the first line feed is carriage-return prefixed.
fn detect_separator(text: &str) -> &'static str {
    match text.find('\n') {
        Some(i) if i > 0 && text.as_bytes()[i - 1] == b'\r' => "\r\n",
        _ => "\n",
    }
}

impl DocumentBuffer for TextDocument {
    fn lines(&self) -> Vec<String> {
        self.lines.clone()
    }

    fn line_separator(&self) -> &str {
        &self.separator
    }

    fn line_count(&self) -> u32 {
        self.lines.len() as u32
    }

    fn line_width(&self, line: u32) -> u32 {
        self.lines
            .get(line.saturating_sub(1) as usize)
            .map_or(0, |l| l.chars().count() as u32)
    }

    fn splice(&mut self, start: u32, end: u32, replacement: Vec<String>) {
        debug_assert!(start >= 1 && start <= end, "splice range must be 1-based and ordered");
        let lo = (start as usize - 1).min(self.lines.len());
        let hi = (end as usize).min(self.lines.len());
        self.lines.splice(lo..hi, replacement);
    }
}
