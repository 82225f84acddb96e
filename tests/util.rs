//! Shared test utilities for integration tests
//!
//! Provides the recording formatter used to observe dispatch behavior
//! across multiple test files.

#![allow(dead_code)]

use hunkfmt::{DocumentBuffer, FormatRange, RangeFormatter};

/// Records every dispatch and applies an optional edit to the document.
pub struct RecordingFormatter {
    pub calls: Vec<Option<FormatRange>>,
    supports_range: bool,
    edit: Box<dyn FnMut(&mut dyn DocumentBuffer, Option<FormatRange>)>,
}

impl RecordingFormatter {
    /// Observes dispatches without touching the document.
    pub fn noop() -> Self {
        Self { calls: Vec::new(), supports_range: true, edit: Box::new(|_, _| {}) }
    }

    /// Applies `edit` on every dispatch, simulating a real formatter.
    pub fn with_edit(
        edit: impl FnMut(&mut dyn DocumentBuffer, Option<FormatRange>) + 'static,
    ) -> Self {
        Self { calls: Vec::new(), supports_range: true, edit: Box::new(edit) }
    }

    /// A backend that cannot format sub-ranges at all.
    pub fn without_range_support() -> Self {
        let mut f = Self::noop();
        f.supports_range = false;
        f
    }
}

impl RangeFormatter for RecordingFormatter {
    fn supports_range(&self) -> bool {
        self.supports_range
    }

    fn format(
        &mut self,
        doc: &mut dyn DocumentBuffer,
        range: Option<FormatRange>,
    ) -> anyhow::Result<()> {
        self.calls.push(range);
        (self.edit)(doc, range);
        Ok(())
    }
}
