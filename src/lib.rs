//! **hunkfmt** - Diff-scoped reformatting for version-controlled documents
//!
//! Formats only the changed regions of a single file, so style-driven
//! reformatting never pollutes diffs with unrelated churn. The core is a
//! hunk-computation-and-reapplication loop over a pluggable VCS baseline,
//! a pluggable diff engine, and an opaque range-formatting capability.

/// Command-line interface with clap integration
pub mod cli;

/// Shell completion generation
pub mod completion;

/// Core reformat pipeline - hunk computation, dispatch, and VCS plumbing
pub mod core {
    /// Document buffer seam and the in-memory implementation
    pub mod document;
    pub use document::{DocumentBuffer, TextDocument};

    /// Hunk and format-range value types
    pub mod hunk;
    pub use hunk::{FormatRange, Hunk};

    /// Diff engine contract and the `similar`-backed default
    pub mod diff;
    pub use diff::{DiffEngine, SimilarDiffEngine};

    /// Formatting dispatch: trait + external-command implementation
    pub mod format;
    pub use format::{CommandFormatter, RangeFormatter};

    /// Version-control clients (git, mercurial) behind one trait
    pub mod vcs;
    pub use vcs::{FileStatus, RepositoryHandle, VcsClient, VcsError, VcsKind};

    /// The reformat loop itself - the algorithmic heart
    pub mod reformat;
    pub use reformat::{
        ReformatError, ReformatOutcome, SessionConfig, format_attached, format_modifications,
    };

    /// Per-document attachment registry keyed by (document, capability)
    pub mod attach;
    pub use attach::{Attachment, AttachmentRegistry};
}

/// Infrastructure - configuration and subprocess plumbing
pub mod infra {
    /// Configuration management with TOML support
    pub mod config;
    // self:: disambiguates from the `config` crate itself
    pub use self::config::{Config, init as config_init, load_config};

    /// Subprocess runner with pinned cwd and captured output
    pub mod process;
    pub use process::CmdOutput;
}

// Strategic re-exports for clean embedding (crate:: avoids the uniform-path
// clash between our `core` module and the `core` crate)
pub use crate::cli::{AppContext, Cli, Commands};
pub use crate::core::{
    Attachment, AttachmentRegistry, CommandFormatter, DiffEngine, DocumentBuffer, FileStatus,
    FormatRange, Hunk, RangeFormatter, ReformatError, ReformatOutcome, RepositoryHandle,
    SessionConfig, SimilarDiffEngine, TextDocument, VcsClient, VcsError, VcsKind,
    format_attached, format_modifications,
};
pub use crate::infra::{Config, load_config};
