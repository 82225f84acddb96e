use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::core::vcs::VcsKind;

/// Shared application context for global flags
#[derive(Clone, Debug)]
pub struct AppContext {
    pub quiet: bool,    // global --quiet
    pub no_color: bool, // global --no-color
    pub dry_run: bool,  // global --dry-run
}

#[derive(Parser)]
#[command(name = "hunkfmt")]
#[command(
    about = "Diff-scoped reformatting: format only the lines you changed, keeping diffs clean"
)]
#[command(version, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Suppress warnings and non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Show what would be done without writing the file
    #[arg(long, global = true)]
    pub dry_run: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Format only the modified regions of a version-controlled file
    Fmt(FmtArgs),

    /// Initialize a hunkfmt.toml config file
    Init(InitArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Parser)]
pub struct FmtArgs {
    /// File to reformat (formatted whole when untracked)
    pub file: PathBuf,

    /// Formatter command; {file}, {start}, {end} expand per dispatch
    /// (range text arrives on stdin, formatted text is read from stdout)
    #[arg(long, value_name = "CMD")]
    pub formatter: Option<String>,

    /// Version-control backend supplying the comparison baseline
    #[arg(long, value_enum)]
    pub vcs: Option<VcsBackend>,

    /// Shrink dispatch ranges past blank boundary lines; skip all-blank hunks
    #[arg(long)]
    pub trim_blank_lines: bool,

    /// Emit a single-line JSON outcome instead of human text
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum VcsBackend {
    /// Diff against the git index (stage 0)
    Git,
    /// Diff against the mercurial parent revision
    Hg,
}

impl From<VcsBackend> for VcsKind {
    fn from(backend: VcsBackend) -> Self {
        match backend {
            VcsBackend::Git => VcsKind::Git,
            VcsBackend::Hg => VcsKind::Hg,
        }
    }
}

#[derive(Parser)]
pub struct InitArgs {
    /// Directory to initialize config in
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite existing config file
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Parser)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,

    /// Output directory; if omitted and --stdout not set, prints error
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Print completion script to stdout instead of a file
    #[arg(long)]
    pub stdout: bool,
}
