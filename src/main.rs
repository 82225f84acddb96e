use anyhow::Result;
use clap::Parser;
use hunkfmt::cli::{AppContext, Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // RUST_LOG-controlled diagnostics on stderr; silent by default.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Build a context once, pass everywhere
    let ctx = AppContext {
        quiet: cli.quiet,
        no_color: cli.no_color,
        dry_run: cli.dry_run,
    };

    match cli.command {
        Commands::Fmt(args) => hunkfmt::core::reformat::run(args, &ctx),
        Commands::Init(args) => hunkfmt::infra::config::init(args, &ctx),
        Commands::Completions(args) => hunkfmt::completion::run(args, &ctx),
    }
}
