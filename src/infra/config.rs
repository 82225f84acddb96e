use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cli::{AppContext, InitArgs};
use crate::core::vcs::VcsKind;

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Version-control backend supplying status and baselines
    pub vcs: VcsKind,

    /// Shrink dispatch ranges past blank boundary lines
    pub trim_blank_lines: bool,

    /// Whether hosts should trigger the loop on save events
    pub format_on_save: bool,

    /// Default formatter invocation
    pub formatter: FormatterConfig,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatterConfig {
    /// Command line; {file}, {start}, {end} expand per dispatch
    pub command: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vcs: VcsKind::Git,
            trim_blank_lines: false,
            format_on_save: false,
            formatter: FormatterConfig { command: String::new() },
        }
    }
}

pub fn load_config() -> Result<Config> {
    let mut builder = config::Config::builder();

    // Load from config files in priority order
    let config_paths = ["hunkfmt.toml", ".hunkfmt.toml"];

    for path in &config_paths {
        if Path::new(path).exists() {
            builder = builder.add_source(config::File::with_name(path));
            break;
        }
    }

    // Add environment variables with HUNKFMT_ prefix
    builder = builder.add_source(config::Environment::with_prefix("HUNKFMT").separator("_"));

    let cfg = builder.build().context("Failed to load configuration")?;
    let parsed: Config = cfg.try_deserialize().context("Failed to parse configuration")?;

    Ok(parsed)
}

pub fn init(args: InitArgs, ctx: &AppContext) -> Result<()> {
    let config_path = args.path.join("hunkfmt.toml");

    if config_path.exists() && !args.force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let config = Config::default();
    let toml_string =
        toml::to_string_pretty(&config).context("Failed to serialize default config")?;

    std::fs::write(&config_path, toml_string).context("Failed to write config file")?;

    if !ctx.quiet {
        println!("Created config file at {}", config_path.display());
    }
    Ok(())
}
