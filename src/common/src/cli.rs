use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Arguments shared by every dellog invocation
#[derive(Parser, Debug, Clone, Default)]
pub struct CommonArgs {
    #[arg(long, help = "Settings file path (defaults to ./dellog.toml when present)")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Glob selecting retention rule documents")]
    pub config_glob: Option<String>,

    #[arg(long, help = "Set dry-run flag, no file will be deleted")]
    pub dry_run: bool,

    #[arg(short, long, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, help = "Enable quiet mode (minimal output)")]
    pub quiet: bool,
}

/// Subcommands; a bare invocation performs a retention pass
#[derive(Subcommand, Debug, Clone, Default, PartialEq, Eq)]
pub enum Commands {
    /// Evaluate every rule and delete expired files (default behavior)
    #[default]
    Run,
    /// Show effective settings and exit
    Config {
        #[arg(long, help = "Show settings in JSON format")]
        json: bool,
    },
    /// Load and validate every rule document without touching target files
    Validate,
    /// Show version information and exit
    Version,
}

/// Utility functions for CLI operations
pub mod utils {
    use super::*;
    use crate::config::RunSettings;
    use anyhow::{Context, Result};
    use tracing_subscriber::EnvFilter;

    /// Log level implied by the verbosity flags
    pub fn log_level(args: &CommonArgs) -> &'static str {
        if args.quiet {
            "warn"
        } else if args.verbose {
            "debug"
        } else {
            "info"
        }
    }

    /// Initialize logging based on CLI arguments; `RUST_LOG` wins when set
    pub fn init_logging(args: &CommonArgs) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(log_level(args)));
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    /// Load settings and apply the command line on top
    pub fn load_settings(args: &CommonArgs) -> Result<RunSettings> {
        let settings = match &args.config {
            Some(path) => {
                log::info!("Loading settings from: {}", path.display());
                RunSettings::load_from_path(path).context("Failed to load settings")?
            }
            None => RunSettings::load().context("Failed to load settings")?,
        };
        Ok(apply_overrides(settings, args))
    }

    /// Command-line flags take precedence over file and environment values
    pub fn apply_overrides(mut settings: RunSettings, args: &CommonArgs) -> RunSettings {
        if let Some(glob) = &args.config_glob {
            settings.config_glob = glob.clone();
        }
        // the flag can only switch dry-run on
        if args.dry_run {
            settings.dry_run = true;
        }
        settings
    }

    /// Display settings in human-readable or JSON format
    pub fn display_settings(settings: &RunSettings, json: bool) -> Result<()> {
        if json {
            let json = serde_json::to_string_pretty(settings)
                .context("Failed to serialize settings to JSON")?;
            println!("{json}");
        } else {
            println!("dellog settings:");
            println!("================");
            println!("Rule documents: {}", settings.config_glob);
            println!("Dry run: {}", settings.dry_run);
            println!("Timezone: {}", settings.timezone);
        }
        Ok(())
    }

    /// Standard version information for the binary named `name`.
    pub fn version_info(name: &str, version: &str) -> String {
        format!(
            "{name} {version} (rust {})",
            env!("CARGO_PKG_RUST_VERSION")
        )
    }
}
