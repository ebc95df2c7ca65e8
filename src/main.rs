use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use common::cli::{Commands, CommonArgs, utils};
use retention::{RetentionEnforcer, RuleStatus};

#[derive(Parser)]
#[command(name = "dellog")]
#[command(about = "dellog - delete date-stamped log files past their retention window")]
#[command(
    long_about = "dellog reads one retention rule per document matched by the rule glob \
(default /etc/dellog.d/*) and deletes files whose YYYY-MM-DD name stamp is older than the \
rule allows. Runs are not locked; do not start two passes over the same files at once."
)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(subcommand)]
    command: Option<DellogCommands>,
}

#[derive(Subcommand)]
enum DellogCommands {
    #[command(flatten)]
    Common(Commands),
}

impl Default for DellogCommands {
    fn default() -> Self {
        Self::Common(Commands::Run)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on CLI arguments
    utils::init_logging(&cli.common);

    let settings = utils::load_settings(&cli.common)?;

    let DellogCommands::Common(command) = cli.command.unwrap_or_default();
    match command {
        Commands::Version => {
            println!(
                "{}",
                utils::version_info(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
            );
            Ok(())
        }
        Commands::Config { json } => utils::display_settings(&settings, json),
        Commands::Validate => validate(settings),
        Commands::Run => run(settings),
    }
}

fn run(settings: common::RunSettings) -> Result<()> {
    log::info!("Rule documents: {}", settings.config_glob);
    if settings.dry_run {
        log::info!("Dry-run mode: no file will be deleted");
    }

    let enforcer =
        RetentionEnforcer::new(settings).context("Failed to initialize retention clock")?;
    let report = enforcer.run().context("Retention run aborted")?;

    if report.dry_run {
        log::info!("{} file(s) would be deleted", report.deleted.len());
    } else {
        log::info!("{} file(s) deleted", report.deleted.len());
    }
    if !report.failed_deletions.is_empty() {
        log::warn!(
            "{} file(s) could not be deleted",
            report.failed_deletions.len()
        );
    }
    if !report.rule_failures.is_empty() {
        log::warn!("{} rule(s) skipped", report.rule_failures.len());
    }

    Ok(())
}

fn validate(settings: common::RunSettings) -> Result<()> {
    let enforcer =
        RetentionEnforcer::new(settings).context("Failed to initialize retention clock")?;
    let report = enforcer
        .validate()
        .context("Rule documents failed to load")?;

    for (source, status) in &report.documents {
        match status {
            RuleStatus::Active(rule) => println!("ok       {}: {rule}", source.display()),
            RuleStatus::Disabled => println!("disabled {}", source.display()),
            RuleStatus::Invalid(message) => println!("invalid  {}: {message}", source.display()),
        }
    }

    if report.invalid_count() > 0 {
        anyhow::bail!(
            "{} of {} rule document(s) are invalid",
            report.invalid_count(),
            report.documents.len()
        );
    }

    log::info!("✅ Rule validation passed");
    Ok(())
}
