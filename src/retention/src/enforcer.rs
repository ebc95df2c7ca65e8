//! Retention Enforcement Engine
//!
//! Drives one pass over every rule document: discover, load, validate,
//! expand, evaluate, delete.
//!
//! ## Failure model
//!
//! - A malformed discovery pattern or an unreadable/undecodable rule
//!   document stops the run before any rule is applied.
//! - Disabled rules, invalid rule fields and malformed target patterns only
//!   affect their own rule.
//! - Per-file problems are logged and recorded; deletions are never retried.
//!
//! Two instances running at the same time are not coordinated.

use chrono::{DateTime, NaiveDate, Utc};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use common::RunSettings;

use crate::enumerator;
use crate::evaluator::{self, Disposition};
use crate::loader::{self, LoadedRule, LoaderError};
use crate::policy::{PolicyError, RetentionClock};
use crate::rule::{RuleError, ValidatedRule};

/// A rule that was skipped because it failed validation or expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleFailure {
    pub source: PathBuf,
    pub message: String,
}

/// Result of a complete retention pass
#[derive(Debug, Clone)]
pub struct RetentionRunReport {
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub today: NaiveDate,
    pub dry_run: bool,
    pub documents_found: usize,
    pub rules_applied: usize,
    pub rules_disabled: usize,
    pub rule_failures: Vec<RuleFailure>,
    pub candidates_evaluated: usize,
    /// Removed files, or in dry-run mode the files that would be removed.
    pub deleted: Vec<PathBuf>,
    pub retained: Vec<PathBuf>,
    /// Directories, unreadable paths and names without a date stamp.
    pub skipped: usize,
    pub failed_deletions: Vec<(PathBuf, String)>,
}

impl RetentionRunReport {
    fn start(clock: &RetentionClock, dry_run: bool) -> Self {
        Self {
            started_at: Utc::now(),
            completed_at: Utc::now(),
            today: clock.today(),
            dry_run,
            documents_found: 0,
            rules_applied: 0,
            rules_disabled: 0,
            rule_failures: Vec::new(),
            candidates_evaluated: 0,
            deleted: Vec::new(),
            retained: Vec::new(),
            skipped: 0,
            failed_deletions: Vec::new(),
        }
    }

    fn record_rule_failure(&mut self, source: &Path, err: &RuleError) {
        warn!(source = %source.display(), error = %err, "Skipping rule");
        self.rule_failures.push(RuleFailure {
            source: source.to_path_buf(),
            message: err.to_string(),
        });
    }
}

/// Outcome of validating one rule document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleStatus {
    Active(ValidatedRule),
    Disabled,
    Invalid(String),
}

/// Result of a validate-only pass.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub documents: Vec<(PathBuf, RuleStatus)>,
}

impl ValidationReport {
    pub fn invalid_count(&self) -> usize {
        self.documents
            .iter()
            .filter(|(_, status)| matches!(status, RuleStatus::Invalid(_)))
            .count()
    }
}

/// Retention Enforcement Engine
///
/// Holds the settings and the clock for one run; both are fixed for the
/// lifetime of the enforcer.
pub struct RetentionEnforcer {
    settings: RunSettings,
    clock: RetentionClock,
}

impl RetentionEnforcer {
    /// Create an enforcer whose clock reads today's date in the configured
    /// timezone.
    pub fn new(settings: RunSettings) -> Result<Self, PolicyError> {
        let clock = RetentionClock::now_in(&settings.timezone)?;
        Ok(Self::with_clock(settings, clock))
    }

    /// Create an enforcer with an explicit clock.
    pub fn with_clock(settings: RunSettings, clock: RetentionClock) -> Self {
        Self { settings, clock }
    }

    /// Run one retention pass over every rule document.
    ///
    /// # Errors
    ///
    /// Returns an error if the discovery pattern is malformed or any rule
    /// document cannot be read or decoded. No rule is applied in that case.
    pub fn run(&self) -> Result<RetentionRunReport, LoaderError> {
        let mut report = RetentionRunReport::start(&self.clock, self.settings.dry_run);

        info!(
            today = %self.clock.today(),
            reference = %self.clock.reference_instant().to_rfc3339(),
            dry_run = self.settings.dry_run,
            "Starting retention run"
        );

        let rules = self.load()?;
        report.documents_found = rules.len();

        for loaded in &rules {
            match loaded.rule.validate(&loaded.source) {
                Ok(Some(rule)) => match self.enforce_rule(&rule, &mut report) {
                    Ok(()) => report.rules_applied += 1,
                    Err(e) => report.record_rule_failure(&rule.source, &e),
                },
                Ok(None) => {
                    debug!(source = %loaded.source.display(), "Rule disabled");
                    report.rules_disabled += 1;
                }
                Err(e) => report.record_rule_failure(&loaded.source, &e),
            }
        }

        report.completed_at = Utc::now();

        info!(
            documents = report.documents_found,
            rules_applied = report.rules_applied,
            rules_disabled = report.rules_disabled,
            rule_failures = report.rule_failures.len(),
            candidates = report.candidates_evaluated,
            deleted = report.deleted.len(),
            retained = report.retained.len(),
            skipped = report.skipped,
            failed = report.failed_deletions.len(),
            dry_run = report.dry_run,
            duration_ms = (report.completed_at - report.started_at).num_milliseconds(),
            "Retention run completed"
        );

        Ok(report)
    }

    /// Load and validate every rule document without touching target files.
    ///
    /// # Errors
    ///
    /// Fails exactly where [`RetentionEnforcer::run`] would fail.
    pub fn validate(&self) -> Result<ValidationReport, LoaderError> {
        let rules = self.load()?;

        let documents = rules
            .into_iter()
            .map(|loaded| {
                let status = match loaded.rule.validate(&loaded.source) {
                    Ok(Some(rule)) => match enumerator::check_pattern(&rule.pattern) {
                        Ok(()) => RuleStatus::Active(rule),
                        Err(e) => RuleStatus::Invalid(e.to_string()),
                    },
                    Ok(None) => RuleStatus::Disabled,
                    Err(e) => RuleStatus::Invalid(e.to_string()),
                };
                (loaded.source, status)
            })
            .collect();

        Ok(ValidationReport { documents })
    }

    fn load(&self) -> Result<Vec<LoadedRule>, LoaderError> {
        let documents = loader::discover(&self.settings.config_glob)?;
        loader::load_rules(&documents)
    }

    /// Apply a single validated rule.
    fn enforce_rule(
        &self,
        rule: &ValidatedRule,
        report: &mut RetentionRunReport,
    ) -> Result<(), RuleError> {
        let candidates = enumerator::expand(&rule.pattern)?;

        info!(
            source = %rule.source.display(),
            pattern = %rule.pattern,
            keep_days = rule.keep_days,
            oldest_kept = ?self.clock.oldest_kept(rule.keep_days),
            candidates = candidates.len(),
            "Applying retention rule"
        );

        for path in candidates {
            report.candidates_evaluated += 1;
            match evaluator::evaluate(&path, &self.clock, rule.keep_days) {
                Disposition::Skip(_) => report.skipped += 1,
                Disposition::Retain { date, age_days } => {
                    info!(path = %path.display(), %date, age_days, "Keeping file");
                    report.retained.push(path);
                }
                Disposition::Expire { date, age_days } => {
                    self.expire(path, date, age_days, report);
                }
            }
        }

        Ok(())
    }

    fn expire(
        &self,
        path: PathBuf,
        date: NaiveDate,
        age_days: i64,
        report: &mut RetentionRunReport,
    ) {
        if self.settings.dry_run {
            info!(path = %path.display(), %date, age_days, "[DRY-RUN] Would delete file");
            report.deleted.push(path);
            return;
        }

        match std::fs::remove_file(&path) {
            Ok(()) => {
                info!(path = %path.display(), %date, age_days, "Deleted file");
                report.deleted.push(path);
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to delete file");
                report.failed_deletions.push((path, e.to_string()));
            }
        }
    }
}
