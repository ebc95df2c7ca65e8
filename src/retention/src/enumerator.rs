//! Expansion of a rule's target pattern into candidate files.

use std::path::PathBuf;
use tracing::debug;

use crate::rule::RuleError;

/// Expand `pattern` into the paths it currently matches, in glob order.
///
/// A malformed pattern is a per-rule error; no matches is simply an empty
/// list. Entries the walker cannot read are dropped.
pub fn expand(pattern: &str) -> Result<Vec<PathBuf>, RuleError> {
    let paths = glob::glob(pattern).map_err(|source| RuleError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })?;

    Ok(paths
        .filter_map(|entry| {
            entry
                .inspect_err(|e| {
                    debug!(path = %e.path().display(), error = %e.error(), "Unreadable glob entry");
                })
                .ok()
        })
        .collect())
}

/// Check the syntax of `pattern` without touching the filesystem.
pub fn check_pattern(pattern: &str) -> Result<(), RuleError> {
    glob::Pattern::new(pattern)
        .map(|_| ())
        .map_err(|source| RuleError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })
}
