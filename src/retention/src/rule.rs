//! Retention rule documents and their validation.

use serde::de::{self, Deserializer, Unexpected, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// One retention rule as decoded from a rule document.
///
/// Missing fields take their zero value, so a document without `enable`
/// describes a disabled rule and one without `keep` fails validation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionRule {
    /// Glob pattern selecting the target files.
    pub file: String,

    /// Retention window in days.
    pub keep: i64,

    /// Whether the rule takes part in the run.
    ///
    /// Accepts the YAML 1.1 spellings (`yes`, `off`, ...) as well.
    #[serde(deserialize_with = "deserialize_yaml11_bool")]
    pub enable: bool,
}

struct Yaml11BoolVisitor;

impl Visitor<'_> for Yaml11BoolVisitor {
    type Value = bool;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a boolean (true/false, yes/no, on/off, y/n)")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
        Ok(v)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<bool, E> {
        match v.to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" | "on" => Ok(true),
            "false" | "no" | "n" | "off" => Ok(false),
            _ => Err(E::invalid_value(Unexpected::Str(v), &self)),
        }
    }

    fn visit_unit<E: de::Error>(self) -> Result<bool, E> {
        Ok(false)
    }
}

fn deserialize_yaml11_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(Yaml11BoolVisitor)
}

impl RetentionRule {
    /// Decide whether this rule is processed in the current run.
    ///
    /// Returns `Ok(None)` for a disabled rule, which is not an error.
    /// Invalid fields are reported as [`RuleError`]; the caller skips the
    /// rule and moves on to the next one.
    pub fn validate(&self, source: &Path) -> Result<Option<ValidatedRule>, RuleError> {
        if !self.enable {
            return Ok(None);
        }

        if self.keep < 1 {
            return Err(RuleError::InvalidKeep(self.keep));
        }

        let pattern = self.file.trim();
        if pattern.is_empty() {
            return Err(RuleError::EmptyPattern);
        }

        Ok(Some(ValidatedRule {
            pattern: pattern.to_string(),
            keep_days: self.keep,
            source: source.to_path_buf(),
        }))
    }
}

/// An enabled rule whose fields passed validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedRule {
    /// Trimmed, non-empty target glob.
    pub pattern: String,

    /// Retention window, at least one day.
    pub keep_days: i64,

    /// Document the rule was loaded from.
    pub source: PathBuf,
}

impl fmt::Display for ValidatedRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (keep {} day(s), from {})",
            self.pattern,
            self.keep_days,
            self.source.display()
        )
    }
}

/// Per-rule problems. These never abort the run.
#[derive(Error, Debug)]
pub enum RuleError {
    /// `keep` must be a positive number of days.
    #[error("invalid field 'keep': {0} must be at least 1")]
    InvalidKeep(i64),

    /// `file` is empty once surrounding whitespace is removed.
    #[error("empty field 'file'")]
    EmptyPattern,

    /// `file` is not a valid glob pattern.
    #[error("invalid field 'file' '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}
