//! Discovery and decoding of rule documents.
//!
//! Every failure in this module is fatal for the run: an operator who
//! ships a broken rule document has to hear about it before anything is
//! deleted.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::rule::RetentionRule;

/// A decoded rule together with the document it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedRule {
    pub source: PathBuf,
    pub rule: RetentionRule,
}

/// Fatal errors while locating or reading rule documents.
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("invalid rule document pattern '{pattern}': {source}")]
    InvalidDiscoveryPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// List the rule documents matched by `pattern`, in glob order.
pub fn discover(pattern: &str) -> Result<Vec<PathBuf>, LoaderError> {
    info!(pattern = %pattern, "Scanning for rule documents");

    let paths = glob::glob(pattern).map_err(|source| LoaderError::InvalidDiscoveryPattern {
        pattern: pattern.to_string(),
        source,
    })?;

    let documents: Vec<PathBuf> = paths
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                debug!(path = %e.path().display(), error = %e.error(), "Unreadable glob entry");
                None
            }
        })
        .collect();

    info!(count = documents.len(), "Found rule document(s)");
    Ok(documents)
}

/// Read and decode one rule document.
///
/// An empty (or explicitly null) document decodes as the default rule,
/// which is disabled. Only the first YAML document of a multi-document
/// stream is used.
pub fn load_rule(path: &Path) -> Result<RetentionRule, LoaderError> {
    let contents = std::fs::read_to_string(path).map_err(|source| LoaderError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    decode_rule(&contents).map_err(|source| LoaderError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

fn decode_rule(contents: &str) -> Result<RetentionRule, serde_yaml::Error> {
    if contents.trim().is_empty() {
        return Ok(RetentionRule::default());
    }
    let Some(document) = serde_yaml::Deserializer::from_str(contents).next() else {
        return Ok(RetentionRule::default());
    };
    let rule = Option::<RetentionRule>::deserialize(document)?;
    Ok(rule.unwrap_or_default())
}

/// Load every document, stopping at the first one that cannot be read or
/// decoded.
pub fn load_rules(paths: &[PathBuf]) -> Result<Vec<LoadedRule>, LoaderError> {
    let mut rules = Vec::with_capacity(paths.len());
    for path in paths {
        info!(path = %path.display(), "Loading rule document");
        let rule = load_rule(path)?;
        debug!(
            path = %path.display(),
            file = %rule.file,
            keep = rule.keep,
            enable = rule.enable,
            "Decoded rule document"
        );
        rules.push(LoadedRule {
            source: path.clone(),
            rule,
        });
    }
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_decode_full_document() {
        let rule = decode_rule("file: /var/log/app-*.log\nkeep: 7\nenable: true\n").unwrap();
        assert_eq!(
            rule,
            RetentionRule {
                file: "/var/log/app-*.log".to_string(),
                keep: 7,
                enable: true,
            }
        );
    }

    #[test]
    fn test_decode_empty_document_is_disabled() {
        assert_eq!(decode_rule("").unwrap(), RetentionRule::default());
        assert_eq!(decode_rule("\n   \n").unwrap(), RetentionRule::default());
        assert_eq!(decode_rule("~\n").unwrap(), RetentionRule::default());
    }

    #[test]
    fn test_decode_yaml11_enable() {
        let on = decode_rule("file: /var/log/app-*.log\nkeep: 7\nenable: yes\n").unwrap();
        assert!(on.enable);
        assert_eq!(on.keep, 7);
        let off = decode_rule("file: /var/log/app-*.log\nkeep: 7\nenable: off\n").unwrap();
        assert!(!off.enable);
    }

    #[test]
    fn test_decode_uses_first_document_only() {
        let rule = decode_rule(
            "---\nfile: /var/log/first-*.log\nkeep: 3\nenable: true\n---\nfile: /var/log/second-*.log\nkeep: 9\n",
        )
        .unwrap();
        assert_eq!(rule.file, "/var/log/first-*.log");
        assert_eq!(rule.keep, 3);
        assert!(rule.enable);
    }

    #[test]
    fn test_decode_rejects_wrong_types() {
        assert!(decode_rule("file: /var/log/*.log\nkeep: seven\nenable: true\n").is_err());
        assert!(decode_rule("just a sentence\n").is_err());
    }

    #[test]
    fn test_discover_invalid_pattern_is_fatal() {
        let err = discover("/etc/dellog.d/[invalid").unwrap_err();
        assert!(matches!(err, LoaderError::InvalidDiscoveryPattern { .. }));
    }

    #[test]
    fn test_discover_lists_matching_documents() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.yml"), "").unwrap();
        fs::write(dir.path().join("a.yml"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        let pattern = format!("{}/*.yml", dir.path().display());
        let found = discover(&pattern).unwrap();
        assert_eq!(
            found,
            vec![dir.path().join("a.yml"), dir.path().join("b.yml")]
        );
    }

    #[test]
    fn test_discover_no_match_is_empty() {
        let dir = TempDir::new().unwrap();
        let pattern = format!("{}/*", dir.path().display());
        assert!(discover(&pattern).unwrap().is_empty());
    }

    #[test]
    fn test_load_rules_halts_on_first_bad_document() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("a.yml");
        let bad = dir.path().join("b.yml");
        let later = dir.path().join("c.yml");
        fs::write(&good, "file: /tmp/*.log\nkeep: 3\nenable: true\n").unwrap();
        fs::write(&bad, "file: [unterminated\n").unwrap();
        fs::write(&later, "file: /tmp/*.log\nkeep: 3\nenable: true\n").unwrap();

        let err = load_rules(&[good, bad.clone(), later]).unwrap_err();
        match err {
            LoaderError::Decode { path, .. } => assert_eq!(path, bad),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_missing_document_is_read_error() {
        let dir = TempDir::new().unwrap();
        let err = load_rule(&dir.path().join("gone.yml")).unwrap_err();
        assert!(matches!(err, LoaderError::Read { .. }));
    }

    #[test]
    fn test_directory_as_document_is_read_error() {
        let dir = TempDir::new().unwrap();
        let err = load_rule(dir.path()).unwrap_err();
        assert!(matches!(err, LoaderError::Read { .. }));
    }
}
