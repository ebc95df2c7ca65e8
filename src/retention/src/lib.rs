//! Date-stamped file retention for dellog.
//!
//! Rule documents name a target glob and a number of days to keep; files
//! whose base name carries a `YYYY-MM-DD` stamp older than that window are
//! deleted.
//!
//! ## Architecture
//!
//! - `loader`: discovery and YAML decoding of rule documents
//! - `rule`: rule records and their validation
//! - `enumerator`: target glob expansion
//! - `policy`: the run clock and the age comparison
//! - `evaluator`: per-file decisions
//! - `enforcer`: one complete pass, dry-run aware
//!
//! ## Usage
//!
//! ```no_run
//! use common::RunSettings;
//! use retention::RetentionEnforcer;
//!
//! let settings = RunSettings {
//!     dry_run: true,
//!     ..Default::default()
//! };
//! let enforcer = RetentionEnforcer::new(settings)?;
//! let report = enforcer.run()?;
//!
//! println!("would delete {} file(s)", report.deleted.len());
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod enforcer;
pub mod enumerator;
pub mod evaluator;
pub mod loader;
pub mod policy;
pub mod rule;

// Re-export commonly used types
pub use enforcer::{RetentionEnforcer, RetentionRunReport, RuleFailure, RuleStatus, ValidationReport};
pub use evaluator::{Disposition, SkipReason};
pub use loader::{LoadedRule, LoaderError};
pub use policy::{PolicyError, RetentionClock};
pub use rule::{RetentionRule, RuleError, ValidatedRule};
