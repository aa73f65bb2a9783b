//! Tagging strategy - which tag to propose and whether to create it
//!
//! A run either validates a fixed tag (a literal `tag` input or a date
//! style) or computes the next semantic version from commit history. The
//! proposal is then applied for real or only reported under dry-run.

pub mod apply;
pub mod check;

pub use apply::ApplyMode;
pub use check::{check_semver, check_static};

use crate::boundary::SkipReason;
use crate::config::Parameters;
use chrono::{DateTime, Utc};
use std::fmt;

/// How the candidate tag is found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStrategy {
    /// Validate a fixed tag name against the catalog
    Static { tag: String },
    /// Compute the next version from commits since the last release
    Semver,
}

/// Result of a check: a tag to create, or why there is none
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    Candidate(String),
    Skipped(SkipReason),
}

impl CheckOutcome {
    pub fn candidate(&self) -> Option<&str> {
        match self {
            CheckOutcome::Candidate(tag) => Some(tag),
            CheckOutcome::Skipped(_) => None,
        }
    }
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckOutcome::Candidate(tag) => write!(f, "new tag '{}'", tag),
            CheckOutcome::Skipped(reason) => write!(f, "{}", reason),
        }
    }
}

/// Check and apply halves chosen for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggingStrategy {
    pub check: CheckStrategy,
    pub apply: ApplyMode,
}

impl TaggingStrategy {
    /// Pick the strategy for `parameters`.
    ///
    /// A date style wins over a literal tag, which wins over semver.
    /// `now` is only read by date styles.
    pub fn select(parameters: &Parameters, now: DateTime<Utc>) -> Self {
        let check = match (parameters.style.date_tag(now), &parameters.tag) {
            (Some(tag), _) => CheckStrategy::Static { tag },
            (None, Some(tag)) => CheckStrategy::Static { tag: tag.clone() },
            (None, None) => CheckStrategy::Semver,
        };

        let apply = if parameters.dry_run {
            ApplyMode::DryRun
        } else {
            ApplyMode::Live
        };

        TaggingStrategy { check, apply }
    }
}
