//! Branch-scoped pre-release identifiers
//!
//! Versions cut from a non-release branch carry a pre-release of the form
//! `<branch-id>.<counter>`, e.g. `1.1.0-feature-x.0`. The branch id makes
//! versions from different branches distinct; the counter grows with every
//! tag a branch cuts for the same release.

use semver::Version;
use std::fmt;

/// Pre-release identifier derived from a branch name, with its counter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchPrerelease {
    /// Sanitized branch name, valid as a semver identifier
    pub identifier: String,
    /// Counter within one release and branch
    pub counter: u64,
}

impl BranchPrerelease {
    /// Build the first pre-release (counter 0) for a branch.
    ///
    /// Every character outside `[0-9A-Za-z-]` becomes `-`. A purely numeric
    /// result is prefixed with `branch-` since semver forbids leading zeros
    /// in numeric identifiers.
    pub fn for_branch(branch_name: &str) -> Self {
        let mut identifier: String = branch_name
            .trim()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' {
                    c
                } else {
                    '-'
                }
            })
            .collect();

        if identifier.is_empty() || identifier.chars().all(|c| c.is_ascii_digit()) {
            identifier = format!("branch-{}", identifier);
        }

        BranchPrerelease {
            identifier,
            counter: 0,
        }
    }

    /// Parse `<identifier>.<counter>` back from a version's pre-release.
    ///
    /// Returns `None` for pre-releases that were not cut by a branch.
    pub fn parse(version: &Version) -> Option<Self> {
        let (identifier, counter) = version.pre.as_str().split_once('.')?;
        let counter = counter.parse::<u64>().ok()?;

        Some(BranchPrerelease {
            identifier: identifier.to_string(),
            counter,
        })
    }

    /// The pre-release following every one of `existing` cut by this branch.
    ///
    /// `existing` should hold the versions sharing the release being
    /// computed; pre-releases of other branches are ignored.
    pub fn after<'a>(&self, existing: impl IntoIterator<Item = &'a Version>) -> Self {
        let counter = existing
            .into_iter()
            .filter_map(BranchPrerelease::parse)
            .filter(|pre| pre.identifier == self.identifier)
            .map(|pre| pre.counter + 1)
            .max()
            .unwrap_or(0);

        BranchPrerelease {
            identifier: self.identifier.clone(),
            counter,
        }
    }
}

impl fmt::Display for BranchPrerelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.identifier, self.counter)
    }
}
