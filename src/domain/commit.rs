use crate::domain::version::BumpLevel;
use regex::Regex;

/// A commit as listed by the repository client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub sha: String,
    pub message: String,
}

impl CommitRecord {
    pub fn new(sha: impl Into<String>, message: impl Into<String>) -> Self {
        CommitRecord {
            sha: sha.into(),
            message: message.into(),
        }
    }
}

/// Bump intent carried by a single commit message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// `#wip`: cancels tagging for the whole range
    Suppress,
    /// `#major`
    Major,
    /// `#minor`
    Minor,
    /// `fix #n` / `fixes #n`: level depends on the issue's labels
    IssueRef(u64),
    /// Any other commit
    Patch,
}

impl Classification {
    /// Level implied without looking at issue labels.
    ///
    /// An issue reference counts as a patch until its labels say otherwise.
    pub fn base_level(&self) -> BumpLevel {
        match self {
            Classification::Suppress => BumpLevel::None,
            Classification::Major => BumpLevel::Major,
            Classification::Minor => BumpLevel::Minor,
            Classification::IssueRef(_) | Classification::Patch => BumpLevel::Patch,
        }
    }
}

fn has_marker(pattern: &str, message: &str) -> bool {
    Regex::new(pattern).is_ok_and(|re| re.is_match(message))
}

fn closed_issue(message: &str) -> Option<u64> {
    Regex::new(r"fix(?:es)? #(\d+)\b")
        .ok()
        .and_then(|re| re.captures(message))
        .and_then(|captures| captures.get(1))
        .and_then(|m| m.as_str().parse::<u64>().ok())
        .filter(|number| *number > 0)
}

/// Classify a commit message.
///
/// Markers are checked in priority order and the first match wins:
/// `#wip`, `#major`, `#minor`, then a `fix #n`/`fixes #n` issue reference.
/// Unmarked commits are patches.
pub fn classify_commit(message: &str) -> Classification {
    if has_marker(r"#wip\b", message) {
        return Classification::Suppress;
    }
    if has_marker(r"#major\b", message) {
        return Classification::Major;
    }
    if has_marker(r"#minor\b", message) {
        return Classification::Minor;
    }

    match closed_issue(message) {
        Some(number) => Classification::IssueRef(number),
        None => Classification::Patch,
    }
}
