use crate::error::{AutotagError, Result};
use crate::git::RepositoryClient;
use regex::Regex;
use tracing::{debug, info};

/// Patterns used when no release branches are configured
pub const DEFAULT_RELEASE_BRANCHES: &str = "^main$,^master$";

/// A branch head being versioned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchRef {
    pub name: String,
    pub head_sha: String,
}

impl BranchRef {
    pub fn new(name: impl Into<String>, head_sha: impl Into<String>) -> Self {
        BranchRef {
            name: name.into(),
            head_sha: head_sha.into(),
        }
    }
}

/// Compiled list of release branch patterns.
///
/// A branch is a release branch when any pattern matches its name.
#[derive(Debug, Clone)]
pub struct ReleaseBranches {
    patterns: Vec<Regex>,
}

impl ReleaseBranches {
    /// Compile a comma-separated list of regular expressions
    pub fn parse(list: &str) -> Result<Self> {
        let patterns = list
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(Regex::new)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(ReleaseBranches { patterns })
    }

    pub fn is_release_branch(&self, branch_name: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(branch_name))
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(Regex::as_str)
    }
}

impl Default for ReleaseBranches {
    fn default() -> Self {
        let patterns = DEFAULT_RELEASE_BRANCHES
            .split(',')
            .filter_map(|p| Regex::new(p).ok())
            .collect();
        ReleaseBranches { patterns }
    }
}

/// Check a branch name against a raw comma-separated pattern list
pub fn is_release_branch(branch_name: &str, pattern_list: &str) -> Result<bool> {
    Ok(ReleaseBranches::parse(pattern_list)?.is_release_branch(branch_name))
}

/// Branch name carried by a `refs/heads/...` trigger ref
pub fn branch_from_ref(trigger_ref: &str) -> &str {
    trigger_ref
        .strip_prefix("refs/heads/")
        .unwrap_or(trigger_ref)
}

/// Resolve the branch being versioned.
///
/// A forced branch wins over the triggering ref. The client's head lookup
/// is prefix based, so only the exact `refs/heads/<name>` match is taken.
pub fn resolve_branch<C: RepositoryClient + ?Sized>(
    client: &C,
    forced_branch: Option<&str>,
    trigger_ref: &str,
) -> Result<BranchRef> {
    let forced = forced_branch.map(str::trim).filter(|b| !b.is_empty());
    let name = match forced {
        Some(branch) => branch,
        None => branch_from_ref(trigger_ref.trim()),
    };

    info!(branch = name, forced = forced.is_some(), "check branch");

    if name.is_empty() {
        return Err(AutotagError::branch_not_found(name, forced.is_some()));
    }

    let full_ref = format!("refs/heads/{}", name);
    let heads = client.matching_heads(name)?;
    debug!(candidates = heads.len(), "matching heads listed");

    heads
        .into_iter()
        .find(|head| head.name == full_ref || head.name == name)
        .map(|head| BranchRef::new(name, head.head_sha))
        .ok_or_else(|| AutotagError::branch_not_found(name, forced.is_some()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MockRepository;

    const PATTERNS: &str = "^release/.*$,^master$";

    #[test]
    fn test_release_branch_matches() {
        assert!(is_release_branch("release/1.2", PATTERNS).unwrap());
        assert!(is_release_branch("master", PATTERNS).unwrap());
    }

    #[test]
    fn test_non_release_branch() {
        assert!(!is_release_branch("feature/x", PATTERNS).unwrap());
        assert!(!is_release_branch("main", PATTERNS).unwrap());
    }

    #[test]
    fn test_patterns_are_trimmed_and_blank_entries_ignored() {
        let branches = ReleaseBranches::parse(" ^main$ , ,^dev.*").unwrap();
        let patterns: Vec<&str> = branches.patterns().collect();
        assert_eq!(patterns, vec!["^main$", "^dev.*"]);
        assert!(branches.is_release_branch("develop"));
    }

    #[test]
    fn test_patterns_are_unanchored() {
        assert!(is_release_branch("hotfix/release-2", "release").unwrap());
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(ReleaseBranches::parse("^release/(.*$").is_err());
    }

    #[test]
    fn test_default_release_branches() {
        let branches = ReleaseBranches::default();
        assert!(branches.is_release_branch("main"));
        assert!(branches.is_release_branch("master"));
        assert!(!branches.is_release_branch("maintenance"));
        let parsed = ReleaseBranches::parse(DEFAULT_RELEASE_BRANCHES).unwrap();
        assert_eq!(
            parsed.patterns().collect::<Vec<_>>(),
            branches.patterns().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_branch_from_ref() {
        assert_eq!(branch_from_ref("refs/heads/feature/x"), "feature/x");
        assert_eq!(branch_from_ref("main"), "main");
    }

    #[test]
    fn test_resolve_contextual_branch() {
        let mut repo = MockRepository::new();
        repo.set_branch_head("feature/x", "abc");
        let branch = resolve_branch(&repo, None, "refs/heads/feature/x").unwrap();
        assert_eq!(branch, BranchRef::new("feature/x", "abc"));
    }

    #[test]
    fn test_resolve_forced_branch_wins() {
        let mut repo = MockRepository::new();
        repo.set_branch_head("main", "m1");
        repo.set_branch_head("release/2", "r2");
        let branch = resolve_branch(&repo, Some(" release/2 "), "refs/heads/main").unwrap();
        assert_eq!(branch, BranchRef::new("release/2", "r2"));
    }

    #[test]
    fn test_resolve_ignores_prefix_matches() {
        let mut repo = MockRepository::new();
        repo.set_branch_head("main-old", "old");
        let err = resolve_branch(&repo, None, "refs/heads/main").unwrap_err();
        assert!(matches!(
            err,
            AutotagError::BranchNotFound { forced: false, .. }
        ));
    }

    #[test]
    fn test_resolve_unknown_forced_branch() {
        let repo = MockRepository::new();
        let err = resolve_branch(&repo, Some("nope"), "refs/heads/main").unwrap_err();
        assert_eq!(err.to_string(), "unknown forced branch nope provided");
    }
}
