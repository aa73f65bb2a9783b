use crate::domain::{classify_commit, BumpLevel, Classification};
use crate::error::Result;
use crate::git::{CommitWalk, RepositoryClient};
use std::collections::HashMap;
use tracing::{debug, info};

/// Issue labels fetched on demand and kept for the rest of the run
pub struct IssueLabelCache<'c, C: RepositoryClient + ?Sized> {
    client: &'c C,
    labels: HashMap<u64, Vec<String>>,
}

impl<'c, C: RepositoryClient + ?Sized> IssueLabelCache<'c, C> {
    pub fn new(client: &'c C) -> Self {
        IssueLabelCache {
            client,
            labels: HashMap::new(),
        }
    }

    /// Labels of an issue, fetched on first use
    pub fn labels(&mut self, issue_number: u64) -> Result<&[String]> {
        if !self.labels.contains_key(&issue_number) {
            let labels = self.client.issue_labels(issue_number)?;
            debug!(issue = issue_number, ?labels, "issue labels loaded");
            self.labels.insert(issue_number, labels);
        }

        Ok(self
            .labels
            .get(&issue_number)
            .map(Vec::as_slice)
            .unwrap_or_default())
    }
}

/// Fold per-commit classifications into one bump level.
///
/// A `#wip` anywhere cancels the whole range. Otherwise `#major` beats
/// `#minor`, and issue references are upgraded to minor when one of their
/// labels is in `allowlist`. An empty range yields [`BumpLevel::None`].
pub fn aggregate<C: RepositoryClient + ?Sized>(
    classifications: impl IntoIterator<Item = Classification>,
    labels: &mut IssueLabelCache<'_, C>,
    allowlist: &[String],
) -> Result<BumpLevel> {
    let classifications: Vec<Classification> = classifications.into_iter().collect();

    if classifications.contains(&Classification::Suppress) {
        return Ok(BumpLevel::None);
    }
    if classifications.contains(&Classification::Major) {
        return Ok(BumpLevel::Major);
    }
    if classifications.contains(&Classification::Minor) {
        return Ok(BumpLevel::Minor);
    }

    let mut level = BumpLevel::None;
    for classification in classifications {
        match classification {
            Classification::IssueRef(number) if level < BumpLevel::Minor => {
                let enhances = labels
                    .labels(number)?
                    .iter()
                    .any(|label| allowlist.contains(label));
                if enhances {
                    info!(issue = number, "found enhancement issue");
                    level = BumpLevel::Minor;
                } else {
                    level = level.max(BumpLevel::Patch);
                }
            }
            other => level = level.max(other.base_level()),
        }
    }

    Ok(level)
}

/// Analyzes the commits of a range to determine its bump level
pub struct BumpAnalyzer {
    allowlist: Vec<String>,
}

impl BumpAnalyzer {
    /// Create an analyzer upgrading issues with any of these labels to minor
    pub fn new(allowlist: Vec<String>) -> Self {
        BumpAnalyzer { allowlist }
    }

    /// Walk from `head_sha` back to (not including) `stop_sha` and decide.
    ///
    /// The walk ends early at the first `#wip` commit since nothing after
    /// it can change the outcome.
    pub fn analyze_range<C: RepositoryClient + ?Sized>(
        &self,
        client: &C,
        head_sha: &str,
        stop_sha: Option<&str>,
    ) -> Result<BumpLevel> {
        let mut classifications = Vec::new();

        for commit in CommitWalk::new(client, head_sha, stop_sha)? {
            let commit = commit?;
            let classification = classify_commit(&commit.message);
            debug!(sha = %commit.sha, ?classification, "classified commit");

            if classification == Classification::Suppress {
                info!(sha = %commit.sha, "work in progress commit found");
                return Ok(BumpLevel::None);
            }
            classifications.push(classification);
        }

        debug!(commits = classifications.len(), "commit range analyzed");

        let mut labels = IssueLabelCache::new(client);
        aggregate(classifications, &mut labels, &self.allowlist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MockRepository;

    fn allowlist() -> Vec<String> {
        vec!["enhancement".to_string()]
    }

    fn aggregate_with(
        repo: &MockRepository,
        classifications: Vec<Classification>,
    ) -> BumpLevel {
        let mut labels = IssueLabelCache::new(repo);
        aggregate(classifications, &mut labels, &allowlist()).unwrap()
    }

    #[test]
    fn test_issue_without_allowed_label_is_patch() {
        let mut repo = MockRepository::new();
        repo.add_issue(5, &["bug"]);
        let level = aggregate_with(
            &repo,
            vec![Classification::Patch, Classification::IssueRef(5)],
        );
        assert_eq!(level, BumpLevel::Patch);
    }

    #[test]
    fn test_issue_with_allowed_label_is_minor() {
        let mut repo = MockRepository::new();
        repo.add_issue(5, &["enhancement"]);
        let level = aggregate_with(
            &repo,
            vec![Classification::Patch, Classification::IssueRef(5)],
        );
        assert_eq!(level, BumpLevel::Minor);
    }

    #[test]
    fn test_major_wins_regardless_of_order() {
        let repo = MockRepository::new();
        assert_eq!(
            aggregate_with(&repo, vec![Classification::Major, Classification::Minor]),
            BumpLevel::Major
        );
        assert_eq!(
            aggregate_with(&repo, vec![Classification::Minor, Classification::Major]),
            BumpLevel::Major
        );
    }

    #[test]
    fn test_minor_skips_issue_lookups() {
        let mut repo = MockRepository::new();
        repo.add_issue(5, &["bug"]);
        let level = aggregate_with(
            &repo,
            vec![Classification::IssueRef(5), Classification::Minor],
        );
        assert_eq!(level, BumpLevel::Minor);
        assert_eq!(repo.issue_lookups(), 0);
    }

    #[test]
    fn test_empty_range_is_none() {
        let repo = MockRepository::new();
        assert_eq!(aggregate_with(&repo, vec![]), BumpLevel::None);
    }

    #[test]
    fn test_suppress_cancels_everything() {
        let repo = MockRepository::new();
        let level = aggregate_with(
            &repo,
            vec![Classification::Major, Classification::Suppress],
        );
        assert_eq!(level, BumpLevel::None);
    }

    #[test]
    fn test_issue_labels_are_cached() {
        let mut repo = MockRepository::new();
        repo.add_issue(9, &["documentation"]);
        let level = aggregate_with(
            &repo,
            vec![
                Classification::IssueRef(9),
                Classification::IssueRef(9),
                Classification::IssueRef(9),
            ],
        );
        assert_eq!(level, BumpLevel::Patch);
        assert_eq!(repo.issue_lookups(), 1);
    }

    #[test]
    fn test_missing_issue_is_an_error() {
        let repo = MockRepository::new();
        let mut labels = IssueLabelCache::new(&repo);
        let result = aggregate(vec![Classification::IssueRef(77)], &mut labels, &allowlist());
        assert!(result.is_err());
    }

    fn history(messages: &[&str]) -> MockRepository {
        let mut repo = MockRepository::new();
        let mut parent: Option<String> = None;
        for (i, message) in messages.iter().enumerate() {
            let sha = format!("c{}", i);
            repo.add_commit(&sha, message, parent.as_deref());
            parent = Some(sha);
        }
        repo
    }

    #[test]
    fn test_analyze_range_excludes_stop_commit() {
        // the #major commit is the previous release and must not count
        let repo = history(&["#major rewrite", "small fix", "tidy up"]);
        let analyzer = BumpAnalyzer::new(allowlist());
        let level = analyzer.analyze_range(&repo, "c2", Some("c0")).unwrap();
        assert_eq!(level, BumpLevel::Patch);
    }

    #[test]
    fn test_analyze_range_full_history() {
        let repo = history(&["initial", "feature #minor", "fix"]);
        let analyzer = BumpAnalyzer::new(allowlist());
        assert_eq!(
            analyzer.analyze_range(&repo, "c2", None).unwrap(),
            BumpLevel::Minor
        );
    }

    #[test]
    fn test_analyze_range_wip_blocks() {
        let repo = history(&["initial", "#major api", "#wip half done"]);
        let analyzer = BumpAnalyzer::new(allowlist());
        assert_eq!(
            analyzer.analyze_range(&repo, "c2", Some("c0")).unwrap(),
            BumpLevel::None
        );
    }

    #[test]
    fn test_analyze_range_head_is_stop() {
        let repo = history(&["initial"]);
        let analyzer = BumpAnalyzer::new(allowlist());
        assert_eq!(
            analyzer.analyze_range(&repo, "c0", Some("c0")).unwrap(),
            BumpLevel::None
        );
    }

    #[test]
    fn test_analyze_range_resolves_issue_labels() {
        let mut repo = history(&["initial", "fixes #12 crash on start"]);
        repo.add_issue(12, &["bug", "enhancement"]);
        let analyzer = BumpAnalyzer::new(allowlist());
        assert_eq!(
            analyzer.analyze_range(&repo, "c1", Some("c0")).unwrap(),
            BumpLevel::Minor
        );
    }
}
