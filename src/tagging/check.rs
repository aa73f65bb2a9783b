use super::CheckOutcome;
use crate::analyzer::BumpAnalyzer;
use crate::boundary::SkipReason;
use crate::config::Parameters;
use crate::domain::version::initial_version;
use crate::domain::{compute_next, BranchPrerelease, BranchRef, BumpLevel, TagCatalog};
use crate::error::Result;
use crate::git::RepositoryClient;
use crate::output::{OutputSink, TAG};
use tracing::{debug, info, warn};

/// Validate a fixed tag name against the catalog.
///
/// An existing tag is a collision unless `force` is set, in which case it
/// is proposed again and the apply step moves it.
pub fn check_static(tag: &str, force: bool, catalog: &TagCatalog) -> CheckOutcome {
    if catalog.exists(tag) {
        if !force {
            info!(tag, "tag already exists");
            return CheckOutcome::Skipped(SkipReason::TagCollision {
                tag: tag.to_string(),
            });
        }
        warn!(tag, "tag already exists, forcing");
    }

    CheckOutcome::Candidate(tag.to_string())
}

/// Whether the head already carries a version this branch would produce.
///
/// That is the newest version tag, or for a non-release branch any of its
/// own pre-release tags.
fn head_tag<'c>(
    catalog: &'c TagCatalog,
    branch: &BranchRef,
    is_release: bool,
) -> Option<&'c str> {
    if let Some(latest) = catalog.latest_any() {
        if latest.tag.sha == branch.head_sha {
            return Some(latest.tag.name.as_str());
        }
    }

    if is_release {
        return None;
    }

    let identifier = BranchPrerelease::for_branch(&branch.name).identifier;
    catalog
        .versioned()
        .iter()
        .filter(|tagged| tagged.tag.sha == branch.head_sha)
        .find(|tagged| {
            BranchPrerelease::parse(&tagged.version).is_some_and(|pre| pre.identifier == identifier)
        })
        .map(|tagged| tagged.tag.name.as_str())
}

/// Compute the next semantic version tag for `branch`.
///
/// The base is the newest release tag (`0.0.0` without one) and is
/// published as the `tag` output before anything can skip. Commits are
/// analyzed from the head back to, not including, the base tag's commit.
pub fn check_semver<C, O>(
    client: &C,
    parameters: &Parameters,
    branch: &BranchRef,
    catalog: &TagCatalog,
    outputs: &mut O,
) -> Result<CheckOutcome>
where
    C: RepositoryClient + ?Sized,
    O: OutputSink + ?Sized,
{
    let latest_release = catalog.latest_release();
    let latest_any = catalog.latest_any();
    debug!(
        latest_release = latest_release.map(|t| t.tag.name.as_str()),
        latest_any = latest_any.map(|t| t.tag.name.as_str()),
        "latest tags"
    );

    let base = latest_release
        .map(|tagged| tagged.version.clone())
        .unwrap_or_else(initial_version);
    let base_name = latest_release
        .map(|tagged| tagged.tag.name.clone())
        .unwrap_or_else(|| base.to_string());
    outputs.set_output(TAG, &base_name)?;

    let is_release = parameters.release_branches.is_release_branch(&branch.name);
    info!(branch = %branch.name, is_release, base = %base, "computing next version");

    if let Some(tag) = head_tag(catalog, branch, is_release) {
        return Ok(CheckOutcome::Skipped(SkipReason::HeadAlreadyTagged {
            tag: tag.to_string(),
            head_sha: branch.head_sha.clone(),
        }));
    }

    let analyzer = BumpAnalyzer::new(parameters.issue_labels.clone());
    let mut level = analyzer.analyze_range(
        client,
        &branch.head_sha,
        latest_release.map(|tagged| tagged.tag.sha.as_str()),
    )?;

    if level == BumpLevel::None {
        return Ok(CheckOutcome::Skipped(SkipReason::NoQualifyingChange));
    }
    if is_release {
        level = level.max(parameters.bump);
    }
    info!(level = %level, "bump level decided");

    let Some(next) = compute_next(&base, level, is_release, &branch.name, catalog.versions())?
    else {
        return Ok(CheckOutcome::Skipped(SkipReason::NoQualifyingChange));
    };

    let candidate = format!("{}{}", parameters.version_prefix, next);
    Ok(check_static(&candidate, parameters.force, catalog))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::branch::ReleaseBranches;
    use crate::git::MockRepository;
    use crate::output::RecordedOutputs;

    fn catalog(repo: &MockRepository) -> TagCatalog {
        TagCatalog::fetch(repo, "").unwrap()
    }

    /// c0 <- c1 <- ... with one commit per message
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

    fn run(
        repo: &MockRepository,
        parameters: &Parameters,
        branch: &str,
        head: &str,
    ) -> (CheckOutcome, RecordedOutputs) {
        let mut outputs = RecordedOutputs::new();
        let outcome = check_semver(
            repo,
            parameters,
            &BranchRef::new(branch, head),
            &catalog(repo),
            &mut outputs,
        )
        .unwrap();
        (outcome, outputs)
    }

    #[test]
    fn test_static_collision_without_force() {
        let mut repo = MockRepository::new();
        repo.add_tag("v2.0.0", "c0");
        assert_eq!(
            check_static("v2.0.0", false, &catalog(&repo)),
            CheckOutcome::Skipped(SkipReason::TagCollision {
                tag: "v2.0.0".to_string()
            })
        );
    }

    #[test]
    fn test_static_collision_with_force() {
        let mut repo = MockRepository::new();
        repo.add_tag("v2.0.0", "c0");
        assert_eq!(
            check_static("v2.0.0", true, &catalog(&repo)),
            CheckOutcome::Candidate("v2.0.0".to_string())
        );
    }

    #[test]
    fn test_static_new_tag() {
        let repo = MockRepository::new();
        assert_eq!(
            check_static("20240305", false, &catalog(&repo)),
            CheckOutcome::Candidate("20240305".to_string())
        );
    }

    #[test]
    fn test_empty_catalog_release_branch() {
        let repo = history(&["initial commit"]);
        let (outcome, outputs) = run(&repo, &Parameters::default(), "main", "c0");
        assert_eq!(outcome, CheckOutcome::Candidate("0.0.1".to_string()));
        assert_eq!(outputs.get(TAG), Some("0.0.0"));
    }

    #[test]
    fn test_feature_branch_prerelease() {
        let mut repo = history(&["release", "candidate", "add api #minor"]);
        repo.add_tag("1.0.0", "c0");
        repo.add_tag("1.1.0-rc.1", "c1");

        let (outcome, outputs) = run(&repo, &Parameters::default(), "feature/x", "c2");
        assert_eq!(
            outcome,
            CheckOutcome::Candidate("1.1.0-feature-x.0".to_string())
        );
        assert_eq!(outputs.get(TAG), Some("1.0.0"));
    }

    #[test]
    fn test_feature_branch_counter_continues() {
        let mut repo = history(&["release", "add api #minor", "more work"]);
        repo.add_tag("1.0.0", "c0");
        repo.add_tag("1.1.0-feature-x.0", "c1");

        let (outcome, _) = run(&repo, &Parameters::default(), "feature/x", "c2");
        assert_eq!(
            outcome,
            CheckOutcome::Candidate("1.1.0-feature-x.1".to_string())
        );
    }

    #[test]
    fn test_head_already_tagged() {
        let mut repo = history(&["initial", "fix"]);
        repo.add_tag("0.0.1", "c1");

        let (outcome, outputs) = run(&repo, &Parameters::default(), "main", "c1");
        assert_eq!(
            outcome,
            CheckOutcome::Skipped(SkipReason::HeadAlreadyTagged {
                tag: "0.0.1".to_string(),
                head_sha: "c1".to_string()
            })
        );
        assert_eq!(outputs.get(TAG), Some("0.0.1"));
    }

    #[test]
    fn test_branch_prerelease_at_head_is_not_retagged() {
        let mut repo = history(&["release", "add api #minor"]);
        repo.add_tag("1.0.0", "c0");
        repo.add_tag("1.1.0-feature-x.0", "c1");
        repo.add_tag("1.1.0-rc.1", "c0");

        let (outcome, _) = run(&repo, &Parameters::default(), "feature/x", "c1");
        assert!(matches!(
            outcome,
            CheckOutcome::Skipped(SkipReason::HeadAlreadyTagged { .. })
        ));
    }

    #[test]
    fn test_wip_blocks_release() {
        let mut repo = history(&["initial", "#major change", "#wip"]);
        repo.add_tag("1.0.0", "c0");

        let (outcome, _) = run(&repo, &Parameters::default(), "main", "c2");
        assert_eq!(
            outcome,
            CheckOutcome::Skipped(SkipReason::NoQualifyingChange)
        );
    }

    #[test]
    fn test_default_bump_is_floor_on_release_branch() {
        let mut repo = history(&["initial", "fix typo"]);
        repo.add_tag("1.0.0", "c0");
        let parameters = Parameters {
            bump: BumpLevel::Minor,
            ..Parameters::default()
        };

        let (outcome, _) = run(&repo, &parameters, "main", "c1");
        assert_eq!(outcome, CheckOutcome::Candidate("1.1.0".to_string()));

        let (outcome, _) = run(&repo, &parameters, "topic", "c1");
        assert_eq!(
            outcome,
            CheckOutcome::Candidate("1.0.1-topic.0".to_string())
        );
    }

    #[test]
    fn test_version_prefix_applied() {
        let mut repo = history(&["initial", "#major rework"]);
        repo.add_tag("v1.4.2", "c0");
        let parameters = Parameters {
            version_prefix: "v".to_string(),
            release_branches: ReleaseBranches::parse("^release/.*$").unwrap(),
            ..Parameters::default()
        };

        let (outcome, outputs) = run(&repo, &parameters, "release/2", "c1");
        assert_eq!(outcome, CheckOutcome::Candidate("v2.0.0".to_string()));
        assert_eq!(outputs.get(TAG), Some("v1.4.2"));
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let mut repo = history(&["initial", "fix"]);
        repo.add_tag("0.0.1", "c1");
        let parameters = Parameters::default();

        let first = run(&repo, &parameters, "main", "c1").0;
        let second = run(&repo, &parameters, "main", "c1").0;
        assert!(first.candidate().is_none());
        assert_eq!(first, second);
    }
}
