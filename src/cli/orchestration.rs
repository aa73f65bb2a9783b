//! Per-run release workflow
//!
//! Kept apart from `main.rs` so the whole decision can be driven
//! programmatically against any [`RepositoryClient`] and [`OutputSink`].

use chrono::{DateTime, Utc};
use tracing::info;

use crate::config::Parameters;
use crate::domain::{resolve_branch, TagCatalog};
use crate::error::Result;
use crate::git::RepositoryClient;
use crate::output::{OutputSink, NEW_TAG};
use crate::tagging::{check_semver, check_static, CheckOutcome, CheckStrategy, TaggingStrategy};

/// What a run decided and did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// The branch that was versioned
    pub branch: String,

    /// Newest release tag used as the base, semver runs only
    pub base_tag: Option<String>,

    /// The tag proposed by the check, if any
    pub new_tag: Option<String>,

    pub outcome: CheckOutcome,

    /// Whether the tag reference was actually created
    pub applied: bool,
}

/// Main release workflow
///
/// 1. Resolve the branch and its head
/// 2. Load the tag catalog
/// 3. Select the tagging strategy
/// 4. Check for a candidate tag and publish `new-tag`
/// 5. Create the tag unless this is a dry run
///
/// `trigger_ref` is the ref that started the run (`refs/heads/<branch>`);
/// a configured `branch` takes precedence over it.
pub fn run_release<C, O>(
    parameters: &Parameters,
    client: &C,
    trigger_ref: &str,
    now: DateTime<Utc>,
    outputs: &mut O,
) -> Result<RunReport>
where
    C: RepositoryClient + ?Sized,
    O: OutputSink + ?Sized,
{
    let branch = resolve_branch(client, parameters.branch.as_deref(), trigger_ref)?;
    info!(branch = %branch.name, head = %branch.head_sha, "branch resolved");

    let catalog = TagCatalog::fetch(client, &parameters.version_prefix)?;

    let strategy = TaggingStrategy::select(parameters, now);
    info!(check = ?strategy.check, apply = ?strategy.apply, "strategy selected");

    let (outcome, base_tag) = match &strategy.check {
        CheckStrategy::Static { tag } => (check_static(tag, parameters.force, &catalog), None),
        CheckStrategy::Semver => {
            let outcome = check_semver(client, parameters, &branch, &catalog, outputs)?;
            let base_tag = catalog
                .latest_release()
                .map(|tagged| tagged.tag.name.clone());
            (outcome, base_tag)
        }
    };

    let new_tag = outcome.candidate().map(str::to_string);
    outputs.set_output(NEW_TAG, new_tag.as_deref().unwrap_or_default())?;

    let applied = match &new_tag {
        Some(tag) => strategy
            .apply
            .apply(client, tag, &branch.head_sha, parameters.force)?,
        None => {
            info!(reason = %outcome, "nothing to tag");
            false
        }
    };

    Ok(RunReport {
        branch: branch.name,
        base_tag,
        new_tag,
        outcome,
        applied,
    })
}
