use crate::error::Result;
use crate::git::RepositoryClient;
use tracing::info;

/// Whether a candidate tag is created or only reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyMode {
    DryRun,
    Live,
}

impl ApplyMode {
    /// Create `tag` at `head_sha`, returning whether the host was changed.
    ///
    /// With `force` an existing tag of that name is moved.
    pub fn apply<C: RepositoryClient + ?Sized>(
        &self,
        client: &C,
        tag: &str,
        head_sha: &str,
        force: bool,
    ) -> Result<bool> {
        match self {
            ApplyMode::DryRun => {
                info!(tag, sha = head_sha, "dry run, tag not created");
                Ok(false)
            }
            ApplyMode::Live => {
                client.create_tag_ref(tag, head_sha, force)?;
                info!(tag, sha = head_sha, "tag created");
                Ok(true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MockRepository;

    #[test]
    fn test_dry_run_does_not_touch_repository() {
        let repo = MockRepository::new();
        let applied = ApplyMode::DryRun.apply(&repo, "v1.0.0", "c0", false).unwrap();
        assert!(!applied);
        assert!(repo.created_tags().is_empty());
    }

    #[test]
    fn test_live_creates_tag() {
        let repo = MockRepository::new();
        let applied = ApplyMode::Live.apply(&repo, "v1.0.0", "c0", false).unwrap();
        assert!(applied);

        let created = repo.created_tags();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].name, "v1.0.0");
        assert_eq!(created[0].sha, "c0");
    }

    #[test]
    fn test_live_existing_tag_needs_force() {
        let mut repo = MockRepository::new();
        repo.add_tag("v1.0.0", "c0");
        assert!(ApplyMode::Live.apply(&repo, "v1.0.0", "c1", false).is_err());
        assert!(ApplyMode::Live.apply(&repo, "v1.0.0", "c1", true).unwrap());
    }
}
