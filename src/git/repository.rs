use crate::domain::{BranchRef, CommitRecord, Tag};
use crate::error::{AutotagError, Result};
use crate::git::{CommitIter, RepositoryClient};
use git2::{Oid, Repository as Git2Repo};
use std::path::Path;
use tracing::{debug, info};

/// A local clone used as the host.
///
/// Created tags are written to the clone and, when a remote is configured,
/// pushed to it. A plain git repository has no issue tracker, so every
/// issue reports no labels.
pub struct Git2Repository {
    repo: Git2Repo,
    remote: Option<String>,
    token: Option<String>,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Git2Repository {
            repo,
            remote: None,
            token: None,
        })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository {
            repo,
            remote: None,
            token: None,
        }
    }

    /// Push created tags to `remote`, authenticating with `token` over HTTPS
    pub fn with_remote(mut self, remote: impl Into<String>, token: Option<String>) -> Self {
        self.remote = Some(remote.into());
        self.token = token;
        self
    }

    /// Full name of the checked out branch, e.g. `refs/heads/main`
    pub fn current_ref(&self) -> Result<String> {
        let head = self.repo.head()?;
        if !head.is_branch() {
            return Err(AutotagError::config(
                "HEAD is detached - pass the branch with --ref or the branch input",
            ));
        }

        head.name()
            .map(str::to_string)
            .ok_or_else(|| AutotagError::config("HEAD reference name is not valid UTF-8"))
    }

    fn push_tag(&self, remote_name: &str, name: &str, force: bool) -> Result<()> {
        let mut remote = self
            .repo
            .find_remote(remote_name)
            .map_err(|e| AutotagError::remote(format!("Cannot find remote: {}", e)))?;

        let mut callbacks = git2::RemoteCallbacks::new();
        let token = self.token.clone();
        callbacks.credentials(move |_url, username_from_url, allowed_types| {
            if let Some(token) = token.as_deref() {
                if allowed_types.contains(git2::CredentialType::USER_PASS_PLAINTEXT) {
                    return git2::Cred::userpass_plaintext("x-access-token", token);
                }
            }

            if allowed_types.contains(git2::CredentialType::SSH_KEY) {
                return git2::Cred::ssh_key_from_agent(username_from_url.unwrap_or("git"));
            }

            git2::Cred::default()
        });

        // the remote's verdict on each ref only arrives through this callback
        callbacks.push_update_reference(|refname, status| match status {
            Some(message) => Err(git2::Error::from_str(&format!(
                "{} rejected: {}",
                refname, message
            ))),
            None => Ok(()),
        });

        let mut push_options = git2::PushOptions::new();
        push_options.remote_callbacks(callbacks);

        let refspec = format!(
            "{}refs/tags/{}:refs/tags/{}",
            if force { "+" } else { "" },
            name,
            name
        );

        remote
            .push(&[refspec.as_str()], Some(&mut push_options))
            .map_err(|e| AutotagError::remote(format!("Push failed: {}", e)))?;

        info!(tag = name, remote = remote_name, "pushed tag");
        Ok(())
    }

    fn head_ref(&self, reference: &git2::Reference<'_>) -> Result<Option<String>> {
        match reference.peel_to_commit() {
            Ok(commit) => Ok(Some(commit.id().to_string())),
            Err(e) if e.code() == git2::ErrorCode::Peel => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl RepositoryClient for Git2Repository {
    fn list_tags(&self) -> Result<Vec<Tag>> {
        let names = self.repo.tag_names(None)?;
        let mut tags = Vec::new();

        for name in names.iter().flatten() {
            let reference = self.repo.find_reference(&format!("refs/tags/{}", name))?;
            // annotated tags are peeled to the commit they mark
            match reference.peel_to_commit() {
                Ok(commit) => tags.push(Tag::new(name, commit.id().to_string())),
                Err(e) => debug!(tag = name, error = %e, "skipping tag without a commit"),
            }
        }

        Ok(tags)
    }

    fn matching_heads(&self, branch: &str) -> Result<Vec<BranchRef>> {
        let mut heads = Vec::new();

        for reference in self.repo.references()? {
            let reference = reference?;
            let Some(full_name) = reference.name() else {
                continue;
            };
            if !full_name.starts_with(&format!("refs/heads/{}", branch)) {
                continue;
            }
            if let Some(sha) = self.head_ref(&reference)? {
                heads.push(BranchRef::new(full_name, sha));
            }
        }

        // CI checkouts often carry only remote-tracking branches
        if let Some(remote) = &self.remote {
            let tracking_prefix = format!("refs/remotes/{}/", remote);
            for reference in self.repo.references()? {
                let reference = reference?;
                let Some(name) = reference
                    .name()
                    .and_then(|n| n.strip_prefix(&tracking_prefix))
                else {
                    continue;
                };
                let full_name = format!("refs/heads/{}", name);
                if name.starts_with(branch) && !heads.iter().any(|h| h.name == full_name) {
                    if let Some(sha) = self.head_ref(&reference)? {
                        heads.push(BranchRef::new(full_name, sha));
                    }
                }
            }
        }

        Ok(heads)
    }

    fn commits_from(&self, sha: &str, hide: Option<&str>) -> Result<CommitIter<'_>> {
        let oid = Oid::from_str(sha)?;
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(git2::Sort::TOPOLOGICAL | git2::Sort::TIME)?;
        revwalk.push(oid)?;
        if let Some(hide) = hide {
            revwalk.hide(Oid::from_str(hide)?)?;
        }

        Ok(Box::new(revwalk.map(move |oid_result| -> Result<CommitRecord> {
            let oid = oid_result?;
            let commit = self.repo.find_commit(oid)?;
            let message = commit.message().unwrap_or("(empty message)").to_string();

            Ok(CommitRecord::new(oid.to_string(), message))
        })))
    }

    fn issue_labels(&self, issue_number: u64) -> Result<Vec<String>> {
        debug!(issue = issue_number, "no issue tracker for a local repository");
        Ok(Vec::new())
    }

    fn create_tag_ref(&self, name: &str, sha: &str, force: bool) -> Result<()> {
        let object = self
            .repo
            .find_object(Oid::from_str(sha)?, None)
            .map_err(|e| AutotagError::tag(format!("Cannot find object: {}", e)))?;

        self.repo
            .tag_lightweight(name, &object, force)
            .map_err(|e| AutotagError::tag(format!("Cannot create tag: {}", e)))?;

        if let Some(remote) = &self.remote {
            self.push_tag(remote, name, force)?;
        }

        Ok(())
    }
}
