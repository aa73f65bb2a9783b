use crate::domain::{BranchRef, CommitRecord, Tag};
use crate::error::{AutotagError, Result};
use crate::git::{CommitIter, RepositoryClient};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};

/// In-memory host for testing without a repository
///
/// Commits form parent chains; tags created through the client are
/// recorded so tests can assert on host mutation.
pub struct MockRepository {
    commits: HashMap<String, (CommitRecord, Option<String>)>,
    tags: RefCell<Vec<Tag>>,
    branch_heads: BTreeMap<String, String>,
    issues: HashMap<u64, Vec<String>>,
    issue_lookups: Cell<usize>,
    created: RefCell<Vec<Tag>>,
    unavailable: Option<String>,
}

impl MockRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        MockRepository {
            commits: HashMap::new(),
            tags: RefCell::new(Vec::new()),
            branch_heads: BTreeMap::new(),
            issues: HashMap::new(),
            issue_lookups: Cell::new(0),
            created: RefCell::new(Vec::new()),
            unavailable: None,
        }
    }

    /// Add a commit whose first parent is `parent`
    pub fn add_commit(&mut self, sha: &str, message: &str, parent: Option<&str>) {
        self.commits.insert(
            sha.to_string(),
            (CommitRecord::new(sha, message), parent.map(str::to_string)),
        );
    }

    /// Add a tag pointing at a commit
    pub fn add_tag(&mut self, name: impl Into<String>, sha: impl Into<String>) {
        self.tags.get_mut().push(Tag::new(name, sha));
    }

    /// Set a branch head
    pub fn set_branch_head(&mut self, branch: impl Into<String>, sha: impl Into<String>) {
        self.branch_heads.insert(branch.into(), sha.into());
    }

    /// Register an issue and its labels
    pub fn add_issue(&mut self, number: u64, labels: &[&str]) {
        self.issues
            .insert(number, labels.iter().map(|l| l.to_string()).collect());
    }

    /// Make every client call fail with the given message
    pub fn set_unavailable(&mut self, message: impl Into<String>) {
        self.unavailable = Some(message.into());
    }

    /// Tags created through [RepositoryClient::create_tag_ref]
    pub fn created_tags(&self) -> Vec<Tag> {
        self.created.borrow().clone()
    }

    /// Number of issue lookups served so far
    pub fn issue_lookups(&self) -> usize {
        self.issue_lookups.get()
    }

    fn check_available(&self) -> Result<()> {
        match &self.unavailable {
            Some(message) => Err(AutotagError::remote(message.clone())),
            None => Ok(()),
        }
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl RepositoryClient for MockRepository {
    fn list_tags(&self) -> Result<Vec<Tag>> {
        self.check_available()?;
        Ok(self.tags.borrow().clone())
    }

    fn matching_heads(&self, branch: &str) -> Result<Vec<BranchRef>> {
        self.check_available()?;
        Ok(self
            .branch_heads
            .iter()
            .filter(|(name, _)| name.starts_with(branch))
            .map(|(name, sha)| BranchRef::new(format!("refs/heads/{}", name), sha.clone()))
            .collect())
    }

    fn commits_from(&self, sha: &str, _hide: Option<&str>) -> Result<CommitIter<'_>> {
        self.check_available()?;
        if !self.commits.contains_key(sha) {
            return Err(AutotagError::remote(format!("No commit found for SHA: {}", sha)));
        }

        let mut next = Some(sha.to_string());
        Ok(Box::new(std::iter::from_fn(move || {
            let sha = next.take()?;
            let (commit, parent) = self.commits.get(&sha)?;
            next = parent.clone();
            Some(Ok(commit.clone()))
        })))
    }

    fn issue_labels(&self, issue_number: u64) -> Result<Vec<String>> {
        self.check_available()?;
        self.issue_lookups.set(self.issue_lookups.get() + 1);
        self.issues
            .get(&issue_number)
            .cloned()
            .ok_or_else(|| AutotagError::remote(format!("Issue #{} not found", issue_number)))
    }

    fn create_tag_ref(&self, name: &str, sha: &str, force: bool) -> Result<()> {
        self.check_available()?;
        let mut tags = self.tags.borrow_mut();
        match tags.iter().position(|tag| tag.name == name) {
            Some(_) if !force => {
                return Err(AutotagError::tag(format!("Reference already exists: {}", name)))
            }
            Some(index) => tags[index].sha = sha.to_string(),
            None => tags.push(Tag::new(name, sha)),
        }
        self.created.borrow_mut().push(Tag::new(name, sha));
        Ok(())
    }
}
