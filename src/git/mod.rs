//! Repository client abstraction
//!
//! The decision core reaches the hosting platform only through the
//! [RepositoryClient] trait. The concrete implementations are:
//!
//! - [repository::Git2Repository]: a local clone read through `git2`, with
//!   optional pushing of created tags to a remote
//! - [mock::MockRepository]: an in-memory host for testing
//!
//! ```rust
//! # use autotag::git::RepositoryClient;
//! # fn example<C: RepositoryClient>(client: &C) -> autotag::Result<()> {
//! for commit in client.commits_from("4b825dc6", None)? {
//!     println!("{}", commit?.message);
//! }
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::domain::{BranchRef, CommitRecord, Tag};
use crate::error::Result;

/// Lazily listed commits, most recent first
pub type CommitIter<'a> = Box<dyn Iterator<Item = Result<CommitRecord>> + 'a>;

/// Operations the hosting platform has to provide
///
/// All calls are blocking; any error is fatal for the run and is passed up
/// unchanged.
pub trait RepositoryClient {
    /// List all tags with the commit each one points at
    fn list_tags(&self) -> Result<Vec<Tag>>;

    /// List branch heads whose name starts with `branch`
    ///
    /// Returned names are full refs (`refs/heads/<name>`).
    fn matching_heads(&self, branch: &str) -> Result<Vec<BranchRef>>;

    /// List commits reachable from `sha`, most recent first
    ///
    /// Commits reachable from `hide` are left out, so history merged in
    /// after `hide` is still listed even when it forked before it.
    fn commits_from(&self, sha: &str, hide: Option<&str>) -> Result<CommitIter<'_>>;

    /// Get the label names of an issue
    fn issue_labels(&self, issue_number: u64) -> Result<Vec<String>>;

    /// Create a tag reference at `sha`
    ///
    /// With `force`, an existing tag of the same name is moved.
    fn create_tag_ref(&self, name: &str, sha: &str, force: bool) -> Result<()>;
}

/// Walks history backward from a start commit, stopping strictly before
/// the stop commit.
///
/// The client is asked to hide everything reachable from the stop commit;
/// the stop check covers clients that can only list a first-parent chain.
///
/// The walk is lazy and can only be consumed once. It ends for good after
/// the stop commit or the first error.
pub struct CommitWalk<'a> {
    commits: CommitIter<'a>,
    stop_sha: Option<String>,
    done: bool,
}

impl<'a> CommitWalk<'a> {
    pub fn new<C: RepositoryClient + ?Sized>(
        client: &'a C,
        start_sha: &str,
        stop_sha: Option<&str>,
    ) -> Result<Self> {
        Ok(CommitWalk {
            commits: client.commits_from(start_sha, stop_sha)?,
            stop_sha: stop_sha.map(str::to_string),
            done: false,
        })
    }
}

impl Iterator for CommitWalk<'_> {
    type Item = Result<CommitRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.commits.next() {
            Some(Ok(commit)) if self.stop_sha.as_deref() == Some(commit.sha.as_str()) => {
                self.done = true;
                None
            }
            Some(Ok(commit)) => Some(Ok(commit)),
            Some(Err(e)) => {
                self.done = true;
                Some(Err(e))
            }
            None => {
                self.done = true;
                None
            }
        }
    }
}
