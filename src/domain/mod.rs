//! Domain logic - pure decision rules independent of the repository client

pub mod branch;
pub mod commit;
pub mod prerelease;
pub mod style;
pub mod tag;
pub mod version;

pub use branch::{is_release_branch, resolve_branch, BranchRef, ReleaseBranches};
pub use commit::{classify_commit, Classification, CommitRecord};
pub use prerelease::BranchPrerelease;
pub use style::TaggingStyle;
pub use tag::{Tag, TagCatalog, VersionedTag};
pub use version::{compute_next, increment, BumpLevel};
