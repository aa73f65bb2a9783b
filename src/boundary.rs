use std::fmt;

/// Reasons a run ends without a new tag.
/// These are expected outcomes, not errors, and are reported to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The literal or computed tag already exists and `force` is unset
    TagCollision { tag: String },
    /// The newest version tag already points at the branch head
    HeadAlreadyTagged { tag: String, head_sha: String },
    /// No release-worthy commit since the last release, or a `#wip` commit
    NoQualifyingChange,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::TagCollision { tag } => {
                write!(f, "Tag '{}' already exists", tag)
            }
            SkipReason::HeadAlreadyTagged { tag, head_sha } => {
                let short_hash = head_sha.get(..7).unwrap_or(head_sha);
                write!(
                    f,
                    "No new commits since tag '{}' (current: {})",
                    tag, short_hash
                )
            }
            SkipReason::NoQualifyingChange => {
                write!(f, "No commit messages or only work in progress found")
            }
        }
    }
}
