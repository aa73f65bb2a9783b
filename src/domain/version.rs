use crate::domain::prerelease::BranchPrerelease;
use crate::error::{AutotagError, Result};
use semver::{BuildMetadata, Prerelease, Version};
use std::fmt;
use std::str::FromStr;

/// Granularity of change implied by the commits since the last release.
///
/// Ordered `None < Patch < Minor < Major`, so the decided level of a range
/// is simply the maximum over its commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum BumpLevel {
    /// Nothing release-worthy; blocks tagging
    #[default]
    None,
    Patch,
    Minor,
    Major,
}

impl FromStr for BumpLevel {
    type Err = AutotagError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(BumpLevel::None),
            "patch" => Ok(BumpLevel::Patch),
            "minor" => Ok(BumpLevel::Minor),
            "major" => Ok(BumpLevel::Major),
            other => Err(AutotagError::config(format!(
                "Invalid bump level: '{}' - expected patch, minor or major",
                other
            ))),
        }
    }
}

impl fmt::Display for BumpLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BumpLevel::None => "none",
            BumpLevel::Patch => "patch",
            BumpLevel::Minor => "minor",
            BumpLevel::Major => "major",
        };
        write!(f, "{}", name)
    }
}

/// Base version used when the catalog holds no semantic version tag.
pub fn initial_version() -> Version {
    Version::new(0, 0, 0)
}

/// Increment a version by the given level.
///
/// A prerelease base is first released when it already sits on the
/// boundary of the requested level, e.g. `1.1.0-rc.1` bumped by minor
/// yields `1.1.0` and `1.2.3-rc.1` bumped by patch yields `1.2.3`.
/// Returns `None` for [`BumpLevel::None`].
pub fn increment(base: &Version, level: BumpLevel) -> Option<Version> {
    let is_pre = !base.pre.is_empty();
    let mut next = Version::new(base.major, base.minor, base.patch);

    match level {
        BumpLevel::None => return None,
        BumpLevel::Major => {
            if !(is_pre && base.minor == 0 && base.patch == 0) {
                next.major += 1;
            }
            next.minor = 0;
            next.patch = 0;
        }
        BumpLevel::Minor => {
            if !(is_pre && base.patch == 0) {
                next.minor += 1;
            }
            next.patch = 0;
        }
        BumpLevel::Patch => {
            if !is_pre {
                next.patch += 1;
            }
        }
    }

    next.pre = Prerelease::EMPTY;
    next.build = BuildMetadata::EMPTY;
    Some(next)
}

/// Compute the next version for a branch.
///
/// Release branches receive the plain increment. Any other branch gets a
/// prerelease keyed by the branch name whose counter continues past the
/// prerelease tags that branch already cut for the same release, so two
/// branches never collide and repeated runs on one branch keep counting.
pub fn compute_next<'a>(
    base: &Version,
    level: BumpLevel,
    is_release: bool,
    branch_name: &str,
    existing: impl IntoIterator<Item = &'a Version>,
) -> Result<Option<Version>> {
    let Some(mut next) = increment(base, level) else {
        return Ok(None);
    };

    if !is_release {
        let existing: Vec<&Version> = existing.into_iter().collect();
        let branch = BranchPrerelease::for_branch(branch_name);

        next.pre = branch_prerelease(&branch, &next, &existing)?;
        if next <= *base {
            // the branch id sorts below the base's own prerelease
            next.patch += 1;
            next.pre = branch_prerelease(&branch, &next, &existing)?;
        }
    }

    if next <= *base {
        return Err(AutotagError::version(format!(
            "Computed version {} does not advance past {}",
            next, base
        )));
    }

    Ok(Some(next))
}

fn branch_prerelease(
    branch: &BranchPrerelease,
    release: &Version,
    existing: &[&Version],
) -> Result<Prerelease> {
    let same_release = existing.iter().copied().filter(|v| {
        v.major == release.major && v.minor == release.minor && v.patch == release.patch
    });
    Ok(Prerelease::new(&branch.after(same_release).to_string())?)
}
