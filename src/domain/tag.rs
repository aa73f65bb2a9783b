use crate::error::Result;
use crate::git::RepositoryClient;
use semver::Version;
use tracing::debug;

/// Represents a git tag and the commit it points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub sha: String,
}

impl Tag {
    /// Create a new tag
    pub fn new(name: impl Into<String>, sha: impl Into<String>) -> Self {
        Tag {
            name: name.into(),
            sha: sha.into(),
        }
    }

    /// Parse the semantic version held by this tag's name.
    ///
    /// The configured prefix is removed first, then surrounding whitespace
    /// and a leading `v` or `=`, e.g. "v1.2.3" -> 1.2.3.
    pub fn version(&self, prefix: &str) -> Option<Version> {
        let name = self.name.strip_prefix(prefix).unwrap_or(&self.name).trim();
        let clean = name
            .strip_prefix('=')
            .unwrap_or(name)
            .trim_start_matches(['v', 'V']);

        Version::parse(clean).ok()
    }
}

/// A tag whose name parsed as a semantic version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedTag {
    pub tag: Tag,
    pub version: Version,
}

impl VersionedTag {
    pub fn is_prerelease(&self) -> bool {
        !self.version.pre.is_empty()
    }
}

/// Snapshot of the repository's tags for one run.
///
/// Keeps the raw tag list for existence checks and a second view of the
/// semantic version tags in ascending precedence.
#[derive(Debug, Clone, Default)]
pub struct TagCatalog {
    raw: Vec<Tag>,
    ordered: Vec<VersionedTag>,
}

impl TagCatalog {
    /// Fetch all tags through the repository client
    pub fn fetch<C: RepositoryClient + ?Sized>(client: &C, prefix: &str) -> Result<Self> {
        let tags = client.list_tags()?;
        Ok(Self::from_tags(tags, prefix))
    }

    /// Build a catalog from a tag list
    pub fn from_tags(tags: Vec<Tag>, prefix: &str) -> Self {
        let mut ordered: Vec<VersionedTag> = tags
            .iter()
            .filter_map(|tag| match tag.version(prefix) {
                Some(version) => Some(VersionedTag {
                    tag: tag.clone(),
                    version,
                }),
                None => {
                    debug!(tag = %tag.name, "skipping tag that is not a semantic version");
                    None
                }
            })
            .collect();

        // stable: versions of equal precedence keep their listing order
        ordered.sort_by(|a, b| a.version.cmp_precedence(&b.version));

        debug!(
            total = tags.len(),
            versioned = ordered.len(),
            "tag catalog loaded"
        );

        TagCatalog { raw: tags, ordered }
    }

    /// Check whether a tag with exactly this name exists
    pub fn exists(&self, name: &str) -> bool {
        self.raw.iter().any(|tag| tag.name == name)
    }

    /// Highest version without a pre-release component
    pub fn latest_release(&self) -> Option<&VersionedTag> {
        self.ordered.iter().rev().find(|tag| !tag.is_prerelease())
    }

    /// Highest version overall
    pub fn latest_any(&self) -> Option<&VersionedTag> {
        self.ordered.last()
    }

    /// Semantic version tags in ascending order
    pub fn versioned(&self) -> &[VersionedTag] {
        &self.ordered
    }

    pub fn versions(&self) -> impl Iterator<Item = &Version> {
        self.ordered.iter().map(|tag| &tag.version)
    }

    pub fn raw(&self) -> &[Tag] {
        &self.raw
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}
