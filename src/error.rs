use thiserror::Error;

/// Unified error type for autotag operations
#[derive(Error, Debug)]
pub enum AutotagError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Version error: {0}")]
    Version(String),

    #[error("Tag error: {0}")]
    Tag(String),

    #[error("Remote operation failed: {0}")]
    Remote(String),

    #[error("unknown {}branch {branch} provided", forced_label(.forced))]
    BranchNotFound { branch: String, forced: bool },

    #[error("Invalid release branch pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Invalid semantic version: {0}")]
    Semver(#[from] semver::Error),

    #[error("Invalid configuration file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn forced_label(forced: &bool) -> &'static str {
    if *forced {
        "forced "
    } else {
        ""
    }
}

/// Convenience type alias for Results in autotag
pub type Result<T> = std::result::Result<T, AutotagError>;

impl AutotagError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        AutotagError::Config(msg.into())
    }

    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        AutotagError::Version(msg.into())
    }

    /// Create a tag error with context
    pub fn tag(msg: impl Into<String>) -> Self {
        AutotagError::Tag(msg.into())
    }

    /// Create a remote error with context
    pub fn remote(msg: impl Into<String>) -> Self {
        AutotagError::Remote(msg.into())
    }

    pub fn branch_not_found(branch: impl Into<String>, forced: bool) -> Self {
        AutotagError::BranchNotFound {
            branch: branch.into(),
            forced,
        }
    }
}
