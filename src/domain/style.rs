use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

/// How the next tag is named
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaggingStyle {
    /// Computed from commits and existing tags
    #[default]
    Semver,
    /// `20240305`
    Date,
    /// `202403051407`
    DateTime,
    /// `2024.3.5`
    DotDate,
    /// `2024.3.5.14.7`
    DotDateTime,
    /// `2024-03-05`
    IsoDate,
    /// `2024-03-05T14-07`
    IsoDateTime,
}

/// Error for a style name outside the known set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStyle(pub String);

impl fmt::Display for UnknownStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown tagging style '{}'", self.0)
    }
}

impl std::error::Error for UnknownStyle {}

impl FromStr for TaggingStyle {
    type Err = UnknownStyle;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "semver" => Ok(TaggingStyle::Semver),
            "date" => Ok(TaggingStyle::Date),
            "datetime" => Ok(TaggingStyle::DateTime),
            "dotdate" => Ok(TaggingStyle::DotDate),
            "dotdatetime" => Ok(TaggingStyle::DotDateTime),
            "isodate" => Ok(TaggingStyle::IsoDate),
            "isodatetime" => Ok(TaggingStyle::IsoDateTime),
            other => Err(UnknownStyle(other.to_string())),
        }
    }
}

impl TaggingStyle {
    pub fn is_semver(&self) -> bool {
        matches!(self, TaggingStyle::Semver)
    }

    /// Render the date tag for `now`, or `None` for [`TaggingStyle::Semver`]
    pub fn date_tag(&self, now: DateTime<Utc>) -> Option<String> {
        let format = match self {
            TaggingStyle::Semver => return None,
            TaggingStyle::Date => "%Y%m%d",
            TaggingStyle::DateTime => "%Y%m%d%H%M",
            TaggingStyle::DotDate => "%Y.%-m.%-d",
            TaggingStyle::DotDateTime => "%Y.%-m.%-d.%-H.%-M",
            TaggingStyle::IsoDate => "%Y-%m-%d",
            TaggingStyle::IsoDateTime => "%Y-%m-%dT%H-%M",
        };
        Some(now.format(format).to_string())
    }
}
