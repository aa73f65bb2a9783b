use crate::domain::branch::{ReleaseBranches, DEFAULT_RELEASE_BRANCHES};
use crate::domain::{BumpLevel, TaggingStyle};
use crate::error::{AutotagError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Flat string-keyed inputs, as handed over by the CI runner
pub type Inputs = BTreeMap<String, String>;

/// Every input key understood by autotag
pub const INPUT_KEYS: [&str; 11] = [
    "branch",
    "bump",
    "dry-run",
    "force",
    "github-token",
    "issue-labels",
    "release-branch",
    "style",
    "tag",
    "version-prefix",
    "with-v",
];

const DEFAULT_ISSUE_LABEL: &str = "enhancement";

/// A value in the inputs file.
///
/// Inputs are strings at heart; booleans, numbers and lists are accepted
/// for convenience and flattened to their string form.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InputValue {
    Text(String),
    Flag(bool),
    Integer(i64),
    List(Vec<String>),
}

impl InputValue {
    fn into_string(self) -> String {
        match self {
            InputValue::Text(s) => s,
            InputValue::Flag(b) => b.to_string(),
            InputValue::Integer(i) => i.to_string(),
            InputValue::List(items) => items.join(","),
        }
    }
}

/// Immutable, validated configuration for one run
#[derive(Debug, Clone)]
pub struct Parameters {
    /// Branch to version instead of the one from the trigger ref
    pub branch: Option<String>,
    /// Lowest level applied on release branches when anything is released
    pub bump: BumpLevel,
    pub dry_run: bool,
    /// Accept an existing tag instead of skipping it
    pub force: bool,
    pub token: Option<String>,
    /// Literal tag overriding the computed version
    pub tag: Option<String>,
    pub release_branches: ReleaseBranches,
    /// Issues carrying one of these labels make a minor release
    pub issue_labels: Vec<String>,
    /// Prefix of computed version tags; empty when prefixing is disabled
    pub version_prefix: String,
    pub style: TaggingStyle,
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters {
            branch: None,
            bump: BumpLevel::Patch,
            dry_run: true,
            force: false,
            token: None,
            tag: None,
            release_branches: ReleaseBranches::default(),
            issue_labels: vec![DEFAULT_ISSUE_LABEL.to_string()],
            version_prefix: String::new(),
            style: TaggingStyle::Semver,
        }
    }
}

fn non_empty(inputs: &Inputs, key: &str) -> Option<String> {
    inputs
        .get(key)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn is_false(inputs: &Inputs, key: &str) -> bool {
    inputs
        .get(key)
        .is_some_and(|value| value.trim().eq_ignore_ascii_case("false"))
}

fn is_true(inputs: &Inputs, key: &str) -> bool {
    inputs
        .get(key)
        .is_some_and(|value| value.trim().eq_ignore_ascii_case("true"))
}

impl Parameters {
    /// Validate raw inputs into parameters.
    ///
    /// Missing keys take their defaults. An unknown `style` falls back to
    /// semver with a warning; an invalid `bump` or release branch pattern
    /// is a configuration error.
    pub fn from_inputs(inputs: &Inputs) -> Result<Self> {
        for key in inputs.keys() {
            if !INPUT_KEYS.contains(&key.as_str()) {
                warn!(key = %key, "ignoring unknown input");
            }
        }

        let bump = match non_empty(inputs, "bump") {
            Some(level) => match level.parse::<BumpLevel>()? {
                BumpLevel::None => {
                    return Err(AutotagError::config(
                        "Invalid bump level: 'none' - expected patch, minor or major",
                    ))
                }
                level => level,
            },
            None => BumpLevel::Patch,
        };

        let style = match non_empty(inputs, "style") {
            Some(name) => name.parse::<TaggingStyle>().unwrap_or_else(|e| {
                warn!("{}, using semver", e);
                TaggingStyle::Semver
            }),
            None => TaggingStyle::Semver,
        };

        let release_branches = ReleaseBranches::parse(
            &non_empty(inputs, "release-branch")
                .unwrap_or_else(|| DEFAULT_RELEASE_BRANCHES.to_string()),
        )?;

        let mut issue_labels: Vec<String> = inputs
            .get("issue-labels")
            .map(|labels| {
                labels
                    .split(',')
                    .map(str::trim)
                    .filter(|label| !label.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        if issue_labels.is_empty() {
            issue_labels.push(DEFAULT_ISSUE_LABEL.to_string());
        }

        let version_prefix = if is_false(inputs, "with-v") {
            String::new()
        } else {
            inputs.get("version-prefix").cloned().unwrap_or_default()
        };

        let parameters = Parameters {
            branch: non_empty(inputs, "branch"),
            bump,
            dry_run: !is_false(inputs, "dry-run"),
            force: is_true(inputs, "force"),
            token: non_empty(inputs, "github-token"),
            tag: non_empty(inputs, "tag"),
            release_branches,
            issue_labels,
            version_prefix,
            style,
        };

        debug!(
            bump = %parameters.bump,
            dry_run = parameters.dry_run,
            force = parameters.force,
            style = ?parameters.style,
            "parameters loaded"
        );

        Ok(parameters)
    }
}

/// Parse a flat TOML table of inputs
pub fn parse_inputs(content: &str) -> Result<Inputs> {
    let table: BTreeMap<String, InputValue> = toml::from_str(content)?;
    Ok(table
        .into_iter()
        .map(|(key, value)| (key, value.into_string()))
        .collect())
}

/// Overlay `INPUT_<KEY>` variables onto `inputs`.
///
/// Keys are upper-cased with hyphens kept, as CI runners export them;
/// the underscore spelling (`INPUT_DRY_RUN`) is accepted as well.
pub fn overlay_env(inputs: &mut Inputs, vars: impl IntoIterator<Item = (String, String)>) {
    let vars: BTreeMap<String, String> = vars.into_iter().collect();

    for key in INPUT_KEYS {
        let hyphenated = format!("INPUT_{}", key.to_uppercase());
        let underscored = hyphenated.replace('-', "_");

        if let Some(value) = vars.get(&hyphenated).or_else(|| vars.get(&underscored)) {
            inputs.insert(key.to_string(), value.clone());
        }
    }
}

/// Overlay `key=value` pairs, e.g. from the command line
pub fn overlay_pairs<'a>(
    inputs: &mut Inputs,
    pairs: impl IntoIterator<Item = &'a str>,
) -> Result<()> {
    for pair in pairs {
        let (key, value) = pair.split_once('=').ok_or_else(|| {
            AutotagError::config(format!("Invalid input '{}' - expected key=value", pair))
        })?;
        inputs.insert(key.trim().to_string(), value.to_string());
    }
    Ok(())
}

/// Loads inputs from file and environment.
///
/// The file is looked up in the following order:
/// 1. Custom path provided as parameter
/// 2. `autotag.toml` in current directory
/// 3. `.autotag.toml` in the user config directory
///
/// Missing files are fine; `INPUT_*` environment variables are applied on top.
pub fn load_inputs(config_path: Option<&str>) -> Result<Inputs> {
    let content = if let Some(path) = config_path {
        Some(fs::read_to_string(path)?)
    } else if Path::new("./autotag.toml").exists() {
        Some(fs::read_to_string("./autotag.toml")?)
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(".autotag.toml");
        if config_path.exists() {
            Some(fs::read_to_string(config_path)?)
        } else {
            None
        }
    } else {
        None
    };

    let mut inputs = match content {
        Some(content) => parse_inputs(&content)?,
        None => Inputs::new(),
    };

    overlay_env(&mut inputs, std::env::vars());
    Ok(inputs)
}
