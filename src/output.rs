//! Run outputs (`tag`, `new-tag`)
//!
//! Outputs are published as soon as they are known, so a value set before
//! a failure stays set.

use crate::error::Result;
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

/// Base version found
pub const TAG: &str = "tag";
/// Computed or literal tag, empty when none
pub const NEW_TAG: &str = "new-tag";

/// Destination for named outputs
pub trait OutputSink {
    fn set_output(&mut self, name: &str, value: &str) -> Result<()>;
}

/// Writes `name=value` lines to stdout and, when given, appends them to
/// the CI output file.
#[derive(Debug, Default)]
pub struct ActionOutputs {
    file: Option<PathBuf>,
}

impl ActionOutputs {
    pub fn new(file: Option<PathBuf>) -> Self {
        ActionOutputs { file }
    }
}

impl OutputSink for ActionOutputs {
    fn set_output(&mut self, name: &str, value: &str) -> Result<()> {
        println!("{}={}", name, value);

        if let Some(path) = &self.file {
            let mut file = OpenOptions::new().create(true).append(true).open(path)?;
            writeln!(file, "{}={}", name, value)?;
        }

        Ok(())
    }
}

/// Keeps outputs in memory
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecordedOutputs {
    values: BTreeMap<String, String>,
}

impl RecordedOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

impl OutputSink for RecordedOutputs {
    fn set_output(&mut self, name: &str, value: &str) -> Result<()> {
        self.values.insert(name.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_action_outputs_append_to_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("output");
        let mut outputs = ActionOutputs::new(Some(path.clone()));

        outputs.set_output(TAG, "1.0.0").unwrap();
        outputs.set_output(NEW_TAG, "").unwrap();

        let written = std::fs::read_to_string(path).unwrap();
        assert_eq!(written, "tag=1.0.0\nnew-tag=\n");
    }

    #[test]
    fn test_recorded_outputs_overwrite() {
        let mut outputs = RecordedOutputs::new();
        outputs.set_output(NEW_TAG, "v1").unwrap();
        outputs.set_output(NEW_TAG, "v2").unwrap();
        assert_eq!(outputs.get(NEW_TAG), Some("v2"));
        assert_eq!(outputs.get(TAG), None);
    }
}
