//! Commit analysis - turns commit history into a bump level

pub mod bump_analyzer;

pub use bump_analyzer::{aggregate, BumpAnalyzer, IssueLabelCache};
