//! User interface module - status output for a run.

pub mod formatter;

pub use formatter::{
    display_error, display_proposed_tag, display_report, display_skip, display_status,
    display_success,
};
