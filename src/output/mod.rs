//! Report formatting.
//!
//! - Terminal: the one-line dudect report, colored by verdict
//! - JSON: machine-readable serialization of a [`Report`](ctprobe_core::Report)

mod json;
mod terminal;

pub use json::{to_json, to_json_pretty};
pub use terminal::format_report;
