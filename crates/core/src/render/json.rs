//! JSON rendering for reports

use crate::models::ProcessInfo;
use crate::report::Report;
use serde_json::{json, Value};

/// Render the report as a JSON value
pub fn render_json(report: &Report) -> serde_json::Result<Value> {
    serde_json::to_value(report)
}

/// Render the report as a pretty-printed JSON string
pub fn render_json_string(report: &Report) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

/// Render the command line and environment of a process as JSON
pub fn render_env_json(process: &ProcessInfo) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&json!({
        "command": process.cmdline,
        "env": process.env,
    }))
}
