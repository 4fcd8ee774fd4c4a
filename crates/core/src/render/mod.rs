//! Output rendering for reports

pub mod json;
pub mod text;

pub use json::{render_env_json, render_json, render_json_string};
pub use text::{render_env, render_human, render_short, render_tree, render_warnings};
