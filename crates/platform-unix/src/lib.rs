//! witr-platform-unix: Linux and macOS collectors for witr
//!
//! This crate reads live processes for the core analysis: /proc on Linux,
//! `ps`, `lsof` and `launchctl` on macOS. Parsers for the text formats these
//! sources produce are platform independent so they build and test
//! everywhere.

pub mod analyzer;
pub mod cgroup;
pub mod error;
pub mod git;
pub mod launchd;
pub mod lsof;
pub mod ps;
pub mod reader;

#[cfg(target_os = "linux")]
pub mod procfs_reader;
#[cfg(target_os = "macos")]
pub mod ps_reader;

pub use analyzer::{analyze_name, analyze_pid, analyze_port, Analyzer};
pub use error::{PlatformError, PlatformResult};
pub use git::{git_context, GitContext};
pub use reader::{NativeLookup, SystemReader};
