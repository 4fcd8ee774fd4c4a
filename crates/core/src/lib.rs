//! witr-core: Core models and analysis for witr
//!
//! This crate contains the OS-agnostic part of "why is this running?":
//! walking a process's parent chain, classifying what supervises it, and
//! deriving warnings about it. Platform crates supply processes through the
//! [`ProcessReader`] trait.
//!
//! # Modules
//!
//! - [`models`] - Core data structures (ProcessInfo, Source, Warning, etc.)
//! - [`process`] - The process capability and reader traits
//! - [`ancestry`] - Parent chain reconstruction with cycle protection
//! - [`detect`] - Priority-ordered source classification
//! - [`warnings`] - Health and security warning rules
//! - [`report`] - The Report struct that aggregates analysis results
//! - [`render`] - Output formatters (standard, tree, short, JSON)
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use witr_core::{build_ancestry, Detector, InitSystem, ProcessInfo, Report, Target};
//!
//! let mut table = HashMap::new();
//! table.insert(1, ProcessInfo { pid: 1, command: "systemd".into(), ..Default::default() });
//! table.insert(42, ProcessInfo { pid: 42, ppid: 1, command: "cron".into(), ..Default::default() });
//!
//! let ancestry = build_ancestry(&table, 42).unwrap();
//! let report = Report::analyze(Target::Pid(42), ancestry, &Detector::new(Some(InitSystem::SYSTEMD)));
//! println!("{}", witr_core::render::render_short(&report));
//! ```

pub mod ancestry;
pub mod detect;
pub mod models;
pub mod process;
pub mod render;
pub mod report;
pub mod warnings;

// Re-export commonly used types at crate root
pub use ancestry::{build_ancestry, Ancestry, AncestryError, INIT_PID};
pub use detect::{Classifier, Detector, InitSystem, ServiceLabel, ServiceLabelLookup};
pub use models::{Health, ProcessInfo, Source, SourceKind, Target, Warning};
pub use process::{ProcessReader, ProcessView, ReadError};
pub use report::Report;
pub use warnings::{warnings, warnings_at};
