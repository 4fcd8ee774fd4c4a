//! Process capability traits
//!
//! The ancestry builder, source detector and warning engine only see a
//! process through [`ProcessView`], and only obtain processes through a
//! [`ProcessReader`]. Platform crates implement the reader; tests use an
//! in-memory table.

use crate::models::{Health, ProcessInfo};
use std::collections::HashMap;
use thiserror::Error;
use time::OffsetDateTime;

/// Read-only accessors over a process snapshot
pub trait ProcessView {
    fn pid(&self) -> u32;
    fn ppid(&self) -> u32;
    /// Short command name
    fn command(&self) -> &str;
    /// Full command line
    fn cmdline(&self) -> &str;
    fn user(&self) -> &str;
    fn working_dir(&self) -> &str;
    fn bind_addresses(&self) -> &[String];
    fn health(&self) -> Health;
    /// Container runtime evidence, if any
    fn container(&self) -> Option<&str>;
    fn start_time(&self) -> Option<OffsetDateTime>;
}

impl ProcessView for ProcessInfo {
    fn pid(&self) -> u32 {
        self.pid
    }

    fn ppid(&self) -> u32 {
        self.ppid
    }

    fn command(&self) -> &str {
        &self.command
    }

    fn cmdline(&self) -> &str {
        &self.cmdline
    }

    fn user(&self) -> &str {
        &self.user
    }

    fn working_dir(&self) -> &str {
        &self.working_dir
    }

    fn bind_addresses(&self) -> &[String] {
        &self.bind_addresses
    }

    fn health(&self) -> Health {
        self.health
    }

    fn container(&self) -> Option<&str> {
        self.container.as_deref().filter(|c| !c.is_empty())
    }

    fn start_time(&self) -> Option<OffsetDateTime> {
        self.start_time
    }
}

/// Errors a process reader can report for a single PID
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadError {
    #[error("Process {pid} not found")]
    NotFound { pid: u32 },

    #[error("Access denied to process {pid}")]
    AccessDenied { pid: u32 },

    #[error("Failed to read process {pid}: {message}")]
    Other { pid: u32, message: String },
}

impl ReadError {
    pub fn pid(&self) -> u32 {
        match self {
            ReadError::NotFound { pid }
            | ReadError::AccessDenied { pid }
            | ReadError::Other { pid, .. } => *pid,
        }
    }

    pub fn is_access_denied(&self) -> bool {
        matches!(self, ReadError::AccessDenied { .. })
    }
}

/// Source of process snapshots
pub trait ProcessReader {
    type Process: ProcessView;

    /// Read one process; fails if it does not exist or cannot be inspected
    fn read(&self, pid: u32) -> Result<Self::Process, ReadError>;
}

/// A fixed process table, keyed by PID
impl ProcessReader for HashMap<u32, ProcessInfo> {
    type Process = ProcessInfo;

    fn read(&self, pid: u32) -> Result<ProcessInfo, ReadError> {
        self.get(&pid).cloned().ok_or(ReadError::NotFound { pid })
    }
}
