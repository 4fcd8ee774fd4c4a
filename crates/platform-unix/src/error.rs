//! Error types for Unix platform operations

use thiserror::Error;
use witr_core::{AncestryError, ProcessInfo, ReadError};

/// Errors that can occur while collecting process data
#[derive(Debug, Error)]
pub enum PlatformError {
    /// Process not found
    #[error("Process {pid} not found")]
    ProcessNotFound { pid: u32 },

    /// Access denied to process
    #[error("Access denied to process {pid}")]
    AccessDenied { pid: u32 },

    /// Reading /proc failed
    #[error("procfs: {0}")]
    Proc(String),

    /// A helper utility (ps, lsof, launchctl) could not be run or failed
    #[error("{program} failed: {message}")]
    CommandFailed {
        program: &'static str,
        message: String,
    },

    /// Nothing is listening on the port
    #[error("No process found listening on port {port}")]
    NoListener { port: u16 },

    /// No process has the requested name
    #[error("No process found matching '{name}'")]
    NoMatch { name: String },

    /// More than one process has the requested name
    #[error("Multiple processes match '{name}' ({} found), use --pid to pick one", .candidates.len())]
    AmbiguousName {
        name: String,
        candidates: Vec<ProcessInfo>,
    },

    /// The target's ancestry could not be built
    #[error(transparent)]
    Ancestry(#[from] AncestryError),

    /// The running OS has no collector
    #[error("Unsupported platform: {0}")]
    Unsupported(&'static str),
}

impl PlatformError {
    /// Check if the target process does not exist
    pub fn is_not_found(&self) -> bool {
        match self {
            PlatformError::ProcessNotFound { .. }
            | PlatformError::NoListener { .. }
            | PlatformError::NoMatch { .. } => true,
            PlatformError::Ancestry(AncestryError::TargetUnreadable { source, .. }) => {
                matches!(source, ReadError::NotFound { .. })
            }
            _ => false,
        }
    }

    /// Check if this is an access denied error
    pub fn is_access_denied(&self) -> bool {
        match self {
            PlatformError::AccessDenied { .. } => true,
            PlatformError::Ancestry(AncestryError::TargetUnreadable { source, .. }) => {
                source.is_access_denied()
            }
            _ => false,
        }
    }

    /// Convert into the reader-level error for `pid`
    pub fn into_read_error(self, pid: u32) -> ReadError {
        match self {
            PlatformError::ProcessNotFound { pid } => ReadError::NotFound { pid },
            PlatformError::AccessDenied { pid } => ReadError::AccessDenied { pid },
            other => ReadError::Other {
                pid,
                message: other.to_string(),
            },
        }
    }
}

#[cfg(target_os = "linux")]
impl From<procfs::ProcError> for PlatformError {
    fn from(err: procfs::ProcError) -> Self {
        PlatformError::Proc(err.to_string())
    }
}

/// Result type for platform operations
pub type PlatformResult<T> = Result<T, PlatformError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_through_ancestry() {
        let err = PlatformError::from(AncestryError::TargetUnreadable {
            pid: 77,
            source: ReadError::NotFound { pid: 77 },
        });
        assert!(err.is_not_found());
        assert!(!err.is_access_denied());
    }

    #[test]
    fn test_access_denied_through_ancestry() {
        let err = PlatformError::from(AncestryError::TargetUnreadable {
            pid: 1,
            source: ReadError::AccessDenied { pid: 1 },
        });
        assert!(err.is_access_denied());
    }

    #[test]
    fn test_into_read_error() {
        assert_eq!(
            PlatformError::ProcessNotFound { pid: 5 }.into_read_error(5),
            ReadError::NotFound { pid: 5 }
        );
        assert_eq!(
            PlatformError::AccessDenied { pid: 5 }.into_read_error(5),
            ReadError::AccessDenied { pid: 5 }
        );
        let other = PlatformError::CommandFailed {
            program: "ps",
            message: "exit status 1".to_string(),
        }
        .into_read_error(5);
        assert!(matches!(other, ReadError::Other { pid: 5, .. }));
    }

    #[test]
    fn test_ambiguous_name_message() {
        let err = PlatformError::AmbiguousName {
            name: "node".to_string(),
            candidates: vec![ProcessInfo::default(), ProcessInfo::default()],
        };
        assert_eq!(
            err.to_string(),
            "Multiple processes match 'node' (2 found), use --pid to pick one"
        );
    }
}
