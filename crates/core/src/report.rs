//! Report structure for process origin analysis

use crate::ancestry::Ancestry;
use crate::detect::Detector;
use crate::models::{ProcessInfo, Source, SourceKind, Target, Warning};
use crate::warnings::warnings;
use serde::Serialize;

/// Complete analysis report
///
/// Serializes with exactly three top-level keys: `ancestry`, `source` and
/// `warnings`.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// The target that was queried
    #[serde(skip)]
    pub target: Target,
    /// Process chain from root to target
    pub ancestry: Ancestry<ProcessInfo>,
    /// Classified source of the process
    pub source: Source,
    /// Advisories about the target
    pub warnings: Vec<Warning>,
}

impl Report {
    /// Classify `ancestry` and derive its warnings
    pub fn analyze(target: Target, ancestry: Ancestry<ProcessInfo>, detector: &Detector) -> Self {
        let source = detector.detect(&ancestry);
        let warnings = warnings(&ancestry, &source);
        Self {
            target,
            ancestry,
            source,
            warnings,
        }
    }

    /// The analyzed process
    pub fn process(&self) -> &ProcessInfo {
        self.ancestry.target()
    }

    /// Get the root ancestor (furthest from target)
    pub fn root_ancestor(&self) -> &ProcessInfo {
        self.ancestry.root()
    }

    /// Check if any warnings were raised
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn is_containerized(&self) -> bool {
        self.source.kind == SourceKind::Container
    }
}
