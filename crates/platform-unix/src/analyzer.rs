//! Full process analysis and report generation
//!
//! Resolves a target to a PID, builds its ancestry from the live system and
//! hands the chain to the core detector and warning engine.

use crate::error::{PlatformError, PlatformResult};
use crate::reader::{NativeLookup, SystemReader};
use witr_core::{build_ancestry, Detector, ProcessInfo, Report, Target};

/// Analyzer bound to the running system
#[derive(Debug, Clone)]
pub struct Analyzer {
    reader: SystemReader,
    lookup: NativeLookup,
}

impl Analyzer {
    pub fn new() -> PlatformResult<Self> {
        Ok(Self {
            reader: SystemReader::new()?,
            lookup: NativeLookup,
        })
    }

    /// The reader used for process snapshots
    pub fn reader(&self) -> &SystemReader {
        &self.reader
    }

    /// Build a complete report for any target
    pub fn analyze(&self, target: &Target) -> PlatformResult<Report> {
        let pid = self.resolve(target)?;
        self.report(target.clone(), pid)
    }

    /// Resolve a target and read only its own process record
    ///
    /// Skips the ancestry walk and source detection.
    pub fn process(&self, target: &Target) -> PlatformResult<ProcessInfo> {
        let pid = self.resolve(target)?;
        self.reader.process(pid)
    }

    /// Build a complete report for a PID
    pub fn analyze_pid(&self, pid: u32) -> PlatformResult<Report> {
        self.analyze(&Target::Pid(pid))
    }

    /// Build a complete report for the process listening on a port
    pub fn analyze_port(&self, port: u16) -> PlatformResult<Report> {
        self.analyze(&Target::Port(port))
    }

    /// Build a complete report for the single process with this name
    pub fn analyze_name(&self, name: &str) -> PlatformResult<Report> {
        self.analyze(&Target::Name(name.to_string()))
    }

    /// Resolve a target to exactly one PID
    ///
    /// A port resolves to the lowest PID owning a listening socket on it. A
    /// name must match exactly one process's short command name.
    pub fn resolve(&self, target: &Target) -> PlatformResult<u32> {
        match target {
            Target::Pid(pid) => Ok(*pid),
            Target::Port(port) => {
                let pids = self.reader.pids_for_port(*port)?;
                log::debug!("Port {} is owned by {:?}", port, pids);
                pids.first()
                    .copied()
                    .ok_or(PlatformError::NoListener { port: *port })
            }
            Target::Name(name) => {
                let pids = self.reader.pids_by_name(name)?;
                match pids.as_slice() {
                    [] => Err(PlatformError::NoMatch { name: name.clone() }),
                    [pid] => Ok(*pid),
                    many => {
                        let candidates = many
                            .iter()
                            .filter_map(|pid| self.reader.process(*pid).ok())
                            .collect();
                        Err(PlatformError::AmbiguousName {
                            name: name.clone(),
                            candidates,
                        })
                    }
                }
            }
        }
    }

    fn report(&self, target: Target, pid: u32) -> PlatformResult<Report> {
        let ancestry = build_ancestry(&self.reader, pid)?;
        let detector = Detector::native().with_lookup(&self.lookup);
        Ok(Report::analyze(target, ancestry, &detector))
    }
}

/// Build a complete report for a PID
pub fn analyze_pid(pid: u32) -> PlatformResult<Report> {
    Analyzer::new()?.analyze_pid(pid)
}

/// Build a complete report for a port
pub fn analyze_port(port: u16) -> PlatformResult<Report> {
    Analyzer::new()?.analyze_port(port)
}

/// Build a complete report for a process name
pub fn analyze_name(name: &str) -> PlatformResult<Report> {
    Analyzer::new()?.analyze_name(name)
}
