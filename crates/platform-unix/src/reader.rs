//! The host's process reader and service label lookup

use crate::error::PlatformResult;
use witr_core::{ProcessInfo, ProcessReader, ReadError, ServiceLabel, ServiceLabelLookup};

/// Reads live processes from the running system
#[derive(Debug, Clone)]
pub struct SystemReader {
    #[cfg(target_os = "linux")]
    procfs: crate::procfs_reader::ProcfsReader,
}

impl SystemReader {
    #[cfg(target_os = "linux")]
    pub fn new() -> PlatformResult<Self> {
        Ok(Self {
            procfs: crate::procfs_reader::ProcfsReader::new()?,
        })
    }

    #[cfg(target_os = "macos")]
    pub fn new() -> PlatformResult<Self> {
        Ok(Self {})
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    pub fn new() -> PlatformResult<Self> {
        Err(crate::error::PlatformError::Unsupported(std::env::consts::OS))
    }

    /// Snapshot `pid`
    pub fn process(&self, pid: u32) -> PlatformResult<ProcessInfo> {
        log::debug!("Reading process {}", pid);

        #[cfg(target_os = "linux")]
        return self.procfs.read_process(pid);

        #[cfg(target_os = "macos")]
        return crate::ps_reader::read_process(pid);

        #[cfg(not(any(target_os = "linux", target_os = "macos")))]
        Err(crate::error::PlatformError::Unsupported(std::env::consts::OS))
    }

    /// PIDs with a listening TCP socket on `port`, sorted
    pub fn pids_for_port(&self, port: u16) -> PlatformResult<Vec<u32>> {
        #[cfg(target_os = "linux")]
        return crate::procfs_reader::pids_for_port(port);

        #[cfg(target_os = "macos")]
        return crate::ps_reader::pids_for_port(port);

        #[cfg(not(any(target_os = "linux", target_os = "macos")))]
        Err(crate::error::PlatformError::Unsupported(std::env::consts::OS))
    }

    /// PIDs whose short command name is exactly `name`, sorted
    pub fn pids_by_name(&self, name: &str) -> PlatformResult<Vec<u32>> {
        #[cfg(target_os = "linux")]
        return crate::procfs_reader::pids_by_name(name);

        #[cfg(target_os = "macos")]
        return crate::ps_reader::pids_by_name(name);

        #[cfg(not(any(target_os = "linux", target_os = "macos")))]
        Err(crate::error::PlatformError::Unsupported(std::env::consts::OS))
    }
}

impl ProcessReader for SystemReader {
    type Process = ProcessInfo;

    fn read(&self, pid: u32) -> Result<ProcessInfo, ReadError> {
        self.process(pid).map_err(|e| e.into_read_error(pid))
    }
}

/// Asks the native init system which service owns a process
///
/// systemd units come from the process's cgroup, launchd labels from
/// `launchctl blame`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeLookup;

impl ServiceLabelLookup for NativeLookup {
    fn service_label(&self, pid: u32) -> Option<ServiceLabel> {
        #[cfg(target_os = "linux")]
        let label = crate::procfs_reader::systemd_label(pid);

        #[cfg(target_os = "macos")]
        let label = crate::ps_reader::launchd_label(pid);

        #[cfg(not(any(target_os = "linux", target_os = "macos")))]
        let label: Option<ServiceLabel> = {
            let _ = pid;
            None
        };

        log::debug!("Service label for {}: {:?}", pid, label);
        label
    }
}
