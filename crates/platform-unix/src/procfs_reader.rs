//! Linux process collector backed by /proc

use crate::cgroup::{container_runtime, systemd_unit};
use crate::error::{PlatformError, PlatformResult};
use crate::git::git_context;
use nix::unistd::{Uid, User};
use procfs::net::TcpState;
use procfs::process::{FDTarget, Process};
use procfs::ProcError;
use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::path::Path;
use time::{OffsetDateTime, UtcOffset};
use witr_core::{Health, ProcessInfo, ServiceLabel};

/// Kernel constants needed to interpret /proc/<pid>/stat
#[derive(Debug, Clone, Copy)]
pub struct ProcfsReader {
    boot_time: u64,
    ticks_per_second: u64,
    page_size: u64,
}

impl ProcfsReader {
    pub fn new() -> PlatformResult<Self> {
        Ok(Self {
            boot_time: procfs::boot_time_secs()?,
            ticks_per_second: procfs::ticks_per_second().max(1),
            page_size: procfs::page_size(),
        })
    }

    /// Snapshot a single process
    ///
    /// Only `stat` is required; every other attribute degrades to an empty
    /// value when it cannot be read (typically another user's process).
    pub fn read_process(&self, pid: u32) -> PlatformResult<ProcessInfo> {
        let process = Process::new(pid as i32).map_err(|e| proc_error(pid, e))?;
        let stat = process.stat().map_err(|e| proc_error(pid, e))?;

        let cpu_seconds = (stat.utime + stat.stime) / self.ticks_per_second;
        let rss_bytes = (stat.rss as u64).saturating_mul(self.page_size);
        let started = self.boot_time + stat.starttime / self.ticks_per_second;

        let cmdline = match process.cmdline() {
            Ok(args) if !args.is_empty() => args.join(" "),
            _ => stat.comm.clone(),
        };

        let working_dir = process
            .cwd()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();

        let cgroup_paths = cgroup_paths(&process);
        let git = git_context(Path::new(&working_dir));
        let (bind_addresses, listening_ports): (Vec<String>, Vec<u16>) = listeners(&process).into_iter().unzip();

        Ok(ProcessInfo {
            pid,
            ppid: stat.ppid.max(0) as u32,
            command: stat.comm.clone(),
            cmdline,
            user: process.uid().map(user_name).unwrap_or_default(),
            start_time: start_time(started),
            working_dir,
            git_repo: git.repo,
            git_branch: git.branch,
            container: container_runtime(&cgroup_paths).map(str::to_string),
            listening_ports,
            bind_addresses,
            health: Health::classify(stat.state, cpu_seconds, rss_bytes),
            env: environment(&process),
        })
    }
}

/// systemd unit of `pid`, from its cgroup membership
pub fn systemd_label(pid: u32) -> Option<ServiceLabel> {
    let process = Process::new(pid as i32).ok()?;
    systemd_unit(&cgroup_paths(&process))
}

/// PIDs that own a listening TCP socket on `port`, sorted
pub fn pids_for_port(port: u16) -> PlatformResult<Vec<u32>> {
    let inodes: HashSet<u64> = listen_sockets()?
        .into_iter()
        .filter(|(_, addr)| addr.port() == port)
        .map(|(inode, _)| inode)
        .collect();
    if inodes.is_empty() {
        return Ok(Vec::new());
    }

    let mut pids = Vec::new();
    for process in procfs::process::all_processes()?.flatten() {
        let owns = process
            .fd()
            .map(|fds| {
                fds.flatten().any(|fd| match fd.target {
                    FDTarget::Socket(inode) => inodes.contains(&inode),
                    _ => false,
                })
            })
            .unwrap_or(false);
        if owns {
            pids.push(process.pid as u32);
        }
    }
    pids.sort_unstable();
    Ok(pids)
}

/// PIDs whose short command name equals `name`, sorted
pub fn pids_by_name(name: &str) -> PlatformResult<Vec<u32>> {
    let mut pids: Vec<u32> = procfs::process::all_processes()?
        .flatten()
        .filter_map(|process| {
            let stat = process.stat().ok()?;
            (stat.comm == name).then_some(stat.pid as u32)
        })
        .collect();
    pids.sort_unstable();
    Ok(pids)
}

fn proc_error(pid: u32, err: ProcError) -> PlatformError {
    match err {
        ProcError::NotFound(_) => PlatformError::ProcessNotFound { pid },
        ProcError::PermissionDenied(_) => PlatformError::AccessDenied { pid },
        other => other.into(),
    }
}

fn start_time(epoch_secs: u64) -> Option<OffsetDateTime> {
    let utc = OffsetDateTime::from_unix_timestamp(epoch_secs as i64).ok()?;
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    Some(utc.to_offset(offset))
}

fn user_name(uid: u32) -> String {
    match User::from_uid(Uid::from_raw(uid)) {
        Ok(Some(user)) => user.name,
        _ => uid.to_string(),
    }
}

fn cgroup_paths(process: &Process) -> Vec<String> {
    process
        .cgroups()
        .map(|groups| groups.0.into_iter().map(|g| g.pathname).collect())
        .unwrap_or_default()
}

fn environment(process: &Process) -> Vec<String> {
    let mut env: Vec<String> = process
        .environ()
        .map(|vars| {
            vars.into_iter()
                .map(|(k, v)| format!("{}={}", k.to_string_lossy(), v.to_string_lossy()))
                .collect()
        })
        .unwrap_or_default();
    env.sort();
    env
}

/// Inode and local address of every listening TCP socket on the host
fn listen_sockets() -> PlatformResult<Vec<(u64, SocketAddr)>> {
    let mut entries = procfs::net::tcp()?;
    // Hosts without IPv6 have no tcp6 table
    entries.extend(procfs::net::tcp6().unwrap_or_default());

    Ok(entries
        .into_iter()
        .filter(|e| e.state == TcpState::Listen)
        .map(|e| (e.inode, e.local_address))
        .collect())
}

/// (bind address, port) pairs for sockets this process listens on
fn listeners(process: &Process) -> Vec<(String, u16)> {
    let owned: HashSet<u64> = match process.fd() {
        Ok(fds) => fds
            .flatten()
            .filter_map(|fd| match fd.target {
                FDTarget::Socket(inode) => Some(inode),
                _ => None,
            })
            .collect(),
        Err(_) => return Vec::new(),
    };
    if owned.is_empty() {
        return Vec::new();
    }

    let sockets: HashMap<u64, SocketAddr> = listen_sockets()
        .unwrap_or_default()
        .into_iter()
        .collect();

    let mut found: Vec<(String, u16)> = owned
        .iter()
        .filter_map(|inode| sockets.get(inode))
        .map(|addr| (addr.ip().to_string(), addr.port()))
        .collect();
    found.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    found.dedup();
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn test_read_current_process() {
        let reader = ProcfsReader::new().unwrap();
        let pid = std::process::id();
        let info = reader.read_process(pid).unwrap();

        assert_eq!(info.pid, pid);
        assert!(info.ppid > 0);
        assert!(!info.command.is_empty());
        assert!(!info.cmdline.is_empty());
        assert!(!info.user.is_empty());
        assert!(info.start_time.is_some());
        assert_eq!(
            info.working_dir,
            std::env::current_dir().unwrap().to_string_lossy()
        );
        assert!(!info.env.is_empty());
        assert!(info.env.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_read_missing_process() {
        let reader = ProcfsReader::new().unwrap();
        let err = reader.read_process(u32::MAX / 2).unwrap_err();
        assert!(matches!(err, PlatformError::ProcessNotFound { .. }));
    }

    #[test]
    fn test_listener_found_by_port() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let pids = pids_for_port(port).unwrap();
        assert_eq!(pids, vec![std::process::id()]);

        let reader = ProcfsReader::new().unwrap();
        let info = reader.read_process(std::process::id()).unwrap();
        assert!(info
            .listeners()
            .any(|(addr, p)| addr == "127.0.0.1" && p == port));
    }
}
