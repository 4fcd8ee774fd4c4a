//! macOS process collector backed by ps, lsof and launchctl

use crate::error::{PlatformError, PlatformResult};
use crate::git::git_context;
use crate::launchd::parse_blame;
use crate::lsof::{name_fields, parse_listeners, parse_pids};
use crate::ps::{parse_env_words, parse_pid_command_list, parse_ps_row, PS_COLUMNS};
use nix::unistd::{Uid, User};
use std::path::Path;
use std::process::Command;
use time::UtcOffset;
use witr_core::{Health, ProcessInfo, ServiceLabel};

const CONTAINER_RUNTIMES: &[&str] = &["docker", "containerd"];

/// Snapshot a single process
pub fn read_process(pid: u32) -> PlatformResult<ProcessInfo> {
    let pid_arg = pid.to_string();
    // ps exits non-zero for an unknown pid
    let output = run("ps", &["-p", &pid_arg, "-o", PS_COLUMNS]).map_err(|e| match e {
        PlatformError::CommandFailed { .. } => PlatformError::ProcessNotFound { pid },
        other => other,
    })?;
    let row = output
        .lines()
        .find_map(parse_ps_row)
        .ok_or(PlatformError::ProcessNotFound { pid })?;

    let cmdline = run("ps", &["-p", &pid_arg, "-o", "command="])
        .map(|out| out.trim().to_string())
        .ok()
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| row.command.clone());

    let working_dir = run("lsof", &["-a", "-p", &pid_arg, "-d", "cwd", "-F", "n"])
        .ok()
        .and_then(|out| name_fields(&out).next().map(str::to_string))
        .unwrap_or_default();

    let listeners = run(
        "lsof",
        &["-nP", "-a", "-p", &pid_arg, "-iTCP", "-sTCP:LISTEN", "-F", "n"],
    )
    .map(|out| parse_listeners(&out))
    .unwrap_or_default();
    let (bind_addresses, listening_ports): (Vec<String>, Vec<u16>) =
        listeners.into_iter().unzip();

    let env = run("ps", &["-E", "-p", &pid_arg, "-o", "command="])
        .map(|out| parse_env_words(&out, &cmdline))
        .unwrap_or_default();

    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    let lowered = cmdline.to_lowercase();
    let container = CONTAINER_RUNTIMES
        .iter()
        .find(|rt| lowered.contains(*rt))
        .map(|rt| rt.to_string());
    let git = git_context(Path::new(&working_dir));

    Ok(ProcessInfo {
        pid: row.pid,
        ppid: row.ppid,
        command: row.command,
        cmdline,
        user: user_name(row.uid),
        start_time: row.started.map(|dt| dt.assume_offset(offset)),
        working_dir,
        git_repo: git.repo,
        git_branch: git.branch,
        container,
        listening_ports,
        bind_addresses,
        health: Health::classify(row.state, row.cpu_seconds, row.rss_bytes),
        env,
    })
}

/// launchd service that spawned `pid`
pub fn launchd_label(pid: u32) -> Option<ServiceLabel> {
    let output = run("launchctl", &["blame", &pid.to_string()]).ok()?;
    parse_blame(&output)
}

/// PIDs that own a listening TCP socket on `port`, sorted
pub fn pids_for_port(port: u16) -> PlatformResult<Vec<u32>> {
    let filter = format!("-iTCP:{}", port);
    match run("lsof", &["-nP", &filter, "-sTCP:LISTEN", "-t"]) {
        Ok(output) => Ok(parse_pids(&output)),
        // lsof exits non-zero when nothing matches
        Err(PlatformError::CommandFailed { .. }) => Ok(Vec::new()),
        Err(e) => Err(e),
    }
}

/// PIDs whose short command name equals `name`, sorted
pub fn pids_by_name(name: &str) -> PlatformResult<Vec<u32>> {
    let output = run("ps", &["-axo", "pid=,ucomm="])?;
    let mut pids: Vec<u32> = parse_pid_command_list(&output)
        .into_iter()
        .filter(|(_, command)| command == name)
        .map(|(pid, _)| pid)
        .collect();
    pids.sort_unstable();
    Ok(pids)
}

fn user_name(uid: u32) -> String {
    match User::from_uid(Uid::from_raw(uid)) {
        Ok(Some(user)) => user.name,
        _ => uid.to_string(),
    }
}

fn run(program: &'static str, args: &[&str]) -> PlatformResult<String> {
    log::trace!("Running {} {}", program, args.join(" "));
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| PlatformError::CommandFailed {
            program,
            message: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(PlatformError::CommandFailed {
            program,
            message: format!(
                "{}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
