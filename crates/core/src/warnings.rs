//! Warning rules for a target process
//!
//! Each rule looks at the target (the last element of the ancestry) and
//! contributes at most one warning. Rules are independent; the output keeps
//! rule order.

use crate::ancestry::Ancestry;
use crate::models::{Health, Source, Warning};
use crate::process::ProcessView;
use std::net::IpAddr;
use time::{Duration, OffsetDateTime};

/// Uptime above which a process is reported as long-running
pub const LONG_RUNNING_THRESHOLD: Duration = Duration::days(90);

/// Working directories that are shared or ephemeral
pub const SUSPICIOUS_WORKING_DIRS: &[&str] = &["/", "/tmp", "/var/tmp"];

const ROOT_USER: &str = "root";

/// Warnings for the target of `ancestry`, evaluated against the current time
pub fn warnings<P: ProcessView>(ancestry: &Ancestry<P>, source: &Source) -> Vec<Warning> {
    warnings_at(ancestry, source, OffsetDateTime::now_utc())
}

/// Warnings for the target of `ancestry`, evaluated at `now`
pub fn warnings_at<P: ProcessView>(
    ancestry: &Ancestry<P>,
    source: &Source,
    now: OffsetDateTime,
) -> Vec<Warning> {
    let target = ancestry.target();
    let mut warnings = Vec::new();

    warnings.extend(health_warning(target.health()));

    if is_public_bind(target.bind_addresses()) {
        warnings.push(Warning::PublicInterface);
    }

    if target.user() == ROOT_USER {
        warnings.push(Warning::RunningAsRoot);
    }

    let dir = target.working_dir();
    if SUSPICIOUS_WORKING_DIRS.contains(&dir) {
        warnings.push(Warning::SuspiciousWorkingDir {
            dir: dir.to_string(),
        });
    }

    if let Some(started) = target.start_time() {
        if now - started > LONG_RUNNING_THRESHOLD {
            warnings.push(Warning::LongRunning);
        }
    }

    if source.is_unknown() {
        warnings.push(Warning::NoKnownSupervisor);
    }

    warnings
}

fn health_warning(health: Health) -> Option<Warning> {
    match health {
        Health::Healthy => None,
        Health::Zombie => Some(Warning::Zombie),
        Health::Stopped => Some(Warning::Stopped),
        Health::HighCpu => Some(Warning::HighCpu),
        Health::HighMem => Some(Warning::HighMem),
    }
}

/// Whether any address is the IPv4 or IPv6 wildcard
pub fn is_public_bind<S: AsRef<str>>(addrs: &[S]) -> bool {
    addrs.iter().any(|addr| {
        let addr = addr.as_ref();
        addr.trim_matches(['[', ']'])
            .parse::<IpAddr>()
            .map(|ip| ip.is_unspecified())
            .unwrap_or(false)
    })
}
