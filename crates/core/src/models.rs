//! Core domain models for witr
//!
//! These types are OS-agnostic and describe a process snapshot, the verdict
//! about what supervises it, and the advisories raised about it.

use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use time::OffsetDateTime;

/// Accumulated CPU time above which a process is flagged `high-cpu`
pub const HIGH_CPU_SECONDS: u64 = 2 * 60 * 60;

/// Resident memory above which a process is flagged `high-mem`
pub const HIGH_MEM_BYTES: u64 = 1024 * 1024 * 1024;

/// The input target for the query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Target {
    /// Query by process ID
    Pid(u32),
    /// Query by listening TCP port
    Port(u16),
    /// Query by short command name
    Name(String),
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Pid(pid) => write!(f, "PID {}", pid),
            Target::Port(port) => write!(f, "port {}", port),
            Target::Name(name) => write!(f, "\"{}\"", name),
        }
    }
}

/// Exclusive health label of a process at snapshot time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Health {
    #[default]
    Healthy,
    Zombie,
    Stopped,
    HighCpu,
    HighMem,
}

impl Health {
    /// Derive the label from a scheduler state letter and resource usage.
    ///
    /// The checks run in order and later ones win: a stopped process that
    /// also holds more than 1 GiB resident is reported as `high-mem`.
    pub fn classify(state: char, cpu_seconds: u64, rss_bytes: u64) -> Self {
        let mut health = match state {
            'Z' => Health::Zombie,
            'T' => Health::Stopped,
            _ => Health::Healthy,
        };
        if cpu_seconds > HIGH_CPU_SECONDS {
            health = Health::HighCpu;
        }
        if rss_bytes > HIGH_MEM_BYTES {
            health = Health::HighMem;
        }
        health
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Health::Healthy => "healthy",
            Health::Zombie => "zombie",
            Health::Stopped => "stopped",
            Health::HighCpu => "high-cpu",
            Health::HighMem => "high-mem",
        }
    }

    pub fn is_healthy(&self) -> bool {
        *self == Health::Healthy
    }
}

impl std::fmt::Display for Health {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of one process, as produced by a process reader
///
/// Fields the reader could not determine are left empty rather than
/// failing the read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessInfo {
    /// Process ID
    pub pid: u32,
    /// Parent process ID (0 when there is none)
    pub ppid: u32,
    /// Short command name (`comm`)
    pub command: String,
    /// Full command line, arguments joined by spaces
    pub cmdline: String,
    /// Owning user name, or the numeric uid when it cannot be resolved
    pub user: String,
    /// Process start time
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub start_time: Option<OffsetDateTime>,
    /// Current working directory
    pub working_dir: String,
    /// Name of the git repository containing the working directory
    pub git_repo: Option<String>,
    /// Checked-out branch of that repository
    pub git_branch: Option<String>,
    /// Container runtime the process belongs to (docker, containerd, kubernetes)
    pub container: Option<String>,
    /// TCP ports the process is listening on
    pub listening_ports: Vec<u16>,
    /// Bind address of each listening port, index-aligned with `listening_ports`
    pub bind_addresses: Vec<String>,
    /// Health label
    pub health: Health,
    /// Environment as `KEY=value` strings
    pub env: Vec<String>,
}

impl ProcessInfo {
    /// Iterate `(address, port)` pairs of the listening sockets
    pub fn listeners(&self) -> impl Iterator<Item = (&str, u16)> + '_ {
        self.listening_ports
            .iter()
            .enumerate()
            .map(|(i, port)| {
                let addr = self
                    .bind_addresses
                    .get(i)
                    .map(String::as_str)
                    .unwrap_or("0.0.0.0");
                (addr, *port)
            })
    }
}

/// What supervises a process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Docker, containerd or a Kubernetes pod
    Container,
    /// systemd as PID 1
    Systemd,
    /// launchd as PID 1
    Launchd,
    /// A process manager such as pm2, supervisord or runit
    Supervisor,
    /// cron / crond
    Cron,
    /// An interactive shell
    Shell,
    /// Origin could not be determined
    Unknown,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Container => "container",
            SourceKind::Systemd => "systemd",
            SourceKind::Launchd => "launchd",
            SourceKind::Supervisor => "supervisor",
            SourceKind::Cron => "cron",
            SourceKind::Shell => "shell",
            SourceKind::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict of the source detector
///
/// Deserializing rejects a confidence outside `[0.0, 1.0]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SourceRecord")]
pub struct Source {
    #[serde(rename = "Type")]
    pub kind: SourceKind,
    #[serde(rename = "Name")]
    pub name: String,
    /// Heuristic score in `[0.0, 1.0]`
    #[serde(rename = "Confidence")]
    pub confidence: f64,
    #[serde(rename = "Details")]
    pub details: Option<BTreeMap<String, String>>,
}

/// Wire form of [`Source`], checked before it becomes one
#[derive(Deserialize)]
struct SourceRecord {
    #[serde(rename = "Type")]
    kind: SourceKind,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Confidence")]
    confidence: f64,
    #[serde(rename = "Details", default)]
    details: Option<BTreeMap<String, String>>,
}

impl TryFrom<SourceRecord> for Source {
    type Error = String;

    fn try_from(record: SourceRecord) -> Result<Self, Self::Error> {
        if !(0.0..=1.0).contains(&record.confidence) {
            return Err(format!(
                "confidence {} is outside [0, 1]",
                record.confidence
            ));
        }
        Ok(Self {
            kind: record.kind,
            name: record.name,
            confidence: record.confidence,
            details: record.details,
        })
    }
}

impl Source {
    /// Create a source; the confidence is clamped into `[0.0, 1.0]`
    pub fn new(kind: SourceKind, name: impl Into<String>, confidence: f64) -> Self {
        Self {
            kind,
            name: name.into(),
            confidence: confidence.clamp(0.0, 1.0),
            details: None,
        }
    }

    /// Attach a supplementary detail
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Look up a detail by key
    pub fn detail(&self, key: &str) -> Option<&str> {
        self.details.as_ref()?.get(key).map(String::as_str)
    }

    /// Create an unknown classification
    pub fn unknown() -> Self {
        Self::new(SourceKind::Unknown, "unknown", 0.2)
    }

    pub fn is_unknown(&self) -> bool {
        self.kind == SourceKind::Unknown
    }
}

/// An advisory about the target process
///
/// Serialized as its display string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    Zombie,
    Stopped,
    HighCpu,
    HighMem,
    /// Listening on `0.0.0.0` or `::`
    PublicInterface,
    RunningAsRoot,
    SuspiciousWorkingDir { dir: String },
    LongRunning,
    NoKnownSupervisor,
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::Zombie => write!(f, "Process is a zombie (defunct)"),
            Warning::Stopped => write!(f, "Process is stopped"),
            Warning::HighCpu => write!(f, "Process is using high CPU (>2h total)"),
            Warning::HighMem => write!(f, "Process is using high memory (>1GB RSS)"),
            Warning::PublicInterface => write!(f, "Process is listening on a public interface"),
            Warning::RunningAsRoot => write!(f, "Process is running as root"),
            Warning::SuspiciousWorkingDir { dir } => {
                write!(f, "Process running from suspicious directory: {}", dir)
            }
            Warning::LongRunning => write!(f, "Process has been running for over 90 days"),
            Warning::NoKnownSupervisor => write!(f, "No known supervisor detected"),
        }
    }
}

impl Serialize for Warning {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
