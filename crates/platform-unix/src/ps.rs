//! Parsing of BSD `ps` output
//!
//! The macOS collector asks `ps` for one row per process with the columns
//! `pid= ppid= uid= lstart= state= time= rss= ucomm=`. `lstart` spans five
//! whitespace separated tokens and `ucomm` is last so it may contain spaces.

use time::macros::format_description;
use time::PrimitiveDateTime;

/// Columns requested from `ps -o`
pub const PS_COLUMNS: &str = "pid=,ppid=,uid=,lstart=,state=,time=,rss=,ucomm=";

/// One parsed `ps` row
#[derive(Debug, Clone, PartialEq)]
pub struct PsRow {
    pub pid: u32,
    pub ppid: u32,
    pub uid: u32,
    /// Start time in the machine's local time zone
    pub started: Option<PrimitiveDateTime>,
    pub state: char,
    pub cpu_seconds: u64,
    pub rss_bytes: u64,
    pub command: String,
}

/// Parse a single row printed with [`PS_COLUMNS`]
pub fn parse_ps_row(line: &str) -> Option<PsRow> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 12 {
        return None;
    }

    let lstart = tokens[3..8].join(" ");
    let rss_kb: u64 = tokens[10].parse().ok()?;

    Some(PsRow {
        pid: tokens[0].parse().ok()?,
        ppid: tokens[1].parse().ok()?,
        uid: tokens[2].parse().ok()?,
        started: parse_lstart(&lstart),
        state: tokens[8].chars().next().unwrap_or('?'),
        cpu_seconds: parse_cpu_time(tokens[9]).unwrap_or(0),
        rss_bytes: rss_kb * 1024,
        command: tokens[11..].join(" "),
    })
}

/// Parse an `lstart` value such as `Sat Oct 3 09:14:22 2026`
pub fn parse_lstart(value: &str) -> Option<PrimitiveDateTime> {
    PrimitiveDateTime::parse(
        value,
        format_description!(
            "[weekday repr:short] [month repr:short] [day padding:none] [hour]:[minute]:[second] [year]"
        ),
    )
    .ok()
}

/// Parse cumulative CPU time in `[[dd-]hh:]mm:ss[.cc]` form into whole seconds
pub fn parse_cpu_time(value: &str) -> Option<u64> {
    let (days, clock) = match value.split_once('-') {
        Some((d, rest)) => (d.parse::<u64>().ok()?, rest),
        None => (0, value),
    };

    let mut seconds = 0u64;
    for part in clock.split(':') {
        let whole = part.split('.').next()?;
        seconds = seconds * 60 + whole.parse::<u64>().ok()?;
    }
    Some(days * 86_400 + seconds)
}

/// Parse `ps -axo pid=,ucomm=` output into (pid, command) pairs
pub fn parse_pid_command_list(output: &str) -> Vec<(u32, String)> {
    output
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            let (pid, command) = line.split_once(char::is_whitespace)?;
            Some((pid.parse().ok()?, command.trim().to_string()))
        })
        .collect()
}

/// Environment entries from `ps -E -o command=` output
///
/// `ps` appends `KEY=value` words after the command line; the command line
/// itself is stripped first so its own `=` arguments are not mistaken for
/// variables.
pub fn parse_env_words(output: &str, cmdline: &str) -> Vec<String> {
    let line = output.trim();
    let rest = line.strip_prefix(cmdline.trim()).unwrap_or(line);
    rest.split_whitespace()
        .filter(|word| is_env_word(word))
        .map(str::to_string)
        .collect()
}

fn is_env_word(word: &str) -> bool {
    match word.split_once('=') {
        Some((key, _)) => {
            !key.is_empty()
                && key
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_')
                && !key.starts_with(|c: char| c.is_ascii_digit())
        }
        None => false,
    }
}
