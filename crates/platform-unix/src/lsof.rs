//! Parsing of `lsof -F` field output

/// Split an lsof listen address into bind address and port
///
/// Handles `*:8080` (any interface), `127.0.0.1:5432`, `[::1]:80` and the
/// BSD style `127.0.0.1.5432`.
pub fn parse_listen_addr(addr: &str) -> Option<(String, u16)> {
    let addr = addr.trim();
    // Drop the remote half of a connected socket
    let addr = addr.split("->").next().unwrap_or(addr);

    let (host, port) = match addr.rsplit_once(':') {
        Some(split) => split,
        None => addr.rsplit_once('.')?,
    };
    let port = port.parse().ok()?;

    let host = match host.trim_matches(['[', ']']) {
        "*" | "" => "0.0.0.0",
        h => h,
    };
    Some((host.to_string(), port))
}

/// Collect every `n` (name) field of `lsof -F n` output
pub fn name_fields(output: &str) -> impl Iterator<Item = &str> {
    output.lines().filter_map(|line| line.strip_prefix('n'))
}

/// Listen addresses from `lsof -F n` output, in output order
pub fn parse_listeners(output: &str) -> Vec<(String, u16)> {
    let mut listeners: Vec<(String, u16)> = Vec::new();
    for entry in name_fields(output).filter_map(parse_listen_addr) {
        if !listeners.contains(&entry) {
            listeners.push(entry);
        }
    }
    listeners
}

/// PIDs printed by `lsof -t`, sorted and deduplicated
pub fn parse_pids(output: &str) -> Vec<u32> {
    let mut pids: Vec<u32> = output
        .lines()
        .filter_map(|line| line.trim().parse().ok())
        .collect();
    pids.sort_unstable();
    pids.dedup();
    pids
}
