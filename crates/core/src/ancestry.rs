//! Process ancestry chain building
//!
//! Walks the parent chain of a target process up to init (PID 1), producing
//! the chain from the topmost reachable ancestor down to the target.

use crate::process::{ProcessReader, ProcessView, ReadError};
use log::debug;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{HashSet, VecDeque};
use thiserror::Error;

/// PID of the init process
pub const INIT_PID: u32 = 1;

/// Errors from building an ancestry chain
#[derive(Debug, Error)]
pub enum AncestryError {
    /// The requested process itself could not be read
    #[error("cannot read process {pid}: {source}")]
    TargetUnreadable {
        pid: u32,
        #[source]
        source: ReadError,
    },

    /// A supplied chain was empty or repeated a PID
    #[error("ancestry chain is empty or repeats a PID")]
    InvalidChain,
}

/// Ordered chain `[root, ..., parent, target]`
///
/// Never empty, and no PID appears twice. Serialized as a plain list;
/// deserializing goes through the same validation as [`Ancestry::from_chain`].
#[derive(Debug, Clone, PartialEq)]
pub struct Ancestry<P> {
    chain: Vec<P>,
}

impl<P: ProcessView> Ancestry<P> {
    /// Wrap an already ordered chain; `None` if it is empty or repeats a PID
    pub fn from_chain(chain: Vec<P>) -> Option<Self> {
        let mut seen = HashSet::new();
        if chain.is_empty() || !chain.iter().all(|p| seen.insert(p.pid())) {
            return None;
        }
        Some(Self { chain })
    }

    /// The process the chain was built for
    pub fn target(&self) -> &P {
        &self.chain[self.chain.len() - 1]
    }

    /// The topmost ancestor that could be read
    pub fn root(&self) -> &P {
        &self.chain[0]
    }

    /// Whether the chain reaches init rather than stopping early
    pub fn reaches_init(&self) -> bool {
        self.root().pid() == INIT_PID
    }

    /// Iterate from root to target
    pub fn iter(&self) -> std::slice::Iter<'_, P> {
        self.chain.iter()
    }

    /// Iterate from target to root
    pub fn nearest_first(&self) -> std::iter::Rev<std::slice::Iter<'_, P>> {
        self.chain.iter().rev()
    }

    pub fn as_slice(&self) -> &[P] {
        &self.chain
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }
}

impl<P: ProcessView> TryFrom<Vec<P>> for Ancestry<P> {
    type Error = AncestryError;

    fn try_from(chain: Vec<P>) -> Result<Self, Self::Error> {
        Self::from_chain(chain).ok_or(AncestryError::InvalidChain)
    }
}

impl<P: Serialize> Serialize for Ancestry<P> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.chain.serialize(serializer)
    }
}

impl<'de, P> Deserialize<'de> for Ancestry<P>
where
    P: Deserialize<'de> + ProcessView,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let chain = Vec::<P>::deserialize(deserializer)?;
        Self::try_from(chain).map_err(D::Error::custom)
    }
}

impl<'a, P> IntoIterator for &'a Ancestry<P> {
    type Item = &'a P;
    type IntoIter = std::slice::Iter<'a, P>;

    fn into_iter(self) -> Self::IntoIter {
        self.chain.iter()
    }
}

/// Build the ancestry chain for a process
///
/// Reads `pid` and then each parent in turn until init, a parent of 0, an
/// unreadable ancestor, or an already visited PID is reached. Only a failure
/// to read `pid` itself is an error; an unreadable ancestor truncates the
/// chain.
pub fn build_ancestry<R>(reader: &R, pid: u32) -> Result<Ancestry<R::Process>, AncestryError>
where
    R: ProcessReader + ?Sized,
{
    if pid == 0 {
        return Err(AncestryError::TargetUnreadable {
            pid,
            source: ReadError::NotFound { pid },
        });
    }

    let mut chain = VecDeque::new();
    let mut visited = HashSet::new();
    let mut current = pid;

    loop {
        if current == 0 {
            break;
        }
        if !visited.insert(current) {
            debug!("Cycle detected in ancestry of PID {} at PID {}", pid, current);
            break;
        }

        let process = match reader.read(current) {
            Ok(process) => process,
            Err(source) if current == pid => {
                return Err(AncestryError::TargetUnreadable { pid, source });
            }
            Err(err) => {
                debug!("Ancestry of PID {} truncated at PID {}: {}", pid, current, err);
                break;
            }
        };

        let parent = process.ppid();
        let reached_init = process.pid() == INIT_PID || parent == 0;
        debug!("PID {} ({}) -> parent {}", current, process.command(), parent);
        chain.push_front(process);

        if reached_init {
            break;
        }
        current = parent;
    }

    Ok(Ancestry {
        chain: chain.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProcessInfo;
    use std::collections::HashMap;

    fn proc(pid: u32, ppid: u32, command: &str) -> ProcessInfo {
        ProcessInfo {
            pid,
            ppid,
            command: command.to_string(),
            ..Default::default()
        }
    }

    /// Create a fake process table for testing ancestry building
    fn create_fake_process_table() -> HashMap<u32, ProcessInfo> {
        [
            proc(1, 0, "systemd"),
            proc(100, 1, "sshd"),
            proc(200, 100, "sshd"),
            proc(300, 200, "bash"),
            proc(400, 300, "vim"),
        ]
        .into_iter()
        .map(|p| (p.pid, p))
        .collect()
    }

    fn pids(ancestry: &Ancestry<ProcessInfo>) -> Vec<u32> {
        ancestry.iter().map(|p| p.pid).collect()
    }

    #[test]
    fn test_build_ancestry_reaches_init() {
        let table = create_fake_process_table();
        let ancestry = build_ancestry(&table, 400).expect("Should build ancestry");

        assert_eq!(pids(&ancestry), vec![1, 100, 200, 300, 400]);
        assert_eq!(ancestry.target().pid, 400);
        assert_eq!(ancestry.root().pid, 1);
        assert!(ancestry.reaches_init());
    }

    #[test]
    fn test_build_ancestry_for_init_itself() {
        let table = create_fake_process_table();
        let ancestry = build_ancestry(&table, 1).expect("Should build ancestry");
        assert_eq!(pids(&ancestry), vec![1]);
    }

    #[test]
    fn test_build_ancestry_stops_at_parent_zero() {
        let mut table = create_fake_process_table();
        // A kernel thread style root that is not PID 1
        table.insert(2, proc(2, 0, "kthreadd"));
        table.insert(50, proc(50, 2, "kworker/0:1"));

        let ancestry = build_ancestry(&table, 50).expect("Should build ancestry");
        assert_eq!(pids(&ancestry), vec![2, 50]);
        assert!(!ancestry.reaches_init());
    }

    #[test]
    fn test_build_ancestry_truncates_at_unreadable_parent() {
        let mut table = create_fake_process_table();
        // Parent 999 has exited
        table.insert(500, proc(500, 999, "orphan"));
        table.insert(600, proc(600, 500, "child"));

        let ancestry = build_ancestry(&table, 600).expect("Truncation is not an error");
        assert_eq!(pids(&ancestry), vec![500, 600]);
    }

    #[test]
    fn test_build_ancestry_fails_for_unreadable_target() {
        let table = create_fake_process_table();
        let err = build_ancestry(&table, 12345).unwrap_err();
        match err {
            AncestryError::TargetUnreadable { pid, source } => {
                assert_eq!(pid, 12345);
                assert_eq!(source, ReadError::NotFound { pid: 12345 });
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_build_ancestry_rejects_pid_zero() {
        let table = create_fake_process_table();
        assert!(build_ancestry(&table, 0).is_err());
    }

    #[test]
    fn test_build_ancestry_detects_cycles() {
        let mut table = create_fake_process_table();
        // Create a cycle: 500 -> 501 -> 500
        table.insert(500, proc(500, 501, "cycle1"));
        table.insert(501, proc(501, 500, "cycle2"));

        let ancestry = build_ancestry(&table, 500).expect("Cycle must terminate");
        assert!(ancestry.len() <= 2);
        assert_eq!(pids(&ancestry), vec![501, 500]);
    }

    #[test]
    fn test_build_ancestry_self_parented() {
        let mut table = create_fake_process_table();
        table.insert(999, proc(999, 999, "self"));

        let ancestry = build_ancestry(&table, 999).expect("Should build ancestry");
        assert_eq!(pids(&ancestry), vec![999]);
    }

    #[test]
    fn test_build_ancestry_invariants_hold_for_every_pid() {
        let mut table = create_fake_process_table();
        table.insert(500, proc(500, 501, "a"));
        table.insert(501, proc(501, 502, "b"));
        table.insert(502, proc(502, 500, "c"));
        table.insert(700, proc(700, 888, "orphan"));

        for &pid in table.keys() {
            let ancestry = build_ancestry(&table, pid).expect("Every PID is readable");
            assert_eq!(ancestry.target().pid, pid);

            let mut seen = HashSet::new();
            assert!(ancestry.iter().all(|p| seen.insert(p.pid)), "duplicate PID");

            let root = ancestry.root();
            let parent_readable = table.contains_key(&root.ppid);
            let parent_in_chain = seen.contains(&root.ppid);
            assert!(
                root.pid == INIT_PID || root.ppid == 0 || !parent_readable || parent_in_chain,
                "chain for {} stopped early at {}",
                pid,
                root.pid
            );
        }
    }

    #[test]
    fn test_from_chain_rejects_empty_and_duplicates() {
        assert!(Ancestry::<ProcessInfo>::from_chain(vec![]).is_none());
        assert!(Ancestry::from_chain(vec![proc(1, 0, "init"), proc(1, 0, "init")]).is_none());
        assert!(Ancestry::from_chain(vec![proc(1, 0, "init"), proc(2, 1, "sh")]).is_some());
    }

    #[test]
    fn test_ancestry_serializes_as_list() {
        let table = create_fake_process_table();
        let ancestry = build_ancestry(&table, 300).unwrap();
        let value = serde_json::to_value(&ancestry).unwrap();
        let list = value.as_array().expect("ancestry is a JSON array");
        assert_eq!(list.len(), 4);
        assert_eq!(list[3]["command"], "bash");
    }

    #[test]
    fn test_ancestry_json_round_trip() {
        let table = create_fake_process_table();
        let ancestry = build_ancestry(&table, 300).unwrap();
        let json = serde_json::to_string(&ancestry).unwrap();
        let parsed: Ancestry<ProcessInfo> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, ancestry);
    }

    #[test]
    fn test_deserialize_rejects_empty_chain() {
        let result = serde_json::from_str::<Ancestry<ProcessInfo>>("[]");
        let err = result.unwrap_err();
        assert!(err.to_string().contains("empty or repeats a PID"));
    }

    #[test]
    fn test_deserialize_rejects_repeated_pid() {
        let json = serde_json::to_string(&vec![proc(5, 1, "a"), proc(5, 1, "b")]).unwrap();
        let err = serde_json::from_str::<Ancestry<ProcessInfo>>(&json).unwrap_err();
        assert!(err.to_string().contains("empty or repeats a PID"));
    }

    #[test]
    fn test_try_from_vec() {
        assert!(matches!(
            Ancestry::<ProcessInfo>::try_from(Vec::new()),
            Err(AncestryError::InvalidChain)
        ));
        let ancestry = Ancestry::try_from(vec![proc(1, 0, "init")]).unwrap();
        assert_eq!(ancestry.target().pid, 1);
    }
}
