//! Process source classification
//!
//! Determines what started or supervises a process from its ancestry. The
//! classifiers run in a fixed priority order and the first match wins:
//! container, supervisor, cron, shell, then the init system.

use crate::ancestry::{Ancestry, INIT_PID};
use crate::models::{Source, SourceKind};
use crate::process::ProcessView;
use log::debug;

/// Confidence scores for the heuristics
pub mod scores {
    /// Container cgroup marker anywhere in the chain
    pub const CONTAINER: f64 = 0.9;
    /// pm2 in a command name or command line
    pub const PM2: f64 = 0.9;
    /// Registered supervisor program
    pub const SUPERVISOR: f64 = 0.7;
    /// cron / crond ancestor
    pub const CRON: f64 = 0.6;
    /// Interactive shell ancestor
    pub const SHELL: f64 = 0.5;
    /// Init system as PID 1
    pub const INIT: f64 = 0.8;
    /// Init system with a resolved service label
    pub const INIT_SERVICE: f64 = 0.9;
    /// Unknown origin
    pub const UNKNOWN: f64 = 0.2;
}

/// Known supervisors and the name they are reported as.
///
/// Longer keys come before their prefixes so that command-line substring
/// matches pick the most specific entry.
pub const SUPERVISORS: &[(&str, &str)] = &[
    ("pm2 god", "pm2"),
    ("pm2", "pm2"),
    ("supervisord", "supervisord"),
    ("gunicorn", "gunicorn"),
    ("uwsgi", "uwsgi"),
    ("s6-supervise", "s6"),
    ("s6", "s6"),
    ("runsv", "runit"),
    ("runit", "runit"),
    ("openrc", "openrc"),
    ("monit", "monit"),
    ("circusd", "circus"),
    ("circus", "circus"),
    ("daemontools", "daemontools"),
    ("tini", "tini"),
    ("docker-init", "docker-init"),
];

pub const CRON_DAEMONS: &[&str] = &["cron", "crond"];

pub const SHELLS: &[&str] = &["bash", "zsh", "sh", "fish"];

/// A resolved init-system service for a PID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceLabel {
    /// Service label, e.g. `com.apple.Spotlight` or `nginx.service`
    pub label: String,
    /// Domain the service lives in, e.g. `system` or `gui/501`
    pub domain: String,
}

/// Resolves which init-system service manages a PID
///
/// Lookups may fail for any reason; a failure is reported as `None` and
/// only lowers the confidence of the init classification.
pub trait ServiceLabelLookup {
    fn service_label(&self, pid: u32) -> Option<ServiceLabel>;
}

/// The init program expected as PID 1 on a platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitSystem {
    pub kind: SourceKind,
    pub program: &'static str,
}

impl InitSystem {
    pub const SYSTEMD: InitSystem = InitSystem {
        kind: SourceKind::Systemd,
        program: "systemd",
    };

    pub const LAUNCHD: InitSystem = InitSystem {
        kind: SourceKind::Launchd,
        program: "launchd",
    };

    /// The init system of the platform this binary was built for
    pub fn native() -> Option<Self> {
        if cfg!(target_os = "macos") {
            Some(Self::LAUNCHD)
        } else if cfg!(target_os = "linux") {
            Some(Self::SYSTEMD)
        } else {
            None
        }
    }
}

/// One unit of the classifier chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classifier {
    Container,
    Supervisor,
    Cron,
    Shell,
    Init,
}

/// Evaluation order of the classifier chain
pub const PRIORITY: [Classifier; 5] = [
    Classifier::Container,
    Classifier::Supervisor,
    Classifier::Cron,
    Classifier::Shell,
    Classifier::Init,
];

/// Source detector for one platform configuration
#[derive(Clone, Copy)]
pub struct Detector<'a> {
    init: Option<InitSystem>,
    lookup: Option<&'a dyn ServiceLabelLookup>,
}

impl<'a> Detector<'a> {
    /// Create a detector; `init` is `None` on platforms without a known init
    pub fn new(init: Option<InitSystem>) -> Self {
        Self { init, lookup: None }
    }

    /// Create a detector for the platform this binary was built for
    pub fn native() -> Self {
        Self::new(InitSystem::native())
    }

    /// Use `lookup` to resolve service labels for init-managed targets
    pub fn with_lookup(mut self, lookup: &'a dyn ServiceLabelLookup) -> Self {
        self.lookup = Some(lookup);
        self
    }

    /// Classify the source of the target of `ancestry`
    pub fn detect<P: ProcessView>(&self, ancestry: &Ancestry<P>) -> Source {
        for classifier in PRIORITY {
            if let Some(source) = self.evaluate(classifier, ancestry) {
                debug!(
                    "PID {} classified as {} by {:?}",
                    ancestry.target().pid(),
                    source.kind,
                    classifier
                );
                return source;
            }
        }
        Source::unknown()
    }

    /// Run a single classifier
    pub fn evaluate<P: ProcessView>(
        &self,
        classifier: Classifier,
        ancestry: &Ancestry<P>,
    ) -> Option<Source> {
        match classifier {
            Classifier::Container => detect_container(ancestry),
            Classifier::Supervisor => detect_supervisor(ancestry),
            Classifier::Cron => detect_cron(ancestry),
            Classifier::Shell => detect_shell(ancestry),
            Classifier::Init => self.detect_init(ancestry),
        }
    }

    /// PID 1 running the platform's init program
    fn detect_init<P: ProcessView>(&self, ancestry: &Ancestry<P>) -> Option<Source> {
        let init = self.init?;
        let root = ancestry.root();
        if root.pid() != INIT_PID || root.command() != init.program {
            return None;
        }

        let target = ancestry.target().pid();
        match self.lookup.and_then(|lookup| lookup.service_label(target)) {
            Some(service) if !service.label.is_empty() => Some(
                Source::new(init.kind, service.label, scores::INIT_SERVICE)
                    .with_detail("domain", service.domain),
            ),
            _ => Some(Source::new(init.kind, init.program, scores::INIT)),
        }
    }
}

impl std::fmt::Debug for Detector<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Detector")
            .field("init", &self.init)
            .field("lookup", &self.lookup.is_some())
            .finish()
    }
}

/// Container cgroup evidence on any ancestor, not only the target
fn detect_container<P: ProcessView>(ancestry: &Ancestry<P>) -> Option<Source> {
    let runtime = ancestry.iter().find_map(|p| p.container())?;
    Some(
        Source::new(SourceKind::Container, "container", scores::CONTAINER)
            .with_detail("runtime", runtime),
    )
}

/// Nearest supervisor to the target
fn detect_supervisor<P: ProcessView>(ancestry: &Ancestry<P>) -> Option<Source> {
    ancestry.nearest_first().find_map(|p| {
        let command = p.command().to_lowercase();
        let cmdline = p.cmdline().to_lowercase();

        if command.contains("pm2") || cmdline.contains("pm2") {
            return Some(Source::new(SourceKind::Supervisor, "pm2", scores::PM2));
        }
        if let Some((_, name)) = SUPERVISORS.iter().find(|(key, _)| *key == command) {
            return Some(Source::new(SourceKind::Supervisor, *name, scores::SUPERVISOR));
        }
        // Wrapped by an interpreter, e.g. `python /usr/bin/supervisord`
        SUPERVISORS
            .iter()
            .find(|(key, _)| cmdline.contains(key))
            .map(|(_, name)| Source::new(SourceKind::Supervisor, *name, scores::SUPERVISOR))
    })
}

fn detect_cron<P: ProcessView>(ancestry: &Ancestry<P>) -> Option<Source> {
    ancestry
        .nearest_first()
        .find(|p| CRON_DAEMONS.contains(&p.command()))
        .map(|_| Source::new(SourceKind::Cron, "cron", scores::CRON))
}

fn detect_shell<P: ProcessView>(ancestry: &Ancestry<P>) -> Option<Source> {
    ancestry
        .nearest_first()
        .find(|p| SHELLS.contains(&p.command()))
        .map(|p| Source::new(SourceKind::Shell, p.command(), scores::SHELL))
}
