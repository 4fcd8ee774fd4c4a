//! Container and systemd unit detection from cgroup paths
//!
//! A process's cgroup membership is read from `/proc/<pid>/cgroup`. Each line
//! carries a path such as `/system.slice/nginx.service` or
//! `/kubepods/burstable/pod1234/abcd`. The helpers here are pure so they can
//! be tested without a live system.

use witr_core::ServiceLabel;

/// Markers checked in order; the first one found in any path wins
const RUNTIME_MARKERS: &[(&str, &str)] = &[
    ("kubepods", "kubernetes"),
    ("docker", "docker"),
    ("containerd", "containerd"),
];

/// Container runtime named by any of the cgroup `paths`
pub fn container_runtime<S: AsRef<str>>(paths: &[S]) -> Option<&'static str> {
    RUNTIME_MARKERS.iter().find_map(|(marker, runtime)| {
        paths
            .iter()
            .any(|path| path.as_ref().contains(marker))
            .then_some(*runtime)
    })
}

/// systemd unit owning the process, from its cgroup `paths`
///
/// The unit is the last path segment ending in `.service`. A `user@<uid>.service`
/// segment earlier in the path puts the unit in the `user` domain.
pub fn systemd_unit<S: AsRef<str>>(paths: &[S]) -> Option<ServiceLabel> {
    paths.iter().find_map(|path| {
        let segments: Vec<&str> = path
            .as_ref()
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        let unit = segments.iter().rev().find(|s| s.ends_with(".service"))?;
        let user_session = segments
            .iter()
            .any(|s| s.starts_with("user@") && s.ends_with(".service") && s != unit);

        Some(ServiceLabel {
            label: unit.to_string(),
            domain: if user_session { "user" } else { "system" }.to_string(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(&["/system.slice/docker-4f2a.scope"], Some("docker"))]
    #[case(&["/docker/4f2a9c"], Some("docker"))]
    #[case(&["/system.slice/containerd.service/abc"], Some("containerd"))]
    #[case(&["/kubepods/burstable/pod1234/abcd"], Some("kubernetes"))]
    #[case(&["/kubepods.slice/kubepods-besteffort.slice/cri-containerd-1.scope"], Some("kubernetes"))]
    #[case(&["/user.slice/user-1000.slice/session-2.scope"], None)]
    #[case(&[], None)]
    fn test_container_runtime(#[case] paths: &[&str], #[case] expected: Option<&str>) {
        assert_eq!(container_runtime(paths), expected);
    }

    #[test]
    fn test_system_unit() {
        let label = systemd_unit(&["/system.slice/nginx.service"]).unwrap();
        assert_eq!(label.label, "nginx.service");
        assert_eq!(label.domain, "system");
    }

    #[test]
    fn test_user_unit() {
        let label = systemd_unit(&[
            "/user.slice/user-1000.slice/user@1000.service/app.slice/syncthing.service",
        ])
        .unwrap();
        assert_eq!(label.label, "syncthing.service");
        assert_eq!(label.domain, "user");
    }

    #[test]
    fn test_user_manager_itself() {
        let label = systemd_unit(&["/user.slice/user-1000.slice/user@1000.service/init.scope"])
            .unwrap();
        assert_eq!(label.label, "user@1000.service");
        assert_eq!(label.domain, "system");
    }

    #[test]
    fn test_session_scope_has_no_unit() {
        assert!(systemd_unit(&["/user.slice/user-1000.slice/session-2.scope"]).is_none());
        assert!(systemd_unit::<&str>(&[]).is_none());
    }

    #[test]
    fn test_first_hierarchy_with_unit_wins() {
        let label = systemd_unit(&["/", "/system.slice/sshd.service"]).unwrap();
        assert_eq!(label.label, "sshd.service");
    }
}
