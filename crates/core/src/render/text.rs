//! Text-based rendering for reports

use crate::models::ProcessInfo;
use crate::report::Report;
use time::macros::format_description;
use time::OffsetDateTime;

/// Render the standard narrative report
pub fn render_human(report: &Report) -> String {
    render_human_at(report, OffsetDateTime::now_utc())
}

/// Render the standard narrative report with relative times computed at `now`
pub fn render_human_at(report: &Report, now: OffsetDateTime) -> String {
    let proc = report.process();
    let mut out = String::new();

    out.push_str(&format!("Target: {}\n\n", proc.command));

    out.push_str(&format!("Process: {} (pid {})", proc.command, proc.pid));
    if !proc.health.is_healthy() {
        out.push_str(&format!(" [{}]", proc.health));
    }
    out.push('\n');

    if !proc.user.is_empty() {
        out.push_str(&format!("User: {}\n", proc.user));
    }
    out.push_str(&format!("Command: {}\n", proc.cmdline));
    if let Some(started) = proc.start_time {
        out.push_str(&format!("Started: {}\n", format_started(started, now)));
    }

    out.push_str("\nWhy It Exists:\n  ");
    out.push_str(&chain_summary(report));
    out.push('\n');

    out.push_str(&format!("\nSource: {}", report.source.name));
    if report.source.name != report.source.kind.as_str() {
        out.push_str(&format!(" ({})", report.source.kind));
    }
    out.push('\n');

    if !proc.working_dir.is_empty() {
        out.push_str(&format!("\nWorking Dir: {}\n", proc.working_dir));
    }
    if let Some(repo) = &proc.git_repo {
        match &proc.git_branch {
            Some(branch) => out.push_str(&format!("Git Repo: {} ({})\n", repo, branch)),
            None => out.push_str(&format!("Git Repo: {}\n", repo)),
        }
    }
    for (i, (addr, port)) in proc.listeners().enumerate() {
        if i == 0 {
            out.push_str(&format!("Listening: {}:{}\n", addr, port));
        } else {
            out.push_str(&format!("           {}:{}\n", addr, port));
        }
    }

    if report.has_warnings() {
        out.push_str("\nWarnings:\n");
        for warning in &report.warnings {
            out.push_str(&format!("  • {}\n", warning));
        }
    }

    out
}

/// Render the ancestry as an indented tree, root first
pub fn render_tree(report: &Report) -> String {
    let mut out = String::new();
    for (i, p) in report.ancestry.iter().enumerate() {
        let indent = "  ".repeat(i);
        let connector = if i == 0 { "" } else { "└─ " };
        out.push_str(&format!(
            "{}{}{} (pid {})\n",
            indent, connector, p.command, p.pid
        ));
    }
    out
}

/// Render a single-line chain summary
pub fn render_short(report: &Report) -> String {
    chain_summary(report)
}

/// Render only the warnings
pub fn render_warnings(report: &Report) -> String {
    if !report.has_warnings() {
        return "No warnings.\n".to_string();
    }
    report
        .warnings
        .iter()
        .map(|w| format!("• {}\n", w))
        .collect()
}

/// Render the command line and environment of a process
pub fn render_env(process: &ProcessInfo) -> String {
    let mut out = format!("Command: {}\n", process.cmdline);
    if process.env.is_empty() {
        out.push_str("No environment variables found\n");
    } else {
        out.push_str("Environment:\n");
        for var in &process.env {
            out.push_str(&format!("  {}\n", var));
        }
    }
    out
}

fn chain_summary(report: &Report) -> String {
    report
        .ancestry
        .iter()
        .map(|p| format!("{} (pid {})", p.command, p.pid))
        .collect::<Vec<_>>()
        .join(" → ")
}

/// Format a start time as relative and absolute, e.g. `3 days ago (2026-10-14 09:12:00)`
pub fn format_started(started: OffsetDateTime, now: OffsetDateTime) -> String {
    format!(
        "{} ({})",
        format_relative(started, now),
        format_absolute(started)
    )
}

/// Relative age, e.g. `5 hours ago`
pub fn format_relative(started: OffsetDateTime, now: OffsetDateTime) -> String {
    let elapsed = now - started;
    let hours = elapsed.whole_hours();

    if hours >= 48 {
        format!("{} days ago", hours / 24)
    } else if hours >= 24 {
        "1 day ago".to_string()
    } else if hours >= 1 {
        format!("{} hours ago", hours)
    } else if elapsed.whole_minutes() >= 1 {
        format!("{} min ago", elapsed.whole_minutes())
    } else {
        "just now".to_string()
    }
}

/// Absolute timestamp in the offset the time was recorded in
pub fn format_absolute(started: OffsetDateTime) -> String {
    started
        .format(format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second]"
        ))
        .unwrap_or_else(|_| started.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ancestry::Ancestry;
    use crate::models::{Health, Source, SourceKind, Target, Warning};
    use time::macros::datetime;
    use time::Duration;

    const NOW: OffsetDateTime = datetime!(2026-10-17 12:00 UTC);

    fn sample_report() -> Report {
        let init = ProcessInfo {
            pid: 1,
            command: "systemd".to_string(),
            cmdline: "/sbin/init".to_string(),
            user: "root".to_string(),
            ..Default::default()
        };
        let target = ProcessInfo {
            pid: 1234,
            ppid: 1,
            command: "nginx".to_string(),
            cmdline: "nginx: master process /usr/sbin/nginx".to_string(),
            user: "root".to_string(),
            start_time: Some(datetime!(2026-10-14 09:12:00 UTC)),
            working_dir: "/".to_string(),
            git_repo: Some("site".to_string()),
            git_branch: Some("main".to_string()),
            listening_ports: vec![80, 443],
            bind_addresses: vec!["0.0.0.0".to_string(), "::".to_string()],
            health: Health::HighMem,
            ..Default::default()
        };
        Report {
            target: Target::Pid(1234),
            ancestry: Ancestry::from_chain(vec![init, target]).unwrap(),
            source: Source::new(SourceKind::Systemd, "nginx.service", 0.9)
                .with_detail("domain", "system"),
            warnings: vec![Warning::HighMem, Warning::PublicInterface],
        }
    }

    #[test]
    fn test_render_human_sections() {
        let output = render_human_at(&sample_report(), NOW);
        assert!(output.starts_with("Target: nginx\n\n"));
        assert!(output.contains("Process: nginx (pid 1234) [high-mem]\n"));
        assert!(output.contains("User: root\n"));
        assert!(output.contains("Started: 3 days ago (2026-10-14 09:12:00)\n"));
        assert!(output.contains("systemd (pid 1) → nginx (pid 1234)"));
        assert!(output.contains("Source: nginx.service (systemd)\n"));
        assert!(output.contains("Working Dir: /\n"));
        assert!(output.contains("Git Repo: site (main)\n"));
        assert!(output.contains("Listening: 0.0.0.0:80\n           :::443\n"));
        assert!(output.contains("  • Process is listening on a public interface\n"));
    }

    #[test]
    fn test_render_human_source_name_equal_to_kind() {
        let mut report = sample_report();
        report.source = Source::new(SourceKind::Systemd, "systemd", 0.8);
        let output = render_human_at(&report, NOW);
        assert!(output.contains("Source: systemd\n"));
    }

    #[test]
    fn test_render_tree_contains_hierarchy() {
        let output = render_tree(&sample_report());
        assert_eq!(output, "systemd (pid 1)\n  └─ nginx (pid 1234)\n");
    }

    #[test]
    fn test_render_short() {
        assert_eq!(
            render_short(&sample_report()),
            "systemd (pid 1) → nginx (pid 1234)"
        );
    }

    #[test]
    fn test_render_warnings() {
        let mut report = sample_report();
        assert_eq!(
            render_warnings(&report),
            "• Process is using high memory (>1GB RSS)\n• Process is listening on a public interface\n"
        );
        report.warnings.clear();
        assert_eq!(render_warnings(&report), "No warnings.\n");
    }

    #[test]
    fn test_render_env() {
        let mut process = sample_report().process().clone();
        assert!(render_env(&process).contains("No environment variables found"));

        process.env = vec!["PATH=/usr/bin".to_string(), "HOME=/root".to_string()];
        let output = render_env(&process);
        assert!(output.contains("Environment:\n  PATH=/usr/bin\n  HOME=/root\n"));
    }

    #[test]
    fn test_format_relative() {
        assert_eq!(format_relative(NOW - Duration::seconds(20), NOW), "just now");
        assert_eq!(format_relative(NOW - Duration::minutes(7), NOW), "7 min ago");
        assert_eq!(format_relative(NOW - Duration::hours(5), NOW), "5 hours ago");
        assert_eq!(format_relative(NOW - Duration::hours(30), NOW), "1 day ago");
        assert_eq!(format_relative(NOW - Duration::days(120), NOW), "120 days ago");
    }
}
