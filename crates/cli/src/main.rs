//! witr: explains why a process is running
//!
//! Usage:
//!   witr --pid 1234        # Analyze a specific PID
//!   witr --port 5000       # Find what's listening on port 5000
//!   witr node              # Analyze the process named "node"
//!
//! Output formats:
//!   --json      Machine-readable JSON
//!   --short     Single-line ancestry chain
//!   --tree      Process ancestry tree
//!   --warnings  Warnings only
//!   --env       Command line and environment
//!   (default)   Human-readable narrative

use clap::Parser;
use owo_colors::{OwoColorize, Style};
use std::io::{self, Write};
use tabled::{
    settings::{object::Columns, style::Style as TableStyle, Alignment, Modify},
    Table, Tabled,
};
use witr_core::render::text::{format_absolute, format_relative};
use witr_core::{render, ProcessInfo, Report, SourceKind, Target};
use witr_platform_unix::{Analyzer, PlatformError};

/// Label width for aligned output
const LABEL_WIDTH: usize = 12;

/// Exit codes for scripting
mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const ERROR_GENERAL: i32 = 1;
    pub const ERROR_NOT_FOUND: i32 = 2;
    pub const ERROR_ACCESS_DENIED: i32 = 3;
    pub const ERROR_INVALID_INPUT: i32 = 4;
}

/// Configuration file support
mod config {
    use serde::Deserialize;
    use std::fs;
    use std::path::{Path, PathBuf};

    /// User configuration from ~/.witr/config.toml
    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    pub struct Config {
        /// Default output settings
        pub output: OutputConfig,
        /// Default flags
        pub defaults: DefaultFlags,
    }

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    pub struct OutputConfig {
        /// Disable colored output by default
        pub no_color: bool,
        /// Use JSON output by default
        pub json: bool,
        /// Use short output by default
        pub short: bool,
        /// Use tree output by default
        pub tree: bool,
    }

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    pub struct DefaultFlags {
        /// Always log debug diagnostics
        pub verbose: bool,
    }

    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".witr").join("config.toml"))
    }

    /// Load configuration from the default location
    ///
    /// A missing file is not an error.
    pub fn load_config() -> Result<Config, String> {
        match config_path() {
            Some(path) => load_config_from(&path),
            None => Ok(Config::default()),
        }
    }

    /// Load configuration from `path`
    pub fn load_config_from(path: &Path) -> Result<Config, String> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| format!("could not read {}: {}", path.display(), e))?;
        toml::from_str(&content).map_err(|e| format!("invalid {}: {}", path.display(), e))
    }

    /// Generate a sample config file content
    pub fn sample_config() -> &'static str {
        r#"# witr configuration file
# Place this file at ~/.witr/config.toml

[output]
# Disable colored output
no_color = false
# Use JSON output by default
json = false
# Use short (one-line) output by default
short = false
# Use tree view by default
tree = false

[defaults]
# Always log debug diagnostics to stderr
verbose = false
"#
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_missing_file_is_default() {
            let dir = tempfile::tempdir().unwrap();
            let cfg = load_config_from(&dir.path().join("config.toml")).unwrap();
            assert!(!cfg.output.json);
            assert!(!cfg.defaults.verbose);
        }

        #[test]
        fn test_sample_config_parses() {
            let cfg: Config = toml::from_str(sample_config()).unwrap();
            assert!(!cfg.output.no_color);
            assert!(!cfg.output.tree);
        }

        #[test]
        fn test_partial_config() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("config.toml");
            fs::write(&path, "[output]\njson = true\n").unwrap();

            let cfg = load_config_from(&path).unwrap();
            assert!(cfg.output.json);
            assert!(!cfg.output.short);
            assert!(!cfg.defaults.verbose);
        }

        #[test]
        fn test_invalid_config_is_an_error() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("config.toml");
            fs::write(&path, "[output\njson = 1").unwrap();

            let err = load_config_from(&path).unwrap_err();
            assert!(err.starts_with("invalid "));
        }
    }
}

#[derive(Parser)]
#[command(name = "witr")]
#[command(version, about, long_about = None)]
#[command(after_help = "Examples:
  witr --pid 1234              Analyze process with PID 1234
  witr --port 8080             Find what's listening on port 8080
  witr nginx                   Analyze the process named 'nginx'
  witr --pid 1234 --json       Output as JSON for scripting
  witr --port 80 --tree        Show ancestry tree for port 80 owner
  witr -p 1234 -w              Show only warnings")]
struct Cli {
    /// Process ID to analyze
    #[arg(long, short = 'p', value_name = "PID")]
    pid: Option<u32>,

    /// Port number to find the owning process
    #[arg(long, short = 'P', value_name = "PORT")]
    port: Option<u16>,

    /// Process name to analyze (exact match on the command name)
    #[arg(value_name = "NAME")]
    name: Option<String>,

    /// Output as JSON (for scripting and automation)
    #[arg(long, short = 'j', conflicts_with_all = ["short", "tree", "warnings"])]
    json: bool,

    /// Output single-line ancestry chain
    #[arg(long, short = 's', conflicts_with_all = ["json", "tree", "warnings"])]
    short: bool,

    /// Show process ancestry tree
    #[arg(long, short = 't', conflicts_with_all = ["json", "short", "warnings"])]
    tree: bool,

    /// Show only warnings
    #[arg(long, short = 'w', conflicts_with_all = ["json", "short", "tree"])]
    warnings: bool,

    /// Show the command line and environment of the process
    #[arg(long, short = 'e', conflicts_with_all = ["short", "tree", "warnings"])]
    env: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Show confidence details and log debug diagnostics
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Generate a sample config file at ~/.witr/config.toml
    #[arg(long)]
    init_config: bool,
}

impl Cli {
    /// Apply config defaults (CLI flags override config)
    fn merge_config(&mut self, cfg: &config::Config) {
        self.no_color |= cfg.output.no_color;
        self.verbose |= cfg.defaults.verbose;

        // Config output modes only apply when no mode was chosen on the command line
        if !(self.json || self.short || self.tree || self.warnings) {
            if cfg.output.json {
                self.json = true;
            } else if cfg.output.short {
                self.short = true;
            } else if cfg.output.tree {
                self.tree = true;
            }
        }
    }

    /// The single target named on the command line
    fn target(&self) -> Result<Target, &'static str> {
        match (self.pid, self.port, &self.name) {
            (Some(pid), None, None) => Ok(Target::Pid(pid)),
            (None, Some(port), None) => Ok(Target::Port(port)),
            (None, None, Some(name)) => Ok(Target::Name(name.clone())),
            (None, None, None) => Err("No target specified"),
            _ => Err("Only one target can be specified at a time"),
        }
    }
}

/// Color configuration for output
struct Colors {
    enabled: bool,
    header: Style,
    success: Style,
    warning: Style,
    error: Style,
    info: Style,
    dim: Style,
    highlight: Style,
}

impl Colors {
    fn new(enabled: bool) -> Self {
        if enabled {
            Self {
                enabled: true,
                header: Style::new().bold().cyan(),
                success: Style::new().green(),
                warning: Style::new().yellow(),
                error: Style::new().red().bold(),
                info: Style::new().cyan(),
                dim: Style::new().dimmed(),
                highlight: Style::new().bold().white(),
            }
        } else {
            Self {
                enabled: false,
                header: Style::new(),
                success: Style::new(),
                warning: Style::new(),
                error: Style::new(),
                info: Style::new(),
                dim: Style::new(),
                highlight: Style::new(),
            }
        }
    }
}

fn main() {
    let mut cli = Cli::parse();

    // Load configuration file
    let (cfg, cfg_error) = match config::load_config() {
        Ok(cfg) => (cfg, None),
        Err(e) => (config::Config::default(), Some(e)),
    };
    cli.merge_config(&cfg);

    init_logging(cli.verbose);
    if let Some(e) = cfg_error {
        log::warn!("Ignoring config file: {}", e);
    }

    // Determine color mode
    let colors = Colors::new(!cli.no_color && supports_color());

    if cli.init_config {
        handle_init_config(&colors);
        return;
    }

    let target = match cli.target() {
        Ok(target) => target,
        Err(message) => {
            print_error(&colors, message);
            print_usage();
            std::process::exit(exit_codes::ERROR_INVALID_INPUT);
        }
    };

    if let Err(e) = handle_target(&target, &cli, &colors) {
        if let PlatformError::AmbiguousName { candidates, .. } = &e {
            print_candidates_table(candidates, &colors);
        }
        print_error(&colors, &e.to_string());
        std::process::exit(exit_code(&e));
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::builder()
        .parse_env(env_logger::Env::new().filter_or("WITR_LOG", default_filter))
        .format_timestamp(None)
        .init();
}

fn print_usage() {
    eprintln!();
    eprintln!("Usage: witr [OPTIONS] [NAME]");
    eprintln!();
    eprintln!("Specify exactly one of:");
    eprintln!("  --pid <PID>     Analyze a process by PID (short: -p)");
    eprintln!("  --port <PORT>   Find process listening on port (short: -P)");
    eprintln!("  <NAME>          Analyze a process by command name");
    eprintln!();
    eprintln!("Run 'witr --help' for more information.");
}

/// Map an analysis error to a process exit code
fn exit_code(err: &PlatformError) -> i32 {
    if err.is_not_found() {
        exit_codes::ERROR_NOT_FOUND
    } else if err.is_access_denied() {
        exit_codes::ERROR_ACCESS_DENIED
    } else {
        exit_codes::ERROR_GENERAL
    }
}

/// Handle --init-config flag
fn handle_init_config(colors: &Colors) {
    use std::fs;

    let Some(config_path) = config::config_path() else {
        print_error(colors, "Could not determine home directory");
        std::process::exit(exit_codes::ERROR_GENERAL);
    };

    // Create directory if it doesn't exist
    if let Some(parent) = config_path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            print_error(colors, &format!("Failed to create config directory: {}", e));
            std::process::exit(exit_codes::ERROR_GENERAL);
        }
    }

    if config_path.exists() {
        print_warning(
            colors,
            &format!("Config file already exists at: {}", config_path.display()),
        );
        eprintln!("Use a text editor to modify it, or delete it first to regenerate.");
        std::process::exit(exit_codes::SUCCESS);
    }

    match fs::write(&config_path, config::sample_config()) {
        Ok(()) => {
            eprintln!(
                "{} Created config file at: {}",
                "success:".style(colors.success),
                config_path.display()
            );
            std::process::exit(exit_codes::SUCCESS);
        }
        Err(e) => {
            print_error(colors, &format!("Failed to write config file: {}", e));
            std::process::exit(exit_codes::ERROR_GENERAL);
        }
    }
}

/// Resolve, analyze and render one target
fn handle_target(target: &Target, cli: &Cli, colors: &Colors) -> Result<(), PlatformError> {
    log::debug!("Analyzing {}", target);

    let analyzer = Analyzer::new()?;
    if cli.env {
        let process = analyzer.process(target)?;
        render_env(&process, cli, colors);
        return Ok(());
    }

    let report = analyzer.analyze(target)?;
    render_report(&report, cli, colors);
    Ok(())
}

/// Render a single report based on output format
fn render_report(report: &Report, cli: &Cli, colors: &Colors) {
    if cli.json {
        match render::json::render_json_string(report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                print_error(colors, &format!("Failed to render JSON: {}", e));
                std::process::exit(exit_codes::ERROR_GENERAL);
            }
        }
    } else if cli.short {
        if colors.enabled {
            println!("{}", colored_short(report, colors));
        } else {
            println!("{}", render::render_short(report));
        }
    } else if cli.tree {
        if colors.enabled {
            print_colored_tree(report, colors);
        } else {
            print!("{}", render::render_tree(report));
        }
    } else if cli.warnings {
        if colors.enabled {
            print_colored_warnings(report, colors);
        } else {
            print!("{}", render::render_warnings(report));
        }
    } else if colors.enabled {
        print_colored_report(report, cli, colors);
    } else {
        print!("{}", render::render_human(report));
    }
}

/// Render the command line and environment
fn render_env(process: &ProcessInfo, cli: &Cli, colors: &Colors) {
    if cli.json {
        match render::render_env_json(process) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                print_error(colors, &format!("Failed to render JSON: {}", e));
                std::process::exit(exit_codes::ERROR_GENERAL);
            }
        }
        return;
    }

    if !colors.enabled {
        print!("{}", render::render_env(process));
        return;
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();

    print_row(
        &mut out,
        "Command",
        &process.cmdline,
        colors.header,
        colors.dim,
    );
    if process.env.is_empty() {
        print_sub_item(&mut out, "No environment variables found", colors.dim);
    } else {
        print_section(&mut out, "Environment", colors.header);
        for var in &process.env {
            match var.split_once('=') {
                Some((key, value)) => print_sub_item(
                    &mut out,
                    &format!("{}={}", key.style(colors.info), value),
                    Style::new(),
                ),
                None => print_sub_item(&mut out, var, colors.dim),
            }
        }
    }
}

/// Print an aligned label with value
fn print_row(
    out: &mut impl Write,
    label: &str,
    value: &str,
    label_style: Style,
    value_style: Style,
) {
    writeln!(
        out,
        "{:>width$} : {}",
        label.style(label_style),
        value.style(value_style),
        width = LABEL_WIDTH
    )
    .ok();
}

/// Print an aligned label with styled value (already styled)
fn print_row_raw(out: &mut impl Write, label: &str, value: String, label_style: Style) {
    writeln!(
        out,
        "{:>width$} : {}",
        label.style(label_style),
        value,
        width = LABEL_WIDTH
    )
    .ok();
}

/// Print an aligned section header
fn print_section(out: &mut impl Write, label: &str, label_style: Style) {
    writeln!(out).ok();
    writeln!(
        out,
        "{:>width$} :",
        label.style(label_style),
        width = LABEL_WIDTH
    )
    .ok();
}

/// Print sub-items with proper indentation
fn print_sub_item(out: &mut impl Write, value: &str, value_style: Style) {
    writeln!(
        out,
        "{:>width$}   {}",
        "",
        value.style(value_style),
        width = LABEL_WIDTH
    )
    .ok();
}

/// Process row for the ambiguous-name table
#[derive(Tabled)]
struct ProcessRow {
    #[tabled(rename = "PID")]
    pid: u32,
    #[tabled(rename = "Command")]
    command: String,
    #[tabled(rename = "User")]
    user: String,
    #[tabled(rename = "Started")]
    started: String,
}

/// Print a table of the processes sharing a name
fn print_candidates_table(candidates: &[ProcessInfo], colors: &Colors) {
    let stderr = io::stderr();
    let mut out = stderr.lock();

    writeln!(
        out,
        "\n{} {} matching processes found:\n",
        "→".style(colors.info),
        candidates.len()
    )
    .ok();

    let rows: Vec<ProcessRow> = candidates
        .iter()
        .map(|proc| ProcessRow {
            pid: proc.pid,
            command: proc.cmdline.clone(),
            user: if proc.user.is_empty() {
                "-".to_string()
            } else {
                proc.user.clone()
            },
            started: proc
                .start_time
                .map(format_absolute)
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect();

    let table = Table::new(&rows)
        .with(TableStyle::rounded())
        .with(Modify::new(Columns::single(0)).with(Alignment::right()))
        .to_string();

    for line in table.lines() {
        writeln!(out, "  {}", line).ok();
    }

    writeln!(
        out,
        "\n{} Use {} to see details for a specific process.\n",
        "tip:".style(colors.dim),
        "--pid <PID>".style(colors.info)
    )
    .ok();
}

fn print_colored_report(report: &Report, cli: &Cli, colors: &Colors) {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let proc = report.process();

    print_row(
        &mut out,
        "Target",
        &proc.command,
        colors.header,
        colors.highlight,
    );
    writeln!(out).ok();

    // Process row with name, PID, and health
    let health = if proc.health.is_healthy() {
        String::new()
    } else {
        format!(" {}", format!("[{}]", proc.health).style(colors.warning))
    };
    let process_value = format!(
        "{} (pid {}){}",
        proc.command.style(colors.highlight),
        proc.pid.to_string().style(colors.info),
        health
    );
    print_row_raw(&mut out, "Process", process_value, colors.header);

    if !proc.user.is_empty() {
        let user_style = if proc.user == "root" {
            colors.warning
        } else {
            colors.info
        };
        print_row(&mut out, "User", &proc.user, colors.header, user_style);
    }

    print_row(&mut out, "Command", &proc.cmdline, colors.header, colors.dim);

    if let Some(start_time) = proc.start_time {
        let now = time::OffsetDateTime::now_utc();
        let time_value = format!(
            "{} ({})",
            format_relative(start_time, now).style(colors.dim),
            format_absolute(start_time).style(colors.dim)
        );
        print_row_raw(&mut out, "Started", time_value, colors.header);
    }

    // Why It Exists section
    print_section(&mut out, "Why It Exists", colors.header);
    let last = report.ancestry.len() - 1;
    let chain: Vec<String> = report
        .ancestry
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let name_style = if i == last {
                colors.highlight
            } else {
                colors.info
            };
            format!(
                "{} (pid {})",
                p.command.style(name_style),
                p.pid.to_string().style(colors.dim)
            )
        })
        .collect();
    print_sub_item(&mut out, &chain.join(" → "), Style::new());
    writeln!(out).ok();

    // Source classification
    let kind_style = match report.source.kind {
        SourceKind::Systemd | SourceKind::Launchd => colors.success,
        SourceKind::Container | SourceKind::Supervisor => colors.info,
        SourceKind::Cron => colors.highlight,
        SourceKind::Shell => colors.warning,
        SourceKind::Unknown => colors.dim,
    };
    let mut source = report.source.name.clone();
    if report.source.name != report.source.kind.as_str() {
        source.push_str(&format!(" ({})", report.source.kind));
    }
    print_row(&mut out, "Source", &source, colors.header, kind_style);

    if cli.verbose {
        print_row(
            &mut out,
            "Confidence",
            &format!("{:.0}%", report.source.confidence * 100.0),
            colors.header,
            colors.dim,
        );
        for (key, value) in report.source.details.iter().flatten() {
            print_sub_item(&mut out, &format!("{}: {}", key, value), colors.dim);
        }
    }

    if !proc.working_dir.is_empty() {
        print_row(
            &mut out,
            "Working Dir",
            &proc.working_dir,
            colors.header,
            colors.dim,
        );
    }

    if let Some(repo) = &proc.git_repo {
        let value = match &proc.git_branch {
            Some(branch) => format!("{} ({})", repo.style(colors.info), branch.style(colors.dim)),
            None => repo.style(colors.info).to_string(),
        };
        print_row_raw(&mut out, "Git Repo", value, colors.header);
    }

    for (i, (addr, port)) in proc.listeners().enumerate() {
        let value = format!("{}:{}", addr, port);
        if i == 0 {
            print_row(&mut out, "Listening", &value, colors.header, colors.info);
        } else {
            print_sub_item(&mut out, &value, colors.info);
        }
    }

    if report.has_warnings() {
        print_section(&mut out, "Warnings", colors.warning);
        for warning in &report.warnings {
            print_sub_item(&mut out, &format!("• {}", warning), colors.warning);
        }
    }

    writeln!(out).ok();
}

/// Print a colored ancestry tree, root first
fn print_colored_tree(report: &Report, colors: &Colors) {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let last = report.ancestry.len() - 1;

    for (i, p) in report.ancestry.iter().enumerate() {
        let indent = "  ".repeat(i);
        let prefix = if i == 0 { "" } else { "└─ " };
        let name_style = if i == last {
            colors.highlight
        } else {
            colors.info
        };

        writeln!(
            out,
            "{}{}{} {}",
            indent,
            prefix.style(colors.dim),
            p.command.style(name_style),
            format!("(pid {})", p.pid).style(colors.dim)
        )
        .ok();
    }
}

/// Single-line chain with the target highlighted
fn colored_short(report: &Report, colors: &Colors) -> String {
    let last = report.ancestry.len() - 1;
    report
        .ancestry
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let name_style = if i == last {
                colors.highlight
            } else {
                colors.info
            };
            format!(
                "{} {}",
                p.command.style(name_style),
                format!("(pid {})", p.pid).style(colors.dim)
            )
        })
        .collect::<Vec<_>>()
        .join(&format!(" {} ", "→".style(colors.dim)))
}

/// Print only the warnings
fn print_colored_warnings(report: &Report, colors: &Colors) {
    if !report.has_warnings() {
        println!("{}", "No warnings.".style(colors.success));
        return;
    }
    for warning in &report.warnings {
        println!("{} {}", "•".style(colors.warning), warning);
    }
}

/// Print an error message
fn print_error(colors: &Colors, message: &str) {
    eprintln!("{} {}", "error:".style(colors.error), message);
}

/// Print a warning message
fn print_warning(colors: &Colors, message: &str) {
    eprintln!("{} {}", "warning:".style(colors.warning), message);
}

/// Check if the terminal supports color
fn supports_color() -> bool {
    // Check for common NO_COLOR convention
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }

    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    atty::is(atty::Stream::Stdout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use witr_core::ReadError;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("witr").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_target_selection() {
        assert_eq!(cli(&["--pid", "42"]).target(), Ok(Target::Pid(42)));
        assert_eq!(cli(&["-P", "8080"]).target(), Ok(Target::Port(8080)));
        assert_eq!(
            cli(&["nginx"]).target(),
            Ok(Target::Name("nginx".to_string()))
        );
        assert!(cli(&[]).target().is_err());
        assert!(cli(&["--pid", "1", "nginx"]).target().is_err());
    }

    #[test]
    fn test_output_modes_conflict() {
        let parsed = Cli::try_parse_from(["witr", "-p", "1", "--json", "--tree"]);
        assert!(parsed.is_err());
        let parsed = Cli::try_parse_from(["witr", "-p", "1", "--env", "--json"]);
        assert!(parsed.is_ok());
    }

    #[test]
    fn test_config_mode_yields_to_flags() {
        let cfg: config::Config = toml::from_str("[output]\njson = true\nno_color = true").unwrap();

        let mut flags = cli(&["-p", "1", "--tree"]);
        flags.merge_config(&cfg);
        assert!(flags.tree);
        assert!(!flags.json);
        assert!(flags.no_color);

        let mut plain = cli(&["-p", "1"]);
        plain.merge_config(&cfg);
        assert!(plain.json);
    }

    fn chain_report() -> Report {
        let shell = ProcessInfo {
            pid: 100,
            ppid: 1,
            command: "bash".to_string(),
            ..Default::default()
        };
        let server = ProcessInfo {
            pid: 4242,
            ppid: 100,
            command: "python3".to_string(),
            ..Default::default()
        };
        Report {
            target: Target::Pid(4242),
            ancestry: witr_core::Ancestry::from_chain(vec![shell, server]).unwrap(),
            source: witr_core::Source::unknown(),
            warnings: Vec::new(),
        }
    }

    #[test]
    fn test_colored_short_without_colors_matches_plain() {
        let report = chain_report();
        assert_eq!(
            colored_short(&report, &Colors::new(false)),
            render::render_short(&report)
        );
    }

    #[test]
    fn test_colored_short_styles_chain() {
        let output = colored_short(&chain_report(), &Colors::new(true));
        assert!(output.contains("\u{1b}["));
        assert!(output.contains("bash"));
        assert!(output.contains("(pid 100)"));
        assert!(output.contains("python3"));
        assert!(output.contains("(pid 4242)"));
        assert!(output.contains("→"));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            exit_code(&PlatformError::NoListener { port: 1 }),
            exit_codes::ERROR_NOT_FOUND
        );
        assert_eq!(
            exit_code(&PlatformError::AccessDenied { pid: 1 }),
            exit_codes::ERROR_ACCESS_DENIED
        );
        assert_eq!(
            exit_code(&PlatformError::from(
                witr_core::AncestryError::TargetUnreadable {
                    pid: 9,
                    source: ReadError::NotFound { pid: 9 },
                }
            )),
            exit_codes::ERROR_NOT_FOUND
        );
        assert_eq!(
            exit_code(&PlatformError::AmbiguousName {
                name: "sh".to_string(),
                candidates: Vec::new(),
            }),
            exit_codes::ERROR_GENERAL
        );
    }
}
