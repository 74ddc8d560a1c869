//! Command line interface for the `checkconf` binary.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::catalog::ManifestLoader;
use crate::error::{CheckConfError, Result};
use crate::fspaths::{Fspaths, Platform};
use crate::provider::{list_checks, CheckRecord, FlushOutcome};
use crate::reconciler::{OutcomeStatus, ReconcileReport, Reconciler, ResourceOutcome};

/// Reconcile Sensu check config files against a desired-state manifest
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Default log filter, overridden by RUST_LOG
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Bring check config files in line with a manifest directory
    Apply {
        /// Directory of YAML manifests
        manifest_dir: PathBuf,

        /// Show what would change without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// List the check config files in a directory
    List {
        /// Checks directory (defaults to the platform checks directory)
        #[arg(long)]
        checks_dir: Option<PathBuf>,

        /// Platform used for the default directory: unix or windows
        #[arg(long)]
        platform: Option<Platform>,
    },
}

/// Runs a parsed command, writing its report to `out`.
///
/// Returns the process exit code: 1 when any check failed to reconcile.
pub fn run<W: Write>(cli: &Cli, out: &mut W) -> Result<i32> {
    match &cli.command {
        Command::Apply {
            manifest_dir,
            dry_run,
        } => apply(manifest_dir, *dry_run, out),
        Command::List {
            checks_dir,
            platform,
        } => {
            let dir = checks_dir.clone().unwrap_or_else(|| {
                Fspaths::new(platform.unwrap_or_else(Platform::current)).checks_dir()
            });
            list(&dir, out)
        }
    }
}

fn apply<W: Write>(manifest_dir: &Path, dry_run: bool, out: &mut W) -> Result<i32> {
    let catalog = ManifestLoader::new(manifest_dir).load_catalog()?;
    let reconciler = Reconciler::for_catalog(&catalog);

    let report = if dry_run {
        reconciler.plan(&catalog)?
    } else {
        reconciler.apply(&catalog)?
    };

    print_report(&report, out)?;
    Ok(if report.has_failures() { 1 } else { 0 })
}

fn list<W: Write>(dir: &Path, out: &mut W) -> Result<i32> {
    for record in list_checks(dir)? {
        writeln!(out, "{}", format_record(&record)).map_err(|e| stdout_error(dir, e))?;
    }
    Ok(0)
}

fn print_report<W: Write>(report: &ReconcileReport, out: &mut W) -> Result<()> {
    for outcome in &report.outcomes {
        writeln!(out, "{}", format_outcome(outcome))
            .map_err(|e| stdout_error(Path::new("<stdout>"), e))?;
    }
    writeln!(
        out,
        "{} checks, {} changed, {} failed{}",
        report.outcomes.len(),
        report.changed(),
        report.failed(),
        if report.dry_run { " (dry run)" } else { "" }
    )
    .map_err(|e| stdout_error(Path::new("<stdout>"), e))
}

/// One report line: `<name>: <action> [<result>]`.
pub fn format_outcome(outcome: &ResourceOutcome) -> String {
    let status = match &outcome.status {
        OutcomeStatus::Planned => "planned".to_string(),
        OutcomeStatus::Committed(FlushOutcome::Written(path)) => {
            format!("wrote {}", path.display())
        }
        OutcomeStatus::Committed(FlushOutcome::Removed(path)) => {
            format!("removed {}", path.display())
        }
        OutcomeStatus::Committed(FlushOutcome::AlreadyAbsent(_)) => "already absent".to_string(),
        OutcomeStatus::Committed(FlushOutcome::Unchanged) => "ok".to_string(),
        OutcomeStatus::Failed(e) => format!("FAILED: {}", e),
    };
    format!("{}: {} [{}]", outcome.name, outcome.action, status)
}

fn format_record(record: &CheckRecord) -> String {
    let path = record
        .source_path()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    format!(
        "{}\t{}\tconfig={}\tevent={}",
        record.name(),
        path,
        record.config(),
        record.event()
    )
}

fn stdout_error(path: &Path, source: std::io::Error) -> CheckConfError {
    CheckConfError::WriteFile {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconciler::PlannedAction;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_apply() {
        let cli = Cli::try_parse_from(["checkconf", "apply", "/tmp/manifest", "--dry-run"]).unwrap();
        assert_eq!(cli.log_level, "info");
        match cli.command {
            Command::Apply {
                manifest_dir,
                dry_run,
            } => {
                assert_eq!(manifest_dir, PathBuf::from("/tmp/manifest"));
                assert!(dry_run);
            }
            _ => panic!("expected apply"),
        }
    }

    #[test]
    fn test_parse_list_with_platform() {
        let cli = Cli::try_parse_from([
            "checkconf",
            "--log-level",
            "debug",
            "list",
            "--platform",
            "windows",
        ])
        .unwrap();
        assert_eq!(cli.log_level, "debug");
        assert!(matches!(
            cli.command,
            Command::List {
                checks_dir: None,
                platform: Some(Platform::Windows)
            }
        ));
    }

    #[test]
    fn test_unknown_platform_is_rejected() {
        let result = Cli::try_parse_from(["checkconf", "list", "--platform", "beos"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_list_prints_one_line_per_file() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("config_ntp.json"),
            r#"{"checks": {"ntp": {"interval": 60}}}"#,
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "checkconf",
            "list",
            "--checks-dir",
            dir.path().to_str().unwrap(),
        ])
        .unwrap();
        let mut out = Vec::new();
        assert_eq!(run(&cli, &mut out).unwrap(), 0);

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("ntp\t"));
        assert!(text.contains("config=absent"));
    }

    #[test]
    fn test_format_outcome() {
        let outcome = ResourceOutcome {
            name: "ntp".to_string(),
            action: PlannedAction::Create,
            status: OutcomeStatus::Planned,
        };
        assert_eq!(format_outcome(&outcome), "ntp: create [planned]");
    }
}
