//! Command-line surface and the interactive collaborator prompts.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::discovery::SelectHeader;
use crate::error::{HfError, HfResult};
use crate::fixup::Confirm;
use crate::model::DatasetName;
use crate::workspace::load_workspace;

#[derive(Debug, Parser)]
#[command(name = "histfix")]
#[command(about = "Repair stale data paths inside Analyzer history files")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Find the current header/raw locations and rewrite each history file.
    Fixup(FixupArgs),
    /// Print what a fixup would do, without touching anything.
    Plan(PlanArgs),
}

/// Where to look: either a workspace descriptor or both directories given
/// explicitly.
#[derive(Debug, Args)]
pub struct LocationArgs {
    /// Path to a .wksp2 workspace file naming both directories.
    pub workspace: Option<PathBuf>,

    /// Dataset root to scan for headers (with --history-dir, replaces the
    /// workspace file).
    #[arg(long, requires = "history_dir", conflicts_with = "workspace")]
    pub data_root: Option<PathBuf>,

    /// Directory holding the .ehst2 history files.
    #[arg(long, requires = "data_root", conflicts_with = "workspace")]
    pub history_dir: Option<PathBuf>,
}

impl LocationArgs {
    /// Resolve to (data root, history directory).
    pub fn resolve(&self) -> HfResult<(PathBuf, PathBuf)> {
        if let (Some(data), Some(hist)) = (&self.data_root, &self.history_dir) {
            return Ok((data.clone(), hist.clone()));
        }
        let Some(workspace) = &self.workspace else {
            return Err(HfError::Validation(
                "give a workspace file, or both --data-root and --history-dir".to_owned(),
            ));
        };
        let ws = load_workspace(workspace)?;
        Ok((ws.raw_file_dir, ws.history_file_dir))
    }
}

#[derive(Debug, Args)]
pub struct FixupArgs {
    #[command(flatten)]
    pub location: LocationArgs,

    /// Only print what would be done; do not change any files.
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Apply every fix without asking.
    #[arg(long, default_value_t = false)]
    pub yes: bool,
}

#[derive(Debug, Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub location: LocationArgs,

    /// Print the plan as JSON instead of one line per history file.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

/// Interactive header disambiguation: numbered list, `s` (or empty) skips.
pub struct PromptSelect;

impl SelectHeader for PromptSelect {
    fn select(&self, name: &DatasetName, candidates: &[PathBuf]) -> Option<PathBuf> {
        let mut out = std::io::stderr().lock();
        let _ = writeln!(out, "Found multiple headers for {name}:");
        for (i, candidate) in candidates.iter().enumerate() {
            let _ = writeln!(out, "  {}: {}", i + 1, candidate.display());
        }

        let stdin = std::io::stdin();
        loop {
            let _ = write!(out, "Choice (1-{}, s to skip): ", candidates.len());
            let _ = out.flush();
            let mut line = String::new();
            if stdin.lock().read_line(&mut line).unwrap_or(0) == 0 {
                return None;
            }
            let line = line.trim();
            if line.is_empty() || line.eq_ignore_ascii_case("s") {
                return None;
            }
            if let Ok(choice) = line.parse::<usize>() {
                if (1..=candidates.len()).contains(&choice) {
                    return Some(candidates[choice - 1].clone());
                }
            }
        }
    }
}

/// Interactive `[Y/n]` confirmation; default answer is yes.
pub struct PromptConfirm;

impl Confirm for PromptConfirm {
    fn confirm(&self, message: &str) -> bool {
        let mut out = std::io::stderr().lock();
        let stdin = std::io::stdin();
        loop {
            let _ = write!(out, "{message} [Y/n]: ");
            let _ = out.flush();
            let mut line = String::new();
            if stdin.lock().read_line(&mut line).unwrap_or(0) == 0 {
                return false;
            }
            match line.trim().to_ascii_lowercase().as_str() {
                "" | "y" | "yes" => return true,
                "n" | "no" => return false,
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn fixup_args_parse() {
        let cli = Cli::parse_from(["histfix", "fixup", "study.wksp2", "--dry-run", "--yes"]);
        let Command::Fixup(args) = cli.command else {
            panic!("expected fixup");
        };
        assert!(args.dry_run);
        assert!(args.yes);
        assert_eq!(args.location.workspace, Some(PathBuf::from("study.wksp2")));
    }

    #[test]
    fn explicit_directories_parse() {
        let cli = Cli::parse_from([
            "histfix",
            "plan",
            "--data-root",
            "/data",
            "--history-dir",
            "/hist",
            "--json",
        ]);
        let Command::Plan(args) = cli.command else {
            panic!("expected plan");
        };
        assert!(args.json);
        let (data, hist) = args.location.resolve().unwrap();
        assert_eq!(data, PathBuf::from("/data"));
        assert_eq!(hist, PathBuf::from("/hist"));
    }

    #[test]
    fn workspace_conflicts_with_explicit_directories() {
        let result = Cli::try_parse_from([
            "histfix",
            "fixup",
            "study.wksp2",
            "--data-root",
            "/data",
            "--history-dir",
            "/hist",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn missing_location_is_a_validation_error() {
        let cli = Cli::parse_from(["histfix", "plan"]);
        let Command::Plan(args) = cli.command else {
            panic!("expected plan");
        };
        assert!(matches!(
            args.location.resolve(),
            Err(HfError::Validation(_))
        ));
    }
}
