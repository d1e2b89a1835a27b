//! The repair driver: plan, report, confirm, patch.
//!
//! Planning never mutates; every write is gated per file behind the
//! [`Confirm`] collaborator (or skipped entirely in dry-run mode). Soft
//! misses — no header, no raw file, unresolved ambiguity — are reported
//! individually and never abort the batch; a corrupt container does, since
//! continuing past one is unsafe.

use std::fs;
use std::path::{Path, PathBuf};

use crate::discovery::SelectHeader;
use crate::error::HfResult;
use crate::model::{has_extension, Match, HISTORY_EXT};
use crate::patch::apply_fix;
use crate::plan::plan_matches;

/// Gates each destructive write. Returning `false` skips that file.
pub trait Confirm {
    fn confirm(&self, message: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, message: &str) -> bool {
        self(message)
    }
}

/// Auto-confirming collaborator for `--yes` runs; logs what it waves past.
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, message: &str) -> bool {
        tracing::info!("{message} (assuming yes)");
        true
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FixupOptions {
    /// Plan and report only; apply nothing.
    pub dry_run: bool,
}

/// Outcome counts for one fixup run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixupSummary {
    pub applied: usize,
    pub planned: usize,
    pub missing_raw: usize,
    pub missing_header: usize,
    pub declined: usize,
    /// Containers whose patch failed softly (e.g. a missing path stream).
    pub failed: usize,
}

/// History files directly inside `dir` (non-recursive), sorted by path.
pub fn list_history_files(dir: &Path) -> HfResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && has_extension(&path, HISTORY_EXT) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Repair every history file in `history_dir` against the datasets under
/// `data_root`.
pub fn run_fixup(
    data_root: &Path,
    history_dir: &Path,
    options: FixupOptions,
    selector: &dyn SelectHeader,
    confirm: &dyn Confirm,
) -> HfResult<FixupSummary> {
    let history_files = list_history_files(history_dir)?;
    tracing::info!(
        count = history_files.len(),
        history_dir = %history_dir.display(),
        "history files enumerated"
    );
    let matches = plan_matches(data_root, &history_files, selector)?;

    let mut summary = FixupSummary::default();
    for m in &matches {
        match apply_match(m, options, confirm) {
            Ok(Some(Outcome::Applied)) => summary.applied += 1,
            Ok(Some(Outcome::Planned)) => summary.planned += 1,
            Ok(Some(Outcome::Declined)) => summary.declined += 1,
            Ok(None) => summary.missing_raw += 1,
            // A container missing one of its path streams sinks only that
            // file; corrupt structure or i/o trouble stops the run.
            Err(error) if !error.is_fatal_for_batch() => {
                tracing::warn!(
                    dataset = %m.name,
                    history = %m.history.display(),
                    %error,
                    "history file could not be patched; continuing"
                );
                summary.failed += 1;
            }
            Err(error) => return Err(error),
        }
        if m.header.is_none() && m.raw.is_some() {
            summary.missing_header += 1;
        }
    }

    tracing::info!(
        applied = summary.applied,
        planned = summary.planned,
        missing_raw = summary.missing_raw,
        missing_header = summary.missing_header,
        declined = summary.declined,
        failed = summary.failed,
        "fixup finished"
    );
    Ok(summary)
}

enum Outcome {
    Applied,
    Planned,
    Declined,
}

/// Handle one match; `None` means the hard raw-file miss.
fn apply_match(
    m: &Match,
    options: FixupOptions,
    confirm: &dyn Confirm,
) -> HfResult<Option<Outcome>> {
    let Some(raw) = m.raw.as_deref() else {
        tracing::warn!(dataset = %m.name, "no raw file found; history file left alone");
        return Ok(None);
    };
    if m.header.is_none() {
        tracing::warn!(
            dataset = %m.name,
            "no header found; fixing the data path only"
        );
    }

    let description = match m.header.as_deref() {
        Some(header) => format!(
            "Set paths for {} to {} / {}",
            m.name,
            header.display(),
            raw.display()
        ),
        None => format!("Set data path for {} to {}", m.name, raw.display()),
    };

    if options.dry_run {
        tracing::info!(history = %m.history.display(), "{description} (dry run)");
        return Ok(Some(Outcome::Planned));
    }
    if !confirm.confirm(&description) {
        tracing::info!(dataset = %m.name, "declined; history file left alone");
        return Ok(Some(Outcome::Declined));
    }

    apply_fix(&m.history, raw, m.header.as_deref())?;
    Ok(Some(Outcome::Applied))
}
