//! Workspace descriptor (`.wksp2`) loading.
//!
//! A workspace file is a small XML document naming, among other settings,
//! the dataset root and the directory holding the history files:
//!
//! ```xml
//! <Workspace>
//!   <RawFilePath>C:\data\study1</RawFilePath>
//!   <HistoryFilePath>C:\data\study1\history</HistoryFilePath>
//! </Workspace>
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{HfError, HfResult};

/// The two directories a repair run needs.
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Root under which headers (and shortcuts to them) are discovered.
    pub raw_file_dir: PathBuf,
    /// Directory holding the history files to repair.
    pub history_file_dir: PathBuf,
}

/// Load the workspace descriptor at `path`.
pub fn load_workspace(path: &Path) -> HfResult<Workspace> {
    let text = fs::read_to_string(path)?;
    let doc = roxmltree::Document::parse(&text)
        .map_err(|e| workspace_error(path, format!("not well-formed XML: {e}")))?;

    let workspace = doc
        .root()
        .children()
        .find(|n| n.has_tag_name("Workspace"))
        .ok_or_else(|| workspace_error(path, "missing <Workspace> root element"))?;

    let raw_file_dir = element_text(path, workspace, "RawFilePath")?;
    let history_file_dir = element_text(path, workspace, "HistoryFilePath")?;
    Ok(Workspace {
        raw_file_dir: PathBuf::from(raw_file_dir),
        history_file_dir: PathBuf::from(history_file_dir),
    })
}

fn element_text(
    path: &Path,
    workspace: roxmltree::Node<'_, '_>,
    tag: &str,
) -> HfResult<String> {
    workspace
        .children()
        .find(|n| n.has_tag_name(tag))
        .and_then(|n| n.text())
        .map(|t| t.trim().to_owned())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| workspace_error(path, format!("missing or empty <{tag}> element")))
}

fn workspace_error(path: &Path, detail: impl Into<String>) -> HfError {
    HfError::Workspace {
        path: path.to_path_buf(),
        detail: detail.into(),
    }
}
