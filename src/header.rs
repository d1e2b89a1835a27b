//! Raw-data path extraction from header documents.
//!
//! A `.vhdr` header is a line-oriented text file; the line
//! `DataFile=<name>` names the raw recording, always relative to the
//! header's own directory.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{HfError, HfResult};

/// Return the absolute path of the raw-data file referenced by the header
/// at `header_path`.
///
/// The first line whose key token is `DataFile` wins; its value is trimmed
/// and joined onto the header's containing directory. Fails with `NotFound`
/// when no such line exists.
pub fn extract_raw_path(header_path: &Path) -> HfResult<PathBuf> {
    let text = fs::read_to_string(header_path)?;
    let value = text
        .lines()
        .find_map(data_file_value)
        .ok_or_else(|| HfError::not_found("DataFile reference line", header_path))?;

    let dir = header_path.parent().unwrap_or_else(|| Path::new(""));
    Ok(dir.join(value))
}

/// Match `^DataFile\s*=\s*(.+)$` and return the trimmed value.
fn data_file_value(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("DataFile")?;
    let value = rest.trim_start().strip_prefix('=')?.trim();
    (!value.is_empty()).then_some(value)
}
