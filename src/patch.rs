//! Rewriting path streams inside a history-file container.
//!
//! A history file is an OLE/CFB compound file whose root storage carries
//! four path streams: `DataPath`/`DataPathW` for the raw recording and
//! `HeaderPath`/`HeaderPathW` for the header document. The container format
//! does not hold true wide strings here; both members of a pair receive the
//! same zero-terminated UTF-8 bytes.
//!
//! The whole container is loaded into memory, edited there, and written
//! back through a sibling temporary file renamed over the original, so a
//! failure at any point leaves the on-disk file exactly as it was.

use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use cfb::CompoundFile;
use tempfile::NamedTempFile;

use crate::error::{HfError, HfResult};
use crate::model::{has_extension, HISTORY_EXT};

/// Root stream pair holding the raw-data path.
pub const DATA_PATH_FIELD: &str = "DataPath";
/// Root stream pair holding the header path.
pub const HEADER_PATH_FIELD: &str = "HeaderPath";

/// A history container opened for update.
///
/// All edits land in an in-memory image; nothing reaches disk until
/// [`commit`](Self::commit) consumes the container. Dropping without
/// committing discards every edit.
pub struct HistoryContainer {
    path: PathBuf,
    comp: CompoundFile<Cursor<Vec<u8>>>,
}

impl HistoryContainer {
    /// Open the container at `path` for update.
    ///
    /// The extension is validated before any file access; a non-history
    /// extension is a `Validation` error and the file is never touched.
    /// Bytes that do not parse as a compound file are a `Format` error.
    pub fn open(path: &Path) -> HfResult<Self> {
        if !has_extension(path, HISTORY_EXT) {
            return Err(HfError::Validation(format!(
                "`{}` does not have the .{HISTORY_EXT} history-file extension",
                path.display()
            )));
        }
        let bytes = fs::read(path)?;
        let comp = CompoundFile::open(Cursor::new(bytes)).map_err(|e| {
            HfError::format(path, format!("not a structured-storage container: {e}"))
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            comp,
        })
    }

    /// Overwrite both streams of a path field with `value`, encoded as
    /// zero-terminated UTF-8. `field` is the narrow stream name; the wide
    /// twin is `field` + `W`.
    pub fn set_path_field(&mut self, field: &str, value: &Path) -> HfResult<()> {
        let encoded = encode_path(value);
        for name in [field.to_owned(), format!("{field}W")] {
            let mut stream = self
                .comp
                .open_stream(&name)
                .map_err(|_| HfError::not_found(format!("stream `{name}`"), &self.path))?;
            stream.set_len(0)?;
            stream.write_all(&encoded)?;
        }
        Ok(())
    }

    /// Persist every edit atomically.
    ///
    /// The finished image is written to a temporary file next to the
    /// original and renamed over it, so readers observe either the old
    /// container or the new one, never a partial write.
    pub fn commit(self) -> HfResult<()> {
        let Self { path, mut comp } = self;
        comp.flush()?;
        let image = comp.into_inner().into_inner();

        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let mut staged = NamedTempFile::new_in(dir)?;
        staged.write_all(&image)?;
        staged.as_file().sync_all()?;
        staged.persist(&path).map_err(|e| HfError::Io(e.error))?;
        Ok(())
    }
}

/// Rewrite the data-path streams (and, when given, the header-path streams)
/// of the history file at `history` and commit.
pub fn apply_fix(history: &Path, raw: &Path, header: Option<&Path>) -> HfResult<()> {
    let mut container = HistoryContainer::open(history)?;
    container.set_path_field(DATA_PATH_FIELD, raw)?;
    if let Some(header) = header {
        container.set_path_field(HEADER_PATH_FIELD, header)?;
    }
    container.commit()?;
    tracing::info!(
        history = %history.display(),
        raw = %raw.display(),
        header = ?header.map(std::path::Path::display),
        "history file paths rewritten"
    );
    Ok(())
}

fn encode_path(value: &Path) -> Vec<u8> {
    let mut bytes = value.to_string_lossy().into_owned().into_bytes();
    bytes.push(0);
    bytes
}
