use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use serde::{Serialize, Serializer};

/// Extension of header documents discovered under the dataset root.
pub const HEADER_EXT: &str = "vhdr";
/// Extension of OS shortcut files followed during discovery.
pub const SHORTCUT_EXT: &str = "lnk";
/// Extension identifying a history-file structured-storage container.
pub const HISTORY_EXT: &str = "ehst2";

/// Case-insensitive name of one logical recording session.
///
/// Derived from a file basename (extension stripped) and used as the join
/// key between headers, raw files, and history files. Equality, ordering,
/// and hashing all go through one case-folded form so that grouping during
/// discovery and lookup during planning can never disagree; the original
/// spelling is kept for display.
#[derive(Debug, Clone)]
pub struct DatasetName {
    raw: String,
    folded: String,
}

impl DatasetName {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let folded = raw.to_lowercase();
        Self { raw, folded }
    }

    /// Dataset name from a file's basename, extension stripped.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.file_stem()
            .map(|stem| Self::new(stem.to_string_lossy().into_owned()))
    }

    /// The name as originally spelled on disk.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn folded(&self) -> &str {
        &self.folded
    }
}

impl fmt::Display for DatasetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl PartialEq for DatasetName {
    fn eq(&self, other: &Self) -> bool {
        self.folded == other.folded
    }
}

impl Eq for DatasetName {}

impl PartialOrd for DatasetName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DatasetName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.folded.cmp(&other.folded)
    }
}

impl Hash for DatasetName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.folded.hash(state);
    }
}

// Lets map lookups borrow the folded key without cloning.
impl Borrow<str> for DatasetName {
    fn borrow(&self) -> &str {
        &self.folded
    }
}

impl Serialize for DatasetName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

/// The resolved triple for one history file.
///
/// An absent `raw` is a hard miss (nothing to repair with); an absent
/// `header` is a soft miss (the data path can still be fixed, flagged so
/// the operator knows the header stream stays stale).
#[derive(Debug, Clone, Serialize)]
pub struct Match {
    pub name: DatasetName,
    pub history: PathBuf,
    pub header: Option<PathBuf>,
    pub raw: Option<PathBuf>,
}

impl Match {
    /// A match can be applied as soon as the raw-data path is known.
    #[must_use]
    pub fn is_fixable(&self) -> bool {
        self.raw.is_some()
    }
}

/// True when `path` has the given extension, compared case-insensitively.
pub(crate) fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().eq_ignore_ascii_case(ext))
        .unwrap_or(false)
}
