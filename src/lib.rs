#![forbid(unsafe_code)]

//! histfix: repair stale file-path references inside EEG history files.
//!
//! A history file (`.ehst2`) is a structured-storage container holding
//! absolute paths to its companion header (`.vhdr`) and raw-data (`.eeg`)
//! files. When a dataset moves, those paths go stale; this crate
//! rediscovers where the files now live (following `.lnk` shortcut
//! indirection) and rewrites the container's path streams in place.

pub mod cli;
pub mod discovery;
pub mod error;
pub mod fixup;
pub mod header;
pub mod logging;
pub mod model;
pub mod patch;
pub mod plan;
pub mod shortcut;
pub mod workspace;

pub use discovery::{locate_headers, SelectHeader};
pub use error::{HfError, HfResult};
pub use fixup::{run_fixup, Confirm, FixupOptions, FixupSummary};
pub use header::extract_raw_path;
pub use model::{DatasetName, Match};
pub use patch::apply_fix;
pub use plan::plan_matches;
pub use shortcut::resolve_target;
pub use workspace::{load_workspace, Workspace};
