//! Match planning: join history files against discovered headers.
//!
//! Planning mutates nothing. Both maps are built once per call and then
//! only read, so the per-history-file joins are independent of each other.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::discovery::{locate_headers, SelectHeader};
use crate::error::HfResult;
use crate::header::extract_raw_path;
use crate::model::{DatasetName, Match};

/// Derive the raw-data map from an already-resolved header map.
///
/// A header whose `DataFile` reference cannot be read is a soft miss for
/// that dataset: warned about and omitted, never fatal to the batch.
pub fn raw_paths_from_headers(
    headers: &BTreeMap<DatasetName, PathBuf>,
) -> BTreeMap<DatasetName, PathBuf> {
    let mut raws = BTreeMap::new();
    for (name, header) in headers {
        match extract_raw_path(header) {
            Ok(raw) => {
                raws.insert(name.clone(), raw);
            }
            Err(error) => {
                tracing::warn!(
                    dataset = %name,
                    header = %header.display(),
                    %error,
                    "header does not yield a raw-data path"
                );
            }
        }
    }
    raws
}

/// Produce one [`Match`] per history file, preserving input order.
///
/// The header map (and from it the raw map) is computed once; each history
/// file's dataset name, derived from its basename, is then looked up in
/// both maps independently. Missing entries become absent fields, never
/// batch failures.
pub fn plan_matches(
    root: &Path,
    history_files: &[PathBuf],
    selector: &dyn SelectHeader,
) -> HfResult<Vec<Match>> {
    let headers = locate_headers(root, selector)?;
    let raws = raw_paths_from_headers(&headers);
    tracing::info!(
        headers = headers.len(),
        raws = raws.len(),
        root = %root.display(),
        "discovery complete"
    );

    let mut matches = Vec::with_capacity(history_files.len());
    for history in history_files {
        let Some(name) = DatasetName::from_path(history) else {
            tracing::warn!(
                history = %history.display(),
                "history path has no basename to derive a dataset name from; skipped"
            );
            continue;
        };
        let header = headers.get(name.folded()).cloned();
        let raw = raws.get(name.folded()).cloned();
        matches.push(Match {
            name,
            history: history.clone(),
            header,
            raw,
        });
    }
    Ok(matches)
}
