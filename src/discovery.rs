//! Header discovery under a dataset root.
//!
//! Discovery is split in two so the walk is testable without a
//! human-in-the-loop stub: `find_header_candidates` is pure and returns
//! every candidate it can see; `locate_headers` layers the disambiguation
//! collaborator on top to pick one path per dataset.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::HfResult;
use crate::model::{has_extension, DatasetName, HEADER_EXT, SHORTCUT_EXT};
use crate::shortcut;

/// Chooses among several header files claiming the same dataset name.
///
/// Returning `None` leaves the dataset unresolved; the scan reports it and
/// moves on rather than erroring.
pub trait SelectHeader {
    fn select(&self, name: &DatasetName, candidates: &[PathBuf]) -> Option<PathBuf>;
}

impl<F> SelectHeader for F
where
    F: Fn(&DatasetName, &[PathBuf]) -> Option<PathBuf>,
{
    fn select(&self, name: &DatasetName, candidates: &[PathBuf]) -> Option<PathBuf> {
        self(name, candidates)
    }
}

/// Selector for contexts where ambiguity cannot be resolved; every
/// multi-candidate dataset is left out.
pub struct SkipAmbiguous;

impl SelectHeader for SkipAmbiguous {
    fn select(&self, _name: &DatasetName, _candidates: &[PathBuf]) -> Option<PathBuf> {
        None
    }
}

/// Walk `root` and collect every header candidate, grouped by dataset name.
///
/// A candidate is either a `.vhdr` file found directly in the tree or the
/// target of a `.lnk` shortcut whose resolved path ends in `.vhdr`.
/// Identical paths are deduplicated; grouping is case-insensitive. A
/// malformed shortcut aborts the scan with a `Format` error.
pub fn find_header_candidates(
    root: &Path,
) -> HfResult<BTreeMap<DatasetName, BTreeSet<PathBuf>>> {
    let mut groups: BTreeMap<DatasetName, BTreeSet<PathBuf>> = BTreeMap::new();

    for entry in WalkDir::new(root).into_iter().filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();

        let candidate = if has_extension(path, SHORTCUT_EXT) {
            let target = PathBuf::from(shortcut::resolve_target(path)?);
            if !has_extension(&target, HEADER_EXT) {
                tracing::debug!(
                    shortcut = %path.display(),
                    target = %target.display(),
                    "shortcut target is not a header; skipping"
                );
                continue;
            }
            target
        } else if has_extension(path, HEADER_EXT) {
            std::path::absolute(path)?
        } else {
            continue;
        };

        let Some(name) = DatasetName::from_path(&candidate) else {
            continue;
        };
        groups.entry(name).or_default().insert(candidate);
    }

    Ok(groups)
}

/// Resolve one header path per dataset name under `root`.
///
/// Single-candidate groups are used directly; multi-candidate groups go
/// through `selector`. Datasets the selector declines are omitted from the
/// result and logged.
pub fn locate_headers(
    root: &Path,
    selector: &dyn SelectHeader,
) -> HfResult<BTreeMap<DatasetName, PathBuf>> {
    let mut headers = BTreeMap::new();

    for (name, group) in find_header_candidates(root)? {
        let candidates: Vec<PathBuf> = group.into_iter().collect();
        let chosen = if candidates.len() == 1 {
            candidates.into_iter().next()
        } else {
            tracing::info!(
                dataset = %name,
                count = candidates.len(),
                "multiple headers share a dataset name; asking for a choice"
            );
            selector.select(&name, &candidates)
        };

        match chosen {
            Some(path) => {
                headers.insert(name, path);
            }
            None => {
                tracing::warn!(dataset = %name, "header ambiguity left unresolved; dataset skipped");
            }
        }
    }

    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).expect("mkdir");
        fs::write(path, b"[Common Infos]\n").expect("write file");
    }

    fn plant_shortcut(path: &Path, target: &Path) {
        fs::create_dir_all(path.parent().unwrap()).expect("mkdir");
        let image = shortcut::build_shortcut(&[&target.to_string_lossy()], false);
        fs::write(path, image).expect("write shortcut");
    }

    #[test]
    fn finds_headers_in_nested_directories() {
        let dir = tempfile::tempdir().expect("create temp dir");
        touch(&dir.path().join("a/rec1.vhdr"));
        touch(&dir.path().join("a/b/rec2.vhdr"));
        touch(&dir.path().join("a/b/rec2.eeg"));

        let groups = find_header_candidates(dir.path()).unwrap();
        assert_eq!(groups.len(), 2);
        assert!(groups.contains_key("rec1"));
        assert!(groups.contains_key("rec2"));
    }

    #[test]
    fn follows_shortcuts_to_headers_elsewhere() {
        let scan = tempfile::tempdir().expect("create temp dir");
        let elsewhere = tempfile::tempdir().expect("create temp dir");
        let real = elsewhere.path().join("rec9.vhdr");
        touch(&real);
        plant_shortcut(&scan.path().join("links/rec9.lnk"), &real);

        let groups = find_header_candidates(scan.path()).unwrap();
        let group = groups.get("rec9").expect("rec9 group");
        assert_eq!(group.iter().next().unwrap(), &real);
    }

    #[test]
    fn shortcut_targets_that_are_not_headers_are_dropped() {
        let dir = tempfile::tempdir().expect("create temp dir");
        plant_shortcut(
            &dir.path().join("stray.lnk"),
            Path::new("C:\\somewhere\\notes.txt"),
        );
        let groups = find_header_candidates(dir.path()).unwrap();
        assert!(groups.is_empty());
    }

    #[test]
    fn case_collisions_group_together() {
        let dir = tempfile::tempdir().expect("create temp dir");
        touch(&dir.path().join("one/Rec1.vhdr"));
        touch(&dir.path().join("two/rec1.VHDR"));

        let groups = find_header_candidates(dir.path()).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups.get("rec1").unwrap().len(), 2);
    }

    #[test]
    fn duplicate_paths_are_deduplicated() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let real = dir.path().join("rec1.vhdr");
        touch(&real);
        // A shortcut pointing at the directly-found header adds nothing.
        plant_shortcut(&dir.path().join("rec1.lnk"), &std::path::absolute(&real).unwrap());

        let groups = find_header_candidates(dir.path()).unwrap();
        assert_eq!(groups.get("rec1").unwrap().len(), 1);
    }

    #[test]
    fn malformed_shortcut_aborts_the_scan() {
        let dir = tempfile::tempdir().expect("create temp dir");
        fs::write(dir.path().join("bad.lnk"), b"garbage").expect("write junk");
        assert!(find_header_candidates(dir.path()).is_err());
    }

    #[test]
    fn single_candidates_bypass_the_selector() {
        let dir = tempfile::tempdir().expect("create temp dir");
        touch(&dir.path().join("rec1.vhdr"));

        let panicking = |_: &DatasetName, _: &[PathBuf]| -> Option<PathBuf> {
            panic!("selector must not run for single candidates")
        };
        let headers = locate_headers(dir.path(), &panicking).unwrap();
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn selector_choice_wins_for_ambiguous_groups() {
        let dir = tempfile::tempdir().expect("create temp dir");
        touch(&dir.path().join("one/rec1.vhdr"));
        touch(&dir.path().join("two/rec1.vhdr"));

        let pick_last = |_: &DatasetName, candidates: &[PathBuf]| candidates.last().cloned();
        let headers = locate_headers(dir.path(), &pick_last).unwrap();
        let chosen = headers.get("rec1").expect("rec1 resolved");
        assert!(chosen.ends_with("two/rec1.vhdr"), "chose {}", chosen.display());
    }

    #[test]
    fn declined_ambiguity_omits_the_dataset() {
        let dir = tempfile::tempdir().expect("create temp dir");
        touch(&dir.path().join("one/rec1.vhdr"));
        touch(&dir.path().join("two/rec1.vhdr"));
        touch(&dir.path().join("rec2.vhdr"));

        let headers = locate_headers(dir.path(), &SkipAmbiguous).unwrap();
        assert!(!headers.contains_key("rec1"));
        assert!(headers.contains_key("rec2"));
    }
}
