//! Walk a directory tree for files named after a date.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use chrono::NaiveDate;
use tracing::{debug, warn};

use rfe_common::{DateRange, DateRangePolicy, DatedFile, FileKey, FilenamePattern};

use crate::error::{StorageError, StorageResult};

/// Every file under `root` whose name matches `pattern`, sorted by key.
///
/// Files that do not match (partial downloads, other products) are skipped.
/// When two files share a key, the one whose path sorts first wins.
pub fn discover(root: &Path, pattern: &FilenamePattern) -> StorageResult<Vec<DatedFile>> {
    if !root.is_dir() {
        return Err(StorageError::MissingDirectory(root.to_path_buf()));
    }

    let mut by_key: BTreeMap<FileKey, DatedFile> = BTreeMap::new();
    for entry in walkdir::WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| StorageError::Walk {
            path: root.to_path_buf(),
            message: e.to_string(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let Ok(key) = pattern.parse_path(entry.path()) else {
            debug!(path = %entry.path().display(), "Skipping non-matching file");
            continue;
        };

        if let Some(existing) = by_key.get(&key) {
            warn!(
                kept = %existing.path.display(),
                ignored = %entry.path().display(),
                "Duplicate file for the same date"
            );
            continue;
        }
        by_key.insert(key, DatedFile::new(entry.into_path(), key));
    }

    debug!(root = %root.display(), pattern = %pattern, found = by_key.len(), "Discovered files");
    Ok(by_key.into_values().collect())
}

/// Keep the files that fall inside `range` under `policy`, in key order.
///
/// Per-day keys must be one of the expected dates; per-year keys must be a
/// year touched by the range.
pub fn select_in_range(
    files: Vec<DatedFile>,
    range: &DateRange,
    policy: DateRangePolicy,
) -> Vec<DatedFile> {
    let dates: HashSet<NaiveDate> = range.expected_dates(policy).into_iter().collect();
    let years = range.inclusive_year_range();

    files
        .into_iter()
        .filter(|file| match file.key {
            FileKey::Day(date) => dates.contains(&date),
            FileKey::Year(year) => years.contains(&year),
        })
        .collect()
}

/// Discover and select in one step.
pub fn discover_in_range(
    root: &Path,
    pattern: &FilenamePattern,
    range: &DateRange,
    policy: DateRangePolicy,
) -> StorageResult<Vec<DatedFile>> {
    Ok(select_in_range(discover(root, pattern)?, range, policy))
}
