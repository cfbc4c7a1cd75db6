// Copyright (c) 2026 Omni Engine Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Concrete ingestion connectors.
//!
//! Each connector walks one kind of on-disk evidence and turns it into
//! [`MemoryEntry`](crate::domain::entry::MemoryEntry) values. Filesystem work
//! runs on the blocking pool so a slow disk never stalls the async workers.

pub mod fileboss;
pub mod mega_pdf;
pub mod static_payload;
pub mod whisperx;

pub use fileboss::FileBossConnector;
pub use mega_pdf::MegaPdfConnector;
pub use static_payload::StaticConnector;
pub use whisperx::WhisperXConnector;

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::domain::entry::MemoryEntry;

/// Every regular file under `root` accepted by `keep`, sorted by path.
///
/// Entries that cannot be read are returned separately so callers can turn
/// them into alerts instead of failing the whole scan.
pub(crate) fn sorted_files(
    root: &Path,
    keep: impl Fn(&Path) -> bool,
) -> (Vec<PathBuf>, Vec<walkdir::Error>) {
    let mut files = Vec::new();
    let mut errors = Vec::new();

    for entry in WalkDir::new(root).follow_links(false) {
        match entry {
            Ok(entry) if entry.file_type().is_file() && keep(entry.path()) => {
                files.push(entry.into_path());
            }
            Ok(_) => {}
            Err(e) => errors.push(e),
        }
    }

    files.sort();
    (files, errors)
}

/// Files under `root` accepted by `keep`, plus alerts for whatever could not
/// be scanned.
///
/// A missing root yields a single alert naming `source`. Unreadable entries
/// below the root become one alert each.
pub(crate) fn scan(
    root: &Path,
    source: &str,
    keep: impl Fn(&Path) -> bool,
) -> (Vec<PathBuf>, Vec<MemoryEntry>) {
    if !root.is_dir() {
        return (
            Vec::new(),
            vec![MemoryEntry::alert(
                format!("{source} root {} does not exist", root.display()),
                source,
            )],
        );
    }

    let (files, errors) = sorted_files(root, keep);
    let alerts = errors
        .into_iter()
        .map(|e| MemoryEntry::alert(format!("Failed to index entry: {e}"), source))
        .collect();
    (files, alerts)
}

/// Lowercased extension of `path`, if any
pub(crate) fn extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
}

/// Final path component as a display string
pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_files_is_recursive_and_ordered() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("b")).unwrap();
        std::fs::write(dir.path().join("b/2.txt"), "x").unwrap();
        std::fs::write(dir.path().join("a.pdf"), "x").unwrap();
        std::fs::write(dir.path().join("c.txt"), "x").unwrap();

        let (files, errors) = sorted_files(dir.path(), |path| extension(path).as_deref() == Some("txt"));

        assert!(errors.is_empty());
        let names: Vec<PathBuf> = files
            .iter()
            .map(|path| path.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(names, vec![PathBuf::from("b/2.txt"), PathBuf::from("c.txt")]);
    }

    #[test]
    fn test_scan_reports_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent");

        let (files, alerts) = scan(&missing, "WHISPERX", |_| true);

        assert!(files.is_empty());
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].is_alert());
        assert_eq!(alerts[0].source(), "WHISPERX");
        assert!(alerts[0].content().starts_with("WHISPERX root "));
        assert!(alerts[0].content().ends_with("does not exist"));
    }
}
