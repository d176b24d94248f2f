//! Scan result container and statistics.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ScanWarning;
use crate::record::{EntryKind, ScanRecord};

/// Summary statistics for a catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogStats {
    /// Total size of regular files in bytes.
    pub total_size: u64,
    /// Number of regular files.
    pub total_files: u64,
    /// Number of directories.
    pub total_dirs: u64,
    /// Number of symbolic links.
    pub total_links: u64,
    /// Entries skipped because an earlier root already provided the path.
    pub shadowed: u64,
}

impl CatalogStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Update stats with an accepted record.
    pub fn record(&mut self, record: &ScanRecord) {
        match record.kind {
            EntryKind::File { .. } => {
                self.total_files += 1;
                self.total_size += record.size;
            }
            EntryKind::Directory => self.total_dirs += 1,
            EntryKind::Link { .. } => self.total_links += 1,
        }
    }

    /// Record an entry hidden by a higher-priority root.
    pub fn record_shadowed(&mut self) {
        self.shadowed += 1;
    }

    /// Total number of cataloged entries.
    pub fn total_entries(&self) -> u64 {
        self.total_files + self.total_dirs + self.total_links
    }
}

/// Ordered records produced by one scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    /// Records in first-discovery order; `path` is unique.
    pub records: Vec<ScanRecord>,

    /// Roots that were scanned, in priority order.
    pub roots: Vec<PathBuf>,

    /// Duration of the scan.
    pub scan_duration: Duration,

    /// Summary statistics.
    pub stats: CatalogStats,

    /// Entries that were skipped with a diagnostic.
    pub warnings: Vec<ScanWarning>,
}

impl Catalog {
    /// Create a new catalog.
    pub fn new(
        records: Vec<ScanRecord>,
        roots: Vec<PathBuf>,
        stats: CatalogStats,
        scan_duration: Duration,
        warnings: Vec<ScanWarning>,
    ) -> Self {
        Self {
            records,
            roots,
            scan_duration,
            stats,
            warnings,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if no entries were cataloged.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate records in order.
    pub fn iter(&self) -> std::slice::Iter<'_, ScanRecord> {
        self.records.iter()
    }

    /// Find the record for a relative path.
    pub fn get(&self, path: impl AsRef<Path>) -> Option<&ScanRecord> {
        let path = path.as_ref();
        self.records.iter().find(|r| r.path == path)
    }

    /// Records contributed by the given root.
    pub fn from_root<'a>(&'a self, root: &'a Path) -> impl Iterator<Item = &'a ScanRecord> {
        self.records.iter().filter(move |r| r.root == root)
    }

    /// Check if there were any warnings during scanning.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

impl IntoIterator for Catalog {
    type Item = ScanRecord;
    type IntoIter = std::vec::IntoIter<ScanRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a ScanRecord;
    type IntoIter = std::slice::Iter<'a, ScanRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
