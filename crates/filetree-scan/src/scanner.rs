//! Multi-root merge walk built on jwalk.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use indexmap::map::Entry;
use jwalk::{Parallelism, WalkDir};

use filetree_core::{Catalog, CatalogStats, ScanConfig, ScanRecord, ScanWarning};

use crate::metadata::MetadataExtractor;

/// Walks several roots in priority order and merges them into one catalog.
///
/// Each relative path is cataloged once, from the first root that
/// contains it. Records keep the order in which they were first found.
#[derive(Debug, Default, Clone, Copy)]
pub struct TreeScanner;

impl TreeScanner {
    /// Create a new scanner.
    pub fn new() -> Self {
        Self
    }

    /// Scan every root in `config`.
    ///
    /// Never fails: missing roots contribute nothing, and entries that
    /// cannot be inspected are skipped and reported in
    /// [`Catalog::warnings`].
    pub fn scan(&self, config: &ScanConfig) -> Catalog {
        let mut extractor = MetadataExtractor::new(config.security);
        self.scan_with(config, &mut extractor)
    }

    /// Scan using a caller-supplied extractor.
    ///
    /// The extractor's own security capability takes precedence over the
    /// one in `config`.
    pub fn scan_with(&self, config: &ScanConfig, extractor: &mut MetadataExtractor) -> Catalog {
        let start = Instant::now();
        let roots: Vec<PathBuf> = config.resolved_roots().iter().map(|r| absolutize(r)).collect();

        let mut seen: IndexMap<PathBuf, ScanRecord> = IndexMap::new();
        let mut stats = CatalogStats::new();
        let mut warnings = Vec::new();

        for root in &roots {
            self.merge_root(config, root, extractor, &mut seen, &mut stats, &mut warnings);
        }

        Catalog::new(
            seen.into_values().collect(),
            roots,
            stats,
            start.elapsed(),
            warnings,
        )
    }

    /// Walk one root, adding entries whose relative path is not yet known.
    fn merge_root(
        &self,
        config: &ScanConfig,
        root: &Path,
        extractor: &mut MetadataExtractor,
        seen: &mut IndexMap<PathBuf, ScanRecord>,
        stats: &mut CatalogStats,
        warnings: &mut Vec<ScanWarning>,
    ) {
        match fs::metadata(root) {
            Ok(m) if m.is_dir() => {}
            Ok(_) => {
                tracing::debug!(target: "filetree::scan", root = %root.display(), "root is not a directory, skipping");
                return;
            }
            Err(err) => {
                tracing::debug!(target: "filetree::scan", root = %root.display(), %err, "root not readable, skipping");
                return;
            }
        }

        tracing::debug!(target: "filetree::scan", root = %root.display(), "walking root");

        let walker = WalkDir::new(root)
            .parallelism(parallelism(config.threads))
            .skip_hidden(false)
            .follow_links(false)
            .sort(config.sort)
            .min_depth(1);

        for entry_result in walker {
            let entry = match entry_result {
                Ok(e) => e,
                Err(err) => {
                    // Unreadable subdirectories are passed over, like the rest of the walk.
                    tracing::debug!(target: "filetree::scan", %err, "error while walking");
                    continue;
                }
            };

            let path = entry.path();
            let Ok(rel_path) = path.strip_prefix(root) else {
                continue;
            };

            let slot = match seen.entry(rel_path.to_path_buf()) {
                Entry::Occupied(_) => {
                    stats.record_shadowed();
                    continue;
                }
                Entry::Vacant(slot) => slot,
            };

            match extractor.extract(root, slot.key()) {
                Ok(record) => {
                    tracing::debug!(target: "filetree::scan", path = %path.display(), "found");
                    stats.record(&record);
                    slot.insert(record);
                }
                Err(err) => {
                    tracing::warn!(target: "filetree::scan", path = %path.display(), "{err}");
                    warnings.push(ScanWarning::from_error(&err));
                }
            }
        }
    }
}

fn parallelism(threads: usize) -> Parallelism {
    match threads {
        0 => Parallelism::RayonDefaultPool {
            busy_timeout: Duration::from_millis(100),
        },
        1 => Parallelism::Serial,
        n => Parallelism::RayonNewPool(n),
    }
}

/// Make a root absolute so file records carry a usable source path.
fn absolutize(root: &Path) -> PathBuf {
    std::path::absolute(root).unwrap_or_else(|_| root.to_path_buf())
}
