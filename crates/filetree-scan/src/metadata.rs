//! Per-entry metadata extraction.

use std::fs::{self, FileType, Metadata};
use std::path::Path;

use filetree_core::{
    EntryKind, FileMode, ScanError, ScanRecord, SecurityCapability, SecurityContext,
};

use crate::accounts::AccountCache;
use crate::security::{self, ContextSource, XattrContextSource};

/// Builds a [`ScanRecord`] for a single filesystem entry.
///
/// Entries are inspected with `lstat`, so a symlink is always reported
/// as a link and never as its target. Owner, group and security context
/// degrade to fallback values instead of failing; only a failed stat or
/// an unsupported file type is an error.
pub struct MetadataExtractor {
    security: SecurityCapability,
    contexts: Box<dyn ContextSource>,
    accounts: AccountCache,
}

impl MetadataExtractor {
    /// Create an extractor reading labels from extended attributes.
    pub fn new(security: SecurityCapability) -> Self {
        Self::with_context_source(security, XattrContextSource)
    }

    /// Create an extractor with a custom label source.
    pub fn with_context_source(
        security: SecurityCapability,
        contexts: impl ContextSource + 'static,
    ) -> Self {
        Self {
            security,
            contexts: Box::new(contexts),
            accounts: AccountCache::new(),
        }
    }

    /// Extract the record for `rel_path` under `root`.
    pub fn extract(&mut self, root: &Path, rel_path: &Path) -> Result<ScanRecord, ScanError> {
        let abs_path = root.join(rel_path);
        let metadata = fs::symlink_metadata(&abs_path).map_err(|e| ScanError::io(&abs_path, e))?;

        let file_type = metadata.file_type();
        let kind = if file_type.is_symlink() {
            let target = fs::read_link(&abs_path).map_err(|e| ScanError::io(&abs_path, e))?;
            EntryKind::Link { src: target }
        } else if file_type.is_dir() {
            EntryKind::Directory
        } else if file_type.is_file() {
            EntryKind::File {
                src: abs_path.clone(),
            }
        } else {
            return Err(ScanError::UnsupportedFileType {
                path: abs_path,
                file_type: describe_file_type(&file_type).to_string(),
            });
        };

        let uid = get_uid(&metadata);
        let gid = get_gid(&metadata);

        let security = self
            .security
            .is_enabled()
            .then(|| self.context(&abs_path));

        Ok(ScanRecord {
            root: root.to_path_buf(),
            path: rel_path.to_path_buf(),
            kind,
            mode: FileMode::from_raw(get_mode(&metadata)),
            owner: self.accounts.user(uid),
            group: self.accounts.group(gid),
            uid,
            gid,
            size: metadata.len(),
            mtime: get_mtime(&metadata),
            ctime: get_ctime(&metadata),
            security,
        })
    }

    fn context(&self, path: &Path) -> SecurityContext {
        security::resolve(self.contexts.as_ref(), path)
    }
}

/// Name a file type the catalog does not support.
#[cfg(unix)]
fn describe_file_type(file_type: &FileType) -> &'static str {
    use std::os::unix::fs::FileTypeExt;

    if file_type.is_fifo() {
        "fifo"
    } else if file_type.is_socket() {
        "socket"
    } else if file_type.is_block_device() {
        "block device"
    } else if file_type.is_char_device() {
        "character device"
    } else {
        "unknown"
    }
}

#[cfg(not(unix))]
fn describe_file_type(_file_type: &FileType) -> &'static str {
    "unknown"
}

// Cross-platform metadata helpers

#[cfg(unix)]
fn get_uid(metadata: &Metadata) -> u32 {
    std::os::unix::fs::MetadataExt::uid(metadata)
}

#[cfg(not(unix))]
fn get_uid(_metadata: &Metadata) -> u32 {
    0
}

#[cfg(unix)]
fn get_gid(metadata: &Metadata) -> u32 {
    std::os::unix::fs::MetadataExt::gid(metadata)
}

#[cfg(not(unix))]
fn get_gid(_metadata: &Metadata) -> u32 {
    0
}

#[cfg(unix)]
fn get_mode(metadata: &Metadata) -> u32 {
    std::os::unix::fs::MetadataExt::mode(metadata)
}

#[cfg(not(unix))]
fn get_mode(metadata: &Metadata) -> u32 {
    // Only the read-only attribute maps onto permission bits
    match (metadata.is_dir(), metadata.permissions().readonly()) {
        (true, _) => 0o755,
        (false, true) => 0o444,
        (false, false) => 0o644,
    }
}

#[cfg(unix)]
fn get_mtime(metadata: &Metadata) -> f64 {
    use std::os::unix::fs::MetadataExt;
    metadata.mtime() as f64 + metadata.mtime_nsec() as f64 / 1e9
}

#[cfg(not(unix))]
fn get_mtime(metadata: &Metadata) -> f64 {
    epoch_seconds(metadata.modified().ok())
}

/// Time of the last status change (Unix) or creation (elsewhere).
#[cfg(unix)]
fn get_ctime(metadata: &Metadata) -> f64 {
    use std::os::unix::fs::MetadataExt;
    metadata.ctime() as f64 + metadata.ctime_nsec() as f64 / 1e9
}

#[cfg(not(unix))]
fn get_ctime(metadata: &Metadata) -> f64 {
    epoch_seconds(metadata.created().ok())
}

#[cfg(not(unix))]
fn epoch_seconds(time: Option<std::time::SystemTime>) -> f64 {
    time.and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::io;
    use std::os::unix::fs::{PermissionsExt, symlink};
    use std::path::PathBuf;
    use tempfile::TempDir;

    struct Label(&'static str);

    impl ContextSource for Label {
        fn raw_context(&self, _path: &Path) -> io::Result<Option<String>> {
            Ok(Some(self.0.to_string()))
        }
    }

    #[test]
    fn test_extract_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("hello.txt"), "hello").unwrap();
        fs::set_permissions(temp.path().join("hello.txt"), fs::Permissions::from_mode(0o640))
            .unwrap();

        let mut extractor = MetadataExtractor::new(SecurityCapability::Disabled);
        let record = extractor.extract(temp.path(), Path::new("hello.txt")).unwrap();

        assert!(record.kind.is_file());
        assert_eq!(record.src(), Some(temp.path().join("hello.txt").as_path()));
        assert_eq!(record.mode.to_string(), "0640");
        assert_eq!(record.size, 5);
        assert!(record.mtime > 0.0);
        assert!(record.security.is_none());
    }

    #[test]
    fn test_extract_dangling_symlink() {
        let temp = TempDir::new().unwrap();
        symlink("../does/not/exist", temp.path().join("dangling")).unwrap();

        let mut extractor = MetadataExtractor::new(SecurityCapability::Disabled);
        let record = extractor.extract(temp.path(), Path::new("dangling")).unwrap();

        assert_eq!(
            record.kind,
            EntryKind::Link {
                src: PathBuf::from("../does/not/exist")
            }
        );
    }

    #[test]
    fn test_extract_missing_entry() {
        let temp = TempDir::new().unwrap();
        let mut extractor = MetadataExtractor::new(SecurityCapability::Disabled);

        let err = extractor.extract(temp.path(), Path::new("gone")).unwrap_err();
        assert!(matches!(err, ScanError::NotFound { .. }));
    }

    #[test]
    fn test_extract_with_injected_context() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("etc")).unwrap();

        let mut extractor = MetadataExtractor::with_context_source(
            SecurityCapability::Enabled,
            Label("system_u:object_r:etc_t:s0:c1,c2"),
        );
        let record = extractor.extract(temp.path(), Path::new("etc")).unwrap();
        let ctx = record.security.unwrap();

        assert!(record.kind.is_dir());
        assert_eq!(ctx.kind.as_deref(), Some("etc_t"));
        assert_eq!(ctx.level.as_deref(), Some("s0:c1,c2"));
    }
}
