//! SELinux capability probe and file context lookup.

use std::io;
use std::path::Path;

use filetree_core::{SecurityCapability, SecurityContext};

/// Extended attribute holding the raw SELinux label.
pub const SELINUX_XATTR: &str = "security.selinux";

/// Mount point of selinuxfs when the subsystem is active.
const SELINUXFS_ENFORCE: &str = "/sys/fs/selinux/enforce";

/// Probe whether the host has SELinux enabled.
///
/// The kernel only exposes selinuxfs once a policy is loaded, which is
/// the same condition `is_selinux_enabled(3)` checks.
pub fn probe() -> SecurityCapability {
    if cfg!(target_os = "linux") && Path::new(SELINUXFS_ENFORCE).exists() {
        SecurityCapability::Enabled
    } else {
        SecurityCapability::Disabled
    }
}

/// Source of raw security labels.
pub trait ContextSource: Send + Sync {
    /// Raw, untranslated label of `path`, without following a final
    /// symlink. `Ok(None)` means the entry carries no label.
    fn raw_context(&self, path: &Path) -> io::Result<Option<String>>;
}

/// Reads labels from the `security.selinux` extended attribute.
#[derive(Debug, Default, Clone, Copy)]
pub struct XattrContextSource;

impl ContextSource for XattrContextSource {
    #[cfg(target_os = "linux")]
    fn raw_context(&self, path: &Path) -> io::Result<Option<String>> {
        let value = xattr::get(path, SELINUX_XATTR)?;
        Ok(value.map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
    }

    #[cfg(not(target_os = "linux"))]
    fn raw_context(&self, _path: &Path) -> io::Result<Option<String>> {
        Ok(None)
    }
}

/// Resolve the context of `path`, falling back to all parts unknown.
pub fn resolve(source: &dyn ContextSource, path: &Path) -> SecurityContext {
    match source.raw_context(path) {
        Ok(Some(raw)) => SecurityContext::parse(&raw),
        Ok(None) => SecurityContext::unknown(),
        Err(err) => {
            tracing::debug!(
                target: "filetree::security",
                path = %path.display(),
                %err,
                "context lookup failed"
            );
            SecurityContext::unknown()
        }
    }
}
