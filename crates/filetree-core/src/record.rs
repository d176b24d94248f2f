//! Catalog record types.

use std::fmt;
use std::path::{Path, PathBuf};

use compact_str::CompactString;
use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumDiscriminants, EnumString};

/// Type of a cataloged entry, with the fields only that type carries.
///
/// Serialized as a `state` tag plus an optional `src` field, so a
/// directory can never carry a source path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, EnumDiscriminants)]
#[serde(tag = "state", rename_all = "lowercase")]
#[strum_discriminants(name(EntryState))]
#[strum_discriminants(derive(Hash, Display, EnumString))]
#[strum_discriminants(strum(serialize_all = "lowercase"))]
pub enum EntryKind {
    /// Regular file.
    File {
        /// Absolute path to read the file content from.
        src: PathBuf,
    },
    /// Directory.
    Directory,
    /// Symbolic link.
    Link {
        /// Raw link target, never resolved.
        src: PathBuf,
    },
}

impl EntryKind {
    /// Get the state tag of this entry.
    pub fn state(&self) -> EntryState {
        EntryState::from(self)
    }

    /// Source path for files, raw target for links, `None` for directories.
    pub fn src(&self) -> Option<&Path> {
        match self {
            EntryKind::File { src } | EntryKind::Link { src } => Some(src),
            EntryKind::Directory => None,
        }
    }

    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, EntryKind::Directory)
    }

    /// Check if this is a regular file.
    pub fn is_file(&self) -> bool {
        matches!(self, EntryKind::File { .. })
    }

    /// Check if this is a symlink.
    pub fn is_link(&self) -> bool {
        matches!(self, EntryKind::Link { .. })
    }
}

/// Owner or group of an entry: the account name, or the numeric id when
/// the id has no entry in the account database.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Account {
    /// Resolved account or group name.
    Name(CompactString),
    /// Unresolved numeric id.
    Id(u32),
}

impl Account {
    /// Get the resolved name, if any.
    pub fn name(&self) -> Option<&str> {
        match self {
            Account::Name(name) => Some(name),
            Account::Id(_) => None,
        }
    }

    /// Check whether the lookup fell back to the numeric id.
    pub fn is_unresolved(&self) -> bool {
        matches!(self, Account::Id(_))
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Account::Name(name) => f.write_str(name),
            Account::Id(id) => write!(f, "{id}"),
        }
    }
}

/// Permission bits of an entry.
///
/// Rendered as octal with a leading zero, at least four characters wide
/// (`0644`, `0755`, `04755`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct FileMode(u32);

impl FileMode {
    /// Permission, setuid/setgid and sticky bits.
    pub const MASK: u32 = 0o7777;

    /// Create from a raw `st_mode`; the file type bits are dropped.
    pub fn from_raw(mode: u32) -> Self {
        Self(mode & Self::MASK)
    }

    /// Get the permission bits.
    pub fn bits(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for FileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0{:03o}", self.0)
    }
}

impl From<FileMode> for String {
    fn from(mode: FileMode) -> Self {
        mode.to_string()
    }
}

impl TryFrom<String> for FileMode {
    type Error = std::num::ParseIntError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        u32::from_str_radix(&value, 8).map(Self::from_raw)
    }
}

/// Whether the host's SELinux subsystem is available.
///
/// Decided once per process and passed down to the extractor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecurityCapability {
    /// Contexts are queried and reported on every record.
    Enabled,
    /// Context fields are omitted from every record.
    #[default]
    Disabled,
}

impl SecurityCapability {
    /// Check if contexts should be queried.
    pub fn is_enabled(&self) -> bool {
        matches!(self, SecurityCapability::Enabled)
    }
}

/// SELinux context of an entry, split into its four parts.
///
/// Each part is `None` when it could not be determined.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityContext {
    #[serde(rename = "seuser")]
    pub user: Option<CompactString>,
    #[serde(rename = "serole")]
    pub role: Option<CompactString>,
    #[serde(rename = "setype")]
    pub kind: Option<CompactString>,
    #[serde(rename = "selevel")]
    pub level: Option<CompactString>,
}

impl SecurityContext {
    /// Context with all four parts unknown.
    pub fn unknown() -> Self {
        Self::default()
    }

    /// Split a raw `user:role:type:level` context.
    ///
    /// The level may itself contain `:`, so at most three splits are made.
    /// A trailing NUL as stored in the xattr is ignored.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim_end_matches('\0');
        let mut parts = raw.splitn(4, ':').map(CompactString::from);
        Self {
            user: parts.next(),
            role: parts.next(),
            kind: parts.next(),
            level: parts.next(),
        }
    }

    /// Check if no part of the context is known.
    pub fn is_unknown(&self) -> bool {
        self.user.is_none() && self.role.is_none() && self.kind.is_none() && self.level.is_none()
    }
}

/// Metadata for one cataloged filesystem entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRecord {
    /// Root the entry was found under.
    pub root: PathBuf,

    /// Path relative to `root`; unique within a catalog.
    pub path: PathBuf,

    /// Entry type and source.
    #[serde(flatten)]
    pub kind: EntryKind,

    /// Permission bits.
    pub mode: FileMode,

    /// Owning user.
    pub owner: Account,

    /// Owning group.
    pub group: Account,

    /// Numeric user id.
    pub uid: u32,

    /// Numeric group id.
    pub gid: u32,

    /// Size in bytes as reported by lstat.
    pub size: u64,

    /// Last modification, seconds since the epoch.
    pub mtime: f64,

    /// Last status change, seconds since the epoch.
    pub ctime: f64,

    /// SELinux context, present only when the subsystem is enabled.
    #[serde(flatten, deserialize_with = "deserialize_security")]
    pub security: Option<SecurityContext>,
}

/// `None` only when all four context keys are missing; keys that are
/// present but `null` give a context with unknown parts.
fn deserialize_security<'de, D>(deserializer: D) -> Result<Option<SecurityContext>, D::Error>
where
    D: Deserializer<'de>,
{
    fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }

    #[derive(Deserialize)]
    struct ContextKeys {
        #[serde(default, deserialize_with = "present")]
        seuser: Option<Option<CompactString>>,
        #[serde(default, deserialize_with = "present")]
        serole: Option<Option<CompactString>>,
        #[serde(default, deserialize_with = "present")]
        setype: Option<Option<CompactString>>,
        #[serde(default, deserialize_with = "present")]
        selevel: Option<Option<CompactString>>,
    }

    let keys = ContextKeys::deserialize(deserializer)?;
    if keys.seuser.is_none()
        && keys.serole.is_none()
        && keys.setype.is_none()
        && keys.selevel.is_none()
    {
        return Ok(None);
    }
    Ok(Some(SecurityContext {
        user: keys.seuser.flatten(),
        role: keys.serole.flatten(),
        kind: keys.setype.flatten(),
        level: keys.selevel.flatten(),
    }))
}

impl ScanRecord {
    /// Get the state tag.
    pub fn state(&self) -> EntryState {
        self.kind.state()
    }

    /// Get the source path or link target.
    pub fn src(&self) -> Option<&Path> {
        self.kind.src()
    }

    /// Absolute path of the entry.
    pub fn abs_path(&self) -> PathBuf {
        self.root.join(&self.path)
    }
}
