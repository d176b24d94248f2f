//! Multi-root directory cataloging for filetree.
//!
//! This crate walks one or more directory trees in priority order and
//! produces a single [`Catalog`] of their entries, annotated with
//! ownership, permissions, size, timestamps and (when the host supports
//! it) SELinux context.
//!
//! # Overview
//!
//! - **First root wins**: a relative path found under an earlier root
//!   hides the same path under every later root
//! - **Never fatal**: missing roots add nothing, unreadable or unsupported
//!   entries become warnings
//! - **Degrades gracefully**: unknown uids and gids are reported as
//!   numbers, unreadable contexts as null
//!
//! # Example
//!
//! ```rust,no_run
//! use filetree_scan::{ScanConfig, TreeScanner, security};
//!
//! let mut config = ScanConfig::new(["/srv/files/site", "/srv/files/common"]);
//! config.security = security::probe();
//!
//! let catalog = TreeScanner::new().scan(&config);
//! for record in &catalog {
//!     println!("{} {} {}", record.state(), record.mode, record.path.display());
//! }
//! ```

mod accounts;
mod metadata;
mod scanner;
pub mod security;

pub use accounts::AccountCache;
pub use metadata::MetadataExtractor;
pub use scanner::TreeScanner;
pub use security::{ContextSource, XattrContextSource};

// Re-export core types for convenience
pub use filetree_core::{
    Account, Catalog, CatalogStats, EntryKind, EntryState, FileMode, ScanConfig, ScanError,
    ScanRecord, ScanWarning, SecurityCapability, SecurityContext, WarningKind,
};
