//! Core types for filetree.
//!
//! This crate provides the data structures shared by the scanner and its
//! callers: catalog records, scan configuration, and error types.

mod catalog;
mod config;
mod error;
mod record;

pub use catalog::{Catalog, CatalogStats};
pub use config::{ScanConfig, ScanConfigBuilder};
pub use error::{ScanError, ScanWarning, WarningKind};
pub use record::{
    Account, EntryKind, EntryState, FileMode, ScanRecord, SecurityCapability, SecurityContext,
};
