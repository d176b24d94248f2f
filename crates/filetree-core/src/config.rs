//! Scan configuration types.

use std::path::PathBuf;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::record::SecurityCapability;

/// Configuration for a multi-root scan.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ScanConfig {
    /// Roots to scan, highest priority first.
    pub roots: Vec<PathBuf>,

    /// Directory that relative roots are resolved against.
    #[builder(default)]
    #[serde(default)]
    pub base_dir: Option<PathBuf>,

    /// Whether SELinux contexts are queried.
    #[builder(default)]
    #[serde(default)]
    pub security: SecurityCapability,

    /// Sort entries by file name within each directory.
    #[builder(default = "false")]
    #[serde(default)]
    pub sort: bool,

    /// Threads used to read directories (1 = serial, 0 = auto-detect).
    #[builder(default = "1")]
    #[serde(default = "default_threads")]
    pub threads: usize,
}

fn default_threads() -> usize {
    1
}

impl ScanConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        match self.roots {
            Some(ref roots) if roots.is_empty() => {
                Err("At least one root path is required".to_string())
            }
            Some(ref roots) if roots.iter().any(|r| r.as_os_str().is_empty()) => {
                Err("Root path cannot be empty".to_string())
            }
            Some(_) => Ok(()),
            None => Err("Root paths are required".to_string()),
        }
    }
}

impl ScanConfig {
    /// Create a new scan config builder.
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder::default()
    }

    /// Create a simple config for scanning the given roots.
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
            base_dir: None,
            security: SecurityCapability::Disabled,
            sort: false,
            threads: 1,
        }
    }

    /// Roots with relative entries joined onto `base_dir`.
    pub fn resolved_roots(&self) -> Vec<PathBuf> {
        match self.base_dir {
            Some(ref base) => self.roots.iter().map(|root| base.join(root)).collect(),
            None => self.roots.clone(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::new(["."])
    }
}
