//! Build configuration.
//!
//! Everything a build needs is fixed here, up front, and never changes while
//! the build runs.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::writer::MAX_PART_BYTES;
use crate::{Error, Result};

/// Configuration for a sitemap build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Directory that receives parts, the index and `.gz` files.
    /// Default: `sitemaps`
    pub output_dir: PathBuf,

    /// Part files are `{base_name}{n}.xml`; the index is `{base_name}.xml`
    /// with spaces stripped.
    /// Default: `sitemap`
    pub base_name: String,

    /// Public root URL of the site, e.g. `https://example.com`.
    pub root_url: String,

    /// Path segment under `root_url` where parts are served.
    /// Default: `sitemaps`
    pub sitemaps_path: String,

    /// Pretty-print part files.
    /// Default: false
    pub indented: bool,

    /// Gzip every output file and point the index at the `.gz` parts.
    /// Default: true
    pub gzip: bool,

    /// Byte ceiling checked before each entry is written.
    /// Default: 500,000
    pub max_part_bytes: u64,

    /// Copy the `.gz` files here once compressed.
    /// Default: none
    pub publish_dir: Option<PathBuf>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("sitemaps"),
            base_name: "sitemap".to_string(),
            root_url: String::new(),
            sitemaps_path: "sitemaps".to_string(),
            indented: false,
            gzip: true,
            max_part_bytes: MAX_PART_BYTES,
            publish_dir: None,
        }
    }
}

impl BuildConfig {
    pub fn new(output_dir: impl Into<PathBuf>, root_url: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            root_url: root_url.into(),
            ..Self::default()
        }
    }

    /// Load a JSON config; missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|err| Error::io_at(path, err))?;
        serde_json::from_str(&raw)
            .map_err(|err| Error::InvalidConfig(format!("{}: {err}", path.display())))
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_name.trim().is_empty() {
            return Err(Error::InvalidConfig("base_name is empty".to_string()));
        }
        if self.base_name.contains(&['/', '\\'][..]) {
            return Err(Error::InvalidConfig(format!(
                "base_name must be a plain file name: {}",
                self.base_name
            )));
        }
        if self.root_url.trim().is_empty() {
            return Err(Error::InvalidConfig("root_url is empty".to_string()));
        }
        if self.max_part_bytes == 0 {
            return Err(Error::InvalidConfig("max_part_bytes must be > 0".to_string()));
        }
        Ok(())
    }
}
