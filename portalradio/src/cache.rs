//! Persisted record of the last port that passed the handshake.
//!
//! The cache is a single line of plain text:
//!
//! ```text
//! <port name> <device name>
//! ```
//!
//! A missing, empty or unreadable file is a cache miss, never an error. A
//! record whose port is no longer enumerated is stale: it is ignored, and
//! overwritten by the next successful probe.

use crate::error::Result;
use crate::port::PortInfo;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

/// Default cache file name, relative to the working directory.
pub const DEFAULT_CACHE_FILE: &str = "portalradio_port.txt";

/// Port identifier and device name of the last validated port.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CachedPortRecord {
    /// Port name/path, as reported by enumeration.
    pub port_name: String,
    /// First line of the device's INIT reply.
    pub device_name: String,
}

impl CachedPortRecord {
    /// Create a record.
    pub fn new(port_name: impl Into<String>, device_name: impl Into<String>) -> Self {
        Self {
            port_name: port_name.into(),
            device_name: device_name.into(),
        }
    }

    /// Parse the cache file contents. Only the first line is considered; the
    /// port name ends at the first whitespace character.
    fn parse(content: &str) -> Option<Self> {
        let line = content
            .lines()
            .next()?
            .trim();
        let (port_name, device_name) = line
            .split_once(char::is_whitespace)
            .unwrap_or((line, ""));
        if port_name.is_empty() {
            return None;
        }
        Some(Self::new(port_name, device_name.trim()))
    }

    fn to_line(&self) -> String {
        format!("{} {}\n", self.port_name, self.device_name)
    }
}

/// File-backed store for a single [`CachedPortRecord`].
#[derive(Debug, Clone)]
pub struct PortCache {
    path: PathBuf,
}

impl Default for PortCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_FILE)
    }
}

impl PortCache {
    /// Cache stored at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the cache file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the cached record, if there is a usable one.
    pub fn load(&self) -> Option<CachedPortRecord> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                debug!("No port cache at {}: {e}", self.path.display());
                return None;
            },
        };

        let record = CachedPortRecord::parse(&content);
        if record.is_none() {
            debug!("Ignoring malformed port cache {}", self.path.display());
        }
        record
    }

    /// Overwrite the cache with `record`, creating the file if needed.
    pub fn save(&self, record: &CachedPortRecord) -> Result<()> {
        fs::write(&self.path, record.to_line())?;
        info!(
            "Saved port {} to {}",
            record.port_name,
            self.path.display()
        );
        Ok(())
    }

    /// Check whether `record` points at one of the currently enumerated ports.
    pub fn is_valid(record: &CachedPortRecord, ports: &[PortInfo]) -> bool {
        ports
            .iter()
            .any(|p| p.name == record.port_name)
    }
}
