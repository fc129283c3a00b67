use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::error::ReadError;
use crate::inventory::model::ScanFile;
use crate::metadata::tree::TagNode;

/// Source of embedded metadata for a scanned file.
///
/// `Ok(None)` means the file carries no metadata at all.
#[async_trait]
pub trait MetadataReader: Send + Sync {
    async fn read(&self, file: &ScanFile) -> Result<Option<TagNode>, ReadError>;
}

/// Default suffix appended to an image path to locate its metadata dump.
pub const DEFAULT_SIDECAR_SUFFIX: &str = ".json";

/// Reads metadata from a JSON dump stored beside each image
/// (`scan_001.jpg` → `scan_001.jpg.json`).
#[derive(Debug, Clone)]
pub struct JsonSidecarReader {
    suffix: String,
}

impl JsonSidecarReader {
    pub fn new() -> Self {
        Self::with_suffix(DEFAULT_SIDECAR_SUFFIX)
    }

    pub fn with_suffix(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }

    /// Location of the metadata dump for `image`.
    pub fn sidecar_path(&self, image: &Path) -> PathBuf {
        let mut name = OsString::from(image.as_os_str());
        name.push(&self.suffix);
        PathBuf::from(name)
    }
}

impl Default for JsonSidecarReader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetadataReader for JsonSidecarReader {
    async fn read(&self, file: &ScanFile) -> Result<Option<TagNode>, ReadError> {
        let path = self.sidecar_path(&file.path);
        debug!("Reading metadata sidecar {}", path.display());

        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| ReadError::Io {
                path: path.clone(),
                source,
            })?;

        let tree = TagNode::parse(&text).map_err(|source| ReadError::Malformed {
            path: path.clone(),
            source,
        })?;

        // Dump tools emitting one record per input wrap it in an array.
        Ok(match tree {
            Some(TagNode::Array(mut items)) if items.len() == 1 => items.pop(),
            other => other,
        })
    }
}
