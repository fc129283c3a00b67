use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// An input file queued for inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanFile {
    pub path: PathBuf,
    /// File name shown in progress and results.
    pub name: String,
    /// Folder the file belongs to, relative to the batch root.
    pub folder: String,
}

impl ScanFile {
    pub fn new(path: impl Into<PathBuf>, folder: impl Into<String>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Self {
            path,
            name,
            folder: folder.into(),
        }
    }

    /// Build a scan file whose folder is its parent directory relative to
    /// `root`, or the parent's own name when it is not under `root`.
    pub fn under_root(path: impl Into<PathBuf>, root: Option<&Path>) -> Self {
        let path = path.into();
        let parent = path.parent().unwrap_or_else(|| Path::new(""));

        let folder = match root.and_then(|r| parent.strip_prefix(r).ok()) {
            Some(rel) if rel.as_os_str().is_empty() => ".".to_string(),
            Some(rel) => rel.to_string_lossy().replace('\\', "/"),
            None => parent
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| ".".to_string()),
        };

        Self::new(path, folder)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum InventoryStatus {
    /// The golden key was found.
    Valid,
    /// Metadata present but no golden key.
    NoMatch,
    /// Metadata stripped or unreadable.
    Stripped,
}

impl std::fmt::Display for InventoryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            InventoryStatus::Valid => "valid",
            InventoryStatus::NoMatch => "no-match",
            InventoryStatus::Stripped => "stripped",
        })
    }
}

/// Inventory outcome for one input file. Emitted once, never revised.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InventoryResult {
    pub id: Option<String>,
    #[serde(rename = "file")]
    pub file_name: String,
    pub folder: String,
    pub source: String,
    pub status: InventoryStatus,
}

/// Inbound command for the scan worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ScanCommand {
    Start { files: Vec<ScanFile> },
}

/// Outbound event from the scan worker, in emission order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ScanEvent {
    Progress {
        /// 1-based count of files completed so far.
        current: usize,
        total: usize,
        filename: String,
    },
    Result(InventoryResult),
    Complete {
        #[serde(rename = "totalFiles")]
        total_files: usize,
    },
}

/// Lifecycle of the scan worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanState {
    Idle,
    Running,
    Complete,
}
