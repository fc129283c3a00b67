use tracing::{debug, warn};

use crate::config::ScanConfig;
use crate::inventory::model::{InventoryResult, InventoryStatus, ScanFile};
use crate::metadata::hunt::{golden_key, hunt};
use crate::metadata::reader::MetadataReader;
use crate::metadata::tree::TagNode;

pub const SOURCE_MINIMAL_METADATA: &str = "Minimal Metadata";
pub const SOURCE_NO_GOLDEN_KEY: &str = "No XMP:DocumentNo";
pub const SOURCE_READ_ERROR: &str = "Read Error";

/// Folder reported for files whose metadata could not be read.
pub const UNKNOWN_FOLDER: &str = "unknown";

/// Classify one file from its metadata tree.
///
/// Only a golden-key finding becomes an identifier; numeric fallback
/// findings are never promoted.
pub fn classify(file: &ScanFile, tree: Option<&TagNode>, config: &ScanConfig) -> InventoryResult {
    let tag_count = tree.map(TagNode::top_level_len).unwrap_or(0);

    if tag_count < config.min_top_level_tags {
        return result(file, None, SOURCE_MINIMAL_METADATA, InventoryStatus::Stripped);
    }

    let findings = hunt(tree);
    match golden_key(&findings) {
        Some(found) => result(
            file,
            Some(found.number.clone()),
            &found.source,
            InventoryStatus::Valid,
        ),
        None => {
            debug!(
                file = %file.name,
                fallback = findings.len(),
                "no golden key; numeric findings not promoted"
            );
            result(file, None, SOURCE_NO_GOLDEN_KEY, InventoryStatus::NoMatch)
        }
    }
}

/// Read one file's metadata and classify it. Never fails: a read error
/// becomes a stripped result.
pub async fn inventory_file(
    reader: &dyn MetadataReader,
    file: &ScanFile,
    config: &ScanConfig,
) -> InventoryResult {
    match reader.read(file).await {
        Ok(tree) => classify(file, tree.as_ref(), config),
        Err(e) => {
            warn!("Metadata read failed for {}: {}", file.name, e);
            InventoryResult {
                id: None,
                file_name: file.name.clone(),
                folder: UNKNOWN_FOLDER.to_string(),
                source: SOURCE_READ_ERROR.to_string(),
                status: InventoryStatus::Stripped,
            }
        }
    }
}

fn result(
    file: &ScanFile,
    id: Option<String>,
    source: &str,
    status: InventoryStatus,
) -> InventoryResult {
    InventoryResult {
        id,
        file_name: file.name.clone(),
        folder: file.folder.clone(),
        source: source.to_string(),
        status,
    }
}
