use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::inventory::model::{InventoryResult, InventoryStatus, ScanEvent};
use crate::ranges::{compress, compress_gaps};

/// Aggregate view of a finished inventory batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventorySummary {
    pub total_files: usize,
    pub counts: BTreeMap<String, usize>,
    /// Range notation of recovered mutation numbers.
    pub found_ranges: String,
    /// Range notation of numbers missing between the smallest and largest
    /// recovered ones.
    pub missing_ranges: String,
    pub results: Vec<InventoryResult>,
}

impl InventorySummary {
    pub fn from_results(results: Vec<InventoryResult>) -> Self {
        let mut counts = BTreeMap::new();
        for status in [
            InventoryStatus::Valid,
            InventoryStatus::NoMatch,
            InventoryStatus::Stripped,
        ] {
            counts.insert(status.to_string(), 0);
        }
        for r in &results {
            *counts.entry(r.status.to_string()).or_insert(0) += 1;
        }

        let ids = parse_ids(&results);

        Self {
            total_files: results.len(),
            counts,
            found_ranges: compress(&ids),
            missing_ranges: compress_gaps(&ids),
            results,
        }
    }

    /// Build a summary from a worker's event stream, keeping results only.
    pub fn from_events(events: &[ScanEvent]) -> Self {
        Self::from_results(
            events
                .iter()
                .filter_map(|e| match e {
                    ScanEvent::Result(r) => Some(r.clone()),
                    _ => None,
                })
                .collect(),
        )
    }

    pub fn count(&self, status: InventoryStatus) -> usize {
        self.counts.get(&status.to_string()).copied().unwrap_or(0)
    }
}

/// Numeric identifiers of valid results. Ids that are not plain integers
/// are skipped.
pub fn parse_ids(results: &[InventoryResult]) -> Vec<i64> {
    results
        .iter()
        .filter(|r| r.status == InventoryStatus::Valid)
        .filter_map(|r| r.id.as_deref())
        .filter_map(|id| id.trim().parse().ok())
        .collect()
}
