use crate::TOOL_NAME;
use crate::inventory::model::InventoryStatus;
use crate::inventory::summary::InventorySummary;
use crate::report::model::DiagnosisBatch;

pub fn render_diagnosis(batch: &DiagnosisBatch) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} {}\n", TOOL_NAME, batch.tool.version));

    for f in &batch.files {
        let path = &f.path;
        match &f.health {
            Some(h) => {
                out.push_str(&format!(
                    "{path}: {} (declared {}, detected {}{})\n",
                    h.status,
                    h.original_format,
                    h.detected_format,
                    if h.fixable { ", fixable" } else { "" }
                ));
                out.push_str(&format!("  {}\n", h.suggested_action));
            }
            None => out.push_str(&format!("{path}: unreadable\n")),
        }
        if let Some(repaired) = &f.repaired_path {
            out.push_str(&format!("  repaired copy: {repaired}\n"));
        }
        if let Some(error) = &f.error {
            out.push_str(&format!("  error: {error}\n"));
        }
    }
    out
}

pub fn render_inventory(summary: &InventorySummary) -> String {
    let mut out = String::new();

    for r in &summary.results {
        out.push_str(&format!(
            "{:<10} {:<12} {}/{} ({})\n",
            r.status.to_string(),
            r.id.as_deref().unwrap_or("-"),
            r.folder,
            r.file_name,
            r.source
        ));
    }

    out.push_str(&format!(
        "Files: {}  valid: {}  no-match: {}  stripped: {}\n",
        summary.total_files,
        summary.count(InventoryStatus::Valid),
        summary.count(InventoryStatus::NoMatch),
        summary.count(InventoryStatus::Stripped),
    ));
    if !summary.found_ranges.is_empty() {
        out.push_str(&format!("Found: {}\n", summary.found_ranges));
    }
    if !summary.missing_ranges.is_empty() {
        out.push_str(&format!("Missing: {}\n", summary.missing_ranges));
    }
    out
}
