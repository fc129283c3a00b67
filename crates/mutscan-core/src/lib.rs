pub mod config;
pub mod error;
pub mod health;
pub mod inventory;
pub mod metadata;
pub mod ranges;
pub mod report;

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::config::DiagnoseConfig;
use crate::health::diagnose::diagnose_with;
use crate::health::read::{read_artifact, write_repaired};
use crate::report::model::DiagnosisReport;

pub const TOOL_NAME: &str = "mutscan";

/// JSON schema version of diagnosis reports.
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Read and diagnose one file, writing a repaired copy into `repair_dir`
/// when one is given and the file is fixable.
///
/// Never fails: an unreadable file or a failed repair write is recorded in
/// the report's `error`.
pub fn diagnose_path(
    path: &Path,
    config: &DiagnoseConfig,
    repair_dir: Option<&Path>,
) -> DiagnosisReport {
    let path_str = path.display().to_string();

    let ctx = match read_artifact(path) {
        Ok(ctx) => ctx,
        Err(e) => {
            warn!("Cannot diagnose {}: {:#}", path_str, e);
            return DiagnosisReport::unreadable(path_str, format!("{e:#}"));
        }
    };
    let health = diagnose_with(&ctx.bytes, &ctx.declared_extension, config);

    let mut report = DiagnosisReport {
        path: path_str,
        artifact: Some(ctx.to_artifact()),
        health: None,
        repaired_path: None,
        error: None,
    };

    if let Some(dir) = repair_dir {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match write_repaired(dir, &name, &health) {
            Ok(written) => report.repaired_path = written.map(|p| p.display().to_string()),
            Err(e) => {
                warn!("Repair of {} failed: {:#}", report.path, e);
                report.error = Some(format!("{e:#}"));
            }
        }
    }

    report.health = Some(health);
    report
}

/// Diagnose every path in order; one report per path.
pub fn diagnose_paths(
    paths: &[PathBuf],
    config: &DiagnoseConfig,
    repair_dir: Option<&Path>,
) -> Vec<DiagnosisReport> {
    paths
        .iter()
        .map(|p| diagnose_path(p, config, repair_dir))
        .collect()
}
