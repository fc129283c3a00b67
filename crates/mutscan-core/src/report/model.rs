use serde::{Deserialize, Serialize};

use crate::SCHEMA_VERSION;
use crate::health::model::{HealthReport, HealthStatus};

/// Tool metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
}

/// File metadata bound to a diagnosis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactInfo {
    pub path: Option<String>,
    pub size_bytes: u64,
    pub hash: ArtifactHash,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactHash {
    pub algorithm: String,
    pub value: String,
}

/// Diagnosis of one file.
///
/// A file that could not be read has no artifact or health block and
/// carries `error` instead. A failed repair write keeps the health block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosisReport {
    pub path: String,
    pub artifact: Option<ArtifactInfo>,
    pub health: Option<HealthReport>,
    /// Where the repaired copy was written, if it was.
    pub repaired_path: Option<String>,
    pub error: Option<String>,
}

impl DiagnosisReport {
    pub fn unreadable(path: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            artifact: None,
            health: None,
            repaired_path: None,
            error: Some(error.into()),
        }
    }

    /// Exit code for this file; any error counts as unrecoverable.
    pub fn exit_code(&self) -> i32 {
        match (&self.error, &self.health) {
            (None, Some(health)) => exit_code([health]),
            _ => 2,
        }
    }
}

/// Diagnoses of a set of files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosisBatch {
    pub schema_version: String,
    pub tool: ToolInfo,
    pub files: Vec<DiagnosisReport>,
    pub exit_code: i32,
}

impl DiagnosisBatch {
    pub fn new(tool: ToolInfo, files: Vec<DiagnosisReport>) -> Self {
        let exit_code = files
            .iter()
            .map(DiagnosisReport::exit_code)
            .max()
            .unwrap_or(0);
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            tool,
            files,
            exit_code,
        }
    }
}

/// CI-style exit code for a set of health reports:
///
/// - 0 → every file healthy
/// - 1 → at least one problem, all of them fixable
/// - 2 → at least one file that cannot be repaired
pub fn exit_code<'a>(reports: impl IntoIterator<Item = &'a HealthReport>) -> i32 {
    reports.into_iter().fold(0, |code, r| {
        let this = match (r.status, r.fixable) {
            (HealthStatus::Healthy, _) => 0,
            (_, true) => 1,
            (_, false) => 2,
        };
        code.max(this)
    })
}
