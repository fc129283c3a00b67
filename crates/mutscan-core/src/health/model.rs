use serde::{Deserialize, Serialize};

/// Outcome of a format diagnosis.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Corrupt,
    Mislabeled,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Corrupt => "corrupt",
            HealthStatus::Mislabeled => "mislabeled",
        };
        f.write_str(s)
    }
}

/// Diagnosis of one file's binary content against its declared format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: HealthStatus,
    /// Extension of the matched signature, or `Unknown/Garbage`.
    pub detected_format: String,
    /// Normalized declared extension.
    pub original_format: String,
    pub detected_mime: Option<String>,
    /// Byte offset at which the signature was found.
    pub offset: Option<usize>,
    pub fixable: bool,
    pub suggested_action: String,
    /// Recovered content when the repair is mechanical.
    #[serde(skip)]
    pub repaired_bytes: Option<Vec<u8>>,
}
