/// Tuning knobs for the format diagnostician.
#[derive(Debug, Clone)]
pub struct DiagnoseConfig {
    /// Number of leading bytes searched for a known signature.
    pub scan_window_bytes: usize,
}

impl Default for DiagnoseConfig {
    fn default() -> Self {
        // Magic bytes always sit near the head; garbage prefixes longer
        // than this are treated as unrecoverable.
        Self {
            scan_window_bytes: 4096,
        }
    }
}

/// Tuning knobs for the batch scan orchestrator.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Files whose metadata has fewer top-level tags than this are
    /// classified as stripped without searching.
    pub min_top_level_tags: usize,

    /// Capacity of the outbound event channel.
    pub channel_capacity: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            min_top_level_tags: 2,
            channel_capacity: 64,
        }
    }
}
