use serde::{Deserialize, Serialize};

/// Export pipeline tuning (`[export]`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Rows returned by a preview when the request gives no limit.
    pub preview_limit: usize,
    /// Records per batch; cancellation is observed between batches.
    pub batch_size: usize,
    /// Maximum number of batches evaluated concurrently.
    pub parallelism: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            preview_limit: 20,
            batch_size: 512,
            parallelism: 4,
        }
    }
}
