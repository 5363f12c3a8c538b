//! Ingestion configuration types.

use serde::Deserialize;

/// Queue ingestion configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Answer partly failed batches with `batchItemFailures` instead of
    /// failing the invocation. Requires `ReportBatchItemFailures` on the
    /// event source mapping.
    /// Default: false
    pub report_batch_item_failures: bool,
}
