//! Order creation shared by the queue and event-bus paths.
//!
//! Both ingestion paths end in `OrderWriter::create`: normalize the checkout
//! detail, then put it into the order table.

mod clock;
mod normalizer;

pub use clock::{format_sort_key, Clock, SystemClock};
pub use normalizer::OrderNormalizer;

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info};

use crate::storage::{Record, RecordStore, Result};

/// Normalizes checkout payloads and persists them as order records.
pub struct OrderWriter {
    store: Arc<dyn RecordStore>,
    normalizer: OrderNormalizer,
    table: String,
}

impl OrderWriter {
    /// Build a writer whose sort key attribute follows the store's key schema.
    pub fn new(store: Arc<dyn RecordStore>, table: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        let normalizer = OrderNormalizer::new(store.key_schema().sort_key.clone(), clock);
        Self {
            store,
            normalizer,
            table: table.into(),
        }
    }

    /// Create one order from a checkout detail and return the stored record.
    ///
    /// Store faults are logged and returned unchanged so the caller's trigger
    /// can redeliver.
    #[tracing::instrument(name = "order.create", skip_all, fields(table = %self.table))]
    pub async fn create(&self, detail: Option<Value>) -> Result<Record> {
        let record = self.normalizer.normalize(detail);
        let schema = self.store.key_schema();
        let user = record
            .get(&schema.partition_key)
            .and_then(Value::as_str)
            .unwrap_or("<missing>")
            .to_string();
        let order_date = record
            .get(&schema.sort_key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        debug!(record = ?record, "Normalized order");

        match self.store.put(&self.table, record.clone()).await {
            Ok(()) => {
                info!(user = %user, order_date = %order_date, "Order created");
                Ok(record)
            }
            Err(e) => {
                error!(user = %user, order_date = %order_date, error = %e, "Failed to store order");
                Err(e)
            }
        }
    }
}
