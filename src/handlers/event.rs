//! Event-bus ingestion: one checkout event per invocation.

use std::sync::Arc;

use tracing::info;

use super::OrderError;
use crate::invocation::BusEvent;
use crate::order::OrderWriter;
use crate::storage::Record;

/// Handles checkout events delivered directly by the event bus.
pub struct DirectEventHandler {
    writer: Arc<OrderWriter>,
}

impl DirectEventHandler {
    pub fn new(writer: Arc<OrderWriter>) -> Self {
        Self { writer }
    }

    /// Store the event's detail as one order.
    #[tracing::instrument(name = "order.event", skip_all, fields(detail_type = %event.detail_type))]
    pub async fn handle(&self, event: BusEvent) -> Result<Record, OrderError> {
        info!(source = ?event.source, "Processing checkout event");
        Ok(self.writer.create(event.detail).await?)
    }
}
