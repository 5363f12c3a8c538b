//! Queue batch ingestion.
//!
//! Every message in a batch is processed concurrently and independently; the
//! batch completes only after all of them have finished. Any failure fails the
//! invocation so the queue redelivers the batch, unless partial batch
//! responses are enabled, in which case only the failed message ids are
//! handed back.
//!
//! Records are decoded one at a time, so a record that does not decode fails
//! on its own like any other message.

use std::sync::Arc;

use aws_lambda_events::event::sqs::{BatchItemFailure, SqsBatchResponse, SqsMessage};
use futures::future::join_all;
use serde_json::Value;
use tracing::{error, info, warn};

use super::OrderError;
use crate::invocation::{CheckoutEnvelope, QueueBatch};
use crate::order::OrderWriter;
use crate::storage::Record;

/// Result of processing one message.
struct MessageOutcome {
    message_id: Option<String>,
    result: Result<Record, OrderError>,
}

/// Handles batches of queued checkout messages.
pub struct BatchHandler {
    writer: Arc<OrderWriter>,
    report_item_failures: bool,
}

impl BatchHandler {
    pub fn new(writer: Arc<OrderWriter>, report_item_failures: bool) -> Self {
        Self {
            writer,
            report_item_failures,
        }
    }

    /// Process every message in the batch.
    ///
    /// Returns an empty `SqsBatchResponse` when all messages were stored.
    #[tracing::instrument(name = "order.batch", skip_all, fields(size = batch.records.len()))]
    pub async fn handle(&self, batch: QueueBatch) -> Result<SqsBatchResponse, OrderError> {
        let total = batch.records.len();
        let outcomes = join_all(
            batch
                .records
                .into_iter()
                .enumerate()
                .map(|(index, message)| self.process(index, message)),
        )
        .await;

        let mut failures: Vec<(Option<String>, OrderError)> = outcomes
            .into_iter()
            .filter_map(|outcome| match outcome.result {
                Ok(_) => None,
                Err(e) => Some((outcome.message_id, e)),
            })
            .collect();

        if failures.is_empty() {
            info!(total, "Batch processed");
            return Ok(SqsBatchResponse::default());
        }

        let failed = failures.len();
        let reportable = failures.iter().all(|(id, _)| id.is_some());

        if self.report_item_failures && reportable {
            warn!(failed, total, "Batch partly failed; reporting failed items");
            return Ok(SqsBatchResponse {
                batch_item_failures: failures
                    .into_iter()
                    .filter_map(|(id, _)| id)
                    .map(|item_identifier| BatchItemFailure { item_identifier })
                    .collect(),
            });
        }

        if self.report_item_failures {
            warn!("Failed message without messageId cannot be reported individually");
        }

        let (_, first) = failures.swap_remove(0);
        Err(OrderError::BatchFailed {
            failed,
            total,
            first: Box::new(first),
        })
    }

    async fn process(&self, index: usize, record: Value) -> MessageOutcome {
        // Read the id before decoding so a malformed message can still be
        // reported individually.
        let message_id = record
            .get("messageId")
            .and_then(Value::as_str)
            .map(str::to_string);
        let label = message_id
            .clone()
            .unwrap_or_else(|| format!("#{index}"));
        let result = self.store_message(&label, record).await;

        if let Err(e) = &result {
            error!(message_id = %label, error = %e, "Failed to process queue message");
        }

        MessageOutcome { message_id, result }
    }

    async fn store_message(&self, label: &str, record: Value) -> Result<Record, OrderError> {
        let message: SqsMessage =
            serde_json::from_value(record).map_err(|e| OrderError::MalformedInput {
                message_id: label.to_string(),
                reason: e.to_string(),
            })?;

        let body = message.body.ok_or_else(|| OrderError::MalformedInput {
            message_id: label.to_string(),
            reason: "message has no body".to_string(),
        })?;

        let envelope: CheckoutEnvelope =
            serde_json::from_str(&body).map_err(|e| OrderError::MalformedInput {
                message_id: label.to_string(),
                reason: e.to_string(),
            })?;

        Ok(self.writer.create(envelope.detail).await?)
    }
}
