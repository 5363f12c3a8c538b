//! Invocation handlers.
//!
//! `OrderService` is the function entry point: it classifies the payload and
//! hands it to one of
//! - `BatchHandler`: queue batches (fire redelivery on failure)
//! - `DirectEventHandler`: single event-bus events (fire redelivery on failure)
//! - `QueryHandler`: request/response lookups (always answer with an envelope)

mod batch;
mod event;
mod query;

pub use batch::BatchHandler;
pub use event::DirectEventHandler;
pub use query::QueryHandler;

use std::sync::Arc;

use aws_lambda_events::event::sqs::SqsBatchResponse;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::invocation::{Invocation, RouteError};
use crate::order::{Clock, OrderWriter, SystemClock};
use crate::storage::{RecordStore, StorageError};
use crate::utils::response_builder::{self, ApiResponse};

/// Errors produced while handling an invocation.
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    /// A queue record, or its body, did not decode.
    #[error("Malformed message {message_id}: {reason}")]
    MalformedInput { message_id: String, reason: String },

    #[error(transparent)]
    Route(#[from] RouteError),

    #[error("Unsupported route: \"{method}\"")]
    UnsupportedOperation { method: String },

    #[error("Missing request parameter: {0}")]
    MissingParameter(String),

    #[error(transparent)]
    Store(#[from] StorageError),

    #[error("{failed} of {total} messages failed; first failure: {first}")]
    BatchFailed {
        failed: usize,
        total: usize,
        #[source]
        first: Box<OrderError>,
    },
}

/// What an invocation hands back to the runtime.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    /// Ingestion finished; serializes as `null`.
    Acknowledged,
    /// Some queue messages failed and should be redelivered individually.
    PartialBatch(SqsBatchResponse),
    /// Answer to a request/response call.
    Response(ApiResponse),
}

/// Routes each invocation to the matching handler.
pub struct OrderService {
    batch: BatchHandler,
    events: DirectEventHandler,
    query: QueryHandler,
}

impl OrderService {
    pub fn new(store: Arc<dyn RecordStore>, config: &Config) -> Self {
        Self::with_clock(store, config, Arc::new(SystemClock))
    }

    /// Build the service with a specific time source for sort keys.
    pub fn with_clock(store: Arc<dyn RecordStore>, config: &Config, clock: Arc<dyn Clock>) -> Self {
        let table = config.storage.table_name.clone();
        let writer = Arc::new(OrderWriter::new(Arc::clone(&store), table.clone(), clock));

        Self {
            batch: BatchHandler::new(
                Arc::clone(&writer),
                config.ingest.report_batch_item_failures,
            ),
            events: DirectEventHandler::new(writer),
            query: QueryHandler::new(store, table),
        }
    }

    /// Handle one raw trigger payload.
    ///
    /// Ingestion failures are returned as `Err` so the trigger redelivers.
    /// Request/response calls always yield `Ok(Outcome::Response(..))`.
    #[tracing::instrument(name = "order.invoke", skip_all)]
    pub async fn invoke(&self, payload: Value) -> Result<Outcome, OrderError> {
        debug!(payload = %payload, "Invocation received");

        let invocation = match Invocation::classify(payload) {
            Ok(invocation) => invocation,
            Err(e @ RouteError::Unroutable(_)) => {
                warn!(error = %e, "Payload matches no trigger shape");
                let e = OrderError::from(e);
                return Ok(Outcome::Response(response_builder::failure(&e)));
            }
            Err(e) => {
                error!(error = %e, "Malformed trigger payload");
                return Err(e.into());
            }
        };

        info!(path = invocation.kind(), "Routing invocation");

        match invocation {
            Invocation::Batch(batch) => {
                let response = self.batch.handle(batch).await?;
                if response.batch_item_failures.is_empty() {
                    Ok(Outcome::Acknowledged)
                } else {
                    Ok(Outcome::PartialBatch(response))
                }
            }
            Invocation::Event(event) => {
                self.events.handle(event).await?;
                Ok(Outcome::Acknowledged)
            }
            Invocation::Request(request) => Ok(Outcome::Response(self.query.handle(&request).await)),
        }
    }
}
