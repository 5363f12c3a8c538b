//! order-service: Lambda entry point for the order service
//!
//! One function receives every trigger wired to it and lets `OrderService`
//! decide the path from the payload shape.
//!
//! ## Architecture
//! ```text
//! [SQS queue]     --(Records)-->      \
//! [EventBridge]   --(detail-type)-->   [order-service] --> [DynamoDB order table]
//! [API Gateway]   --(httpMethod)-->   /
//! ```
//!
//! ## Configuration
//! - ORDERING_CONFIG: Path to a config file (optional)
//! - ORDERING__*: Overrides for any config key
//! - DYNAMODB_TABLE_NAME / PRIMARY_KEY / SORT_KEY: Table and key names
//! - ORDERING_LOG / ORDERING_LOG_FORMAT: Log filter and output format

use std::sync::Arc;

use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use tracing::{info, info_span, Instrument};

use ordering::config::Config;
use ordering::handlers::{OrderService, Outcome};
use ordering::storage::init_storage;
use ordering::utils::bootstrap::init_tracing;

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    let config = Config::load(None)?;
    let store = init_storage(&config.storage).await?;
    let service = Arc::new(OrderService::new(store, &config));

    info!(table = %config.storage.table_name, "order-service started");

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let service = Arc::clone(&service);
        async move { handle(&service, event).await }
    }))
    .await
}

async fn handle(service: &OrderService, event: LambdaEvent<Value>) -> Result<Outcome, Error> {
    let (payload, context) = event.into_parts();
    let span = info_span!("lambda.invoke", request_id = %context.request_id);

    service
        .invoke(payload)
        .instrument(span)
        .await
        .map_err(Error::from)
}
