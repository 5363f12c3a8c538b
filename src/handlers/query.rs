//! Order lookups over the request/response path.
//!
//! - `GET /order/{userName}?orderDate=...` returns the matching order (as a list)
//! - `GET /order` returns every order in the table
//!
//! Any path parameter selects a point lookup; the bulk listing only runs
//! when the request carries none.

use std::sync::Arc;

use http::Method;
use serde_json::Value;
use tracing::{debug, error, info};

use super::OrderError;
use crate::invocation::ApiRequest;
use crate::storage::{Record, RecordStore};
use crate::utils::response_builder::{self, ApiResponse};

/// Serves point and bulk order lookups.
pub struct QueryHandler {
    store: Arc<dyn RecordStore>,
    table: String,
}

impl QueryHandler {
    pub fn new(store: Arc<dyn RecordStore>, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
        }
    }

    /// Answer a request. Never fails: errors become a 500 response.
    #[tracing::instrument(name = "order.query", skip_all, fields(method = %request.http_method))]
    pub async fn handle(&self, request: &ApiRequest) -> ApiResponse {
        match self.execute(request).await {
            Ok(body) => {
                response_builder::success(request.http_method.as_str(), body)
            }
            Err(e) => {
                error!(error = %e, "Request failed");
                response_builder::failure(&e)
            }
        }
    }

    /// Run the lookup a request asks for.
    pub async fn execute(&self, request: &ApiRequest) -> Result<Value, OrderError> {
        if request.http_method != Method::GET {
            return Err(OrderError::UnsupportedOperation {
                method: request.http_method.as_str().to_string(),
            });
        }

        let records = if request.path_parameters.is_empty() {
            self.get_all_orders().await?
        } else {
            let schema = self.store.key_schema();
            let partition_value = request
                .path_parameters
                .get(&schema.partition_key)
                .ok_or_else(|| OrderError::MissingParameter(schema.partition_key.clone()))?;
            let sort_value = request
                .query_string_parameters
                .first(&schema.sort_key)
                .ok_or_else(|| OrderError::MissingParameter(schema.sort_key.clone()))?;
            self.get_order(partition_value, sort_value).await?
        };

        Ok(Value::Array(records.into_iter().map(Value::Object).collect()))
    }

    async fn get_order(&self, partition_value: &str, sort_value: &str) -> Result<Vec<Record>, OrderError> {
        debug!(partition = %partition_value, sort = %sort_value, "Point lookup");
        let records = self
            .store
            .query_by_key(&self.table, partition_value, sort_value)
            .await?;
        info!(count = records.len(), "Order lookup finished");
        Ok(records)
    }

    async fn get_all_orders(&self) -> Result<Vec<Record>, OrderError> {
        debug!("Full table scan");
        let records = self.store.scan_all(&self.table).await?;
        info!(count = records.len(), "Order listing finished");
        Ok(records)
    }
}
