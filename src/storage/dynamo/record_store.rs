//! DynamoDB RecordStore implementation.
//!
//! Table schema:
//! - partition key: configured attribute (String), `userName` for orders
//! - sort key: configured attribute (String), `orderDate` for orders

use std::collections::HashMap;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use tracing::{debug, info};

use super::marshal::{from_item, to_item};
use crate::storage::{KeySchema, Record, RecordStore, Result, StorageError};

/// DynamoDB implementation of RecordStore.
pub struct DynamoRecordStore {
    client: Client,
    schema: KeySchema,
}

impl DynamoRecordStore {
    /// Wrap an existing client.
    pub fn new(client: Client, schema: KeySchema) -> Self {
        Self { client, schema }
    }

    /// Build a client from the default AWS provider chain.
    ///
    /// `region` overrides the chain's region; `endpoint_url` points the client
    /// at LocalStack or another emulator.
    pub async fn connect(
        schema: KeySchema,
        region: Option<&str>,
        endpoint_url: Option<&str>,
    ) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());

        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region.to_string()));
        }

        if let Some(endpoint) = endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }

        let sdk_config = loader.load().await;

        info!(
            region = ?region,
            endpoint = ?endpoint_url,
            "Connected to DynamoDB"
        );

        Self::new(Client::new(&sdk_config), schema)
    }

    fn items_to_records(items: Option<Vec<HashMap<String, AttributeValue>>>) -> Result<Vec<Record>> {
        items
            .unwrap_or_default()
            .into_iter()
            .map(from_item)
            .collect()
    }
}

#[async_trait]
impl RecordStore for DynamoRecordStore {
    async fn put(&self, table: &str, record: Record) -> Result<()> {
        let (partition, sort) = self.schema.key_of(&record)?;
        let (partition, sort) = (partition.to_string(), sort.to_string());

        self.client
            .put_item()
            .table_name(table)
            .set_item(Some(to_item(record)))
            .send()
            .await
            .map_err(|e| {
                StorageError::Dynamo(format!("put_item failed: {}", DisplayErrorContext(&e)))
            })?;

        debug!(
            table = %table,
            partition = %partition,
            sort = %sort,
            "Stored item in DynamoDB"
        );

        Ok(())
    }

    async fn query_by_key(
        &self,
        table: &str,
        partition_value: &str,
        sort_value: &str,
    ) -> Result<Vec<Record>> {
        let output = self
            .client
            .query()
            .table_name(table)
            .key_condition_expression("#pk = :pk AND #sk = :sk")
            .expression_attribute_names("#pk", &self.schema.partition_key)
            .expression_attribute_names("#sk", &self.schema.sort_key)
            .expression_attribute_values(":pk", AttributeValue::S(partition_value.to_string()))
            .expression_attribute_values(":sk", AttributeValue::S(sort_value.to_string()))
            .send()
            .await
            .map_err(|e| {
                StorageError::Dynamo(format!("query failed: {}", DisplayErrorContext(&e)))
            })?;

        let records = Self::items_to_records(output.items)?;
        debug!(
            table = %table,
            partition = %partition_value,
            sort = %sort_value,
            count = records.len(),
            "Queried DynamoDB by key"
        );
        Ok(records)
    }

    async fn scan_all(&self, table: &str) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        let mut start_key: Option<HashMap<String, AttributeValue>> = None;
        let mut pages = 0usize;

        // A single scan call stops at 1 MB; keep following the continuation
        // key so callers always see the whole table.
        loop {
            let output = self
                .client
                .scan()
                .table_name(table)
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|e| {
                    StorageError::Dynamo(format!("scan failed: {}", DisplayErrorContext(&e)))
                })?;

            pages += 1;
            records.extend(Self::items_to_records(output.items)?);

            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        debug!(table = %table, pages, count = records.len(), "Scanned DynamoDB table");
        Ok(records)
    }

    fn key_schema(&self) -> &KeySchema {
        &self.schema
    }
}
