//! Mock record store for testing and local runs.
//!
//! Keeps items per table keyed by (partition, sort) value, so puts with an
//! existing key pair overwrite the earlier item the way DynamoDB does.

use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{KeySchema, Record, RecordStore, Result, StorageError};

/// Key type for stored items: (partition value, sort value).
type ItemKey = (String, String);

/// Mock record store that keeps items in memory.
#[derive(Default)]
pub struct MockRecordStore {
    schema: KeySchema,
    tables: RwLock<HashMap<String, BTreeMap<ItemKey, Record>>>,
    fail_on_put: RwLock<bool>,
    fail_on_read: RwLock<bool>,
    fail_partitions: RwLock<HashSet<String>>,
    put_attempts: RwLock<usize>,
}

impl MockRecordStore {
    pub fn new(schema: KeySchema) -> Self {
        Self {
            schema,
            ..Self::default()
        }
    }

    pub async fn set_fail_on_put(&self, fail: bool) {
        *self.fail_on_put.write().await = fail;
    }

    pub async fn set_fail_on_read(&self, fail: bool) {
        *self.fail_on_read.write().await = fail;
    }

    /// Fail every put whose partition value equals `partition_value`.
    pub async fn fail_puts_for(&self, partition_value: impl Into<String>) {
        self.fail_partitions
            .write()
            .await
            .insert(partition_value.into());
    }

    /// Number of put calls received, including rejected ones.
    pub async fn put_attempts(&self) -> usize {
        *self.put_attempts.read().await
    }

    /// Number of items currently stored in a table.
    pub async fn stored_count(&self, table: &str) -> usize {
        self.tables
            .read()
            .await
            .get(table)
            .map(BTreeMap::len)
            .unwrap_or(0)
    }
}

#[async_trait]
impl RecordStore for MockRecordStore {
    async fn put(&self, table: &str, record: Record) -> Result<()> {
        *self.put_attempts.write().await += 1;

        if *self.fail_on_put.read().await {
            return Err(StorageError::Unavailable(format!(
                "put rejected for table {table}"
            )));
        }

        let (partition, sort) = self.schema.key_of(&record)?;
        if self.fail_partitions.read().await.contains(partition) {
            return Err(StorageError::Unavailable(format!(
                "put rejected for partition {partition}"
            )));
        }

        let key = (partition.to_string(), sort.to_string());
        self.tables
            .write()
            .await
            .entry(table.to_string())
            .or_default()
            .insert(key, record);
        Ok(())
    }

    async fn query_by_key(
        &self,
        table: &str,
        partition_value: &str,
        sort_value: &str,
    ) -> Result<Vec<Record>> {
        if *self.fail_on_read.read().await {
            return Err(StorageError::Unavailable(format!(
                "query rejected for table {table}"
            )));
        }

        let key = (partition_value.to_string(), sort_value.to_string());
        let tables = self.tables.read().await;
        Ok(tables
            .get(table)
            .and_then(|items| items.get(&key))
            .cloned()
            .into_iter()
            .collect())
    }

    async fn scan_all(&self, table: &str) -> Result<Vec<Record>> {
        if *self.fail_on_read.read().await {
            return Err(StorageError::Unavailable(format!(
                "scan rejected for table {table}"
            )));
        }

        let tables = self.tables.read().await;
        Ok(tables
            .get(table)
            .map(|items| items.values().cloned().collect())
            .unwrap_or_default())
    }

    fn key_schema(&self) -> &KeySchema {
        &self.schema
    }
}
