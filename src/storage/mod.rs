//! Record storage.
//!
//! This module contains:
//! - `RecordStore` trait: put / query-by-key / scan over a keyed table
//! - `KeySchema`: partition and sort key attribute names
//! - Implementations: DynamoDB, Mock (in-memory)

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::info;

use crate::config::{StorageConfig, StorageType};

pub mod mock;

#[cfg(feature = "dynamo")]
pub mod dynamo;

pub use mock::MockRecordStore;

#[cfg(feature = "dynamo")]
pub use dynamo::DynamoRecordStore;

/// A stored item as plain field mappings.
pub type Record = Map<String, Value>;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Missing key attribute: {field}")]
    MissingKey { field: String },

    #[error("Key attribute '{field}' must be a non-empty string")]
    InvalidKey { field: String },

    #[error("Attribute conversion failed: {0}")]
    Marshal(String),

    #[error("DynamoDB error: {0}")]
    Dynamo(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Unknown storage type: {0}")]
    UnknownStorageType(String),
}

/// Partition and sort key attribute names for a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySchema {
    pub partition_key: String,
    pub sort_key: String,
}

impl KeySchema {
    pub fn new(partition_key: impl Into<String>, sort_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            sort_key: sort_key.into(),
        }
    }

    /// Extract the (partition, sort) key values from a record.
    ///
    /// Both must be present, string-typed and non-empty; the store rejects
    /// anything else before a write reaches the backend.
    pub fn key_of<'a>(&self, record: &'a Record) -> Result<(&'a str, &'a str)> {
        let partition = string_key(record, &self.partition_key)?;
        let sort = string_key(record, &self.sort_key)?;
        Ok((partition, sort))
    }
}

impl Default for KeySchema {
    fn default() -> Self {
        Self::new("userName", "orderDate")
    }
}

fn string_key<'a>(record: &'a Record, field: &str) -> Result<&'a str> {
    match record.get(field) {
        None | Some(Value::Null) => Err(StorageError::MissingKey {
            field: field.to_string(),
        }),
        Some(Value::String(s)) if !s.is_empty() => Ok(s),
        Some(_) => Err(StorageError::InvalidKey {
            field: field.to_string(),
        }),
    }
}

/// Interface for order persistence.
///
/// Implementations:
/// - `DynamoRecordStore`: AWS DynamoDB
/// - `MockRecordStore`: In-memory store for testing and local runs
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Upsert one item. An item with the same key pair is replaced.
    async fn put(&self, table: &str, record: Record) -> Result<()>;

    /// Return the items matching an exact (partition, sort) key pair.
    async fn query_by_key(
        &self,
        table: &str,
        partition_value: &str,
        sort_value: &str,
    ) -> Result<Vec<Record>>;

    /// Return every item in the table.
    async fn scan_all(&self, table: &str) -> Result<Vec<Record>>;

    /// Key attribute names this store was configured with.
    fn key_schema(&self) -> &KeySchema;
}

/// Initialize the record store based on configuration.
pub async fn init_storage(config: &StorageConfig) -> Result<Arc<dyn RecordStore>> {
    let schema = KeySchema::new(&config.partition_key, &config.sort_key);
    info!(
        storage_type = ?config.storage_type,
        table = %config.table_name,
        partition_key = %schema.partition_key,
        sort_key = %schema.sort_key,
        "Initializing record store"
    );

    match config.storage_type {
        StorageType::Memory => Ok(Arc::new(MockRecordStore::new(schema))),
        #[cfg(feature = "dynamo")]
        StorageType::Dynamo => {
            let store = DynamoRecordStore::connect(
                schema,
                config.dynamo.region.as_deref(),
                config.dynamo.endpoint_url.as_deref(),
            )
            .await;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "dynamo"))]
        StorageType::Dynamo => {
            tracing::error!("DynamoDB storage requested but 'dynamo' feature is not enabled");
            Err(StorageError::UnknownStorageType("dynamo".to_string()))
        }
    }
}
