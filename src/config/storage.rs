//! Storage configuration types.

use serde::Deserialize;

/// Storage type discriminator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    /// AWS DynamoDB.
    #[default]
    Dynamo,
    /// In-process map, for local runs and tests.
    Memory,
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Storage type discriminator.
    #[serde(rename = "type")]
    pub storage_type: StorageType,
    /// Table holding order records.
    pub table_name: String,
    /// Partition key attribute name.
    pub partition_key: String,
    /// Sort key attribute name.
    pub sort_key: String,
    /// DynamoDB-specific configuration.
    pub dynamo: DynamoConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            storage_type: StorageType::Dynamo,
            table_name: "order".to_string(),
            partition_key: "userName".to_string(),
            sort_key: "orderDate".to_string(),
            dynamo: DynamoConfig::default(),
        }
    }
}

/// DynamoDB-specific configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DynamoConfig {
    /// Custom endpoint URL (for LocalStack or testing).
    pub endpoint_url: Option<String>,
    /// AWS region. Uses the default provider chain if not set.
    pub region: Option<String>,
}
