//! DynamoDB storage implementation.

mod marshal;
mod record_store;

pub use record_store::DynamoRecordStore;
