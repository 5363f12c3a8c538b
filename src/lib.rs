//! Ordering - serverless order service
//!
//! Persists checkout events as order records and serves order lookups.
//! One function entry point handles three trigger shapes: queue batches,
//! event-bus events and request/response calls.

pub mod config;
pub mod handlers;
pub mod invocation;
pub mod order;
pub mod storage;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::Config;
pub use handlers::{OrderError, OrderService, Outcome};
