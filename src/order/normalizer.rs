//! Checkout payload to order record conversion.

use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use super::clock::{format_sort_key, Clock};
use crate::storage::Record;

/// Turns a checkout payload into an order record with an assigned sort key.
#[derive(Clone)]
pub struct OrderNormalizer {
    sort_key: String,
    clock: Arc<dyn Clock>,
}

impl OrderNormalizer {
    pub fn new(sort_key: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            sort_key: sort_key.into(),
            clock,
        }
    }

    /// Copy the payload's fields and stamp the sort key with the current time.
    ///
    /// Any caller-supplied value under the sort key is overwritten. Absent,
    /// null or non-object payloads yield a record holding only the sort key;
    /// the partition key is left for the store to validate.
    pub fn normalize(&self, detail: Option<Value>) -> Record {
        let mut record = match detail {
            Some(Value::Object(fields)) => fields,
            None | Some(Value::Null) => Record::new(),
            Some(other) => {
                warn!(
                    kind = json_kind(&other),
                    "Checkout detail is not an object; discarding its content"
                );
                Record::new()
            }
        };

        let order_date = format_sort_key(self.clock.now());
        record.insert(self.sort_key.clone(), Value::String(order_date));
        record
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
