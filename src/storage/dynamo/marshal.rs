//! Conversion between JSON records and DynamoDB attribute maps.
//!
//! Numbers travel as their decimal string form in both directions so no
//! precision is lost. Binary and set types only occur in items written by
//! other producers; they are read back as base64 strings and JSON arrays.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use base64::prelude::*;
use serde_json::{Number, Value};

use crate::storage::{Record, Result, StorageError};

/// Convert a record into a DynamoDB item.
pub fn to_item(record: Record) -> HashMap<String, AttributeValue> {
    record
        .into_iter()
        .map(|(name, value)| (name, to_attribute(value)))
        .collect()
}

/// Convert a DynamoDB item into a record.
pub fn from_item(item: HashMap<String, AttributeValue>) -> Result<Record> {
    item.into_iter()
        .map(|(name, attr)| from_attribute(attr).map(|value| (name, value)))
        .collect()
}

pub fn to_attribute(value: Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s),
        Value::Array(values) => AttributeValue::L(values.into_iter().map(to_attribute).collect()),
        Value::Object(map) => AttributeValue::M(to_item(map)),
    }
}

pub fn from_attribute(attr: AttributeValue) -> Result<Value> {
    let value = match attr {
        AttributeValue::S(s) => Value::String(s),
        AttributeValue::N(n) => Value::Number(parse_number(&n)?),
        AttributeValue::Bool(b) => Value::Bool(b),
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::L(values) => Value::Array(
            values
                .into_iter()
                .map(from_attribute)
                .collect::<Result<Vec<_>>>()?,
        ),
        AttributeValue::M(map) => Value::Object(from_item(map)?),
        AttributeValue::Ss(values) => Value::Array(values.into_iter().map(Value::String).collect()),
        AttributeValue::Ns(values) => Value::Array(
            values
                .iter()
                .map(|n| parse_number(n).map(Value::Number))
                .collect::<Result<Vec<_>>>()?,
        ),
        AttributeValue::B(blob) => Value::String(BASE64_STANDARD.encode(blob.as_ref())),
        AttributeValue::Bs(blobs) => Value::Array(
            blobs
                .iter()
                .map(|blob| Value::String(BASE64_STANDARD.encode(blob.as_ref())))
                .collect(),
        ),
        other => {
            return Err(StorageError::Marshal(format!(
                "unsupported attribute type: {other:?}"
            )))
        }
    };
    Ok(value)
}

fn parse_number(n: &str) -> Result<Number> {
    n.parse::<Number>()
        .map_err(|e| StorageError::Marshal(format!("invalid number '{n}': {e}")))
}
