//! Trigger payload decoding.
//!
//! The function is wired to three triggers that do not announce themselves,
//! so the payload shape decides the path. Checks run in a fixed order and the
//! first match wins:
//!
//! 1. non-empty `Records` array: queue batch
//! 2. non-empty `detail-type` string: event-bus event
//! 3. anything else: request/response call

use aws_lambda_events::event::apigw::ApiGatewayProxyRequest;
use aws_lambda_events::event::eventbridge::EventBridgeEvent;
use serde::Deserialize;
use serde_json::Value;

/// A batch of queue messages.
///
/// Records stay undecoded here so that one malformed message fails on its own
/// in the batch handler instead of rejecting the whole batch.
#[derive(Debug, Clone, Deserialize)]
pub struct QueueBatch {
    #[serde(rename = "Records", alias = "records")]
    pub records: Vec<Value>,
}

/// The event a checkout publishes, as found inside a queue message body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutEnvelope {
    #[serde(default)]
    pub detail: Option<Value>,
}

/// An event delivered straight from the event bus. A missing or null
/// `detail` decodes to `None`.
pub type BusEvent = EventBridgeEvent<Option<Value>>;

/// A request/response call in API Gateway proxy form.
pub type ApiRequest = ApiGatewayProxyRequest;

/// Errors raised while classifying a trigger payload.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("Malformed {kind} payload: {source}")]
    Malformed {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unsupported route: payload matches no known trigger shape")]
    Unroutable(#[source] serde_json::Error),
}

/// A decoded trigger payload.
#[derive(Debug, Clone)]
pub enum Invocation {
    Batch(QueueBatch),
    Event(BusEvent),
    Request(ApiRequest),
}

impl Invocation {
    /// Decode a raw payload into the first trigger shape it matches.
    pub fn classify(payload: Value) -> Result<Self, RouteError> {
        if has_records(&payload) {
            return serde_json::from_value(payload)
                .map(Invocation::Batch)
                .map_err(|source| RouteError::Malformed {
                    kind: "queue batch",
                    source,
                });
        }

        if has_detail_type(&payload) {
            return serde_json::from_value(payload)
                .map(Invocation::Event)
                .map_err(|source| RouteError::Malformed {
                    kind: "bus event",
                    source,
                });
        }

        serde_json::from_value(payload)
            .map(Invocation::Request)
            .map_err(RouteError::Unroutable)
    }

    /// Short name of the path, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Invocation::Batch(_) => "batch",
            Invocation::Event(_) => "event",
            Invocation::Request(_) => "request",
        }
    }
}

fn has_records(payload: &Value) -> bool {
    payload
        .get("Records")
        .or_else(|| payload.get("records"))
        .and_then(Value::as_array)
        .is_some_and(|records| !records.is_empty())
}

fn has_detail_type(payload: &Value) -> bool {
    payload
        .get("detail-type")
        .and_then(Value::as_str)
        .is_some_and(|detail_type| !detail_type.is_empty())
}
