//! Response building for the request/response path.
//!
//! Every synchronous call gets an API Gateway proxy response whose body is a
//! JSON envelope: `{message, body}` on success (200) or
//! `{message, errorMsg, errorStack}` on failure (500).

use std::error::Error;

use aws_lambda_events::encodings::Body;
use aws_lambda_events::event::apigw::ApiGatewayProxyResponse;
use http::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::{json, Value};

/// Message used for every failure envelope.
pub const FAILURE_MESSAGE: &str = "Failed to perform operation.";

/// API Gateway proxy integration response.
pub type ApiResponse = ApiGatewayProxyResponse;

/// Accessors for responses built here.
pub trait ApiResponseExt {
    fn is_success(&self) -> bool;

    /// Decode the body back into an envelope.
    fn envelope(&self) -> serde_json::Result<Envelope>;
}

impl ApiResponseExt for ApiResponse {
    fn is_success(&self) -> bool {
        self.status_code == 200
    }

    fn envelope(&self) -> serde_json::Result<Envelope> {
        match &self.body {
            Some(Body::Text(text)) => serde_json::from_str(text),
            Some(Body::Binary(bytes)) => serde_json::from_slice(bytes),
            _ => serde_json::from_str(""),
        }
    }
}

fn json_response(status_code: i64, envelope: Value) -> ApiResponse {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    ApiResponse {
        status_code,
        headers,
        body: Some(Body::Text(envelope.to_string())),
        ..ApiResponse::default()
    }
}

/// Decoded response body.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Envelope {
    Failure {
        message: String,
        #[serde(rename = "errorMsg")]
        error_msg: String,
        #[serde(rename = "errorStack")]
        error_stack: String,
    },
    Success {
        message: String,
        body: Value,
    },
}

/// Builds a 200 response for a completed operation.
pub fn success(method: &str, body: Value) -> ApiResponse {
    json_response(
        200,
        json!({
            "message": format!("Successfully finished operation: \"{method}\""),
            "body": body,
        }),
    )
}

/// Builds a 500 response carrying the error and its cause chain.
pub fn failure(err: &(dyn Error + 'static)) -> ApiResponse {
    json_response(
        500,
        json!({
            "message": FAILURE_MESSAGE,
            "errorMsg": err.to_string(),
            "errorStack": error_stack(err),
        }),
    )
}

/// Renders an error and its sources, one per line.
pub fn error_stack(err: &(dyn Error + 'static)) -> String {
    let mut lines = vec![err.to_string()];
    let mut source = err.source();
    while let Some(cause) = source {
        lines.push(format!("caused by: {cause}"));
        source = cause.source();
    }
    lines.join("\n")
}
