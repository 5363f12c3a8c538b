//! OrderService interface step definitions.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta};
use cucumber::{given, then, when, World};
use serde_json::{json, Value};

use ordering::config::Config;
use ordering::handlers::{OrderService, Outcome};
use ordering::storage::{KeySchema, MockRecordStore, RecordStore};
use ordering::test_utils::SteppingClock;
use ordering::utils::response_builder::{ApiResponse, ApiResponseExt, Envelope};

/// Test context for OrderService scenarios.
#[derive(World)]
#[world(init = Self::new)]
pub struct OrderServiceWorld {
    config: Config,
    store: Arc<MockRecordStore>,
    service: OrderService,
    pending_messages: Vec<Value>,
    captured_dates: HashMap<String, String>,
    last_outcome: Option<Outcome>,
    last_error: Option<String>,
}

impl fmt::Debug for OrderServiceWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderServiceWorld")
            .field("pending_messages", &self.pending_messages.len())
            .field("last_outcome", &self.last_outcome)
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}

impl OrderServiceWorld {
    fn new() -> Self {
        let config = Config::for_test();
        let store = Arc::new(MockRecordStore::new(KeySchema::default()));
        let service = Self::build_service(&store, &config);
        Self {
            config,
            store,
            service,
            pending_messages: Vec::new(),
            captured_dates: HashMap::new(),
            last_outcome: None,
            last_error: None,
        }
    }

    fn build_service(store: &Arc<MockRecordStore>, config: &Config) -> OrderService {
        let start = DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp");
        let clock = Arc::new(SteppingClock::new(start, TimeDelta::milliseconds(1)));
        OrderService::with_clock(store.clone(), config, clock)
    }

    async fn invoke(&mut self, payload: Value) {
        match self.service.invoke(payload).await {
            Ok(outcome) => {
                self.last_outcome = Some(outcome);
                self.last_error = None;
            }
            Err(e) => {
                self.last_outcome = None;
                self.last_error = Some(e.to_string());
            }
        }
    }

    fn response(&self) -> &ApiResponse {
        match &self.last_outcome {
            Some(Outcome::Response(response)) => response,
            other => panic!("Expected a response, got {:?}", other),
        }
    }

    async fn orders_for(&self, user: &str) -> Vec<Value> {
        self.store
            .scan_all(&self.config.storage.table_name)
            .await
            .expect("scan should succeed")
            .into_iter()
            .filter(|record| record.get("userName") == Some(&json!(user)))
            .map(Value::Object)
            .collect()
    }
}

// --- Background ---

#[given("an order service backed by an in-memory store")]
async fn given_order_service(world: &mut OrderServiceWorld) {
    assert_eq!(world.store.stored_count("order").await, 0);
}

// --- Given steps ---

#[given("partial batch responses are enabled")]
async fn given_partial_batch_responses(world: &mut OrderServiceWorld) {
    world.config.ingest.report_batch_item_failures = true;
    world.service = OrderServiceWorld::build_service(&world.store, &world.config);
}

#[given(expr = "the store rejects orders for {string}")]
async fn given_store_rejects(world: &mut OrderServiceWorld, user: String) {
    world.store.fail_puts_for(user).await;
}

#[given(expr = "a queue message {string} with a checkout for {string}")]
async fn given_queue_message(world: &mut OrderServiceWorld, message_id: String, user: String) {
    let body = json!({"detail": {"userName": user, "totalPrice": 25}});
    world.pending_messages.push(json!({
        "messageId": message_id,
        "body": body.to_string(),
    }));
}

#[given(expr = "a queue message {string} with body {string}")]
async fn given_queue_message_body(world: &mut OrderServiceWorld, message_id: String, body: String) {
    world.pending_messages.push(json!({
        "messageId": message_id,
        "body": body,
    }));
}

#[given(expr = "a queue message {string} with a numeric body")]
async fn given_queue_message_numeric_body(world: &mut OrderServiceWorld, message_id: String) {
    world.pending_messages.push(json!({
        "messageId": message_id,
        "body": 42,
    }));
}

// --- When steps ---

#[when("the batch is delivered")]
async fn when_batch_delivered(world: &mut OrderServiceWorld) {
    let batch = json!({ "Records": world.pending_messages.clone() });
    world.invoke(batch).await;
}

#[when("the batch is delivered again")]
async fn when_batch_redelivered(world: &mut OrderServiceWorld) {
    when_batch_delivered(world).await;
}

#[when(expr = "a checkout event for {string} is published")]
async fn when_event_published(world: &mut OrderServiceWorld, user: String) {
    let event = json!({
        "detail-type": "CheckoutBasket",
        "source": "com.swn.basket.checkoutbasket",
        "detail": {"userName": user, "totalPrice": 40},
    });
    world.invoke(event).await;

    let latest = world
        .orders_for(&user)
        .await
        .iter()
        .filter_map(|order| order["orderDate"].as_str().map(str::to_string))
        .max();
    if let Some(order_date) = latest {
        world.captured_dates.insert(user, order_date);
    }
}

#[when(expr = "the client requests the order for {string} at the captured date")]
async fn when_request_order(world: &mut OrderServiceWorld, user: String) {
    let order_date = world
        .captured_dates
        .get(&user)
        .cloned()
        .expect("No order date captured for user");
    let request = json!({
        "httpMethod": "GET",
        "path": format!("/order/{user}"),
        "pathParameters": {"userName": user},
        "queryStringParameters": {"orderDate": order_date},
    });
    world.invoke(request).await;
}

#[when(expr = "the client requests the order for {string} without a date")]
async fn when_request_order_without_date(world: &mut OrderServiceWorld, user: String) {
    let request = json!({
        "httpMethod": "GET",
        "pathParameters": {"userName": user},
    });
    world.invoke(request).await;
}

#[when("the client requests all orders")]
async fn when_request_all(world: &mut OrderServiceWorld) {
    world
        .invoke(json!({"httpMethod": "GET", "path": "/order"}))
        .await;
}

#[when(expr = "the client sends a {string} request")]
async fn when_client_sends(world: &mut OrderServiceWorld, method: String) {
    world
        .invoke(json!({"httpMethod": method, "path": "/order"}))
        .await;
}

// --- Then steps ---

#[then("the invocation succeeds")]
async fn then_invocation_succeeds(world: &mut OrderServiceWorld) {
    assert!(
        world.last_error.is_none(),
        "Expected success, got error: {:?}",
        world.last_error
    );
}

#[then("the invocation fails")]
async fn then_invocation_fails(world: &mut OrderServiceWorld) {
    assert!(world.last_error.is_some(), "Expected the invocation to fail");
}

#[then(expr = "{int} orders are stored")]
async fn then_orders_stored(world: &mut OrderServiceWorld, count: usize) {
    assert_eq!(world.store.stored_count("order").await, count);
}

#[then(expr = "{int} orders are stored for {string}")]
async fn then_orders_stored_for(world: &mut OrderServiceWorld, count: usize, user: String) {
    assert_eq!(world.orders_for(&user).await.len(), count);
}

#[then(expr = "the response status is {int}")]
async fn then_response_status(world: &mut OrderServiceWorld, status: i64) {
    assert_eq!(world.response().status_code, status);
}

#[then(expr = "the response body lists {int} order(s)")]
async fn then_response_lists(world: &mut OrderServiceWorld, count: usize) {
    match world.response().envelope().expect("Envelope should decode") {
        Envelope::Success { body, .. } => {
            assert_eq!(body.as_array().map(Vec::len), Some(count));
        }
        failure => panic!("Expected success envelope, got {:?}", failure),
    }
}

#[then(expr = "the error message mentions {string}")]
async fn then_error_mentions(world: &mut OrderServiceWorld, text: String) {
    let message = match (&world.last_error, &world.last_outcome) {
        (Some(error), _) => error.clone(),
        (None, Some(Outcome::Response(response))) => {
            match response.envelope().expect("Envelope should decode") {
                Envelope::Failure { error_msg, .. } => error_msg,
                success => panic!("Expected failure envelope, got {:?}", success),
            }
        }
        other => panic!("No error to inspect: {:?}", other),
    };
    assert!(
        message.contains(&text),
        "Expected '{}' in error message '{}'",
        text,
        message
    );
}

#[then(expr = "the failed items are {string}")]
async fn then_failed_items(world: &mut OrderServiceWorld, ids: String) {
    let expected: Vec<&str> = ids.split(',').map(str::trim).collect();
    match &world.last_outcome {
        Some(Outcome::PartialBatch(response)) => {
            let actual: Vec<&str> = response
                .batch_item_failures
                .iter()
                .map(|failure| failure.item_identifier.as_str())
                .collect();
            assert_eq!(actual, expected);
        }
        other => panic!("Expected a partial batch response, got {:?}", other),
    }
}
