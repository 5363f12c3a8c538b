//! RecordStore interface tests.
//!
//! These tests verify the contract of the RecordStore trait for a store
//! using the default `userName` / `orderDate` key schema. Every test writes
//! under its own partition value so implementations may share a table.

use ordering::storage::{Record, RecordStore, StorageError};
use serde_json::{json, Value};

fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("test record must be an object, got {other}"),
    }
}

// =============================================================================
// RecordStore::put / query_by_key tests
// =============================================================================

pub async fn test_query_nonexistent<S: RecordStore>(store: &S, table: &str) {
    let result = store
        .query_by_key(table, "test_nobody", "2024-01-01T00:00:00.000Z")
        .await
        .expect("query should succeed");
    assert!(result.is_empty(), "nonexistent key should yield no records");
}

pub async fn test_put_and_query<S: RecordStore>(store: &S, table: &str) {
    let order = record(json!({
        "userName": "test_put_query",
        "orderDate": "2024-01-01T10:00:00.000Z",
        "totalPrice": 42.5,
        "quantity": 3,
        "express": true,
        "coupon": null,
        "items": [
            {"productId": "p-1", "price": 10},
            {"productId": "p-2", "price": 32.5}
        ],
        "address": {"city": "Ankara", "zip": "06000"}
    }));

    store
        .put(table, order.clone())
        .await
        .expect("put should succeed");

    let result = store
        .query_by_key(table, "test_put_query", "2024-01-01T10:00:00.000Z")
        .await
        .expect("query should succeed");

    assert_eq!(result, vec![order], "should return the stored record unchanged");
}

pub async fn test_put_overwrites_same_key<S: RecordStore>(store: &S, table: &str) {
    let key_date = "2024-01-02T10:00:00.000Z";
    let first = record(json!({"userName": "test_overwrite", "orderDate": key_date, "totalPrice": 1}));
    let second = record(json!({"userName": "test_overwrite", "orderDate": key_date, "totalPrice": 2}));

    store.put(table, first).await.unwrap();
    store.put(table, second.clone()).await.unwrap();

    let result = store
        .query_by_key(table, "test_overwrite", key_date)
        .await
        .unwrap();
    assert_eq!(result, vec![second], "later put should replace the earlier item");
}

pub async fn test_distinct_sort_keys_coexist<S: RecordStore>(store: &S, table: &str) {
    let user = "test_distinct_sort";
    for date in ["2024-01-03T10:00:00.000Z", "2024-01-03T10:00:00.001Z"] {
        store
            .put(table, record(json!({"userName": user, "orderDate": date})))
            .await
            .unwrap();
    }

    for date in ["2024-01-03T10:00:00.000Z", "2024-01-03T10:00:00.001Z"] {
        let result = store.query_by_key(table, user, date).await.unwrap();
        assert_eq!(result.len(), 1, "order at {date} should exist");
    }
}

pub async fn test_put_missing_partition_key<S: RecordStore>(store: &S, table: &str) {
    let result = store
        .put(table, record(json!({"orderDate": "2024-01-04T10:00:00.000Z"})))
        .await;
    assert!(
        matches!(result, Err(StorageError::MissingKey { ref field }) if field == "userName"),
        "put without partition key should be rejected, got {result:?}"
    );
}

pub async fn test_put_non_string_key<S: RecordStore>(store: &S, table: &str) {
    let result = store
        .put(
            table,
            record(json!({"userName": 7, "orderDate": "2024-01-05T10:00:00.000Z"})),
        )
        .await;
    assert!(
        matches!(result, Err(StorageError::InvalidKey { ref field }) if field == "userName"),
        "put with numeric partition key should be rejected, got {result:?}"
    );
}

// =============================================================================
// RecordStore::scan_all tests
// =============================================================================

pub async fn test_scan_returns_every_record<S: RecordStore>(store: &S, table: &str) {
    let users = ["test_scan_a", "test_scan_b", "test_scan_c"];
    for (i, user) in users.iter().enumerate() {
        store
            .put(
                table,
                record(json!({"userName": user, "orderDate": format!("2024-01-06T10:00:00.00{i}Z")})),
            )
            .await
            .unwrap();
    }

    let scanned = store.scan_all(table).await.expect("scan should succeed");
    let mut found: Vec<&str> = scanned
        .iter()
        .filter_map(|r| r.get("userName").and_then(Value::as_str))
        .filter(|user| user.starts_with("test_scan_"))
        .collect();
    found.sort_unstable();

    assert_eq!(found, users, "scan should include every stored record");
}

// =============================================================================
// Test runner macro
// =============================================================================

/// Run all RecordStore interface tests against a store implementation.
#[macro_export]
macro_rules! run_record_store_tests {
    ($store:expr, $table:expr) => {
        use $crate::storage::record_store_tests::*;

        test_query_nonexistent($store, $table).await;
        println!("  test_query_nonexistent: PASSED");

        test_put_and_query($store, $table).await;
        println!("  test_put_and_query: PASSED");

        test_put_overwrites_same_key($store, $table).await;
        println!("  test_put_overwrites_same_key: PASSED");

        test_distinct_sort_keys_coexist($store, $table).await;
        println!("  test_distinct_sort_keys_coexist: PASSED");

        test_put_missing_partition_key($store, $table).await;
        println!("  test_put_missing_partition_key: PASSED");

        test_put_non_string_key($store, $table).await;
        println!("  test_put_non_string_key: PASSED");

        test_scan_returns_every_record($store, $table).await;
        println!("  test_scan_returns_every_record: PASSED");
    };
}
