//! Integration tests for the adapter against the in-memory backend.

use proptest::prelude::*;
use serde_json::json;
use std::collections::BTreeSet;
use std::sync::Arc;
use tabledb_adapter::{
    Adapter, AdapterConfig, AdapterError, ColumnSpec, Query, Schema, SequenceAllocator,
    TableSchema, AUTO_INCREMENT, UNIQUE,
};
use tabledb_store::{document, DocumentBackend, InMemoryBackend};

fn users_schema() -> Schema {
    Schema::new().table(
        "users",
        TableSchema::new()
            .column("id", ColumnSpec::new().with_flag(AUTO_INCREMENT, true))
            .column("email", ColumnSpec::new().with_flag(UNIQUE, true)),
    )
}

async fn connect(backend: &Arc<InMemoryBackend>, schema: &Schema) -> Adapter {
    Adapter::connect(
        AdapterConfig::new("app"),
        Arc::clone(backend) as Arc<dyn DocumentBackend>,
        Some(schema),
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn users_end_to_end() {
    let backend = Arc::new(InMemoryBackend::new());
    let adapter = connect(&backend, &users_schema()).await;

    for (i, email) in ["a@x.com", "b@x.com", "c@x.com"].iter().enumerate() {
        let saved = adapter
            .save("users", document(json!({ "email": email })))
            .await
            .unwrap();
        assert_eq!(saved.get("id"), Some(&json!(i as i64 + 1)));
    }

    // Duplicate email is rejected by the unique index.
    let err = adapter
        .save("users", document(json!({ "email": "a@x.com" })))
        .await
        .unwrap_err();
    assert!(matches!(err, AdapterError::Constraint { .. }));
    assert_eq!(backend.collection_len("users"), 3);

    // Lookups see the allocated identities.
    let found = adapter
        .find_one("users", &Query::filtered(document(json!({ "id": 2 }))))
        .await
        .unwrap();
    assert_eq!(found.get("email"), Some(&json!("b@x.com")));

    adapter.close().await.unwrap();
}

#[tokio::test]
async fn update_and_destroy_flow() {
    let backend = Arc::new(InMemoryBackend::new());
    let adapter = connect(&backend, &users_schema()).await;

    adapter
        .save("users", document(json!({ "email": "a@x.com" })))
        .await
        .unwrap();
    adapter
        .save("users", document(json!({ "email": "b@x.com" })))
        .await
        .unwrap();

    let refreshed = adapter
        .update("users", &json!(1), &document(json!({ "name": "ada" })))
        .await
        .unwrap();
    assert_eq!(refreshed.get("name"), Some(&json!("ada")));
    assert_eq!(refreshed.get("email"), Some(&json!("a@x.com")));

    let removed = adapter
        .destroy("users", &Query::filtered(document(json!({ "id": 2 }))))
        .await
        .unwrap();
    assert_eq!(removed.len(), 1);
    assert_eq!(adapter.find("users", &Query::all()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn reconnecting_adapter_continues_sequences() {
    let backend = Arc::new(InMemoryBackend::new());

    let adapter = connect(&backend, &users_schema()).await;
    adapter
        .save("users", document(json!({ "email": "a@x.com" })))
        .await
        .unwrap();
    drop(adapter);

    // A second adapter over the same store picks up where the first
    // left off instead of re-allocating identities.
    let adapter = connect(&backend, &users_schema()).await;
    let saved = adapter
        .save("users", document(json!({ "email": "b@x.com" })))
        .await
        .unwrap();
    assert_eq!(saved.get("id"), Some(&json!(2)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_saves_allocate_distinct_dense_identities() {
    let backend = Arc::new(InMemoryBackend::new());
    let schema = Schema::new().table(
        "users",
        TableSchema::new().column("id", ColumnSpec::new().with_flag(AUTO_INCREMENT, true)),
    );
    let adapter = Arc::new(connect(&backend, &schema).await);

    let mut handles = Vec::new();
    for i in 0..16 {
        let adapter = Arc::clone(&adapter);
        handles.push(tokio::spawn(async move {
            let saved = adapter
                .save("users", document(json!({ "n": i })))
                .await
                .unwrap();
            saved.get("id").unwrap().as_i64().unwrap()
        }));
    }

    let mut ids = BTreeSet::new();
    for handle in handles {
        ids.insert(handle.await.unwrap());
    }
    let expected: BTreeSet<i64> = (1..=16).collect();
    assert_eq!(ids, expected);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    // Concurrent allocations from one sequence form a dense, duplicate-free
    // range regardless of fan-out width.
    #[test]
    fn allocations_form_dense_range(fanout in 1usize..24) {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(4)
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async move {
            let backend =
                Arc::new(InMemoryBackend::new()) as Arc<dyn DocumentBackend>;
            let sequences = SequenceAllocator::new(Arc::clone(&backend));
            sequences.ensure("users", "id").await.unwrap();

            let mut handles = Vec::new();
            for _ in 0..fanout {
                let sequences = sequences.clone();
                handles.push(tokio::spawn(async move {
                    sequences.next_value("users", "id").await.unwrap()
                }));
            }

            let mut values = BTreeSet::new();
            for handle in handles {
                values.insert(handle.await.unwrap());
            }
            let expected: BTreeSet<i64> = (1..=fanout as i64).collect();
            assert_eq!(values, expected);
        });
    }
}
