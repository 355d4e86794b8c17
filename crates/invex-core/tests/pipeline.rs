//! End-to-end pipeline behavior against a call-recording provider.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use invex_core::extraction::{self, ExtractionProvider};
use invex_core::{
    invoice_registry, Cardinality, ExtractionError, ExtractionPipeline, FailurePolicy,
    FieldSchema, InvexError, LlmError, RecordSchema, SchemaRegistry, SchemaResult,
};

/// Provider that answers from a per-schema script and records call order.
#[derive(Default)]
struct StubProvider {
    answers: HashMap<String, Value>,
    failing: Option<String>,
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<String>>,
}

impl StubProvider {
    fn answer(mut self, schema_id: &str, raw: Value) -> Self {
        self.answers.insert(schema_id.to_string(), raw);
        self
    }

    fn failing_on(mut self, schema_id: &str) -> Self {
        self.failing = Some(schema_id.to_string());
        self
    }

    fn delayed(mut self, schema_id: &str, delay: Duration) -> Self {
        self.delays.insert(schema_id.to_string(), delay);
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExtractionProvider for StubProvider {
    async fn extract(&self, schema: &RecordSchema, _text: &str) -> extraction::Result<Value> {
        self.calls.lock().unwrap().push(schema.id().to_string());

        if let Some(delay) = self.delays.get(schema.id()) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.as_deref() == Some(schema.id()) {
            return Err(ExtractionError::ModelInvocation {
                schema_id: schema.id().to_string(),
                source: LlmError::Connection("connection refused".to_string()),
            });
        }
        Ok(self.answers.get(schema.id()).cloned().unwrap_or(Value::Null))
    }
}

fn schema(id: &str, cardinality: Cardinality) -> RecordSchema {
    RecordSchema::new(id, format!("{} record", id), cardinality)
        .with_field(FieldSchema::new("name", "name"))
        .with_field(FieldSchema::new("city", "city"))
}

fn two_schemas() -> SchemaRegistry {
    SchemaRegistry::from_schemas([schema("s1", Cardinality::One), schema("s2", Cardinality::One)])
        .unwrap()
}

fn invoice_and_items() -> SchemaRegistry {
    let builtin = invoice_registry().unwrap();
    SchemaRegistry::from_schemas([
        builtin.get("invoice").unwrap().clone(),
        builtin.get("line_items").unwrap().clone(),
    ])
    .unwrap()
}

#[tokio::test]
async fn test_schemas_run_in_registry_order() {
    let pipeline = ExtractionPipeline::new(StubProvider::default());
    let bundle = pipeline.run("ACME Corp, Chicago", &two_schemas()).await.unwrap();

    assert_eq!(pipeline.provider().calls(), vec!["s1", "s2"]);
    assert_eq!(bundle.schema_ids().collect::<Vec<_>>(), vec!["s1", "s2"]);
}

#[tokio::test]
async fn test_empty_document_makes_no_calls() {
    let pipeline = ExtractionPipeline::new(StubProvider::default());

    for text in ["", "   ", "\n\t \n"] {
        let err = pipeline.run(text, &two_schemas()).await.unwrap_err();
        assert!(matches!(err, InvexError::EmptyDocument));
    }
    assert!(pipeline.provider().calls().is_empty());
}

#[tokio::test]
async fn test_one_schema_takes_first_candidate() {
    let provider = StubProvider::default().answer(
        "s1",
        json!([{"name": "first", "city": "DAYTON"}, {"name": "second", "city": "CHICAGO"}]),
    );
    let registry = SchemaRegistry::from_schemas([schema("s1", Cardinality::One)]).unwrap();

    let bundle = ExtractionPipeline::new(provider).run("text", &registry).await.unwrap();
    let record = bundle.get("s1").and_then(|r| r.as_one()).unwrap();
    assert_eq!(record.get("name"), Some("first"));
    assert_eq!(record.get("city"), Some("DAYTON"));
}

#[tokio::test]
async fn test_many_schema_empty_list() {
    let provider = StubProvider::default().answer("s1", json!([]));
    let registry = SchemaRegistry::from_schemas([schema("s1", Cardinality::Many)]).unwrap();

    let bundle = ExtractionPipeline::new(provider).run("text", &registry).await.unwrap();
    assert_eq!(bundle.get("s1"), Some(&SchemaResult::Many(vec![])));
    assert_eq!(bundle.to_value(), json!({"s1": []}));
}

#[tokio::test]
async fn test_record_keys_match_declared_fields() {
    let provider = StubProvider::default()
        .answer("s1", json!({"name": "ACME", "zip": "60601"}))
        .answer("s2", json!({}));

    let bundle = ExtractionPipeline::new(provider)
        .run("text", &two_schemas())
        .await
        .unwrap();

    for (_, result) in bundle.iter() {
        for record in result.records() {
            assert_eq!(record.field_names().collect::<Vec<_>>(), vec!["name", "city"]);
        }
    }
}

#[tokio::test]
async fn test_invoice_end_to_end() {
    let provider = StubProvider::default()
        .answer("invoice", json!({"invoice_number": "1019273"}))
        .answer(
            "line_items",
            json!([{"product_description": "CABLE", "count": "40"}, {}]),
        );

    let bundle = ExtractionPipeline::new(provider)
        .run("INVOICE 1019273 ...", &invoice_and_items())
        .await
        .unwrap();

    assert_eq!(
        bundle.to_value(),
        json!({
            "invoice": {
                "invoice_number": "1019273",
                "invoice_date": null,
                "customer_id": null,
                "customer_po": null,
                "salesperson": null,
                "terms": null,
                "due_date": null,
                "packing_slip_no": null,
                "tracking_number": null
            },
            "line_items": [
                {
                    "product_description": "CABLE",
                    "count": "40",
                    "unit_item_price": null,
                    "product_total_price": null
                },
                {
                    "product_description": null,
                    "count": null,
                    "unit_item_price": null,
                    "product_total_price": null
                }
            ]
        })
    );
}

#[tokio::test]
async fn test_failure_aborts_run() {
    let provider = StubProvider::default()
        .answer("s1", json!({"name": "ACME"}))
        .failing_on("s2");
    let registry = SchemaRegistry::from_schemas([
        schema("s1", Cardinality::One),
        schema("s2", Cardinality::One),
        schema("s3", Cardinality::One),
    ])
    .unwrap();
    let pipeline = ExtractionPipeline::new(provider);

    let err = pipeline.run("text", &registry).await.unwrap_err();
    match err {
        InvexError::Extraction(e) => {
            assert_eq!(e.schema_id(), "s2");
            assert!(e.is_model_invocation());
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(pipeline.provider().calls(), vec!["s1", "s2"]);
}

#[tokio::test]
async fn test_continue_policy_marks_failed_schema() {
    let provider = StubProvider::default()
        .answer("s1", json!({"name": "ACME"}))
        .failing_on("s1")
        .answer("s2", json!({"city": "DAYTON"}));
    let pipeline = ExtractionPipeline::new(provider).with_failure_policy(FailurePolicy::Continue);

    let bundle = pipeline.run("text", &two_schemas()).await.unwrap();

    assert_eq!(pipeline.provider().calls(), vec!["s1", "s2"]);
    let failures: Vec<_> = bundle.failures().map(|(id, _)| id).collect();
    assert_eq!(failures, vec!["s1"]);
    assert_eq!(
        bundle.get("s2").and_then(|r| r.as_one()).and_then(|r| r.get("city")),
        Some("DAYTON")
    );
}

#[tokio::test]
async fn test_concurrent_run_keeps_registry_order() {
    let provider = StubProvider::default()
        .answer("s1", json!({"name": "slow"}))
        .answer("s2", json!({"name": "fast"}))
        .delayed("s1", Duration::from_millis(50));

    let concurrent = ExtractionPipeline::new(provider)
        .with_concurrency(true)
        .run("text", &two_schemas())
        .await
        .unwrap();

    let sequential = ExtractionPipeline::new(
        StubProvider::default()
            .answer("s1", json!({"name": "slow"}))
            .answer("s2", json!({"name": "fast"})),
    )
    .run("text", &two_schemas())
    .await
    .unwrap();

    assert_eq!(concurrent, sequential);
    assert_eq!(concurrent.schema_ids().collect::<Vec<_>>(), vec!["s1", "s2"]);
}

#[tokio::test]
async fn test_concurrent_fail_fast() {
    let provider = StubProvider::default().failing_on("s2");
    let err = ExtractionPipeline::new(provider)
        .with_concurrency(true)
        .run("text", &two_schemas())
        .await
        .unwrap_err();

    assert!(matches!(err, InvexError::Extraction(ref e) if e.schema_id() == "s2"));
}
