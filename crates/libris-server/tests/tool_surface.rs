//! Tool surface integration tests
//!
//! Builds a real container over the memory store, ingests a small corpus
//! through the pipeline (null extractor), and drives the tool router the
//! way an MCP client would. Checks the response contract: JSON payloads,
//! `isError` semantics for validation failures, and well-formed empty
//! results for unknown names.

use std::sync::Arc;

use rmcp::model::CallToolRequestParam;

use libris_infrastructure::config::{AppConfig, StoreBackend, StoreConfig};
use libris_infrastructure::AppContainer;
use libris_server::tools::{route_tool_call, ToolHandlers};

async fn seeded_container() -> Arc<AppContainer> {
    let config = AppConfig {
        store: StoreConfig {
            backend: StoreBackend::Memory,
            ..Default::default()
        },
        ..Default::default()
    };
    let container = AppContainer::build(config).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let doc = dir.path().join("search-engines.txt");
    let body = "Inverted indexes map terms to documents. ".repeat(30);
    tokio::fs::write(&doc, format!("{}\n\n{}", body.trim(), body.trim()))
        .await
        .unwrap();
    container.pipeline.ingest_path(&doc).await.unwrap();

    container
}

fn handlers(container: Arc<AppContainer>) -> ToolHandlers {
    // The same wiring the stdio transport uses.
    ToolHandlers::wire(container)
}

fn request(name: &'static str, args: serde_json::Value) -> CallToolRequestParam {
    CallToolRequestParam {
        meta: None,
        name: name.into(),
        arguments: args.as_object().cloned(),
        task: None,
    }
}

fn payload(result: &rmcp::model::CallToolResult) -> serde_json::Value {
    assert_ne!(result.is_error, Some(true), "unexpected error result");
    let text = result.content[0].as_text().unwrap().text.clone();
    serde_json::from_str(&text).unwrap()
}

#[tokio::test]
async fn catalog_search_returns_the_ingested_document() {
    let handlers = handlers(seeded_container().await);
    let result = route_tool_call(
        request(
            "catalog_search",
            serde_json::json!({"text": "inverted indexes", "limit": 3, "debug": true}),
        ),
        &handlers,
    )
    .await
    .unwrap();

    let body = payload(&result);
    assert_eq!(body["total"], 1);
    assert_eq!(body["documents"][0]["filename"], "search-engines.txt");
    assert!(body["documents"][0]["scores"]["vector"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn validation_failures_are_is_error_payloads() {
    let handlers = handlers(seeded_container().await);

    // Limit above the cap never reaches the service layer.
    let result = route_tool_call(
        request(
            "catalog_search",
            serde_json::json!({"text": "q", "limit": 100}),
        ),
        &handlers,
    )
    .await
    .unwrap();
    assert_eq!(result.is_error, Some(true));

    // Malformed fields behave the same way.
    let result = route_tool_call(
        request("catalog_search", serde_json::json!({"limit": 3})),
        &handlers,
    )
    .await
    .unwrap();
    assert_eq!(result.is_error, Some(true));
}

#[tokio::test]
async fn unknown_tool_is_a_protocol_error() {
    let handlers = handlers(seeded_container().await);
    let result = route_tool_call(request("drop_tables", serde_json::json!({})), &handlers).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn unknown_concept_yields_an_empty_outcome() {
    let handlers = handlers(seeded_container().await);
    let result = route_tool_call(
        request(
            "concept_search",
            serde_json::json!({"concept": "phlogiston", "limit": 5}),
        ),
        &handlers,
    )
    .await
    .unwrap();

    let body = payload(&result);
    assert_eq!(body["totalFound"], 0);
    assert!(body["conceptMetadata"].is_null());
    assert_eq!(body["chunks"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn corpus_status_reports_counts_and_health() {
    let handlers = handlers(seeded_container().await);
    let result = route_tool_call(request("corpus_status", serde_json::json!({})), &handlers)
        .await
        .unwrap();

    let body = payload(&result);
    assert_eq!(body["tables"]["documents"], 1);
    assert!(body["tables"]["chunks"].as_u64().unwrap() >= 1);
    assert_eq!(body["store"], "memory");
    assert_eq!(body["embedding"]["dimensions"], 384);
    assert_eq!(body["health"]["healthy"], true);
}

#[tokio::test]
async fn chunks_search_answers_for_unknown_sources() {
    let handlers = handlers(seeded_container().await);
    let result = route_tool_call(
        request(
            "chunks_search",
            serde_json::json!({"text": "indexes", "source": "missing.pdf", "limit": 3}),
        ),
        &handlers,
    )
    .await
    .unwrap();

    let body = payload(&result);
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn list_categories_is_empty_without_extraction() {
    // The null extractor produced no categories for the corpus.
    let handlers = handlers(seeded_container().await);
    let result = route_tool_call(request("list_categories", serde_json::json!({})), &handlers)
        .await
        .unwrap();
    let body = payload(&result);
    assert_eq!(body["total"], 0);
}
