//! End-to-end session flow against a scripted engine.
//!
//! Covers the full loop: upload -> signature -> template save -> re-upload
//! of a structurally equal workbook -> auto-apply -> run -> result stored
//! verbatim.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{json, Value};

use sheetwiz::engine::{Engine, RunResponse, UploadResponse};
use sheetwiz::persist::MemoryBlobStore;
use sheetwiz::{
    RunOutcome, RunStatus, SessionController, Sheet, TemplateStore, UploadOutcome, Workbook,
};

/// Engine double: every upload yields the configured workbook, every run
/// succeeds with the configured payload and records the query it was sent.
struct ScriptedEngine {
    workbook: Workbook,
    result: Value,
    context: Value,
    seen_queries: RwLock<Vec<String>>,
}

impl ScriptedEngine {
    fn new(workbook: Workbook, result: Value, context: Value) -> Self {
        Self {
            workbook,
            result,
            context,
            seen_queries: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Engine for ScriptedEngine {
    async fn run(&self, query: &str, _workbook: Option<&Workbook>) -> Result<RunResponse> {
        self.seen_queries.write().push(query.to_string());
        Ok(RunResponse {
            ok: true,
            result: Some(self.result.clone()),
            context: Some(self.context.clone()),
            error: None,
        })
    }

    async fn upload(&self, _file: &Path) -> Result<UploadResponse> {
        Ok(UploadResponse {
            ok: true,
            workbook: Some(self.workbook.clone()),
            schemas: Some(json!({"detected": true})),
            error: None,
        })
    }
}

fn sales_costs_workbook() -> Workbook {
    Workbook {
        sheets: vec![
            Sheet {
                name: "Sales".to_string(),
                rows: vec![vec![json!("Region"), json!("Revenue")]],
            },
            Sheet {
                name: "Costs".to_string(),
                rows: vec![vec![json!("Region"), json!("Cost")]],
            },
        ],
    }
}

#[tokio::test]
async fn template_auto_applies_on_structurally_equal_reupload() {
    let result = json!({"rows": [["EU", 1200.5], ["US", 900.0]]});
    let context = json!({"measures": ["revenue"], "dimensions": ["region"]});
    let backend = Arc::new(MemoryBlobStore::new());

    // First session: upload, type a query, save it as an auto-run template.
    {
        let engine = Arc::new(ScriptedEngine::new(
            sales_costs_workbook(),
            result.clone(),
            context.clone(),
        ));
        let templates = Arc::new(TemplateStore::new(backend.clone()));
        let session = SessionController::new(engine, templates.clone());

        let outcome = session.upload(Path::new("book.xlsx")).await;
        let signature = match outcome {
            UploadOutcome::Installed { signature, .. } => signature,
            other => panic!("expected install, got {other:?}"),
        };
        assert_eq!(signature, "2:Sales|Costs");

        session.set_query("Total revenue by region");
        templates
            .create("Revenue", "Total revenue by region", true, Some(signature))
            .unwrap();
    }

    // Second session over the same storage: a structurally equal workbook
    // re-applies the saved template without any typing.
    let engine = Arc::new(ScriptedEngine::new(
        sales_costs_workbook(),
        result.clone(),
        context.clone(),
    ));
    let templates = Arc::new(TemplateStore::new(backend));
    let session = SessionController::new(engine.clone(), templates);

    let outcome = session.upload(Path::new("book-v2.xlsx")).await;
    let auto_applied = match outcome {
        UploadOutcome::Installed { auto_applied, .. } => auto_applied,
        other => panic!("expected install, got {other:?}"),
    };
    assert_eq!(auto_applied.unwrap().query, "Total revenue by region");

    let snapshot = session.snapshot();
    assert_eq!(snapshot.query, "Total revenue by region");
    assert!(snapshot.refine.is_empty());

    // The run is still a separate, user-triggered step.
    assert_eq!(snapshot.status, RunStatus::Idle);
    assert_eq!(session.run().await, RunOutcome::Succeeded);

    let snapshot = session.snapshot();
    assert_eq!(snapshot.status, RunStatus::Succeeded);
    assert_eq!(snapshot.result, Some(result));
    assert_eq!(snapshot.context, Some(context));
    assert!(snapshot.error.is_none());
    assert_eq!(
        engine.seen_queries.read().as_slice(),
        ["Total revenue by region"]
    );
}

#[tokio::test]
async fn refinement_travels_with_the_query_but_stays_separate() {
    let engine = Arc::new(ScriptedEngine::new(
        sales_costs_workbook(),
        json!({"rows": []}),
        json!({}),
    ));
    let templates = Arc::new(TemplateStore::new(Arc::new(MemoryBlobStore::new())));
    let session = SessionController::new(engine.clone(), templates);

    session.upload(Path::new("book.xlsx")).await;
    session.set_query("Total revenue by region");
    session.set_refine("Only Europe, sorted descending");

    assert_eq!(session.run().await, RunOutcome::Succeeded);

    let sent = engine.seen_queries.read().first().cloned().unwrap();
    assert!(sent.starts_with("Total revenue by region"));
    assert!(sent.contains("Refine / adjust as follows:"));
    assert!(sent.ends_with("Only Europe, sorted descending"));

    // Session state keeps the pair unmerged.
    let snapshot = session.snapshot();
    assert_eq!(snapshot.query, "Total revenue by region");
    assert_eq!(snapshot.refine, "Only Europe, sorted descending");
}

#[tokio::test]
async fn ambiguous_templates_leave_query_untouched_on_upload() {
    let backend = Arc::new(MemoryBlobStore::new());
    let templates = Arc::new(TemplateStore::new(backend));
    let signature = Some("2:Sales|Costs".to_string());
    templates.create("a", "First", true, signature.clone()).unwrap();
    templates.create("b", "Second", true, signature).unwrap();

    let engine = Arc::new(ScriptedEngine::new(
        sales_costs_workbook(),
        json!({}),
        json!({}),
    ));
    let session = SessionController::new(engine, templates.clone());

    match session.upload(Path::new("book.xlsx")).await {
        UploadOutcome::Installed { auto_applied, .. } => assert!(auto_applied.is_none()),
        other => panic!("expected install, got {other:?}"),
    }
    assert!(session.snapshot().query.is_empty());

    // Both candidates are still discoverable for a manual apply.
    assert_eq!(
        templates.find_auto_run_matches(Some("2:Sales|Costs")).len(),
        2
    );
}
