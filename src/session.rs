//! Session orchestration.
//!
//! `SessionController` is the state machine behind the client: it owns the
//! current workbook, the query pair and the run lifecycle, and it is the
//! only thing that talks to the engine boundary and the template store.
//! Each command performs one atomic state transition; rendering layers are
//! pure observers via `snapshot()`.
//!
//! Run lifecycle: `Idle -> Running -> Succeeded | Failed`. The only ways
//! back to `Idle` are a new workbook or a new run start. Result, context
//! and error always change together, under a single write lock, so no
//! stale output can appear alongside a different workbook or an in-flight
//! run.

use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;

use crate::compose::compose;
use crate::engine::{Engine, UploadResponse};
use crate::templates::{Template, TemplateStore};
use crate::workbook::{self, Workbook};

/// Fallback messages when a failure carries no detail.
const GENERIC_ENGINE_ERROR: &str = "Engine error";
const GENERIC_UPLOAD_ERROR: &str = "Upload failed";

/// Stage of the engine-invocation lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    #[default]
    Idle,
    Running,
    Succeeded,
    Failed,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Idle => write!(f, "idle"),
            RunStatus::Running => write!(f, "running"),
            RunStatus::Succeeded => write!(f, "succeeded"),
            RunStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Outcome of a `run()` invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Succeeded,
    Failed,
    /// Refused before starting: empty effective query, or a run already in
    /// flight.
    Skipped,
    /// The engine responded, but a newer workbook or run had superseded
    /// this invocation; session state was left untouched.
    Superseded,
}

/// Outcome of an `upload()` invocation.
#[derive(Debug, Clone)]
pub enum UploadOutcome {
    /// Workbook installed, with the auto-applied template if exactly one
    /// stored template matched.
    Installed {
        sheet_names: Vec<String>,
        signature: String,
        auto_applied: Option<Template>,
    },
    /// The engine rejected the file, or the transport failed. The current
    /// workbook is left in place.
    Rejected { error: String },
}

#[derive(Debug, Default)]
struct SessionState {
    workbook: Option<Workbook>,
    schemas: Option<Value>,
    signature: Option<String>,
    query: String,
    refine: String,
    status: RunStatus,
    result: Option<Value>,
    context: Option<Value>,
    error: Option<String>,
    /// Identity of the active invocation. Bumped on every workbook change
    /// and run start; a completion whose captured token no longer matches
    /// is stale and must be discarded.
    run_token: u64,
}

/// Cloned view of session state for display.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub status: RunStatus,
    pub sheet_names: Vec<String>,
    pub signature: Option<String>,
    pub schemas: Option<Value>,
    pub query: String,
    pub refine: String,
    pub effective_query: String,
    pub result: Option<Value>,
    pub context: Option<Value>,
    pub error: Option<String>,
}

/// The session state machine.
pub struct SessionController {
    state: RwLock<SessionState>,
    engine: Arc<dyn Engine>,
    templates: Arc<TemplateStore>,
}

impl SessionController {
    pub fn new(engine: Arc<dyn Engine>, templates: Arc<TemplateStore>) -> Self {
        Self {
            state: RwLock::new(SessionState::default()),
            engine,
            templates,
        }
    }

    pub fn templates(&self) -> &TemplateStore {
        &self.templates
    }

    /// Install a new workbook, resetting the run lifecycle.
    ///
    /// Always returns the status to `Idle` and clears result/context/error;
    /// any in-flight run is superseded. If exactly one stored template has
    /// `auto_run` set and matches the new workbook's signature, its query
    /// replaces the primary query (refinement cleared) and it is returned.
    /// Zero or multiple matches change nothing.
    pub fn set_workbook(
        &self,
        workbook: Option<Workbook>,
        schemas: Option<Value>,
    ) -> Option<Template> {
        let signature = workbook::signature(workbook.as_ref());
        {
            let mut state = self.state.write();
            state.workbook = workbook;
            state.schemas = schemas;
            state.signature = signature.clone();
            state.status = RunStatus::Idle;
            state.result = None;
            state.context = None;
            state.error = None;
            state.run_token = state.run_token.wrapping_add(1);
        }
        tracing::info!("[session] Workbook replaced (signature: {:?})", signature);

        // Auto-apply is only attempted for a defined signature.
        let signature = signature?;
        let matches = self.templates.find_auto_run_matches(Some(signature.as_str()));
        match matches.as_slice() {
            [template] => {
                self.apply_template(template);
                tracing::info!(
                    "[session] Auto-applied template '{}' ({})",
                    template.name,
                    template.id
                );
                Some(template.clone())
            }
            [] => None,
            many => {
                tracing::debug!(
                    "[session] {} templates match signature, none auto-applied",
                    many.len()
                );
                None
            }
        }
    }

    /// Set the primary query text.
    pub fn set_query(&self, text: impl Into<String>) {
        self.state.write().query = text.into();
    }

    /// Set the refinement text.
    pub fn set_refine(&self, text: impl Into<String>) {
        self.state.write().refine = text.into();
    }

    /// Copy a template's query into the session: primary query replaced,
    /// refinement cleared. Never triggers a run.
    pub fn apply_template(&self, template: &Template) {
        let mut state = self.state.write();
        state.query = template.query.clone();
        state.refine.clear();
    }

    /// The composed request that a run would send.
    pub fn effective_query(&self) -> String {
        let state = self.state.read();
        compose(&state.query, &state.refine)
    }

    /// The current workbook's signature, if any.
    pub fn signature(&self) -> Option<String> {
        self.state.read().signature.clone()
    }

    pub fn status(&self) -> RunStatus {
        self.state.read().status
    }

    pub fn has_workbook(&self) -> bool {
        self.state.read().workbook.is_some()
    }

    /// Submit the effective query to the engine.
    ///
    /// Guarded: a no-op (`Skipped`) if the effective query trims to empty
    /// or a run is already in flight. The transition to `Running` (with
    /// result/context/error cleared) happens synchronously before the
    /// engine call; the completion is applied only if this run is still the
    /// active invocation when it arrives.
    pub async fn run(&self) -> RunOutcome {
        let (token, query, workbook) = {
            let mut state = self.state.write();
            let query = compose(&state.query, &state.refine);
            if query.is_empty() {
                tracing::debug!("[session] Run refused: empty effective query");
                return RunOutcome::Skipped;
            }
            if state.status == RunStatus::Running {
                tracing::debug!("[session] Run refused: another run is in flight");
                return RunOutcome::Skipped;
            }
            state.status = RunStatus::Running;
            state.result = None;
            state.context = None;
            state.error = None;
            state.run_token = state.run_token.wrapping_add(1);
            (state.run_token, query, state.workbook.clone())
        };

        tracing::info!("[session] Run started ({} chars)", query.len());
        let response = self.engine.run(&query, workbook.as_ref()).await;

        let mut state = self.state.write();
        if state.run_token != token {
            tracing::debug!("[session] Discarding stale run completion");
            return RunOutcome::Superseded;
        }

        match response {
            Ok(resp) if resp.ok => {
                state.status = RunStatus::Succeeded;
                state.result = resp.result;
                state.context = resp.context;
                state.error = None;
                tracing::info!("[session] Run succeeded");
                RunOutcome::Succeeded
            }
            Ok(resp) => {
                let error = resp
                    .error
                    .filter(|e| !e.is_empty())
                    .unwrap_or_else(|| GENERIC_ENGINE_ERROR.to_string());
                tracing::warn!("[session] Run failed: {}", error);
                state.status = RunStatus::Failed;
                state.result = None;
                state.context = None;
                state.error = Some(error);
                RunOutcome::Failed
            }
            Err(e) => {
                tracing::warn!("[session] Run transport failure: {:#}", e);
                state.status = RunStatus::Failed;
                state.result = None;
                state.context = None;
                state.error = Some(e.to_string());
                RunOutcome::Failed
            }
        }
    }

    /// Upload a workbook file through the engine boundary and install the
    /// result. On rejection or transport failure the current workbook is
    /// left untouched and the failure is recorded as the session error.
    pub async fn upload(&self, file: &Path) -> UploadOutcome {
        tracing::info!("[session] Uploading {}", file.display());

        match self.engine.upload(file).await {
            Ok(UploadResponse {
                ok: true,
                workbook: Some(workbook),
                schemas,
                ..
            }) => {
                let sheet_names = workbook.sheet_names();
                let auto_applied = self.set_workbook(Some(workbook), schemas);
                // set_workbook always derives a signature for a present workbook
                let signature = self.signature().unwrap_or_default();
                UploadOutcome::Installed {
                    sheet_names,
                    signature,
                    auto_applied,
                }
            }
            Ok(resp) => {
                let error = resp
                    .error
                    .filter(|e| !e.is_empty())
                    .unwrap_or_else(|| GENERIC_UPLOAD_ERROR.to_string());
                self.record_upload_failure(&error);
                UploadOutcome::Rejected { error }
            }
            Err(e) => {
                let error = e.to_string();
                self.record_upload_failure(&error);
                UploadOutcome::Rejected { error }
            }
        }
    }

    fn record_upload_failure(&self, error: &str) {
        tracing::warn!("[session] Upload failed: {}", error);
        self.state.write().error = Some(error.to_string());
    }

    /// Cloned view of the session for display.
    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.read();
        SessionSnapshot {
            status: state.status,
            sheet_names: state
                .workbook
                .as_ref()
                .map(|w| w.sheet_names())
                .unwrap_or_default(),
            signature: state.signature.clone(),
            schemas: state.schemas.clone(),
            query: state.query.clone(),
            refine: state.refine.clone(),
            effective_query: compose(&state.query, &state.refine),
            result: state.result.clone(),
            context: state.context.clone(),
            error: state.error.clone(),
        }
    }
}
