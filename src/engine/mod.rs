//! Engine boundary.
//!
//! The analysis engine is remote; this client consumes it strictly as a
//! request/response boundary. `Engine` is the seam: the HTTP
//! implementation talks to the real service, tests substitute their own.
//!
//! A transport-level failure (the `Err` arm) is handled by the session
//! controller identically to an `ok: false` response.

mod http;

pub use http::HttpEngine;

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::workbook::Workbook;

/// Response from the engine's `/run` endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response from the engine's `/upload` endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workbook: Option<Workbook>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schemas: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Remote analysis engine.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Submit an effective query, with the current workbook as context.
    async fn run(&self, query: &str, workbook: Option<&Workbook>) -> Result<RunResponse>;

    /// Upload a workbook file, receiving its structured form.
    async fn upload(&self, file: &Path) -> Result<UploadResponse>;
}
