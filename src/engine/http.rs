//! HTTP client for the remote analysis engine.
//!
//! Two endpoints: `POST /upload` (multipart file) and `POST /run`
//! (JSON query + workbook). Responses are decoded into the shared wire
//! types; HTTP and decode failures surface as `Err` and are mapped to
//! session errors by the controller.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::multipart;
use serde::Serialize;

use crate::workbook::Workbook;

use super::{Engine, RunResponse, UploadResponse};

/// Request body for `/run`.
#[derive(Debug, Serialize)]
struct RunRequest<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    workbook: Option<&'a Workbook>,
}

/// HTTP engine client.
pub struct HttpEngine {
    http: reqwest::Client,
    base_url: String,
}

impl HttpEngine {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(format!("sheetwiz/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Engine for HttpEngine {
    async fn run(&self, query: &str, workbook: Option<&Workbook>) -> Result<RunResponse> {
        let url = format!("{}/run", self.base_url);
        tracing::debug!("[engine] POST {} ({} chars)", url, query.len());

        let resp = self
            .http
            .post(&url)
            .json(&RunRequest { query, workbook })
            .send()
            .await
            .with_context(|| format!("Engine request failed: {url}"))?;

        resp.json::<RunResponse>()
            .await
            .context("Malformed engine response")
    }

    async fn upload(&self, file: &Path) -> Result<UploadResponse> {
        let url = format!("{}/upload", self.base_url);

        let bytes = tokio::fs::read(file)
            .await
            .with_context(|| format!("Failed to read workbook file: {}", file.display()))?;
        let file_name = file
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("workbook.xlsx")
            .to_string();

        tracing::debug!("[engine] POST {} ({}, {} bytes)", url, file_name, bytes.len());

        let form =
            multipart::Form::new().part("file", multipart::Part::bytes(bytes).file_name(file_name));

        let resp = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .with_context(|| format!("Upload request failed: {url}"))?;

        resp.json::<UploadResponse>()
            .await
            .context("Malformed upload response")
    }
}
