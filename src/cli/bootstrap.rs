//! CLI bootstrap - wire settings, storage, engine and session together.
//!
//! `CliContext` owns every service the CLI needs; initialization mirrors
//! the order a GUI shell would use: logging, `.env`, settings, template
//! storage, engine client, session controller.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::engine::HttpEngine;
use crate::persist::FileBlobStore;
use crate::session::SessionController;
use crate::settings::SettingsManager;
use crate::templates::TemplateStore;

use super::args::Args;

/// Context for CLI execution containing all initialized services.
pub struct CliContext {
    /// The session state machine
    pub session: Arc<SessionController>,

    /// Template collection (also reachable via `session`)
    pub templates: Arc<TemplateStore>,

    /// Settings manager
    pub settings_manager: Arc<SettingsManager>,

    /// Command-line arguments
    pub args: Args,
}

/// Initialize the CLI context with all services.
pub async fn initialize(args: &Args) -> Result<CliContext> {
    // Load .env file if present
    if let Err(e) = dotenvy::dotenv() {
        // Only warn on errors other than file not found
        if !matches!(e, dotenvy::Error::Io(_)) {
            tracing::warn!("Failed to load .env file: {}", e);
        }
    }

    // Initialize logging based on verbosity
    let log_level = if args.verbose { "debug" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("sheetwiz={}", log_level).parse().unwrap()),
        )
        .try_init();

    // Load settings
    let settings_manager = Arc::new(
        SettingsManager::new()
            .await
            .context("Failed to initialize settings manager")?,
    );

    // Ensure settings file exists (creates template on first run)
    if let Err(e) = settings_manager.ensure_settings_file().await {
        tracing::warn!("Failed to create settings template: {}", e);
    }

    let settings = settings_manager.get().await;

    // Resolve engine URL: CLI arg / env > settings
    let base_url = args
        .engine_url
        .clone()
        .unwrap_or_else(|| settings.engine.base_url.clone());

    if args.verbose {
        eprintln!(
            "[cli] Settings loaded from {}",
            settings_manager.path().display()
        );
        eprintln!("[cli] Engine: {}", base_url);
    }

    // Template storage
    let store_dir = settings
        .storage
        .data_dir
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(FileBlobStore::default_dir);
    let templates = Arc::new(TemplateStore::new(Arc::new(FileBlobStore::new(store_dir))));

    // Engine client
    let engine = HttpEngine::new(base_url, Duration::from_secs(settings.engine.timeout_secs))
        .context("Failed to create engine client")?;

    // Session controller
    let session = Arc::new(SessionController::new(Arc::new(engine), templates.clone()));

    if args.verbose {
        eprintln!("[cli] {} template(s) loaded", templates.all().len());
    }

    Ok(CliContext {
        session,
        templates,
        settings_manager,
        args: args.clone(),
    })
}
