//! Saved query templates.
//!
//! A template is a reusable query, optionally bound to the structural
//! signature of the workbook that was active when it was saved. Templates
//! with `auto_run` set are matched against freshly uploaded workbooks and
//! re-applied automatically when exactly one matches.
//!
//! The full collection persists most-recent-first as a single JSON blob
//! under one key. All mutation funnels through `TemplateStore`, which keeps
//! an in-memory cache and writes through on every change. Persistence
//! failures degrade softly: unreadable data loads as an empty collection,
//! failed writes are logged and swallowed.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SheetwizError;
use crate::persist::BlobStore;

/// Storage key for the persisted collection.
pub const STORAGE_KEY: &str = "sheetwiz_templates";

/// Display name used when a template is saved without one.
const DEFAULT_NAME: &str = "Saved template";

/// A saved, reusable query.
///
/// `id`, `created_at` and `workbook_signature` are fixed at creation;
/// `auto_run` is the only field that changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: Uuid,
    pub name: String,
    pub query: String,
    pub auto_run: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workbook_signature: Option<String>,
}

/// Durable template collection with an in-memory cache.
pub struct TemplateStore {
    store: Arc<dyn BlobStore>,
    cache: RwLock<Vec<Template>>,
}

impl TemplateStore {
    /// Create a store over the given persistence backend, loading whatever
    /// collection it currently holds.
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        let templates = Self::read_collection(&*store);
        tracing::debug!("[templates] Loaded {} template(s)", templates.len());
        Self {
            store,
            cache: RwLock::new(templates),
        }
    }

    /// Read the persisted collection. Absent or corrupt data degrades to an
    /// empty collection, never an error.
    fn read_collection(store: &dyn BlobStore) -> Vec<Template> {
        let Some(raw) = store.get(STORAGE_KEY) else {
            return Vec::new();
        };
        match serde_json::from_str(&raw) {
            Ok(list) => list,
            Err(e) => {
                tracing::warn!("[templates] Discarding unreadable collection: {}", e);
                Vec::new()
            }
        }
    }

    /// Reload the cache from the persistence backend and return it.
    pub fn load(&self) -> Vec<Template> {
        let templates = Self::read_collection(&*self.store);
        *self.cache.write() = templates.clone();
        templates
    }

    /// Persist the given collection and replace the cache with it. A
    /// persistence failure is logged and swallowed.
    pub fn save(&self, list: Vec<Template>) {
        match serde_json::to_string(&list) {
            Ok(raw) => {
                if let Err(e) = self.store.set(STORAGE_KEY, &raw) {
                    tracing::warn!("[templates] Failed to persist collection: {}", e);
                }
            }
            Err(e) => {
                tracing::warn!("[templates] Failed to serialize collection: {}", e);
            }
        }
        *self.cache.write() = list;
    }

    /// Save a new template at the head of the collection.
    ///
    /// Returns `None` without mutating anything if `query` trims to empty.
    /// A blank `name` falls back to a fixed placeholder.
    pub fn create(
        &self,
        name: &str,
        query: &str,
        auto_run: bool,
        workbook_signature: Option<String>,
    ) -> Option<Template> {
        let query = query.trim();
        if query.is_empty() {
            tracing::debug!("[templates] Refusing to save template with empty query");
            return None;
        }

        let name = name.trim();
        let template = Template {
            id: Uuid::new_v4(),
            name: if name.is_empty() {
                DEFAULT_NAME.to_string()
            } else {
                name.to_string()
            },
            query: query.to_string(),
            auto_run,
            created_at: Utc::now(),
            workbook_signature,
        };

        let mut next = self.cache.read().clone();
        next.insert(0, template.clone());
        self.save(next);

        tracing::info!(
            "[templates] Saved '{}' ({}, auto_run={})",
            template.name,
            template.id,
            template.auto_run
        );
        Some(template)
    }

    /// Remove the template with the given id. No-op if absent.
    pub fn remove(&self, id: Uuid) {
        let mut next = self.cache.read().clone();
        let before = next.len();
        next.retain(|t| t.id != id);
        if next.len() == before {
            return;
        }
        self.save(next);
        tracing::info!("[templates] Removed {}", id);
    }

    /// Flip the `auto_run` flag on the template with the given id. No-op if
    /// absent.
    pub fn toggle_auto_run(&self, id: Uuid) {
        let mut next = self.cache.read().clone();
        let Some(template) = next.iter_mut().find(|t| t.id == id) else {
            return;
        };
        template.auto_run = !template.auto_run;
        tracing::info!("[templates] {} auto_run -> {}", id, template.auto_run);
        self.save(next);
    }

    /// Every stored template with `auto_run` set whose signature equals the
    /// given one (exact string equality; `None` matches only templates
    /// saved without a workbook).
    pub fn find_auto_run_matches(&self, signature: Option<&str>) -> Vec<Template> {
        self.cache
            .read()
            .iter()
            .filter(|t| t.auto_run && t.workbook_signature.as_deref() == signature)
            .cloned()
            .collect()
    }

    /// Snapshot of the cached collection, most-recent-first.
    pub fn all(&self) -> Vec<Template> {
        self.cache.read().clone()
    }

    /// Resolve a template by id prefix (for interactive use).
    pub fn find_by_prefix(&self, prefix: &str) -> Result<Template, SheetwizError> {
        let prefix = prefix.to_lowercase();
        let cache = self.cache.read();
        let matches: Vec<&Template> = cache
            .iter()
            .filter(|t| t.id.to_string().starts_with(&prefix))
            .collect();

        match matches.as_slice() {
            [] => Err(SheetwizError::TemplateNotFound(prefix)),
            [template] => Ok((*template).clone()),
            many => Err(SheetwizError::TemplateAmbiguous(prefix, many.len())),
        }
    }
}
