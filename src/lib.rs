//! Client-side session controller for a workbook-analysis engine.
//!
//! A user uploads a spreadsheet to the remote engine, describes a desired
//! report in natural language, optionally refines it, and submits both;
//! the engine answers with a structured result/context pair. This crate
//! owns the session orchestration around that flow:
//!
//! - [`workbook`]: the workbook shape and its structural signature
//! - [`templates`]: durable, reusable query templates keyed by signature
//! - [`compose`]: primary-query + refinement composition
//! - [`session`]: the run-lifecycle state machine and auto-apply rules
//! - [`engine`]: the remote engine boundary (HTTP, swappable in tests)
//! - [`persist`] / [`settings`]: blob storage and configuration
//! - [`cli`]: one-shot and REPL command-line surface

pub mod cli;
pub mod compose;
pub mod engine;
pub mod error;
pub mod persist;
pub mod session;
pub mod settings;
pub mod templates;
pub mod workbook;

pub use error::SheetwizError;
pub use session::{RunOutcome, RunStatus, SessionController, SessionSnapshot, UploadOutcome};
pub use templates::{Template, TemplateStore};
pub use workbook::{signature, Sheet, Workbook};
