// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. api::ApiError)
    clippy::module_name_repetitions
)]

//! # resort-admin
//!
//! A terminal admin console for a ski resort directory backend.
//!
//! resort-admin lets an operator:
//! - Browse resorts in a filterable table
//! - Stage edits to many cells across many resorts, then save them in one batch
//! - Manage ski passes and user accounts
//! - Ask the backend to scrape a resort website and add the result
//!
//! ## Architecture
//!
//! resort-admin uses The Elm Architecture (TEA) pattern:
//! - **Model**: Application state
//! - **Message**: Events and actions
//! - **Update**: Pure state transitions
//! - **View**: Render to terminal
//!
//! ## Modules
//!
//! - [`record`]: Resort, ski pass and user records and typed field values
//! - [`buffer`]: Staged edits and the effective view over fetched records
//! - [`filter`]: Search and attribute filters
//! - [`commit`]: Batch save of staged edits with per-record outcomes
//! - [`api`]: Backend client traits, HTTP and in-memory implementations
//! - [`app`]: Main application loop and state
//! - [`ui`]: Terminal UI components
//! - [`config`]: Saved defaults and flag merging
//! - [`logging`]: Tracing subscriber setup

pub mod api;
pub mod app;
pub mod buffer;
pub mod commit;
pub mod config;
pub mod filter;
pub mod logging;
pub mod record;
pub mod ui;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::api::{ApiError, Backend, HttpBackend, MemoryBackend};
    pub use crate::app::{App, Message, Model};
    pub use crate::buffer::PendingChanges;
    pub use crate::record::{FieldValue, RecordId, Resort, ResortField};
}
