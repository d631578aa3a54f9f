//! Application state and main event loop.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete application state
//! - [`Message`]: All possible events and actions
//! - [`update`]: Pure function for state transitions
//! - [`App::run`]: Main event loop with rendering
//!
//! `update` never touches the network. It queues [`Command`]s on the model,
//! and [`App::dispatch`] runs them against the [`Backend`] and feeds the
//! results back in as messages. Saving staged edits runs on a worker
//! thread so the table stays usable while records are submitted.

mod effects;
mod event_loop;
mod input;
mod model;
mod update;

pub use effects::CommitWorker;
pub use model::{
    Command, Model, Page, Prompt, ScrapeFocus, ScrapeForm, ToastLevel, UserField,
};
pub use update::{Message, update};

use std::path::PathBuf;
use std::sync::Arc;

use crate::api::Backend;

/// Main application struct that owns the backend and runs the event loop.
pub struct App {
    backend: Arc<dyn Backend>,
    page: Page,
    api_label: String,
    config_global_path: Option<PathBuf>,
    config_local_path: Option<PathBuf>,
    worker: CommitWorker,
}

impl App {
    /// Create a new application talking to `backend`.
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            page: Page::default(),
            api_label: String::new(),
            config_global_path: None,
            config_local_path: None,
            worker: CommitWorker::new(),
        }
    }

    /// Set the page shown at startup.
    #[must_use]
    pub const fn with_page(mut self, page: Page) -> Self {
        self.page = page;
        self
    }

    /// Set the backend description shown in the status bar.
    #[must_use]
    pub fn with_api_label(mut self, label: impl Into<String>) -> Self {
        self.api_label = label.into();
        self
    }

    /// Set config paths to show in help.
    #[must_use]
    pub fn with_config_paths(
        mut self,
        global_path: Option<PathBuf>,
        local_path: Option<PathBuf>,
    ) -> Self {
        self.config_global_path = global_path;
        self.config_local_path = local_path;
        self
    }

    /// The model the event loop starts from, with the initial fetches queued.
    pub fn initial_model(&self) -> Model {
        let mut model = Model::new(self.page);
        model.api_label.clone_from(&self.api_label);
        model
            .config_global_path
            .clone_from(&self.config_global_path);
        model.config_local_path.clone_from(&self.config_local_path);
        model.request_initial_load();
        model
    }
}

#[cfg(test)]
mod tests;
