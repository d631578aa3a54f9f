use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

use crate::api::Backend;
use crate::app::{App, Command, Message, Model, update};
use crate::commit::{self, CommitJob, CommitReport};

/// Runs batch saves off the UI thread and hands back their reports.
pub struct CommitWorker {
    tx: Sender<CommitReport>,
    rx: Receiver<CommitReport>,
    in_flight: usize,
}

impl Default for CommitWorker {
    fn default() -> Self {
        Self::new()
    }
}

impl CommitWorker {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx,
            in_flight: 0,
        }
    }

    /// Start submitting `job` on a new thread.
    ///
    /// A report always comes back: if the save panics, every record in the
    /// job is reported as failed so its edits stay staged.
    pub fn spawn(&mut self, backend: Arc<dyn Backend>, job: CommitJob) {
        let tx = self.tx.clone();
        self.in_flight += 1;
        thread::spawn(move || {
            let snapshot = job.clone();
            let report = panic::catch_unwind(AssertUnwindSafe(|| {
                commit::run(backend.as_ref(), job)
            }))
            .unwrap_or_else(|_| {
                tracing::error!(records = snapshot.len(), "save worker panicked");
                commit::abandoned(&snapshot, "save stopped unexpectedly")
            });
            // The receiver only goes away when the app is shutting down.
            let _ = tx.send(report);
        });
    }

    /// A finished report, if one is ready.
    pub fn try_finished(&mut self) -> Option<CommitReport> {
        match self.rx.try_recv() {
            Ok(report) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                Some(report)
            }
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    pub const fn is_busy(&self) -> bool {
        self.in_flight > 0
    }
}

impl App {
    /// Apply `msg` and run whatever it queued, feeding each result back
    /// through [`update`] until nothing is left to do.
    pub fn dispatch(&mut self, model: &mut Model, msg: Message) {
        *model = update(std::mem::take(model), msg);
        self.run_commands(model);
    }

    /// Run commands queued outside of [`App::dispatch`], e.g. the initial
    /// fetches.
    pub fn run_commands(&mut self, model: &mut Model) {
        loop {
            let commands = model.take_commands();
            if commands.is_empty() {
                break;
            }
            for command in commands {
                if let Some(result) = self.execute(command) {
                    *model = update(std::mem::take(model), result);
                }
            }
        }
    }

    /// Fold in a finished save, if any. Returns whether the model changed.
    pub fn poll_background(&mut self, model: &mut Model) -> bool {
        let Some(report) = self.worker.try_finished() else {
            return false;
        };
        self.dispatch(model, Message::CommitFinished(report));
        true
    }

    /// Whether a save is still running on the worker.
    pub const fn is_saving(&self) -> bool {
        self.worker.is_busy()
    }

    fn execute(&mut self, command: Command) -> Option<Message> {
        tracing::debug!(?command, "executing");
        let api = self.backend.as_ref();
        let result = match command {
            Command::FetchResorts => Message::ResortsLoaded(api.fetch_resorts()),
            Command::FetchSkiPasses => Message::SkiPassesLoaded(api.fetch_ski_passes()),
            Command::FetchUsers => Message::UsersLoaded(api.fetch_users()),
            Command::CreateResort(resort) => Message::ResortCreated(api.create_resort(&resort)),
            Command::DeleteResort(id) => {
                let result = api.delete_resort(&id);
                Message::ResortDeleted(id, result)
            }
            Command::CreateSkiPass(pass) => Message::SkiPassCreated(api.create_ski_pass(&pass)),
            Command::UpdateSkiPass(pass) => Message::SkiPassUpdated(api.update_ski_pass(&pass)),
            Command::DeleteSkiPass(id) => {
                let result = api.delete_ski_pass(&id);
                Message::SkiPassDeleted(id, result)
            }
            Command::UpdateUser(id, changes) => {
                Message::UserUpdated(api.update_user(&id, &changes))
            }
            Command::DeleteUser(id) => {
                let result = api.delete_user(&id);
                Message::UserDeleted(id, result)
            }
            Command::Scrape(request) => Message::ScrapeFinished(api.scrape_and_ingest(&request)),
            Command::Commit(job) => {
                self.worker.spawn(Arc::clone(&self.backend), job);
                return None;
            }
        };
        if let Some(err) = result_error(&result) {
            tracing::warn!(code = err.code().as_str(), error = %err, "request failed");
        }
        Some(result)
    }
}

fn result_error(msg: &Message) -> Option<&crate::api::ApiError> {
    match msg {
        Message::ResortsLoaded(Err(err))
        | Message::SkiPassesLoaded(Err(err))
        | Message::UsersLoaded(Err(err))
        | Message::ResortCreated(Err(err))
        | Message::ResortDeleted(_, Err(err))
        | Message::SkiPassCreated(Err(err))
        | Message::SkiPassUpdated(Err(err))
        | Message::SkiPassDeleted(_, Err(err))
        | Message::UserUpdated(Err(err))
        | Message::UserDeleted(_, Err(err))
        | Message::ScrapeFinished(Err(err)) => Some(err),
        _ => None,
    }
}
