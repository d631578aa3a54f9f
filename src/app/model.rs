use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::api::ScrapeRequest;
use crate::buffer::{PendingChanges, effective_view};
use crate::commit::CommitJob;
use crate::filter::FilterSet;
use crate::record::{PassField, RecordId, Resort, ResortField, SkiPass, User, UserUpdate};

/// Top-level screens.
#[derive(clap::ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Page {
    #[default]
    Resorts,
    Passes,
    Users,
    Scrape,
}

impl Page {
    pub const ALL: [Self; 4] = [Self::Resorts, Self::Passes, Self::Users, Self::Scrape];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Resorts => "resorts",
            Self::Passes => "passes",
            Self::Users => "users",
            Self::Scrape => "scrape",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|page| page.as_str() == s)
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::Resorts => "Resorts",
            Self::Passes => "Ski Passes",
            Self::Users => "Users",
            Self::Scrape => "Scrape",
        }
    }

    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Resorts => Self::Passes,
            Self::Passes => Self::Users,
            Self::Users => Self::Scrape,
            Self::Scrape => Self::Resorts,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    level: ToastLevel,
    message: String,
    expires_at: Instant,
}

/// Editable user columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UserField {
    #[default]
    Username,
    Email,
}

impl UserField {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Username => "Username",
            Self::Email => "Email",
        }
    }
}

/// Rows of the scrape form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScrapeFocus {
    #[default]
    Name,
    Url,
    Submit,
}

impl ScrapeFocus {
    pub const ROWS: [Self; 3] = [Self::Name, Self::Url, Self::Submit];

    pub const fn index(self) -> usize {
        match self {
            Self::Name => 0,
            Self::Url => 1,
            Self::Submit => 2,
        }
    }

    pub fn from_index(idx: usize) -> Self {
        Self::ROWS[idx.min(Self::ROWS.len() - 1)]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapeForm {
    pub name: String,
    pub url: String,
    pub focus: ScrapeFocus,
    pub running: bool,
}

impl ScrapeForm {
    pub fn request(&self) -> ScrapeRequest {
        ScrapeRequest {
            name: self.name.trim().to_string(),
            url: self.url.trim().to_string(),
        }
    }
}

/// The single text prompt that may be open. Only one exists at a time,
/// so opening any prompt drops the keystrokes of the previous one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    /// Live free-text filter
    Search,
    /// Editing one resort cell
    Cell {
        id: RecordId,
        field: ResortField,
        input: String,
    },
    /// Name for a new resort
    NewResort { input: String },
    /// Editing one ski pass column
    PassField {
        id: RecordId,
        field: PassField,
        input: String,
    },
    /// Name for a new ski pass
    NewSkiPass { input: String },
    /// Editing one user column
    UserField {
        id: RecordId,
        field: UserField,
        input: String,
    },
    /// Editing one scrape form field
    ScrapeField { focus: ScrapeFocus, input: String },
}

impl Prompt {
    /// The text being typed.
    pub fn text<'a>(&'a self, model: &'a Model) -> &'a str {
        match self {
            Self::Search => &model.filters.search,
            Self::Cell { input, .. }
            | Self::NewResort { input }
            | Self::PassField { input, .. }
            | Self::NewSkiPass { input }
            | Self::UserField { input, .. }
            | Self::ScrapeField { input, .. } => input,
        }
    }
}

/// Work `update` asks the effect layer to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    FetchResorts,
    FetchSkiPasses,
    FetchUsers,
    CreateResort(Resort),
    DeleteResort(RecordId),
    CreateSkiPass(SkiPass),
    UpdateSkiPass(SkiPass),
    DeleteSkiPass(RecordId),
    UpdateUser(RecordId, UserUpdate),
    DeleteUser(RecordId),
    Scrape(ScrapeRequest),
    Commit(CommitJob),
}

/// The complete application state.
///
/// All state lives here - no global or scattered state.
#[derive(Debug, Default)]
pub struct Model {
    pub page: Page,
    /// Records as last fetched or saved
    pub resorts: Vec<Resort>,
    /// Staged edits not yet saved
    pub pending: PendingChanges,
    pub filters: FilterSet,
    /// `resorts` overlaid with `pending`
    view: Vec<Resort>,
    /// Indices into `view` that pass `filters`
    visible: Vec<usize>,
    /// Selected row among the visible resorts
    pub selected: usize,
    /// Index into [`ResortField::ALL`] of the selected column
    pub column: usize,
    pub ski_passes: Vec<SkiPass>,
    pub pass_selected: usize,
    /// Index into [`PassField::ALL`] of the selected pass column
    pub pass_column: usize,
    pub users: Vec<User>,
    pub user_selected: usize,
    pub user_field: UserField,
    pub scrape: ScrapeForm,
    pub prompt: Option<Prompt>,
    /// Snapshot of the batch save running on the worker
    pub in_flight: Option<CommitJob>,
    /// Backend address shown in the status bar
    pub api_label: String,
    /// Global config path shown in help
    pub config_global_path: Option<PathBuf>,
    /// Local override path shown in help
    pub config_local_path: Option<PathBuf>,
    pub help_visible: bool,
    toast: Option<Toast>,
    pub(super) outbox: Vec<Command>,
    /// Set after the first delete press; a second press deletes
    pub delete_confirmed: bool,
    /// Set after first quit attempt with staged edits; allows second quit to proceed
    pub quit_confirmed: bool,
    pub should_quit: bool,
}

impl Model {
    pub fn new(page: Page) -> Self {
        Self {
            page,
            ..Self::default()
        }
    }

    /// Replace the base records and recompute the view.
    #[must_use]
    pub fn with_resorts(mut self, resorts: Vec<Resort>) -> Self {
        self.resorts = resorts;
        self.refresh_view();
        self
    }

    /// Queue the initial fetches.
    pub fn request_initial_load(&mut self) {
        self.outbox.extend([
            Command::FetchResorts,
            Command::FetchSkiPasses,
            Command::FetchUsers,
        ]);
    }

    /// Recompute the effective view and visible rows after any change to
    /// base records, staged edits or filters.
    pub fn refresh_view(&mut self) {
        self.view = effective_view(&self.resorts, &self.pending);
        self.visible = self.filters.apply(&self.view);
        self.selected = self.selected.min(self.visible.len().saturating_sub(1));
    }

    /// The effective view, unfiltered.
    pub fn view(&self) -> &[Resort] {
        &self.view
    }

    /// Visible resorts in display order.
    pub fn visible_resorts(&self) -> impl Iterator<Item = &Resort> + '_ {
        self.visible.iter().filter_map(|&idx| self.view.get(idx))
    }

    pub const fn visible_count(&self) -> usize {
        self.visible.len()
    }

    /// The selected resort as currently seen (staged edits applied).
    pub fn selected_resort(&self) -> Option<&Resort> {
        self.visible
            .get(self.selected)
            .and_then(|&idx| self.view.get(idx))
    }

    pub fn selected_field(&self) -> ResortField {
        ResortField::ALL[self.column.min(ResortField::ALL.len() - 1)]
    }

    pub fn base_resort(&self, id: &RecordId) -> Option<&Resort> {
        self.resorts.iter().find(|resort| &resort.id == id)
    }

    pub fn selected_ski_pass(&self) -> Option<&SkiPass> {
        self.ski_passes.get(self.pass_selected)
    }

    pub fn selected_pass_field(&self) -> PassField {
        PassField::ALL[self.pass_column.min(PassField::ALL.len() - 1)]
    }

    /// Whether a batch save is running.
    pub const fn is_saving(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn selected_user(&self) -> Option<&User> {
        self.users.get(self.user_selected)
    }

    /// Display name of a ski pass id, falling back to the id itself.
    pub fn ski_pass_name<'a>(&'a self, id: &'a RecordId) -> &'a str {
        self.ski_passes
            .iter()
            .find(|pass| &pass.id == id)
            .map_or(id.as_str(), |pass| pass.name.as_str())
    }

    /// Number of rows on the current page.
    pub const fn row_count(&self) -> usize {
        match self.page {
            Page::Resorts => self.visible.len(),
            Page::Passes => self.ski_passes.len(),
            Page::Users => self.users.len(),
            Page::Scrape => ScrapeFocus::ROWS.len(),
        }
    }

    pub(super) fn queue(&mut self, command: Command) {
        self.outbox.push(command);
    }

    /// Take every queued command, oldest first.
    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.outbox)
    }

    pub fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(Toast {
            level,
            message: message.into(),
            expires_at: Instant::now() + Duration::from_secs(4),
        });
    }

    pub(super) fn expire_toast(&mut self, now: Instant) -> bool {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= now)
        {
            self.toast = None;
            return true;
        }
        false
    }

    pub fn active_toast(&self) -> Option<(&str, ToastLevel)> {
        self.toast
            .as_ref()
            .map(|toast| (toast.message.as_str(), toast.level))
    }
}
