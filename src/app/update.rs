use crate::api::ApiError;
use crate::app::Model;
use crate::app::model::{Command, Page, Prompt, ScrapeFocus, ToastLevel, UserField};
use crate::commit::{self, CommitReport};
use crate::filter::{cycle_option, distinct_values};
use crate::record::{
    FieldValue, PassField, RecordId, Resort, ResortField, SkiPass, User, UserUpdate,
};

/// All possible events and actions in the application.
///
/// Key presses map to the user-facing variants; the effect layer answers
/// queued commands with the `*Loaded` / `*Finished` variants.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    // Navigation
    /// Move the row selection down by n
    SelectDown(usize),
    /// Move the row selection up by n
    SelectUp(usize),
    SelectFirst,
    SelectLast,
    /// Move the column cursor left
    ColumnLeft,
    /// Move the column cursor right
    ColumnRight,
    SwitchPage(Page),
    NextPage,

    // Prompts
    /// Open the editor for the selected cell, user field, or form row
    StartEdit,
    /// Replace the text of the open prompt
    PromptInput(String),
    /// Confirm the open prompt
    PromptSubmit,
    /// Close the open prompt without applying it
    PromptCancel,

    // Staging
    ToggleFlag,
    /// Drop the staged value of the selected cell
    UnstageCell,
    /// Drop every staged field of the selected resort
    UnstageRecord,
    DiscardAll,
    SaveAll,

    // Filters
    StartSearch,
    ClearSearch,
    CycleCountry,
    CycleProvince,
    CyclePassFilter,
    CycleLiftFilter,
    CycleFlagFilter,
    ClearFilters,

    // Records
    /// Prompt for the name of a new resort or ski pass
    StartCreate,
    /// Delete the selected row (second press confirms)
    DeleteSelected,
    Reload,
    SubmitScrape,

    // Effect results
    ResortsLoaded(Result<Vec<Resort>, ApiError>),
    SkiPassesLoaded(Result<Vec<SkiPass>, ApiError>),
    UsersLoaded(Result<Vec<User>, ApiError>),
    ResortCreated(Result<Resort, ApiError>),
    ResortDeleted(RecordId, Result<(), ApiError>),
    SkiPassCreated(Result<SkiPass, ApiError>),
    SkiPassUpdated(Result<SkiPass, ApiError>),
    SkiPassDeleted(RecordId, Result<(), ApiError>),
    UserUpdated(Result<User, ApiError>),
    UserDeleted(RecordId, Result<(), ApiError>),
    ScrapeFinished(Result<Resort, ApiError>),
    CommitFinished(CommitReport),

    // Application
    ToggleHelp,
    HideHelp,
    /// Redraw screen
    Redraw,
    /// Quit the application
    Quit,
}

impl Message {
    /// Whether this message reports the outcome of background work rather
    /// than a user action.
    pub const fn is_effect_result(&self) -> bool {
        matches!(
            self,
            Self::ResortsLoaded(_)
                | Self::SkiPassesLoaded(_)
                | Self::UsersLoaded(_)
                | Self::ResortCreated(_)
                | Self::ResortDeleted(..)
                | Self::SkiPassCreated(_)
                | Self::SkiPassUpdated(_)
                | Self::SkiPassDeleted(..)
                | Self::UserUpdated(_)
                | Self::UserDeleted(..)
                | Self::ScrapeFinished(_)
                | Self::CommitFinished(_)
                | Self::Redraw
        )
    }
}

/// Pure function that updates the model based on a message.
///
/// This is the core of TEA - all state transitions happen here. Network
/// work is only queued as [`Command`]s for the effect layer.
pub fn update(mut model: Model, msg: Message) -> Model {
    // Reset confirmation flags on any user action other than the confirmed one.
    if !msg.is_effect_result() {
        if !matches!(msg, Message::Quit) {
            model.quit_confirmed = false;
        }
        if !matches!(msg, Message::DeleteSelected) {
            model.delete_confirmed = false;
        }
    }

    match msg {
        // Navigation
        Message::SelectDown(n) => move_selection(&mut model, |row, last| (row + n).min(last)),
        Message::SelectUp(n) => move_selection(&mut model, |row, _| row.saturating_sub(n)),
        Message::SelectFirst => move_selection(&mut model, |_, _| 0),
        Message::SelectLast => move_selection(&mut model, |_, last| last),
        Message::ColumnLeft => match model.page {
            Page::Resorts => model.column = model.column.saturating_sub(1),
            Page::Passes => model.pass_column = model.pass_column.saturating_sub(1),
            Page::Users => model.user_field = UserField::Username,
            Page::Scrape => {}
        },
        Message::ColumnRight => match model.page {
            Page::Resorts => model.column = (model.column + 1).min(ResortField::ALL.len() - 1),
            Page::Passes => {
                model.pass_column = (model.pass_column + 1).min(PassField::ALL.len() - 1);
            }
            Page::Users => model.user_field = UserField::Email,
            Page::Scrape => {}
        },
        Message::SwitchPage(page) => {
            model.page = page;
            model.prompt = None;
        }
        Message::NextPage => {
            model.page = model.page.next();
            model.prompt = None;
        }

        // Prompts
        Message::StartEdit => start_edit(&mut model),
        Message::PromptInput(text) => {
            if matches!(model.prompt, Some(Prompt::Search)) {
                model.filters.search = text;
                model.selected = 0;
                model.refresh_view();
            } else if let Some(
                Prompt::Cell { input, .. }
                | Prompt::NewResort { input }
                | Prompt::PassField { input, .. }
                | Prompt::NewSkiPass { input }
                | Prompt::UserField { input, .. }
                | Prompt::ScrapeField { input, .. },
            ) = &mut model.prompt
            {
                *input = text;
            }
        }
        Message::PromptSubmit => submit_prompt(&mut model),
        Message::PromptCancel => {
            if matches!(model.prompt, Some(Prompt::Search)) {
                model.filters.search.clear();
                model.refresh_view();
            }
            model.prompt = None;
        }

        // Staging
        Message::ToggleFlag => toggle_flag(&mut model),
        Message::UnstageCell => {
            if let Some(id) = model.selected_resort().map(|r| r.id.clone()) {
                let field = model.selected_field();
                if model.pending.unstage(&id, field).is_some() {
                    model.refresh_view();
                }
            }
        }
        Message::UnstageRecord => {
            if let Some(id) = model.selected_resort().map(|r| r.id.clone())
                && model.pending.unstage_record(&id).is_some()
            {
                model.refresh_view();
                model.show_toast(ToastLevel::Info, "Reverted staged edits for this resort");
            }
        }
        Message::DiscardAll => {
            let dropped = model.pending.discard_all();
            model.refresh_view();
            if dropped == 0 {
                model.show_toast(ToastLevel::Info, "No pending changes");
            } else {
                model.show_toast(
                    ToastLevel::Info,
                    format!("Discarded pending changes for {dropped} resort(s)"),
                );
            }
        }
        Message::SaveAll => start_save(&mut model),

        // Filters
        Message::StartSearch => {
            model.page = Page::Resorts;
            model.prompt = Some(Prompt::Search);
        }
        Message::ClearSearch => {
            model.filters.search.clear();
            model.refresh_view();
        }
        Message::CycleCountry => {
            let options = distinct_values(model.view(), |r| r.country.as_str());
            model.filters.country = cycle_option(&options, model.filters.country.as_deref());
            model.filters.province = None;
            filters_changed(&mut model);
        }
        Message::CycleProvince => {
            let country = model.filters.country.clone();
            let in_country: Vec<Resort> = model
                .view()
                .iter()
                .filter(|r| country.as_ref().is_none_or(|c| &r.country == c))
                .cloned()
                .collect();
            let options = distinct_values(&in_country, |r| r.province.as_str());
            model.filters.province = cycle_option(&options, model.filters.province.as_deref());
            filters_changed(&mut model);
        }
        Message::CyclePassFilter => {
            model.filters.passes = model.filters.passes.next();
            filters_changed(&mut model);
        }
        Message::CycleLiftFilter => {
            model.filters.lifts = model.filters.lifts.next();
            filters_changed(&mut model);
        }
        Message::CycleFlagFilter => {
            model.filters.flag = model.filters.flag.next();
            filters_changed(&mut model);
        }
        Message::ClearFilters => {
            model.filters.clear();
            filters_changed(&mut model);
        }

        // Records
        Message::StartCreate => {
            model.prompt = Some(if model.page == Page::Passes {
                Prompt::NewSkiPass {
                    input: String::new(),
                }
            } else {
                model.page = Page::Resorts;
                Prompt::NewResort {
                    input: String::new(),
                }
            });
        }
        Message::DeleteSelected => request_delete(&mut model),
        Message::Reload => match model.page {
            Page::Resorts | Page::Scrape => {
                model.queue(Command::FetchResorts);
                model.queue(Command::FetchSkiPasses);
            }
            Page::Passes => model.queue(Command::FetchSkiPasses),
            Page::Users => model.queue(Command::FetchUsers),
        },
        Message::SubmitScrape => submit_scrape(&mut model),

        // Effect results
        Message::ResortsLoaded(result) => match result {
            Ok(resorts) => {
                let count = resorts.len();
                model.resorts = resorts;
                let dropped = {
                    let known = &model.resorts;
                    model
                        .pending
                        .retain_ids(|id| known.iter().any(|r| &r.id == id))
                };
                model.refresh_view();
                if dropped.is_empty() {
                    model.show_toast(ToastLevel::Info, format!("Loaded {count} resorts"));
                } else {
                    model.show_toast(
                        ToastLevel::Warning,
                        format!(
                            "Dropped staged edits for {} resort(s) that no longer exist",
                            dropped.len()
                        ),
                    );
                }
            }
            Err(err) => {
                model.show_toast(ToastLevel::Error, format!("Failed to load resorts: {err}"));
            }
        },
        Message::SkiPassesLoaded(result) => match result {
            Ok(passes) => {
                model.ski_passes = passes;
                model.pass_selected = model
                    .pass_selected
                    .min(model.ski_passes.len().saturating_sub(1));
            }
            Err(err) => {
                model.show_toast(ToastLevel::Error, format!("Failed to load ski passes: {err}"));
            }
        },
        Message::UsersLoaded(result) => match result {
            Ok(users) => {
                model.users = users;
                model.user_selected = model.user_selected.min(model.users.len().saturating_sub(1));
            }
            Err(err) => {
                model.show_toast(ToastLevel::Error, format!("Failed to load users: {err}"));
            }
        },
        Message::ResortCreated(result) => match result {
            Ok(resort) => {
                let name = resort.name.clone();
                model.resorts.push(resort);
                model.refresh_view();
                model.show_toast(ToastLevel::Info, format!("Added {name}"));
            }
            Err(err) => model.show_toast(ToastLevel::Error, format!("Add failed: {err}")),
        },
        Message::ResortDeleted(id, result) => match result {
            Ok(()) => {
                model.resorts.retain(|r| r.id != id);
                model.pending.unstage_record(&id);
                model.refresh_view();
                model.show_toast(ToastLevel::Info, "Resort deleted");
            }
            Err(err) => model.show_toast(ToastLevel::Error, format!("Delete failed: {err}")),
        },
        Message::SkiPassCreated(result) => match result {
            Ok(pass) => {
                let name = pass.name.clone();
                model.ski_passes.push(pass);
                model.pass_selected = model.ski_passes.len() - 1;
                model.show_toast(ToastLevel::Info, format!("Added {name}"));
            }
            Err(err) => model.show_toast(ToastLevel::Error, format!("Add failed: {err}")),
        },
        Message::SkiPassUpdated(result) => match result {
            Ok(pass) => {
                if let Some(slot) = model.ski_passes.iter_mut().find(|p| p.id == pass.id) {
                    *slot = pass;
                }
                model.show_toast(ToastLevel::Info, "Ski pass updated");
            }
            Err(err) => {
                model.show_toast(ToastLevel::Error, format!("Ski pass update failed: {err}"));
            }
        },
        Message::SkiPassDeleted(id, result) => match result {
            Ok(()) => {
                model.ski_passes.retain(|p| p.id != id);
                model.pass_selected = model
                    .pass_selected
                    .min(model.ski_passes.len().saturating_sub(1));
                model.show_toast(ToastLevel::Info, "Ski pass deleted");
            }
            Err(err) => model.show_toast(ToastLevel::Error, format!("Delete failed: {err}")),
        },
        Message::UserUpdated(result) => match result {
            Ok(user) => {
                if let Some(slot) = model.users.iter_mut().find(|u| u.id == user.id) {
                    *slot = user;
                }
                model.show_toast(ToastLevel::Info, "User updated");
            }
            Err(err) => model.show_toast(ToastLevel::Error, format!("User update failed: {err}")),
        },
        Message::UserDeleted(id, result) => match result {
            Ok(()) => {
                model.users.retain(|u| u.id != id);
                model.user_selected = model.user_selected.min(model.users.len().saturating_sub(1));
                model.show_toast(ToastLevel::Info, "User deleted");
            }
            Err(err) => model.show_toast(ToastLevel::Error, format!("Delete failed: {err}")),
        },
        Message::ScrapeFinished(result) => {
            model.scrape.running = false;
            match result {
                Ok(resort) => {
                    let name = resort.name.clone();
                    model.resorts.push(resort);
                    model.refresh_view();
                    model.scrape.name.clear();
                    model.scrape.url.clear();
                    model.scrape.focus = ScrapeFocus::Name;
                    model.show_toast(ToastLevel::Info, format!("Scraped and added {name}"));
                }
                Err(err) => model.show_toast(ToastLevel::Error, format!("Scrape failed: {err}")),
            }
        }
        Message::CommitFinished(report) => {
            model.in_flight = None;
            let summary = commit::reconcile(&mut model.resorts, &mut model.pending, &report);
            model.refresh_view();
            let level = if summary.is_clean() {
                ToastLevel::Info
            } else {
                ToastLevel::Error
            };
            model.show_toast(level, summary.to_string());
        }

        // Application
        Message::ToggleHelp => model.help_visible = !model.help_visible,
        Message::HideHelp => model.help_visible = false,
        Message::Redraw => {}
        Message::Quit => {
            if !model.pending.is_empty() && !model.quit_confirmed {
                model.show_toast(
                    ToastLevel::Warning,
                    format!(
                        "{} resort(s) have unsaved edits! Press q again to quit, or s to save",
                        model.pending.len()
                    ),
                );
                model.quit_confirmed = true;
            } else {
                model.should_quit = true;
            }
        }
    }
    model
}

fn move_selection(model: &mut Model, step: impl Fn(usize, usize) -> usize) {
    let last = model.row_count().saturating_sub(1);
    match model.page {
        Page::Resorts => model.selected = step(model.selected, last),
        Page::Passes => model.pass_selected = step(model.pass_selected, last),
        Page::Users => model.user_selected = step(model.user_selected, last),
        Page::Scrape => {
            let row = step(model.scrape.focus.index(), last);
            model.scrape.focus = ScrapeFocus::from_index(row);
        }
    }
}

fn filters_changed(model: &mut Model) {
    model.selected = 0;
    model.refresh_view();
}

fn start_edit(model: &mut Model) {
    match model.page {
        Page::Resorts => {
            let field = model.selected_field();
            if field == ResortField::Flagged {
                toggle_flag(model);
                return;
            }
            let Some(resort) = model.selected_resort() else {
                return;
            };
            model.prompt = Some(Prompt::Cell {
                id: resort.id.clone(),
                field,
                input: resort.get(field).edit_text(),
            });
        }
        Page::Users => {
            let field = model.user_field;
            let Some(user) = model.selected_user() else {
                return;
            };
            let input = match field {
                UserField::Username => user.username.clone(),
                UserField::Email => user.email.clone(),
            };
            model.prompt = Some(Prompt::UserField {
                id: user.id.clone(),
                field,
                input,
            });
        }
        Page::Scrape => match model.scrape.focus {
            ScrapeFocus::Name => {
                model.prompt = Some(Prompt::ScrapeField {
                    focus: ScrapeFocus::Name,
                    input: model.scrape.name.clone(),
                });
            }
            ScrapeFocus::Url => {
                model.prompt = Some(Prompt::ScrapeField {
                    focus: ScrapeFocus::Url,
                    input: model.scrape.url.clone(),
                });
            }
            ScrapeFocus::Submit => submit_scrape(model),
        },
        Page::Passes => {
            let field = model.selected_pass_field();
            let Some(pass) = model.selected_ski_pass() else {
                return;
            };
            if field == PassField::Active {
                let mut toggled = pass.clone();
                toggled.is_active = !toggled.is_active;
                model.queue(Command::UpdateSkiPass(toggled));
                return;
            }
            model.prompt = Some(Prompt::PassField {
                id: pass.id.clone(),
                field,
                input: field.edit_text(pass),
            });
        }
    }
}

fn submit_prompt(model: &mut Model) {
    let Some(prompt) = model.prompt.take() else {
        return;
    };
    match prompt {
        Prompt::Search => {}
        Prompt::Cell { id, field, input } => {
            let value = match field.parse_input(&input) {
                Ok(value) => value,
                Err(err) => {
                    model.show_toast(ToastLevel::Error, err.to_string());
                    // Keep the editor open so the input can be fixed.
                    model.prompt = Some(Prompt::Cell { id, field, input });
                    return;
                }
            };
            stage_cell(model, &id, field, value);
        }
        Prompt::NewResort { input } => {
            let name = input.trim();
            if name.is_empty() {
                model.show_toast(ToastLevel::Warning, "Resort name is required");
            } else {
                model.queue(Command::CreateResort(Resort::named(name)));
            }
        }
        Prompt::PassField { id, field, input } => {
            let Some(pass) = model.ski_passes.iter().find(|p| p.id == id) else {
                return;
            };
            let mut edited = pass.clone();
            if let Err(err) = field.apply(&mut edited, &input) {
                model.show_toast(ToastLevel::Error, err.to_string());
                model.prompt = Some(Prompt::PassField { id, field, input });
                return;
            }
            if &edited != pass {
                model.queue(Command::UpdateSkiPass(edited));
            }
        }
        Prompt::NewSkiPass { input } => {
            let name = input.trim();
            if name.is_empty() {
                model.show_toast(ToastLevel::Warning, "Ski pass name is required");
            } else {
                model.queue(Command::CreateSkiPass(SkiPass::named(RecordId::default(), name)));
            }
        }
        Prompt::UserField { id, field, input } => {
            let Some(user) = model.users.iter().find(|u| u.id == id) else {
                return;
            };
            let mut changes = UserUpdate::from(user);
            let value = input.trim().to_string();
            match field {
                UserField::Username => changes.username = value,
                UserField::Email => changes.email = value,
            }
            if changes != UserUpdate::from(user) {
                model.queue(Command::UpdateUser(id, changes));
            }
        }
        Prompt::ScrapeField { focus, input } => match focus {
            ScrapeFocus::Name => {
                model.scrape.name = input;
                model.scrape.focus = ScrapeFocus::Url;
            }
            ScrapeFocus::Url => {
                model.scrape.url = input;
                model.scrape.focus = ScrapeFocus::Submit;
            }
            ScrapeFocus::Submit => {}
        },
    }
}

/// Stage `value`, or unstage the field when it equals the base value.
///
/// While a save is submitting this field, base is about to change, so the
/// value is staged even when it matches the current base.
fn stage_cell(model: &mut Model, id: &RecordId, field: ResortField, value: FieldValue) {
    let Some(base) = model.base_resort(id) else {
        model.show_toast(ToastLevel::Warning, "Resort no longer exists");
        return;
    };
    let committing = model
        .in_flight
        .as_ref()
        .is_some_and(|job| job.covers(id, field));
    if base.get(field) == value && !committing {
        model.pending.unstage(id, field);
    } else if let Err(err) = model.pending.stage(id, field, value) {
        model.show_toast(ToastLevel::Error, err.to_string());
        return;
    }
    model.refresh_view();
}

fn toggle_flag(model: &mut Model) {
    let Some(resort) = model.selected_resort() else {
        return;
    };
    let id = resort.id.clone();
    let flagged = !resort.flagged;
    stage_cell(model, &id, ResortField::Flagged, FieldValue::Flag(flagged));
}

fn submit_scrape(model: &mut Model) {
    let request = model.scrape.request();
    if model.scrape.running {
        model.show_toast(ToastLevel::Warning, "Scrape already running");
    } else if request.name.is_empty() || request.url.is_empty() {
        model.show_toast(ToastLevel::Warning, "Enter both a resort name and a URL");
    } else {
        let notice = format!("Scraping {}...", request.url);
        model.scrape.running = true;
        model.queue(Command::Scrape(request));
        model.show_toast(ToastLevel::Info, notice);
    }
}

fn start_save(model: &mut Model) {
    if model.is_saving() {
        model.show_toast(ToastLevel::Warning, "A save is already in progress");
        return;
    }
    if model.pending.is_empty() {
        model.show_toast(ToastLevel::Info, "No pending changes");
        return;
    }
    let job = commit::prepare(&model.resorts, &model.pending);
    let count = job.len();
    model.in_flight = Some(job.clone());
    model.queue(Command::Commit(job));
    model.show_toast(ToastLevel::Info, format!("Saving {count} resort(s)..."));
}

fn request_delete(model: &mut Model) {
    let target = match model.page {
        Page::Resorts => model
            .selected_resort()
            .map(|r| (Command::DeleteResort(r.id.clone()), r.name.clone())),
        Page::Passes => model
            .selected_ski_pass()
            .map(|p| (Command::DeleteSkiPass(p.id.clone()), p.name.clone())),
        Page::Users => model
            .selected_user()
            .map(|u| (Command::DeleteUser(u.id.clone()), u.username.clone())),
        Page::Scrape => None,
    };
    let Some((command, name)) = target else {
        return;
    };
    if model.delete_confirmed {
        model.delete_confirmed = false;
        model.queue(command);
    } else {
        model.delete_confirmed = true;
        model.show_toast(
            ToastLevel::Warning,
            format!("Press D again to delete {name}"),
        );
    }
}
