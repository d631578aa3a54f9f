use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::api::{ApiError, MemoryBackend, ResortApi, ScrapeRequest, SkiPassApi, UserApi};
use crate::commit::{CommitJob, CommitReport, RecordOutcome};
use crate::record::{
    FieldValue, OpenTotal, PassField, RecordId, Resort, ResortField, SkiPass, User, UserUpdate,
};

use super::{App, Command, Message, Model, Page, Prompt, ScrapeFocus, ToastLevel, UserField, update};

fn resort(id: &str, name: &str, country: &str, province: &str) -> Resort {
    Resort {
        id: RecordId::from(id),
        country: country.to_string(),
        province: province.to_string(),
        lifts: OpenTotal::new(2, 4),
        ..Resort::named(name)
    }
}

fn sample_resorts() -> Vec<Resort> {
    vec![
        resort("r1", "Whistler Blackcomb", "Canada", "British Columbia"),
        resort("r2", "Banff Sunshine", "Canada", "Alberta"),
        resort("r3", "Park City", "USA", "Utah"),
    ]
}

fn user(id: &str, name: &str) -> User {
    User {
        id: RecordId::from(id),
        username: name.to_string(),
        email: format!("{name}@example.test"),
        created_at: Some("2024-01-15T10:00:00Z".to_string()),
    }
}

fn create_test_model() -> Model {
    Model::new(Page::Resorts).with_resorts(sample_resorts())
}

fn column_of(field: ResortField) -> usize {
    ResortField::ALL
        .iter()
        .position(|f| *f == field)
        .unwrap()
}

fn at_column(mut model: Model, field: ResortField) -> Model {
    model.column = column_of(field);
    model
}

fn type_text(mut model: Model, text: &str) -> Model {
    let mut typed = model
        .prompt
        .as_ref()
        .map(|p| p.text(&model).to_string())
        .unwrap_or_default();
    for ch in text.chars() {
        typed.push(ch);
        model = update(model, Message::PromptInput(typed.clone()));
    }
    model
}

fn edit_cell(model: Model, field: ResortField, text: &str) -> Model {
    let model = update(at_column(model, field), Message::StartEdit);
    let model = update(model, Message::PromptInput(String::new()));
    let model = type_text(model, text);
    update(model, Message::PromptSubmit)
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn test_app(backend: MemoryBackend) -> (App, Arc<MemoryBackend>) {
    let backend = Arc::new(backend);
    let app = App::new(backend.clone()).with_api_label("memory");
    (app, backend)
}

fn succeed_all(job: &CommitJob) -> CommitReport {
    let outcomes = job
        .items()
        .iter()
        .map(|item| RecordOutcome {
            id: item.id.clone(),
            staged: item.staged.clone(),
            result: Ok(item.record.clone().unwrap()),
        })
        .collect();
    CommitReport { outcomes }
}

fn passes_model() -> Model {
    let mut model = Model::new(Page::Passes);
    model.ski_passes = vec![SkiPass::named("p1", "Epic")];
    model
}

fn wait_for_save(app: &mut App, model: &mut Model) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while model.is_saving() && Instant::now() < deadline {
        if !app.poll_background(model) {
            std::thread::sleep(Duration::from_millis(5));
        }
    }
    assert!(!model.is_saving(), "save did not finish in time");
}

#[test]
fn test_select_down_clamps_to_last_visible_row() {
    let model = update(create_test_model(), Message::SelectDown(10));
    assert_eq!(model.selected, 2);
    let model = update(model, Message::SelectUp(1));
    assert_eq!(model.selected, 1);
    let model = update(model, Message::SelectFirst);
    assert_eq!(model.selected, 0);
}

#[test]
fn test_column_cursor_stays_in_range() {
    let mut model = create_test_model();
    for _ in 0..50 {
        model = update(model, Message::ColumnRight);
    }
    assert_eq!(model.selected_field(), ResortField::Location);
    let model = update(model, Message::ColumnLeft);
    assert_eq!(model.selected_field(), ResortField::SkiPasses);
}

#[test]
fn test_start_edit_seeds_prompt_with_current_value() {
    let model = update(at_column(create_test_model(), ResortField::Lifts), Message::StartEdit);
    assert_eq!(
        model.prompt,
        Some(Prompt::Cell {
            id: RecordId::from("r1"),
            field: ResortField::Lifts,
            input: "2/4".to_string(),
        })
    );
}

#[test]
fn test_submitted_edit_is_staged_and_visible_in_view() {
    let model = edit_cell(create_test_model(), ResortField::Notes, "Check chair 4");
    let id = RecordId::from("r1");

    assert!(model.prompt.is_none());
    assert_eq!(
        model.pending.get(&id, ResortField::Notes),
        Some(&FieldValue::Text("Check chair 4".to_string()))
    );
    assert_eq!(model.selected_resort().unwrap().notes, "Check chair 4");
    // Base is untouched until saved.
    assert_eq!(model.base_resort(&id).unwrap().notes, "");
}

#[test]
fn test_edit_back_to_base_value_unstages() {
    let model = edit_cell(create_test_model(), ResortField::Country, "Canadia");
    assert!(model.pending.contains(&RecordId::from("r1")));

    let model = edit_cell(model, ResortField::Country, "Canada");
    assert!(model.pending.is_empty());
}

#[test]
fn test_invalid_input_keeps_prompt_open_with_error() {
    let model = edit_cell(create_test_model(), ResortField::Gondolas, "lots");
    assert!(matches!(model.prompt, Some(Prompt::Cell { .. })));
    assert!(model.pending.is_empty());
    let (_, level) = model.active_toast().unwrap();
    assert_eq!(level, ToastLevel::Error);
}

#[test]
fn test_prompt_cancel_discards_typing() {
    let model = update(at_column(create_test_model(), ResortField::Notes), Message::StartEdit);
    let model = type_text(model, "draft");
    let model = update(model, Message::PromptCancel);
    assert!(model.prompt.is_none());
    assert!(model.pending.is_empty());
}

#[test]
fn test_toggle_flag_stages_and_second_toggle_reverts() {
    let model = update(create_test_model(), Message::ToggleFlag);
    let id = RecordId::from("r1");
    assert_eq!(
        model.pending.get(&id, ResortField::Flagged),
        Some(&FieldValue::Flag(true))
    );
    assert!(model.selected_resort().unwrap().flagged);

    let model = update(model, Message::ToggleFlag);
    assert!(model.pending.is_empty());
}

#[test]
fn test_edit_on_flag_column_toggles_instead_of_prompting() {
    let model = update(at_column(create_test_model(), ResortField::Flagged), Message::StartEdit);
    assert!(model.prompt.is_none());
    assert!(model.pending.is_staged(&RecordId::from("r1"), ResortField::Flagged));
}

#[test]
fn test_unstage_cell_and_record() {
    let model = edit_cell(create_test_model(), ResortField::Notes, "a");
    let model = edit_cell(model, ResortField::Website, "https://w.test");
    let id = RecordId::from("r1");
    assert_eq!(model.pending.fields(&id).unwrap().len(), 2);

    let model = update(at_column(model, ResortField::Notes), Message::UnstageCell);
    assert!(!model.pending.is_staged(&id, ResortField::Notes));
    assert!(model.pending.is_staged(&id, ResortField::Website));

    let model = update(model, Message::UnstageRecord);
    assert!(model.pending.is_empty());
}

#[test]
fn test_discard_all_clears_every_record() {
    let model = edit_cell(create_test_model(), ResortField::Notes, "a");
    let model = update(model, Message::SelectDown(1));
    let model = edit_cell(model, ResortField::Notes, "b");
    assert_eq!(model.pending.len(), 2);

    let model = update(model, Message::DiscardAll);
    assert!(model.pending.is_empty());
    assert_eq!(model.selected_resort().unwrap().notes, "");
}

#[test]
fn test_save_with_nothing_pending_queues_nothing() {
    let mut model = update(create_test_model(), Message::SaveAll);
    assert!(!model.is_saving());
    assert!(model.take_commands().is_empty());
    assert_eq!(model.active_toast().unwrap().0, "No pending changes");
}

#[test]
fn test_save_queues_commit_and_refuses_second_save() {
    let model = edit_cell(create_test_model(), ResortField::Notes, "x");
    let mut model = update(model, Message::SaveAll);
    assert!(model.is_saving());
    let commands = model.take_commands();
    assert_eq!(commands.len(), 1);
    let Command::Commit(job) = &commands[0] else {
        panic!("expected a commit command, got {commands:?}");
    };
    assert_eq!(job.len(), 1);
    assert_eq!(job.items()[0].record.as_ref().unwrap().notes, "x");

    let mut model = update(model, Message::SaveAll);
    assert!(model.take_commands().is_empty());
    assert_eq!(model.active_toast().unwrap().1, ToastLevel::Warning);
}

#[test]
fn test_commit_finished_reconciles_successes_and_failures() {
    let model = edit_cell(create_test_model(), ResortField::Notes, "ok");
    let model = update(model, Message::SelectDown(1));
    let model = edit_cell(model, ResortField::Notes, "bad");
    let mut model = update(model, Message::SaveAll);
    let Some(Command::Commit(job)) = model.take_commands().pop() else {
        panic!("expected a commit command");
    };

    let outcomes = job
        .items()
        .iter()
        .map(|item| RecordOutcome {
            id: item.id.clone(),
            staged: item.staged.clone(),
            result: if item.id.as_str() == "r2" {
                Err(ApiError::Rejected {
                    status: 500,
                    message: "boom".into(),
                })
            } else {
                Ok(item.record.clone().unwrap())
            },
        })
        .collect();
    let model = update(model, Message::CommitFinished(CommitReport { outcomes }));

    assert!(!model.is_saving());
    assert!(!model.pending.contains(&RecordId::from("r1")));
    assert!(model.pending.contains(&RecordId::from("r2")));
    assert_eq!(model.base_resort(&RecordId::from("r1")).unwrap().notes, "ok");
    assert_eq!(model.base_resort(&RecordId::from("r2")).unwrap().notes, "");
    let (message, level) = model.active_toast().unwrap();
    assert_eq!(level, ToastLevel::Error);
    assert!(message.contains("Failed 1"), "{message}");
}

#[test]
fn test_search_prompt_filters_live_and_cancel_clears() {
    let model = update(create_test_model(), Message::StartSearch);
    let model = type_text(model, "park");
    assert_eq!(model.visible_count(), 1);
    assert_eq!(model.selected_resort().unwrap().name, "Park City");

    let model = update(model, Message::PromptSubmit);
    assert!(model.prompt.is_none());
    assert_eq!(model.visible_count(), 1);

    let model = update(model, Message::ClearSearch);
    assert_eq!(model.visible_count(), 3);
}

#[test]
fn test_filters_apply_to_staged_values() {
    let model = update(create_test_model(), Message::SelectLast);
    let model = edit_cell(model, ResortField::Country, "Canada");
    let model = update(model, Message::CycleCountry);
    assert_eq!(model.filters.country.as_deref(), Some("Canada"));
    assert_eq!(model.visible_count(), 3);
}

#[test]
fn test_cycle_country_resets_province() {
    let model = update(create_test_model(), Message::CycleCountry);
    let model = update(model, Message::CycleProvince);
    assert_eq!(model.filters.country.as_deref(), Some("Canada"));
    assert_eq!(model.filters.province.as_deref(), Some("Alberta"));
    assert_eq!(model.visible_count(), 1);

    let model = update(model, Message::CycleCountry);
    assert_eq!(model.filters.country.as_deref(), Some("USA"));
    assert_eq!(model.filters.province, None);
    assert_eq!(model.visible_count(), 1);

    let model = update(model, Message::ClearFilters);
    assert_eq!(model.visible_count(), 3);
}

#[test]
fn test_delete_needs_second_press() {
    let mut model = update(create_test_model(), Message::DeleteSelected);
    assert!(model.delete_confirmed);
    assert!(model.take_commands().is_empty());

    let mut model = update(model, Message::DeleteSelected);
    assert_eq!(
        model.take_commands(),
        vec![Command::DeleteResort(RecordId::from("r1"))]
    );
}

#[test]
fn test_other_key_cancels_pending_delete() {
    let model = update(create_test_model(), Message::DeleteSelected);
    let model = update(model, Message::SelectDown(1));
    assert!(!model.delete_confirmed);
    let mut model = update(model, Message::DeleteSelected);
    assert!(model.take_commands().is_empty());
}

#[test]
fn test_background_result_does_not_cancel_pending_delete() {
    let model = update(create_test_model(), Message::DeleteSelected);
    let model = update(model, Message::UsersLoaded(Ok(Vec::new())));
    assert!(model.delete_confirmed);
}

#[test]
fn test_resort_deleted_drops_record_and_its_edits() {
    let model = edit_cell(create_test_model(), ResortField::Notes, "x");
    let id = RecordId::from("r1");
    let model = update(model, Message::ResortDeleted(id.clone(), Ok(())));
    assert!(model.base_resort(&id).is_none());
    assert!(model.pending.is_empty());
    assert_eq!(model.visible_count(), 2);
}

#[test]
fn test_quit_with_staged_edits_needs_confirmation() {
    let model = edit_cell(create_test_model(), ResortField::Notes, "x");
    let model = update(model, Message::Quit);
    assert!(!model.should_quit);
    assert_eq!(model.active_toast().unwrap().1, ToastLevel::Warning);

    let model = update(model, Message::Quit);
    assert!(model.should_quit);
}

#[test]
fn test_quit_without_edits_is_immediate() {
    let model = update(create_test_model(), Message::Quit);
    assert!(model.should_quit);
}

#[test]
fn test_reload_drops_edits_for_vanished_records() {
    let model = update(create_test_model(), Message::SelectLast);
    let model = edit_cell(model, ResortField::Notes, "gone soon");
    let model = update(model, Message::SelectFirst);
    let model = edit_cell(model, ResortField::Notes, "kept");

    let fresh: Vec<Resort> = sample_resorts().into_iter().take(2).collect();
    let model = update(model, Message::ResortsLoaded(Ok(fresh)));

    assert_eq!(model.pending.len(), 1);
    assert!(model.pending.contains(&RecordId::from("r1")));
    assert_eq!(model.active_toast().unwrap().1, ToastLevel::Warning);
}

#[test]
fn test_failed_load_keeps_existing_records() {
    let model = update(
        create_test_model(),
        Message::ResortsLoaded(Err(ApiError::Transport("refused".into()))),
    );
    assert_eq!(model.resorts.len(), 3);
    let (message, level) = model.active_toast().unwrap();
    assert_eq!(level, ToastLevel::Error);
    assert!(message.contains("refused"));
}

#[test]
fn test_new_resort_prompt_queues_create() {
    let model = update(create_test_model(), Message::StartCreate);
    let model = type_text(model, "  Revelstoke ");
    let mut model = update(model, Message::PromptSubmit);
    assert_eq!(
        model.take_commands(),
        vec![Command::CreateResort(Resort::named("Revelstoke"))]
    );
}

#[test]
fn test_blank_new_resort_name_is_rejected() {
    let model = update(create_test_model(), Message::StartCreate);
    let mut model = update(model, Message::PromptSubmit);
    assert!(model.take_commands().is_empty());
    assert_eq!(model.active_toast().unwrap().1, ToastLevel::Warning);
}

#[test]
fn test_user_field_edit_queues_update_only_when_changed() {
    let mut model = Model::new(Page::Users);
    model.users = vec![user("u1", "admin")];
    let model = update(model, Message::ColumnRight);
    assert_eq!(model.user_field, UserField::Email);

    let model = update(model, Message::StartEdit);
    let mut model = update(model, Message::PromptSubmit);
    assert!(model.take_commands().is_empty());

    let model = update(model, Message::StartEdit);
    let model = update(model, Message::PromptInput("root@example.test".into()));
    let mut model = update(model, Message::PromptSubmit);
    let commands = model.take_commands();
    let [Command::UpdateUser(id, changes)] = commands.as_slice() else {
        panic!("expected one user update, got {commands:?}");
    };
    assert_eq!(id.as_str(), "u1");
    assert_eq!(changes.email, "root@example.test");
    assert_eq!(changes.username, "admin");
}

#[test]
fn test_scrape_form_walks_fields_then_submits() {
    let model = Model::new(Page::Scrape);
    let model = update(model, Message::StartEdit);
    let model = update(model, Message::PromptInput("Revelstoke".into()));
    let model = update(model, Message::PromptSubmit);
    assert_eq!(model.scrape.name, "Revelstoke");
    assert_eq!(model.scrape.focus, ScrapeFocus::Url);

    let model = update(model, Message::StartEdit);
    let model = update(
        model,
        Message::PromptInput("https://revelstokemountainresort.com".into()),
    );
    let model = update(model, Message::PromptSubmit);
    assert_eq!(model.scrape.focus, ScrapeFocus::Submit);

    let mut model = update(model, Message::StartEdit);
    assert!(model.scrape.running);
    let commands = model.take_commands();
    assert!(matches!(commands.as_slice(), [Command::Scrape(req)] if req.name == "Revelstoke"));
}

#[test]
fn test_scrape_requires_name_and_url() {
    let mut model = update(Model::new(Page::Scrape), Message::SubmitScrape);
    assert!(!model.scrape.running);
    assert!(model.take_commands().is_empty());
}

#[test]
fn test_toast_lifecycle() {
    let mut model = create_test_model();
    model.show_toast(ToastLevel::Info, "hello");
    assert_eq!(model.active_toast(), Some(("hello", ToastLevel::Info)));
    assert!(!model.expire_toast(Instant::now()));
    assert!(model.expire_toast(Instant::now() + Duration::from_secs(5)));
    assert!(model.active_toast().is_none());
}

#[test]
fn test_toggle_help_changes_visibility() {
    let model = update(create_test_model(), Message::ToggleHelp);
    assert!(model.help_visible);
    let model = update(model, Message::HideHelp);
    assert!(!model.help_visible);
}

#[test]
fn test_handle_key_maps_normal_mode_keys() {
    let model = create_test_model();
    assert_eq!(
        App::handle_key(key(KeyCode::Char('j')), &model),
        Some(Message::SelectDown(1))
    );
    assert_eq!(
        App::handle_key(key(KeyCode::Char('3')), &model),
        Some(Message::SwitchPage(Page::Users))
    );
    assert_eq!(
        App::handle_key(
            KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL),
            &model
        ),
        Some(Message::SaveAll)
    );
    assert_eq!(
        App::handle_key(key(KeyCode::Char('F')), &model),
        Some(Message::CycleFlagFilter)
    );
}

#[test]
fn test_resort_only_keys_are_ignored_on_other_pages() {
    let model = Model::new(Page::Passes);
    assert_eq!(App::handle_key(key(KeyCode::Char('f')), &model), None);
    assert_eq!(
        App::handle_key(key(KeyCode::Char('a')), &model),
        Some(Message::StartCreate)
    );
    assert_eq!(
        App::handle_key(key(KeyCode::Char('a')), &Model::new(Page::Users)),
        None
    );
    assert_eq!(
        App::handle_key(key(KeyCode::Char('D')), &model),
        Some(Message::DeleteSelected)
    );
}

#[test]
fn test_handle_key_in_prompt_edits_text() {
    let model = update(create_test_model(), Message::StartSearch);
    let model = update(model, Message::PromptInput("ba".into()));
    assert_eq!(
        App::handle_key(key(KeyCode::Char('q')), &model),
        Some(Message::PromptInput("baq".into()))
    );
    assert_eq!(
        App::handle_key(key(KeyCode::Backspace), &model),
        Some(Message::PromptInput("b".into()))
    );
    assert_eq!(
        App::handle_key(key(KeyCode::Esc), &model),
        Some(Message::PromptCancel)
    );
}

#[test]
fn test_any_key_closes_help() {
    let model = update(create_test_model(), Message::ToggleHelp);
    assert_eq!(
        App::handle_key(key(KeyCode::Char('x')), &model),
        Some(Message::HideHelp)
    );
}

#[test]
fn test_initial_load_fills_every_page() {
    let backend = MemoryBackend::new(
        sample_resorts(),
        vec![SkiPass::named("p1", "Epic")],
        vec![user("u1", "admin")],
    );
    let (mut app, _backend) = test_app(backend);
    let mut model = app.initial_model();
    app.run_commands(&mut model);

    assert_eq!(model.resorts.len(), 3);
    assert_eq!(model.ski_passes.len(), 1);
    assert_eq!(model.users.len(), 1);
    assert_eq!(model.api_label, "memory");
}

#[test]
fn test_save_runs_on_worker_and_reconciles() {
    let backend = MemoryBackend::new(sample_resorts(), Vec::new(), Vec::new())
        .with_latency(Duration::from_millis(20));
    let (mut app, backend) = test_app(backend);
    let mut model = app.initial_model();
    app.run_commands(&mut model);

    model = edit_cell(model, ResortField::Notes, "groomed");
    app.dispatch(&mut model, Message::SaveAll);
    assert!(model.is_saving());

    wait_for_save(&mut app, &mut model);
    assert!(model.pending.is_empty());
    assert_eq!(backend.update_log(), vec![RecordId::from("r1")]);
    assert_eq!(backend.resorts()[0].notes, "groomed");
    assert_eq!(model.resorts[0].notes, "groomed");
}

#[test]
fn test_partial_failure_keeps_only_failed_record_staged() {
    let (mut app, backend) = test_app(MemoryBackend::new(sample_resorts(), Vec::new(), Vec::new()));
    let mut model = app.initial_model();
    app.run_commands(&mut model);
    backend.fail_on(
        &RecordId::from("r2"),
        ApiError::Rejected {
            status: 422,
            message: "invalid".into(),
        },
    );

    for _ in 0..3 {
        model = edit_cell(model, ResortField::Notes, "batch");
        model = update(model, Message::SelectDown(1));
    }
    app.dispatch(&mut model, Message::SaveAll);
    wait_for_save(&mut app, &mut model);

    assert_eq!(backend.update_log().len(), 3);
    assert_eq!(model.pending.len(), 1);
    assert!(model.pending.contains(&RecordId::from("r2")));

    backend.heal(&RecordId::from("r2"));
    app.dispatch(&mut model, Message::SaveAll);
    wait_for_save(&mut app, &mut model);
    assert!(model.pending.is_empty());
}

#[test]
fn test_create_and_delete_through_backend() {
    let (mut app, backend) = test_app(MemoryBackend::new(sample_resorts(), Vec::new(), Vec::new()));
    let mut model = app.initial_model();
    app.run_commands(&mut model);

    app.dispatch(&mut model, Message::StartCreate);
    app.dispatch(&mut model, Message::PromptInput("Revelstoke".into()));
    app.dispatch(&mut model, Message::PromptSubmit);
    assert_eq!(model.resorts.len(), 4);
    assert_eq!(backend.resorts().len(), 4);

    app.dispatch(&mut model, Message::SelectFirst);
    app.dispatch(&mut model, Message::DeleteSelected);
    app.dispatch(&mut model, Message::DeleteSelected);
    assert_eq!(model.resorts.len(), 3);
    assert!(backend.resorts().iter().all(|r| r.id.as_str() != "r1"));
}

#[test]
fn test_user_update_through_backend() {
    let (mut app, backend) = test_app(MemoryBackend::new(
        Vec::new(),
        Vec::new(),
        vec![user("u1", "admin")],
    ));
    let mut model = app.initial_model();
    app.run_commands(&mut model);

    app.dispatch(&mut model, Message::SwitchPage(Page::Users));
    app.dispatch(&mut model, Message::StartEdit);
    app.dispatch(&mut model, Message::PromptInput("root".into()));
    app.dispatch(&mut model, Message::PromptSubmit);

    assert_eq!(model.users[0].username, "root");
    assert_eq!(backend.fetch_users().unwrap()[0].username, "root");
}

#[test]
fn test_revert_during_save_stays_staged_after_reconcile() {
    let id = RecordId::from("r1");
    let model = edit_cell(create_test_model(), ResortField::Notes, "x");
    let mut model = update(model, Message::SaveAll);
    let Some(Command::Commit(job)) = model.take_commands().pop() else {
        panic!("expected a commit command");
    };

    // Back to the base value while the save still carries "x".
    let model = edit_cell(model, ResortField::Notes, "");
    assert_eq!(
        model.pending.get(&id, ResortField::Notes),
        Some(&FieldValue::Text(String::new()))
    );

    let mut model = update(model, Message::CommitFinished(succeed_all(&job)));
    assert_eq!(model.base_resort(&id).unwrap().notes, "x");
    assert_eq!(model.selected_resort().unwrap().notes, "");
    assert!(model.pending.is_staged(&id, ResortField::Notes));

    let mut model = update(model, Message::SaveAll);
    let Some(Command::Commit(next)) = model.take_commands().pop() else {
        panic!("expected the revert to be saved");
    };
    assert_eq!(next.items()[0].record.as_ref().unwrap().notes, "");
}

#[test]
fn test_country_cycle_reaches_every_case_variant() {
    let mut model = Model::new(Page::Resorts).with_resorts(vec![
        resort("r1", "Alta", "USA", "Utah"),
        resort("r2", "Snowbird", "usa", "Utah"),
        resort("r3", "Vail", "USA", "Colorado"),
        resort("r4", "Mulungushi", "Zambia", ""),
    ]);
    let mut seen = Vec::new();
    for _ in 0..4 {
        model = update(model, Message::CycleCountry);
        seen.push(model.filters.country.clone());
    }
    assert_eq!(
        seen,
        vec![
            Some("USA".to_string()),
            Some("usa".to_string()),
            Some("Zambia".to_string()),
            None
        ]
    );
}

#[test]
fn test_new_ski_pass_prompt_queues_create() {
    let model = update(passes_model(), Message::StartCreate);
    assert_eq!(model.page, Page::Passes);
    assert!(matches!(model.prompt, Some(Prompt::NewSkiPass { .. })));

    let model = update(model, Message::PromptInput("  Indy Pass ".into()));
    let mut model = update(model, Message::PromptSubmit);
    let commands = model.take_commands();
    let [Command::CreateSkiPass(pass)] = commands.as_slice() else {
        panic!("expected a create command, got {commands:?}");
    };
    assert_eq!(pass.name, "Indy Pass");
    assert!(pass.id.is_empty());
}

#[test]
fn test_blank_ski_pass_name_is_rejected() {
    let model = update(passes_model(), Message::StartCreate);
    let mut model = update(model, Message::PromptSubmit);
    assert!(model.take_commands().is_empty());
    assert_eq!(model.active_toast().unwrap().1, ToastLevel::Warning);
}

#[test]
fn test_pass_column_edit_queues_update() {
    let mut model = passes_model();
    model = update(model, Message::ColumnRight);
    model = update(model, Message::ColumnRight);
    assert_eq!(model.selected_pass_field(), PassField::Season);

    let model = update(model, Message::StartEdit);
    assert!(matches!(
        model.prompt,
        Some(Prompt::PassField {
            field: PassField::Season,
            ..
        })
    ));
    let model = update(model, Message::PromptInput("2025-2026".into()));
    let mut model = update(model, Message::PromptSubmit);
    let commands = model.take_commands();
    let [Command::UpdateSkiPass(pass)] = commands.as_slice() else {
        panic!("expected an update command, got {commands:?}");
    };
    assert_eq!(pass.id.as_str(), "p1");
    assert_eq!(pass.season, "2025-2026");
    // The list only changes once the backend confirms.
    assert_eq!(model.ski_passes[0].season, "");
}

#[test]
fn test_unchanged_pass_field_queues_nothing() {
    let model = update(passes_model(), Message::StartEdit);
    let mut model = update(model, Message::PromptSubmit);
    assert!(model.prompt.is_none());
    assert!(model.take_commands().is_empty());
}

#[test]
fn test_invalid_price_keeps_pass_prompt_open() {
    let mut model = passes_model();
    for _ in 0..3 {
        model = update(model, Message::ColumnRight);
    }
    assert_eq!(model.selected_pass_field(), PassField::AdultPrice);

    let model = update(model, Message::StartEdit);
    let model = update(model, Message::PromptInput("cheap".into()));
    let mut model = update(model, Message::PromptSubmit);
    assert!(model.take_commands().is_empty());
    assert!(matches!(
        &model.prompt,
        Some(Prompt::PassField { input, .. }) if input == "cheap"
    ));
    assert_eq!(model.active_toast().unwrap().1, ToastLevel::Error);
}

#[test]
fn test_edit_on_active_column_toggles_pass() {
    let mut model = passes_model();
    model.pass_column = PassField::ALL.len() - 1;
    assert_eq!(model.selected_pass_field(), PassField::Active);

    let mut model = update(model, Message::StartEdit);
    assert!(model.prompt.is_none());
    let commands = model.take_commands();
    let [Command::UpdateSkiPass(pass)] = commands.as_slice() else {
        panic!("expected an update command, got {commands:?}");
    };
    assert!(!pass.is_active);
}

#[test]
fn test_ski_pass_create_and_edit_through_backend() {
    let (mut app, backend) = test_app(MemoryBackend::new(
        Vec::new(),
        vec![SkiPass::named("p1", "Epic")],
        Vec::new(),
    ));
    let mut model = app.initial_model();
    app.run_commands(&mut model);

    app.dispatch(&mut model, Message::SwitchPage(Page::Passes));
    app.dispatch(&mut model, Message::StartCreate);
    app.dispatch(&mut model, Message::PromptInput("Indy Pass".into()));
    app.dispatch(&mut model, Message::PromptSubmit);
    assert_eq!(model.ski_passes.len(), 2);
    assert_eq!(model.pass_selected, 1);
    assert!(!model.ski_passes[1].id.is_empty());
    assert_eq!(backend.fetch_ski_passes().unwrap().len(), 2);

    for _ in 0..3 {
        app.dispatch(&mut model, Message::ColumnRight);
    }
    app.dispatch(&mut model, Message::StartEdit);
    app.dispatch(&mut model, Message::PromptInput("$1,049".into()));
    app.dispatch(&mut model, Message::PromptSubmit);

    assert_eq!(model.ski_passes[1].price.adult, Some(1049.0));
    let stored = backend.fetch_ski_passes().unwrap();
    assert_eq!(stored[1].name, "Indy Pass");
    assert_eq!(stored[1].price.adult, Some(1049.0));
    assert_eq!(stored[0].price.adult, None);
}

/// Serves the sample resorts but panics on every resort update.
struct PanickingBackend;

impl ResortApi for PanickingBackend {
    fn fetch_resorts(&self) -> Result<Vec<Resort>, ApiError> {
        Ok(sample_resorts())
    }

    fn create_resort(&self, resort: &Resort) -> Result<Resort, ApiError> {
        Ok(resort.clone())
    }

    fn update_resort(&self, _resort: &Resort) -> Result<Resort, ApiError> {
        panic!("backend blew up mid-save");
    }

    fn delete_resort(&self, _id: &RecordId) -> Result<(), ApiError> {
        Ok(())
    }

    fn scrape_and_ingest(&self, request: &ScrapeRequest) -> Result<Resort, ApiError> {
        Ok(Resort::named(request.name.clone()))
    }
}

impl SkiPassApi for PanickingBackend {
    fn fetch_ski_passes(&self) -> Result<Vec<SkiPass>, ApiError> {
        Ok(Vec::new())
    }

    fn create_ski_pass(&self, pass: &SkiPass) -> Result<SkiPass, ApiError> {
        Ok(pass.clone())
    }

    fn update_ski_pass(&self, pass: &SkiPass) -> Result<SkiPass, ApiError> {
        Ok(pass.clone())
    }

    fn delete_ski_pass(&self, _id: &RecordId) -> Result<(), ApiError> {
        Ok(())
    }
}

impl UserApi for PanickingBackend {
    fn fetch_users(&self) -> Result<Vec<User>, ApiError> {
        Ok(Vec::new())
    }

    fn update_user(&self, id: &RecordId, update: &UserUpdate) -> Result<User, ApiError> {
        Ok(User {
            id: id.clone(),
            username: update.username.clone(),
            email: update.email.clone(),
            created_at: None,
        })
    }

    fn delete_user(&self, _id: &RecordId) -> Result<(), ApiError> {
        Ok(())
    }
}

#[test]
fn test_panicking_save_fails_batch_and_allows_retry() {
    let mut app = App::new(Arc::new(PanickingBackend));
    let mut model = app.initial_model();
    app.run_commands(&mut model);

    model = edit_cell(model, ResortField::Notes, "x");
    app.dispatch(&mut model, Message::SaveAll);
    assert!(model.is_saving());
    wait_for_save(&mut app, &mut model);

    assert!(!app.is_saving());
    assert!(model.pending.is_staged(&RecordId::from("r1"), ResortField::Notes));
    assert_eq!(model.resorts[0].notes, "");
    let (message, level) = model.active_toast().unwrap();
    assert_eq!(level, ToastLevel::Error);
    assert!(message.contains("Failed 1"), "{message}");

    app.dispatch(&mut model, Message::SaveAll);
    assert!(model.is_saving());
    wait_for_save(&mut app, &mut model);
    assert!(model.pending.contains(&RecordId::from("r1")));
}
