use ratatui::prelude::*;
use ratatui::widgets::{Paragraph, Tabs};

use crate::app::{Model, Page, Prompt, ScrapeFocus, ToastLevel};

use super::style;

pub fn render_tabs(model: &Model, frame: &mut Frame, area: Rect) {
    let titles = Page::ALL
        .iter()
        .enumerate()
        .map(|(idx, page)| format!("{} {}", idx + 1, page.title()));
    let selected = Page::ALL
        .iter()
        .position(|page| *page == model.page)
        .unwrap_or(0);
    let tabs = Tabs::new(titles)
        .select(selected)
        .style(style::tab_style(false))
        .highlight_style(style::tab_style(true))
        .divider("|");
    frame.render_widget(tabs, area);
}

pub fn render_filter_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let text = match model.page {
        Page::Resorts => {
            let active = model.filters.describe();
            if active.is_empty() {
                " Filters: none   / search  c country  p province  P passes  L lifts  F flagged"
                    .to_string()
            } else {
                format!(" Filters: {}   0 clears", active.join("  "))
            }
        }
        Page::Passes => " D delete  r reload".to_string(),
        Page::Users => " h/l column  Enter edit  D delete  r reload".to_string(),
        Page::Scrape => " j/k move  Enter edit or submit".to_string(),
    };
    frame.render_widget(Paragraph::new(text).style(style::dim_style()), area);
}

pub fn render_status_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let counts = match model.page {
        Page::Resorts | Page::Scrape => {
            format!("{}/{} resorts", model.visible_count(), model.resorts.len())
        }
        Page::Passes => format!("{} ski passes", model.ski_passes.len()),
        Page::Users => format!("{} users", model.users.len()),
    };
    let pending = if model.pending.is_empty() {
        String::new()
    } else {
        format!(
            "  [{} pending: {} field(s)]",
            model.pending.len(),
            model.pending.field_count()
        )
    };
    let saving = if model.is_saving() { "  [saving...]" } else { "" };
    let api = if model.api_label.is_empty() {
        String::new()
    } else {
        format!("  {}", model.api_label)
    };

    let status = format!(
        " {}  {}{}{}{}  ?:help",
        model.page.title(),
        counts,
        pending,
        saving,
        api
    );
    frame.render_widget(Paragraph::new(status).style(style::bar_style()), area);
}

pub fn render_prompt_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some(prompt) = model.prompt.as_ref() else {
        return;
    };
    let input = prompt.text(model);
    let text = match prompt {
        Prompt::Search => format!("/{input}_  Enter: keep  Esc: clear"),
        Prompt::Cell { field, .. } => format!(
            "{} ({}): {input}_  Enter: stage  Esc: cancel",
            field.label(),
            field.kind()
        ),
        Prompt::NewResort { .. } => format!("New resort name: {input}_  Enter: add  Esc: cancel"),
        Prompt::PassField { field, .. } => {
            format!("{}: {input}_  Enter: save  Esc: cancel", field.label())
        }
        Prompt::NewSkiPass { .. } => {
            format!("New ski pass name: {input}_  Enter: add  Esc: cancel")
        }
        Prompt::UserField { field, .. } => {
            format!("{}: {input}_  Enter: save  Esc: cancel", field.label())
        }
        Prompt::ScrapeField { focus, .. } => {
            let label = match focus {
                ScrapeFocus::Name => "Resort name",
                ScrapeFocus::Url | ScrapeFocus::Submit => "Website URL",
            };
            format!("{label}: {input}_  Enter: next  Esc: cancel")
        }
    };
    frame.render_widget(Paragraph::new(text).style(style::prompt_bar_style()), area);
}

pub fn render_toast_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some((message, level)) = model.active_toast() else {
        return;
    };
    let (prefix, style) = match level {
        ToastLevel::Info => (
            "[info]",
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ),
        ToastLevel::Warning => (
            "[warn]",
            Style::default().bg(Color::Yellow).fg(Color::Black),
        ),
        ToastLevel::Error => ("[error]", Style::default().bg(Color::Red).fg(Color::White)),
    };
    let toast = Paragraph::new(format!("{prefix} {message}")).style(style);
    frame.render_widget(toast, area);
}

/// Full value of the cell under the cursor, and what it was before staging.
pub fn render_detail_bar(model: &Model, frame: &mut Frame, area: Rect) {
    if model.page != Page::Resorts {
        return;
    }
    let Some(resort) = model.selected_resort() else {
        return;
    };
    let field = model.selected_field();
    let value = super::render::cell_text(model, resort, field);
    let mut spans = vec![
        Span::styled(format!(" {}: ", field.label()), style::section_style()),
        Span::raw(value),
    ];
    if model.pending.is_staged(&resort.id, field) {
        let was = model
            .base_resort(&resort.id)
            .map(|base| super::render::cell_text(model, base, field))
            .unwrap_or_default();
        spans.push(Span::styled(
            format!("  (staged, was: {was})"),
            style::staged_cell_style(),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
