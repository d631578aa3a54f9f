use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::{Model, Page, ScrapeFocus, UserField};
use crate::record::{FieldValue, PassField, Resort, ResortField};

use super::{overlays, status, style};

/// Width of the staged/flagged marker column.
const MARKER_WIDTH: u16 = 2;

/// Screen regions, top to bottom.
pub struct ScreenLayout {
    pub tabs: Rect,
    pub body: Rect,
    pub filters: Rect,
    pub status: Rect,
    pub message: Rect,
}

pub fn split_screen(area: Rect) -> ScreenLayout {
    let [tabs, body, filters, status, message] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(area);
    ScreenLayout {
        tabs,
        body,
        filters,
        status,
        message,
    }
}

/// Render the complete UI.
pub fn view(model: &Model, frame: &mut Frame) {
    let area = frame.area();
    let layout = split_screen(area);

    status::render_tabs(model, frame, layout.tabs);
    match model.page {
        Page::Resorts => render_resorts(model, frame, layout.body),
        Page::Passes => render_passes(model, frame, layout.body),
        Page::Users => render_users(model, frame, layout.body),
        Page::Scrape => render_scrape(model, frame, layout.body),
    }
    status::render_filter_bar(model, frame, layout.filters);
    status::render_status_bar(model, frame, layout.status);
    if model.prompt.is_some() {
        status::render_prompt_bar(model, frame, layout.message);
    } else if model.active_toast().is_some() {
        status::render_toast_bar(model, frame, layout.message);
    } else {
        status::render_detail_bar(model, frame, layout.message);
    }

    if model.help_visible {
        overlays::render_help_overlay(model, frame, area);
    }
}

/// Display width of a resort column.
pub const fn column_width(field: ResortField) -> u16 {
    match field {
        ResortField::Name | ResortField::Website | ResortField::Notes => 24,
        ResortField::Information => 28,
        ResortField::Province => 14,
        ResortField::Country => 12,
        ResortField::Location => 20,
        ResortField::SkiPasses => 18,
        ResortField::MapboxVector => 16,
        ResortField::SnowCats | ResortField::Helicopters => 14,
        ResortField::LongestRun
        | ResortField::BaseElevation
        | ResortField::TopElevation
        | ResortField::SkiableTerrain => 10,
        ResortField::Runs | ResortField::Lifts => 9,
        ResortField::TerrainParks | ResortField::Gondolas => 8,
        ResortField::Flagged => 7,
    }
}

/// Indices into [`ResortField::ALL`] to draw in `width` cells.
///
/// The name column is always first. The rest is a window that keeps the
/// cursor column on screen.
pub fn visible_columns(cursor: usize, width: u16) -> Vec<usize> {
    let spacing = 1;
    let mut used = MARKER_WIDTH + spacing + column_width(ResortField::ALL[0]) + spacing;
    let start = cursor.clamp(1, ResortField::ALL.len() - 1);

    let mut right = Vec::new();
    for idx in start..ResortField::ALL.len() {
        let needed = column_width(ResortField::ALL[idx]) + spacing;
        if used + needed > width && !right.is_empty() {
            break;
        }
        used += needed;
        right.push(idx);
    }
    let mut left = Vec::new();
    for idx in (1..start).rev() {
        let needed = column_width(ResortField::ALL[idx]) + spacing;
        if used + needed > width {
            break;
        }
        used += needed;
        left.push(idx);
    }

    let mut columns = vec![0];
    columns.extend(left.into_iter().rev());
    columns.extend(right);
    columns
}

/// Cut `text` to `width` display cells, marking the cut with an ellipsis.
pub fn truncate(text: &str, width: usize) -> String {
    let flat = text.replace(['\n', '\r'], " ");
    if UnicodeWidthStr::width(flat.as_str()) <= width {
        return flat;
    }
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in flat.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

/// Cell text for one field, with ski pass ids shown as names.
pub fn cell_text(model: &Model, resort: &Resort, field: ResortField) -> String {
    match resort.get(field) {
        FieldValue::Passes(ids) => ids
            .iter()
            .map(|id| model.ski_pass_name(id))
            .collect::<Vec<_>>()
            .join(", "),
        other => other.display(),
    }
}

fn render_resorts(model: &Model, frame: &mut Frame, area: Rect) {
    let title = format!(
        " Resorts ({}/{}) ",
        model.visible_count(),
        model.resorts.len()
    );
    let block = Block::default().title(title).borders(Borders::ALL);

    if model.visible_count() == 0 {
        let text = if model.resorts.is_empty() {
            "No resorts loaded. Press r to reload, a to add one."
        } else {
            "No resorts match the current filters. Press 0 to clear them."
        };
        let empty = Paragraph::new(text).style(style::dim_style()).block(block);
        frame.render_widget(empty, area);
        return;
    }

    let columns = visible_columns(model.column, area.width.saturating_sub(2));
    let header = Row::new(
        std::iter::once(Cell::from(""))
            .chain(columns.iter().map(|&idx| {
                let field = ResortField::ALL[idx];
                Cell::from(truncate(field.label(), usize::from(column_width(field))))
            }))
            .collect::<Vec<_>>(),
    )
    .style(style::header_style());

    let rows: Vec<Row> = model
        .visible_resorts()
        .enumerate()
        .map(|(row_idx, resort)| {
            let is_selected = row_idx == model.selected;
            let staged = model.pending.contains(&resort.id);
            let row_style = if resort.flagged {
                style::flagged_row_style()
            } else {
                Style::default()
            };
            let marker = format!(
                "{}{}",
                if staged { "*" } else { " " },
                if resort.flagged { "!" } else { " " }
            );
            let mut cells = vec![Cell::from(marker).style(style::staged_cell_style())];
            for &col in &columns {
                let field = ResortField::ALL[col];
                let mut cell_style = row_style;
                if model.pending.is_staged(&resort.id, field) {
                    cell_style = cell_style.patch(style::staged_cell_style());
                }
                if is_selected && col == model.column {
                    cell_style = cell_style.patch(style::cursor_cell_style());
                }
                let text = truncate(
                    &cell_text(model, resort, field),
                    usize::from(column_width(field)),
                );
                cells.push(Cell::from(text).style(cell_style));
            }
            Row::new(cells)
        })
        .collect();

    let widths = std::iter::once(Constraint::Length(MARKER_WIDTH)).chain(
        columns
            .iter()
            .map(|&idx| Constraint::Length(column_width(ResortField::ALL[idx]))),
    );
    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .column_spacing(1)
        .row_highlight_style(style::selected_row_style());
    let mut state = TableState::default().with_selected(Some(model.selected));
    frame.render_stateful_widget(table, area, &mut state);
}

fn render_passes(model: &Model, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .title(format!(" Ski Passes ({}) ", model.ski_passes.len()))
        .borders(Borders::ALL);
    if model.ski_passes.is_empty() {
        let empty = Paragraph::new("No ski passes loaded. Press r to reload or a to add one.")
            .style(style::dim_style())
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let header = Row::new([
        "Name", "Type", "Season", "Adult", "Active", "Resorts", "Benefits",
    ])
    .style(style::header_style());
    let rows: Vec<Row> = model
        .ski_passes
        .iter()
        .enumerate()
        .map(|(idx, pass)| {
            let resorts = model
                .view()
                .iter()
                .filter(|resort| resort.ski_passes.contains(&pass.id))
                .count();
            let cursor = |field: PassField| {
                if idx == model.pass_selected && model.selected_pass_field() == field {
                    style::cursor_cell_style()
                } else {
                    Style::default()
                }
            };
            let row = Row::new([
                Cell::from(truncate(&pass.name, 24)).style(cursor(PassField::Name)),
                Cell::from(truncate(&pass.pass_type, 12)).style(cursor(PassField::PassType)),
                Cell::from(truncate(&pass.season, 12)).style(cursor(PassField::Season)),
                Cell::from(pass.adult_price_label()).style(cursor(PassField::AdultPrice)),
                Cell::from(if pass.is_active { "yes" } else { "no" })
                    .style(cursor(PassField::Active)),
                Cell::from(resorts.to_string()),
                Cell::from(pass.benefits.join(", ")),
            ]);
            if pass.is_active {
                row
            } else {
                row.style(style::inactive_style())
            }
        })
        .collect();
    let widths = [
        Constraint::Length(24),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Length(10),
        Constraint::Length(6),
        Constraint::Length(8),
        Constraint::Min(10),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .column_spacing(1)
        .row_highlight_style(style::selected_row_style().add_modifier(Modifier::BOLD));
    let mut state = TableState::default().with_selected(Some(model.pass_selected));
    frame.render_stateful_widget(table, area, &mut state);
}

fn render_users(model: &Model, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .title(format!(" Users ({}) ", model.users.len()))
        .borders(Borders::ALL);
    if model.users.is_empty() {
        let empty = Paragraph::new("No users loaded. Press r to reload.")
            .style(style::dim_style())
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let header = Row::new(["Username", "Email", "Created"]).style(style::header_style());
    let rows: Vec<Row> = model
        .users
        .iter()
        .enumerate()
        .map(|(idx, user)| {
            let cursor = |field: UserField| {
                if idx == model.user_selected && model.user_field == field {
                    style::cursor_cell_style()
                } else {
                    Style::default()
                }
            };
            Row::new([
                Cell::from(truncate(&user.username, 20)).style(cursor(UserField::Username)),
                Cell::from(truncate(&user.email, 32)).style(cursor(UserField::Email)),
                Cell::from(user.created_label().to_string()),
            ])
        })
        .collect();
    let widths = [
        Constraint::Length(20),
        Constraint::Length(32),
        Constraint::Length(12),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .column_spacing(1)
        .row_highlight_style(style::selected_row_style());
    let mut state = TableState::default().with_selected(Some(model.user_selected));
    frame.render_stateful_widget(table, area, &mut state);
}

fn render_scrape(model: &Model, frame: &mut Frame, area: Rect) {
    let form = &model.scrape;
    let row_style = |focus: ScrapeFocus| {
        if form.focus == focus {
            style::cursor_cell_style()
        } else {
            Style::default()
        }
    };
    let placeholder = |value: &str| {
        if value.is_empty() {
            "<empty>".to_string()
        } else {
            value.to_string()
        }
    };

    let mut lines = vec![
        Line::styled("Add a resort from its website", style::section_style()),
        Line::raw(""),
        Line::from(vec![
            Span::raw("  Resort name  "),
            Span::styled(placeholder(&form.name), row_style(ScrapeFocus::Name)),
        ]),
        Line::from(vec![
            Span::raw("  Website URL  "),
            Span::styled(placeholder(&form.url), row_style(ScrapeFocus::Url)),
        ]),
        Line::raw(""),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("[ Scrape and add ]", row_style(ScrapeFocus::Submit)),
        ]),
        Line::raw(""),
    ];
    if form.running {
        lines.push(Line::styled(
            "  Scraping... the backend is reading the page",
            style::staged_cell_style(),
        ));
    } else {
        lines.push(Line::styled(
            "  j/k move  Enter edit or submit",
            style::dim_style(),
        ));
    }

    let block = Block::default().title(" Scrape ").borders(Borders::ALL);
    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}
