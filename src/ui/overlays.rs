use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph};

use crate::app::Model;

use super::style;

const HELP_SECTIONS: &[(&str, &[&str])] = &[
    (
        "Navigation",
        &[
            "  j/k or Up/Down      Move row",
            "  h/l or Left/Right   Move column",
            "  PageUp/PageDown     Ten rows",
            "  g / G               First / last row",
            "  Tab, 1-4            Switch page",
        ],
    ),
    (
        "Editing (staged until saved)",
        &[
            "  Enter / e           Edit cell",
            "  f                   Toggle flagged",
            "  u / U               Revert cell / resort",
            "  X                   Discard all staged edits",
            "  s / Ctrl-s          Save all staged edits",
        ],
    ),
    (
        "Filters",
        &[
            "  /                   Search (Esc clears)",
            "  c / p               Cycle country / province",
            "  P / L / F           Passes / lifts / flagged",
            "  0                   Clear all filters",
        ],
    ),
    (
        "Records",
        &[
            "  a                   Add resort / ski pass",
            "  Enter on Active     Toggle ski pass active",
            "  D (twice)           Delete selected row",
            "  r                   Reload from backend",
        ],
    ),
    (
        "Other",
        &[
            "  q / Ctrl-c          Quit (twice with unsaved edits)",
            "  ? / F1              Toggle help",
        ],
    ),
];

pub fn render_help_overlay(model: &Model, frame: &mut Frame, area: Rect) {
    let popup_width = area.width.saturating_sub(12).max(48);
    let popup_height = area.height.saturating_sub(4).max(12);
    let popup = centered_popup_rect(popup_width, popup_height, area);

    let global_cfg = model
        .config_global_path
        .as_ref()
        .map_or_else(|| "<unknown>".to_string(), |p| p.display().to_string());
    let local_cfg = model
        .config_local_path
        .as_ref()
        .map_or_else(|| "<none>".to_string(), |p| p.display().to_string());

    let mut lines: Vec<Line> = Vec::new();
    for (title, rows) in HELP_SECTIONS {
        lines.push(Line::styled(*title, style::section_style()));
        lines.extend(rows.iter().map(|row| Line::raw(*row)));
        lines.push(Line::raw(""));
    }
    lines.push(Line::styled("Config", style::section_style()));
    lines.push(Line::raw(format!("  Global: {global_cfg}")));
    lines.push(Line::raw(format!("  Local override: {local_cfg}")));
    lines.push(Line::raw(""));
    lines.push(Line::styled("Any key closes", style::dim_style()));

    let block = Block::default()
        .title("Help")
        .borders(Borders::ALL)
        .padding(Padding::horizontal(1))
        .style(Style::default().bg(Color::Black).fg(Color::White));

    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

fn centered_popup_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w) / 2);
    let y = area.y + (area.height.saturating_sub(h) / 2);
    Rect::new(x, y, w, h)
}
