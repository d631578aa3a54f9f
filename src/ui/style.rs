//! Theming and color definitions.
//!
//! Uses ANSI colors that adapt to the terminal's color palette.

use ratatui::style::{Color, Modifier, Style};

pub fn header_style() -> Style {
    Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
}

/// Whole selected row. Only adds a background so cell colors survive.
pub fn selected_row_style() -> Style {
    Style::default().bg(Color::Indexed(236))
}

/// The cell under the column cursor on the selected row.
pub fn cursor_cell_style() -> Style {
    Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD)
}

/// A cell whose value is staged but not saved.
pub fn staged_cell_style() -> Style {
    Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD)
}

pub fn flagged_row_style() -> Style {
    Style::default().fg(Color::Red)
}

pub fn inactive_style() -> Style {
    Style::default()
        .fg(Color::Indexed(245))
        .add_modifier(Modifier::DIM)
}

pub fn section_style() -> Style {
    Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD)
}

pub fn dim_style() -> Style {
    Style::default().fg(Color::Indexed(245))
}

pub fn tab_style(active: bool) -> Style {
    if active {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White).bg(Color::DarkGray)
    }
}

/// Bars along the bottom of the screen.
pub fn bar_style() -> Style {
    Style::default().bg(Color::DarkGray).fg(Color::White)
}

pub fn prompt_bar_style() -> Style {
    Style::default().bg(Color::Blue).fg(Color::White)
}
