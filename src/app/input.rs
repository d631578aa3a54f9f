use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{App, Message, Model, Page, Prompt};

/// Rows moved by PageUp / PageDown.
const PAGE_STEP: usize = 10;

impl App {
    pub(super) fn handle_event(event: &Event, model: &Model) -> Option<Message> {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => Self::handle_key(*key, model),
            Event::Resize(..) => Some(Message::Redraw),
            _ => None,
        }
    }

    pub(super) fn handle_key(key: KeyEvent, model: &Model) -> Option<Message> {
        if model.help_visible {
            return Some(Message::HideHelp);
        }

        if let Some(prompt) = model.prompt.as_ref() {
            return Self::handle_prompt_key(key, prompt, model);
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            // Application
            KeyCode::Char('c') if ctrl => Some(Message::Quit),
            KeyCode::Char('s') if ctrl => Some(Message::SaveAll),
            KeyCode::Char('q') => Some(Message::Quit),
            KeyCode::Char('?') | KeyCode::F(1) => Some(Message::ToggleHelp),
            KeyCode::Tab => Some(Message::NextPage),
            KeyCode::Char(c @ '1'..='4') => {
                let idx = (c as usize) - ('1' as usize);
                Page::ALL.get(idx).copied().map(Message::SwitchPage)
            }
            KeyCode::Char('r') => Some(Message::Reload),

            // Navigation
            KeyCode::Char('j') | KeyCode::Down => Some(Message::SelectDown(1)),
            KeyCode::Char('k') | KeyCode::Up => Some(Message::SelectUp(1)),
            KeyCode::PageDown => Some(Message::SelectDown(PAGE_STEP)),
            KeyCode::PageUp => Some(Message::SelectUp(PAGE_STEP)),
            KeyCode::Char('g') | KeyCode::Home => Some(Message::SelectFirst),
            KeyCode::Char('G') | KeyCode::End => Some(Message::SelectLast),
            KeyCode::Char('h') | KeyCode::Left => Some(Message::ColumnLeft),
            KeyCode::Char('l') | KeyCode::Right => Some(Message::ColumnRight),

            KeyCode::Enter | KeyCode::Char('e') => Some(Message::StartEdit),
            KeyCode::Char('D') => Some(Message::DeleteSelected),
            KeyCode::Char('a') if matches!(model.page, Page::Resorts | Page::Passes) => {
                Some(Message::StartCreate)
            }

            _ if model.page == Page::Resorts => Self::handle_resort_key(key),
            _ => None,
        }
    }

    fn handle_resort_key(key: KeyEvent) -> Option<Message> {
        match key.code {
            // Staging
            KeyCode::Char('f') => Some(Message::ToggleFlag),
            KeyCode::Char('u') => Some(Message::UnstageCell),
            KeyCode::Char('U') => Some(Message::UnstageRecord),
            KeyCode::Char('X') => Some(Message::DiscardAll),
            KeyCode::Char('s') => Some(Message::SaveAll),

            // Filters
            KeyCode::Char('/') => Some(Message::StartSearch),
            KeyCode::Esc => Some(Message::ClearSearch),
            KeyCode::Char('c') => Some(Message::CycleCountry),
            KeyCode::Char('p') => Some(Message::CycleProvince),
            KeyCode::Char('P') => Some(Message::CyclePassFilter),
            KeyCode::Char('L') => Some(Message::CycleLiftFilter),
            KeyCode::Char('F') => Some(Message::CycleFlagFilter),
            KeyCode::Char('0') => Some(Message::ClearFilters),
            _ => None,
        }
    }

    fn handle_prompt_key(key: KeyEvent, prompt: &Prompt, model: &Model) -> Option<Message> {
        let text = prompt.text(model);
        match key.code {
            KeyCode::Esc => Some(Message::PromptCancel),
            KeyCode::Enter => Some(Message::PromptSubmit),
            KeyCode::Backspace => {
                let mut next = text.to_string();
                next.pop();
                Some(Message::PromptInput(next))
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Message::PromptInput(String::new()))
            }
            KeyCode::Char(c)
                if !key.modifiers.contains(KeyModifiers::CONTROL)
                    && !key.modifiers.contains(KeyModifiers::ALT) =>
            {
                let mut next = text.to_string();
                next.push(c);
                Some(Message::PromptInput(next))
            }
            _ => None,
        }
    }
}
