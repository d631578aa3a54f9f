use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use ratatui::DefaultTerminal;

use crate::app::{App, Model};

/// Poll interval while a save is running, so its result shows promptly.
const BUSY_POLL_MS: u64 = 50;
const IDLE_POLL_MS: u64 = 250;

impl App {
    /// Run the main event loop.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal initialization or the event loop
    /// encounters an I/O failure.
    pub fn run(&mut self) -> Result<()> {
        let mut terminal = ratatui::try_init()
            .context("Failed to initialize terminal - resort-admin requires an interactive terminal")?;

        let mut model = self.initial_model();
        // Paint once before the initial fetches so the user sees the frame.
        terminal.draw(|frame| crate::ui::view(&model, frame))?;
        self.run_commands(&mut model);

        let result = self.event_loop(&mut terminal, &mut model);

        ratatui::restore();
        if self.is_saving() {
            tracing::warn!("exiting while a save is still running");
        }
        result
    }

    fn event_loop(&mut self, terminal: &mut DefaultTerminal, model: &mut Model) -> Result<()> {
        let mut needs_render = true;

        loop {
            if model.expire_toast(Instant::now()) {
                needs_render = true;
            }

            if self.poll_background(model) {
                needs_render = true;
            }

            let poll_ms = if needs_render {
                0
            } else if self.is_saving() {
                BUSY_POLL_MS
            } else {
                IDLE_POLL_MS
            };
            if event::poll(Duration::from_millis(poll_ms))? {
                if let Some(msg) = Self::handle_event(&event::read()?, model) {
                    tracing::trace!(?msg, "message");
                    self.dispatch(model, msg);
                    needs_render = true;
                }

                // Coalesce key repeat bursts into a single render.
                while event::poll(Duration::from_millis(0))? {
                    if let Some(msg) = Self::handle_event(&event::read()?, model) {
                        self.dispatch(model, msg);
                        needs_render = true;
                    }
                }
            }

            if needs_render {
                terminal.draw(|frame| crate::ui::view(model, frame))?;
                needs_render = false;
            }

            if model.should_quit {
                break;
            }
        }
        Ok(())
    }
}
