//! Terminal UI components.
//!
//! Rendering is a pure function of the [`Model`](crate::app::Model):
//! - `render`: page bodies and the resort table
//! - [`style`]: Theming and colors
//! - status and overlay bars along the edges of the screen

pub mod style;

mod overlays;
mod render;
mod status;

pub use render::{
    ScreenLayout, cell_text, column_width, split_screen, truncate, view, visible_columns,
};
