//! Ratatui front-end. Owns the terminal and every prompt; all record work is
//! delegated to [`crate::Library`].

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
