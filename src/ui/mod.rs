//! Ratatui front-end. `app` owns the state machine, `terminal` drives the
//! event loop, and the remaining modules hold form, list and drawing helpers.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
