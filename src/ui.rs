//! Ratatui front-end for the brew log: a browsable list of past brews and a
//! full-screen form for logging a new one.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
