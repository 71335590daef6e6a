//! Core library surface for the Music Library Manager TUI application.
//!
//! The store owns every song and playlist and writes the library back to its
//! JSON file after each change. The `bin` target wires it to the terminal UI,
//! but tests and benches drive the store directly.
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod store;
pub mod ui;

pub use config::AppConfig;
pub use error::{PersistenceError, ValidationError};
pub use logging::init_logging;

/// The two domain types that the other layers manipulate.
pub use models::{Playlist, Song};

pub use store::LibraryStore;

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
