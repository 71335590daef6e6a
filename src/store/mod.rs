//! Persistence and state management split across logical submodules.

mod codec;
mod export;
mod library;
mod undo;

pub use codec::{load, save, LibraryState};
pub use export::{export_file_name, render_playlist, write_export};
pub use library::LibraryStore;
pub use undo::{UndoEntry, UndoLog};
