//! Binary entry point: resolve paths, start logging, load the library and
//! drive the Ratatui event loop until the user exits.
use std::path::PathBuf;

use clap::Parser;
use music_library_manager::{init_logging, run_app, App, AppConfig, LibraryStore};
use tracing::info;

/// Terminal manager for a personal song library and its playlists.
#[derive(Parser, Debug)]
#[command(name = "music-library-manager", version, about)]
struct Cli {
    /// Library file to load and save
    #[arg(long, env = "MUSIC_LIBRARY_FILE")]
    data_file: Option<PathBuf>,

    /// Directory that playlist exports are written to
    #[arg(long, env = "MUSIC_LIBRARY_EXPORT_DIR")]
    export_dir: Option<PathBuf>,

    /// Log file (filter with RUST_LOG)
    #[arg(long, env = "MUSIC_LIBRARY_LOG")]
    log_file: Option<PathBuf>,
}

/// Fatal setup problems, such as an unwritable log directory, bubble up to the
/// terminal instead of crashing silently.
fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::resolve(cli.data_file, cli.export_dir, cli.log_file)?;
    init_logging(&config.log_file)?;
    info!(
        data_file = %config.data_file.display(),
        export_dir = %config.export_dir.display(),
        "starting"
    );

    let (store, load_problem) = LibraryStore::open(&config.data_file);
    let mut app = App::new(store, config.export_dir, load_problem);
    let result = run_app(&mut app);

    info!(songs = app.store().songs().len(), "exiting");
    result
}
