use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use directories::BaseDirs;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".music-library-manager";
/// Library file stored inside the application data directory.
const DATA_FILE_NAME: &str = "music_data.json";
/// Log file written next to the library file.
const LOG_FILE_NAME: &str = "music-library.log";

/// Where the application reads and writes its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_file: PathBuf,
    pub export_dir: PathBuf,
    pub log_file: PathBuf,
}

impl AppConfig {
    /// Fill in defaults for anything not given explicitly. The home directory
    /// is only consulted when no data file was supplied.
    pub fn resolve(
        data_file: Option<PathBuf>,
        export_dir: Option<PathBuf>,
        log_file: Option<PathBuf>,
    ) -> Result<Self> {
        let data_file = match data_file {
            Some(path) => path,
            None => default_data_dir()?.join(DATA_FILE_NAME),
        };
        let log_file = log_file.unwrap_or_else(|| sibling(&data_file, LOG_FILE_NAME));
        let export_dir = export_dir.unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            data_file,
            export_dir,
            log_file,
        })
    }
}

/// Resolve the application folder inside the user's home.
fn default_data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}

fn sibling(path: &Path, file_name: &str) -> PathBuf {
    match path.parent() {
        Some(parent) => parent.join(file_name),
        None => PathBuf::from(file_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_defaults_next_to_explicit_data_file() {
        let config = AppConfig::resolve(Some(PathBuf::from("/tmp/music/lib.json")), None, None)
            .unwrap();
        assert_eq!(config.log_file, PathBuf::from("/tmp/music/music-library.log"));
        assert_eq!(config.export_dir, PathBuf::from("."));
    }

    #[test]
    fn explicit_values_win() {
        let config = AppConfig::resolve(
            Some(PathBuf::from("lib.json")),
            Some(PathBuf::from("exports")),
            Some(PathBuf::from("debug.log")),
        )
        .unwrap();
        assert_eq!(
            config,
            AppConfig {
                data_file: PathBuf::from("lib.json"),
                export_dir: PathBuf::from("exports"),
                log_file: PathBuf::from("debug.log"),
            }
        );
    }
}
