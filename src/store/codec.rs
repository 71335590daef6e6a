//! JSON persistence for the library. The on-disk document is two ordered
//! arrays, `songs` and `playlists`, holding the records from
//! [`crate::models`].

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{PersistenceError, ValidationError};
use crate::models::{Playlist, PlaylistRecord, Song, SongRecord};

/// Everything the library persists: the authoritative song list and the
/// playlists that reference it.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LibraryState {
    pub songs: Vec<Rc<Song>>,
    pub playlists: Vec<Playlist>,
}

#[derive(Serialize, Deserialize)]
struct LibraryDocument {
    songs: Vec<SongRecord>,
    playlists: Vec<PlaylistRecord>,
}

impl LibraryDocument {
    fn from_state(state: &LibraryState) -> Self {
        Self {
            songs: state.songs.iter().map(|song| song.to_record()).collect(),
            playlists: state
                .playlists
                .iter()
                .map(|playlist| playlist.to_record())
                .collect(),
        }
    }

    fn into_state(self) -> Result<LibraryState, ValidationError> {
        let songs = self
            .songs
            .into_iter()
            .map(|record| Song::from_record(record).map(Rc::new))
            .collect::<Result<Vec<_>, _>>()?;
        let mut playlists = self
            .playlists
            .into_iter()
            .map(Playlist::from_record)
            .collect::<Result<Vec<_>, _>>()?;
        for playlist in &mut playlists {
            playlist.relink(&songs);
        }
        Ok(LibraryState { songs, playlists })
    }
}

/// Read the library at `path`. A missing file is an empty library, not an
/// error; anything unreadable or invalid fails the whole load.
pub fn load(path: &Path) -> Result<LibraryState, PersistenceError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no library file yet, starting empty");
            return Ok(LibraryState::default());
        }
        Err(err) => return Err(PersistenceError::io(path, err)),
    };

    let document: LibraryDocument = serde_json::from_reader(BufReader::new(file)).map_err(
        |source| PersistenceError::Malformed {
            path: path.to_path_buf(),
            source,
        },
    )?;

    document
        .into_state()
        .map_err(|source| PersistenceError::Invalid {
            path: path.to_path_buf(),
            source,
        })
}

/// Write the full library to `path`, replacing it atomically: the document
/// goes to a temp file in the same directory which is then renamed over the
/// destination.
pub fn save(path: &Path, state: &LibraryState) -> Result<(), PersistenceError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|err| PersistenceError::io(dir, err))?;

    let mut staged = NamedTempFile::new_in(dir).map_err(|err| PersistenceError::io(dir, err))?;
    {
        let mut writer = BufWriter::new(&mut staged);
        serde_json::to_writer_pretty(&mut writer, &LibraryDocument::from_state(state))
            .map_err(|err| PersistenceError::io(path, err.into()))?;
        writer
            .flush()
            .map_err(|err| PersistenceError::io(path, err))?;
    }
    staged
        .as_file()
        .sync_all()
        .map_err(|err| PersistenceError::io(path, err))?;
    staged
        .persist(path)
        .map_err(|err| PersistenceError::io(path, err.error))?;

    debug!(
        path = %path.display(),
        songs = state.songs.len(),
        playlists = state.playlists.len(),
        "library saved"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_state() -> LibraryState {
        let alpha = Rc::new(Song::new("Alpha", "A1, A2", "Alb", "Rock", "3:30").unwrap());
        let beta = Rc::new(Song::new("Beta", "B", "", "", "12:01").unwrap());
        let mut playlist = Playlist::new("Road Trip");
        playlist.add_song(Rc::clone(&alpha));
        playlist.add_song(Rc::clone(&alpha));
        LibraryState {
            songs: vec![alpha, beta],
            playlists: vec![playlist, Playlist::new("Empty")],
        }
    }

    #[test]
    fn missing_file_is_empty_library() {
        let dir = TempDir::new().unwrap();
        let state = load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(state, LibraryState::default());
    }

    #[test]
    fn save_then_load_restores_state_and_sharing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("library.json");
        let state = sample_state();

        save(&path, &state).unwrap();
        let loaded = load(&path).unwrap();

        assert_eq!(loaded, state);
        let entry = &loaded.playlists[0].songs()[0];
        assert!(Rc::ptr_eq(entry, &loaded.songs[0]));
    }

    #[test]
    fn save_leaves_only_the_library_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("library.json");
        save(&path, &sample_state()).unwrap();
        save(&path, &LibraryState::default()).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("library.json")]);
        assert_eq!(load(&path).unwrap(), LibraryState::default());
    }

    #[test]
    fn document_shape() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("library.json");
        save(&path, &sample_state()).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["songs"][0]["name"], "Alpha");
        assert_eq!(value["songs"][0]["artists"][1], "A2");
        assert_eq!(value["playlists"][0]["name"], "Road Trip");
        assert_eq!(value["playlists"][0]["songs"][1]["duration"], "3:30");
    }

    #[test]
    fn malformed_json_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("library.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            load(&path),
            Err(PersistenceError::Malformed { .. })
        ));
    }

    #[test]
    fn missing_section_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("library.json");
        fs::write(&path, r#"{ "songs": [] }"#).unwrap();
        assert!(matches!(
            load(&path),
            Err(PersistenceError::Malformed { .. })
        ));
    }

    #[test]
    fn invalid_song_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("library.json");
        fs::write(
            &path,
            r#"{ "songs": [{ "name": "X", "artists": ["A"], "album": "", "genre": "", "duration": "9:99" }], "playlists": [] }"#,
        )
        .unwrap();
        assert!(matches!(
            load(&path),
            Err(PersistenceError::Invalid {
                source: ValidationError::BadDuration(_),
                ..
            })
        ));
    }
}
