//! The library store: sole owner of songs and playlists. Every mutating call
//! keeps playlists consistent with the master song list and then writes the
//! whole library back to disk before returning, so the file is never more than
//! one operation behind memory.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::{debug, info, warn};

use crate::error::PersistenceError;
use crate::models::{Playlist, Song};

use super::codec::{self, LibraryState};
use super::export::{render_playlist, write_export};
use super::undo::{UndoEntry, UndoLog};

/// Songs, playlists and the undo history for one library file. Callers own
/// the store and pass it by reference; there is no global instance.
#[derive(Debug)]
pub struct LibraryStore {
    path: PathBuf,
    state: LibraryState,
    undo: UndoLog,
}

impl LibraryStore {
    /// Open the library backed by `path`.
    ///
    /// Loading never fails outright. If the file is missing the store starts
    /// empty; if it is unreadable or invalid the store also starts empty and
    /// the problem is handed back so the caller can tell the user. Nothing
    /// from a bad file is kept.
    pub fn open(path: impl Into<PathBuf>) -> (Self, Option<PersistenceError>) {
        let path = path.into();
        let (state, problem) = match codec::load(&path) {
            Ok(state) => {
                info!(
                    path = %path.display(),
                    songs = state.songs.len(),
                    playlists = state.playlists.len(),
                    "library loaded"
                );
                (state, None)
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "discarding unreadable library");
                (LibraryState::default(), Some(err))
            }
        };

        let store = Self {
            path,
            state,
            undo: UndoLog::new(),
        };
        (store, problem)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn songs(&self) -> &[Rc<Song>] {
        &self.state.songs
    }

    pub fn playlists(&self) -> &[Playlist] {
        &self.state.playlists
    }

    pub fn state(&self) -> &LibraryState {
        &self.state
    }

    /// Number of removals that [`LibraryStore::undo`] can still reverse.
    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    /// First song whose name matches case-insensitively.
    pub fn find_song(&self, name: &str) -> Option<&Rc<Song>> {
        self.state.songs.iter().find(|song| song.matches_name(name))
    }

    /// First playlist whose name matches case-insensitively.
    pub fn find_playlist(&self, name: &str) -> Option<&Playlist> {
        self.state
            .playlists
            .iter()
            .find(|playlist| playlist.matches_name(name))
    }

    fn playlist_position(&self, name: &str) -> Option<usize> {
        self.state
            .playlists
            .iter()
            .position(|playlist| playlist.matches_name(name))
    }

    pub fn add_song(&mut self, song: Song) -> Result<Rc<Song>, PersistenceError> {
        let song = Rc::new(song);
        self.state.songs.push(Rc::clone(&song));
        info!(song = song.name(), "song added");
        self.persist()?;
        Ok(song)
    }

    /// Append several songs and persist once at the end.
    pub fn add_songs<I>(&mut self, songs: I) -> Result<usize, PersistenceError>
    where
        I: IntoIterator<Item = Song>,
    {
        let before = self.state.songs.len();
        self.state.songs.extend(songs.into_iter().map(Rc::new));
        let added = self.state.songs.len() - before;
        info!(count = added, "songs added");
        self.persist()?;
        Ok(added)
    }

    /// Remove the first song named `name` and every playlist entry with that
    /// name. Returns `None` when no song matches; nothing changes in that
    /// case.
    pub fn remove_song(&mut self, name: &str) -> Result<Option<Rc<Song>>, PersistenceError> {
        let Some(index) = self
            .state
            .songs
            .iter()
            .position(|song| song.matches_name(name))
        else {
            debug!(song = name, "remove requested for unknown song");
            return Ok(None);
        };

        let song = self.state.songs.remove(index);
        self.undo.push(UndoEntry::RemoveSong(Rc::clone(&song)));

        let cascaded: usize = self
            .state
            .playlists
            .iter_mut()
            .map(|playlist| playlist.remove_song_by_name(song.name()))
            .sum();
        info!(song = song.name(), playlist_entries = cascaded, "song removed");

        self.persist()?;
        Ok(Some(song))
    }

    /// Reverse the most recent removal. The song goes back to the end of the
    /// library only; playlist entries dropped by the removal stay dropped.
    /// Returns `None` when there is nothing to undo.
    pub fn undo(&mut self) -> Result<Option<Rc<Song>>, PersistenceError> {
        let Some(entry) = self.undo.pop() else {
            debug!("nothing to undo");
            return Ok(None);
        };

        match entry {
            UndoEntry::RemoveSong(song) => {
                self.state.songs.push(Rc::clone(&song));
                info!(song = song.name(), "song restored");
                self.persist()?;
                Ok(Some(song))
            }
        }
    }

    /// Create an empty playlist. Names need not be unique.
    pub fn create_playlist(&mut self, name: &str) -> Result<&Playlist, PersistenceError> {
        let index = self.state.playlists.len();
        self.state.playlists.push(Playlist::new(name));
        info!(playlist = name, "playlist created");
        self.persist()?;
        Ok(&self.state.playlists[index])
    }

    /// Delete the first playlist named `name`. The songs themselves stay in
    /// the library. Not recorded in the undo log.
    pub fn delete_playlist(&mut self, name: &str) -> Result<Option<Playlist>, PersistenceError> {
        match self.playlist_position(name) {
            Some(index) => self.delete_playlist_at(index),
            None => Ok(None),
        }
    }

    /// Delete the playlist at `index` in [`LibraryStore::playlists`] order.
    /// Names may repeat, so callers that already hold a position use this
    /// instead of the name lookup.
    pub fn delete_playlist_at(
        &mut self,
        index: usize,
    ) -> Result<Option<Playlist>, PersistenceError> {
        if index >= self.state.playlists.len() {
            return Ok(None);
        }

        let playlist = self.state.playlists.remove(index);
        info!(playlist = playlist.name(), index, "playlist deleted");
        self.persist()?;
        Ok(Some(playlist))
    }

    /// Append the library song named `song_name` to the playlist named
    /// `playlist_name`. Returns `false` without touching anything if either
    /// is missing. Duplicate entries are allowed.
    pub fn add_song_to_playlist(
        &mut self,
        song_name: &str,
        playlist_name: &str,
    ) -> Result<bool, PersistenceError> {
        match self.playlist_position(playlist_name) {
            Some(index) => self.add_song_to_playlist_at(song_name, index),
            None => Ok(false),
        }
    }

    /// Positional form of [`LibraryStore::add_song_to_playlist`].
    pub fn add_song_to_playlist_at(
        &mut self,
        song_name: &str,
        index: usize,
    ) -> Result<bool, PersistenceError> {
        let Some(song) = self.find_song(song_name).cloned() else {
            return Ok(false);
        };
        let Some(playlist) = self.state.playlists.get_mut(index) else {
            return Ok(false);
        };

        playlist.add_song(Rc::clone(&song));
        info!(song = song.name(), playlist = playlist.name(), "song added to playlist");
        self.persist()?;
        Ok(true)
    }

    /// Remove every entry named `song_name` from one playlist. The song stays
    /// in the library. Returns `None` if the playlist does not exist, else the
    /// number of entries removed.
    pub fn remove_song_from_playlist(
        &mut self,
        song_name: &str,
        playlist_name: &str,
    ) -> Result<Option<usize>, PersistenceError> {
        match self.playlist_position(playlist_name) {
            Some(index) => self.remove_song_from_playlist_at(song_name, index),
            None => Ok(None),
        }
    }

    /// Positional form of [`LibraryStore::remove_song_from_playlist`].
    pub fn remove_song_from_playlist_at(
        &mut self,
        song_name: &str,
        index: usize,
    ) -> Result<Option<usize>, PersistenceError> {
        let Some(playlist) = self.state.playlists.get_mut(index) else {
            return Ok(None);
        };

        let removed = playlist.remove_song_by_name(song_name);
        if removed > 0 {
            info!(
                song = song_name,
                playlist = playlist.name(),
                removed,
                "song removed from playlist"
            );
            self.persist()?;
        }
        Ok(Some(removed))
    }

    /// Case-insensitive substring search over song names, in library order.
    pub fn search_songs_by_name(&self, term: &str) -> Vec<Rc<Song>> {
        let term = term.to_lowercase();
        self.state
            .songs
            .iter()
            .filter(|song| song.name().to_lowercase().contains(&term))
            .cloned()
            .collect()
    }

    /// Render the named playlist as text, or `None` if it does not exist.
    pub fn export_playlist(&self, name: &str) -> Option<String> {
        self.find_playlist(name).map(render_playlist)
    }

    /// Write the named playlist's export file into `dir` and return its path.
    pub fn export_playlist_to(
        &self,
        name: &str,
        dir: &Path,
    ) -> Result<Option<PathBuf>, PersistenceError> {
        match self.playlist_position(name) {
            Some(index) => self.export_playlist_at(index, dir),
            None => Ok(None),
        }
    }

    /// Positional form of [`LibraryStore::export_playlist_to`].
    pub fn export_playlist_at(
        &self,
        index: usize,
        dir: &Path,
    ) -> Result<Option<PathBuf>, PersistenceError> {
        let Some(playlist) = self.state.playlists.get(index) else {
            return Ok(None);
        };
        let path = write_export(dir, playlist)?;
        info!(playlist = playlist.name(), path = %path.display(), "playlist exported");
        Ok(Some(path))
    }

    /// Write the current library to its file.
    pub fn save(&self) -> Result<(), PersistenceError> {
        self.persist()
    }

    fn persist(&self) -> Result<(), PersistenceError> {
        codec::save(&self.path, &self.state)
    }
}
