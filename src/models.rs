//! Domain models for the music library. A [`Song`] is an immutable value that
//! validates itself on construction; a [`Playlist`] is a named, ordered list of
//! shared song handles. Both have a plain serialized "record" twin so the codec
//! never has to know how validation works.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Case-insensitive name comparison used for every lookup in the library.
/// Surrounding whitespace is ignored on both sides since song names are
/// stored trimmed.
pub fn names_match(left: &str, right: &str) -> bool {
    left.trim().to_lowercase() == right.trim().to_lowercase()
}

/// Accepts `minutes:seconds` where minutes is one or more ASCII digits and
/// seconds is exactly two digits in `00..=59`. Hour-qualified values such as
/// `1:02:03` are rejected.
pub fn is_valid_duration(duration: &str) -> bool {
    let Some((minutes, seconds)) = duration.split_once(':') else {
        return false;
    };
    if minutes.is_empty() || !minutes.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    matches!(seconds.as_bytes(), [tens, ones] if (b'0'..=b'5').contains(tens) && ones.is_ascii_digit())
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One track in the library. Fields are private so a `Song` can only come out
/// of [`Song::new`] (or [`Song::from_record`], which calls it).
pub struct Song {
    name: String,
    artists: Vec<String>,
    album: String,
    genre: String,
    duration: String,
}

impl Song {
    /// Validate the raw inputs and build a song.
    ///
    /// `artists` is a comma-delimited list; each piece is trimmed but empty
    /// pieces (from `"a,,b"` or a trailing comma) are kept as-is.
    pub fn new(
        name: &str,
        artists: &str,
        album: &str,
        genre: &str,
        duration: &str,
    ) -> Result<Self, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if !is_valid_duration(duration) {
            return Err(ValidationError::BadDuration(duration.to_string()));
        }

        Ok(Self {
            name: name.to_string(),
            artists: artists
                .split(',')
                .map(|artist| artist.trim().to_string())
                .collect(),
            album: album.to_string(),
            genre: genre.to_string(),
            duration: duration.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn artists(&self) -> &[String] {
        &self.artists
    }

    pub fn album(&self) -> &str {
        &self.album
    }

    pub fn genre(&self) -> &str {
        &self.genre
    }

    pub fn duration(&self) -> &str {
        &self.duration
    }

    /// Artists joined back into the comma-delimited form accepted by
    /// [`Song::new`].
    pub fn artists_text(&self) -> String {
        self.artists.join(", ")
    }

    pub fn matches_name(&self, name: &str) -> bool {
        names_match(&self.name, name)
    }

    pub fn to_record(&self) -> SongRecord {
        SongRecord {
            name: self.name.clone(),
            artists: self.artists.clone(),
            album: self.album.clone(),
            genre: self.genre.clone(),
            duration: self.duration.clone(),
        }
    }

    /// Rebuild a song from its record. This deliberately goes through
    /// [`Song::new`] so a hand-edited file cannot smuggle in invalid data.
    pub fn from_record(record: SongRecord) -> Result<Self, ValidationError> {
        Song::new(
            &record.name,
            &record.artists.join(", "),
            &record.album,
            &record.genre,
            &record.duration,
        )
    }
}

impl fmt::Display for Song {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} by {}", self.name, self.artists_text())
    }
}

/// Field-for-field serialized form of a [`Song`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongRecord {
    pub name: String,
    pub artists: Vec<String>,
    pub album: String,
    pub genre: String,
    pub duration: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Named ordered collection of songs. Entries are `Rc` handles shared with the
/// library's master list, so a playlist never carries song data the library
/// does not also hold.
pub struct Playlist {
    name: String,
    songs: Vec<Rc<Song>>,
}

impl Playlist {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            songs: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn songs(&self) -> &[Rc<Song>] {
        &self.songs
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn matches_name(&self, name: &str) -> bool {
        names_match(&self.name, name)
    }

    /// Append without a duplicate check; the same song may appear many times.
    pub fn add_song(&mut self, song: Rc<Song>) {
        self.songs.push(song);
    }

    /// Drop every entry whose name matches, returning how many were removed.
    pub fn remove_song_by_name(&mut self, name: &str) -> usize {
        let before = self.songs.len();
        self.songs.retain(|song| !song.matches_name(name));
        before - self.songs.len()
    }

    pub fn to_record(&self) -> PlaylistRecord {
        PlaylistRecord {
            name: self.name.clone(),
            songs: self.songs.iter().map(|song| song.to_record()).collect(),
        }
    }

    pub fn from_record(record: PlaylistRecord) -> Result<Self, ValidationError> {
        let songs = record
            .songs
            .into_iter()
            .map(|song| Song::from_record(song).map(Rc::new))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            name: record.name,
            songs,
        })
    }

    /// Swap each entry for an equal song from `library`, restoring shared
    /// ownership after a load.
    pub(crate) fn relink(&mut self, library: &[Rc<Song>]) {
        for entry in &mut self.songs {
            if let Some(shared) = library.iter().find(|song| ***song == **entry) {
                *entry = Rc::clone(shared);
            }
        }
    }
}

impl fmt::Display for Playlist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Serialized form of a [`Playlist`], embedding full song records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistRecord {
    pub name: String,
    pub songs: Vec<SongRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alpha() -> Song {
        Song::new("Alpha", "A1, A2", "Alb", "Rock", "3:30").unwrap()
    }

    #[test]
    fn splits_and_trims_artists() {
        let song = Song::new("Alpha", " A1 ,A2,  A3 ", "", "", "0:00").unwrap();
        assert_eq!(song.artists(), ["A1", "A2", "A3"]);
    }

    #[test]
    fn lookups_ignore_case_and_surrounding_whitespace() {
        let song = Song::new("Alpha ", "A", "", "", "1:00").unwrap();
        assert_eq!(song.name(), "Alpha");
        assert!(song.matches_name("Alpha "));
        assert!(song.matches_name("  alpha"));
        assert!(!song.matches_name("Alph"));
        assert!(Playlist::new("Road Trip").matches_name(" road trip "));
    }

    #[test]
    fn keeps_empty_artist_pieces() {
        let song = Song::new("Alpha", "A1,, A2,", "", "", "1:00").unwrap();
        assert_eq!(song.artists(), ["A1", "", "A2", ""]);
    }

    #[test]
    fn rejects_blank_name() {
        assert_eq!(
            Song::new("   ", "A", "", "", "3:30"),
            Err(ValidationError::EmptyName)
        );
    }

    #[test]
    fn blank_name_wins_over_bad_duration() {
        assert_eq!(
            Song::new("", "A", "", "", "nope"),
            Err(ValidationError::EmptyName)
        );
    }

    #[test]
    fn duration_pattern() {
        for ok in ["0:00", "3:30", "59:59", "123:05", "007:10"] {
            assert!(is_valid_duration(ok), "{ok} should be accepted");
        }
        for bad in ["", "5:99", "abc", "3:3", "3:300", ":30", "1:02:03", "3:6a", "-1:00", "3:60"] {
            assert!(!is_valid_duration(bad), "{bad} should be rejected");
        }
    }

    #[test]
    fn bad_duration_carries_value() {
        assert_eq!(
            Song::new("Alpha", "A", "", "", "5:99"),
            Err(ValidationError::BadDuration("5:99".to_string()))
        );
        assert_eq!(
            ValidationError::BadDuration("5:99".to_string()).to_string(),
            "bad duration: 5:99"
        );
    }

    #[test]
    fn record_round_trip() {
        let song = alpha();
        let rebuilt = Song::from_record(song.to_record()).unwrap();
        assert_eq!(rebuilt, song);
    }

    #[test]
    fn from_record_validates() {
        let mut record = alpha().to_record();
        record.duration = "3:75".to_string();
        assert!(Song::from_record(record).is_err());
    }

    #[test]
    fn display_lists_artists() {
        assert_eq!(alpha().to_string(), "Alpha by A1, A2");
    }

    #[test]
    fn playlist_allows_duplicates_and_removes_all_matches() {
        let song = Rc::new(alpha());
        let other = Rc::new(Song::new("Beta", "B", "", "", "2:00").unwrap());
        let mut playlist = Playlist::new("Mix");
        playlist.add_song(Rc::clone(&song));
        playlist.add_song(Rc::clone(&other));
        playlist.add_song(Rc::clone(&song));
        assert_eq!(playlist.len(), 3);

        assert_eq!(playlist.remove_song_by_name("ALPHA"), 2);
        assert_eq!(playlist.songs(), [other]);
        assert_eq!(playlist.remove_song_by_name("missing"), 0);
    }

    #[test]
    fn relink_shares_equal_library_songs() {
        let library = vec![Rc::new(alpha())];
        let mut playlist = Playlist::from_record(PlaylistRecord {
            name: "P".to_string(),
            songs: vec![alpha().to_record()],
        })
        .unwrap();
        assert!(!Rc::ptr_eq(&playlist.songs()[0], &library[0]));

        playlist.relink(&library);
        assert!(Rc::ptr_eq(&playlist.songs()[0], &library[0]));
    }
}
