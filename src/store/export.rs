//! Human-readable playlist export. The text is a projection for people, not a
//! format the library can read back.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::PersistenceError;
use crate::models::Playlist;

/// Render a playlist as text. The `Songs:` header is omitted for an empty
/// playlist.
pub fn render_playlist(playlist: &Playlist) -> String {
    let mut out = format!("Playlist: {}\n", playlist.name());
    if !playlist.is_empty() {
        out.push_str("Songs:\n");
        for song in playlist.songs() {
            // Writing into a String cannot fail.
            let _ = writeln!(
                out,
                "{} by {} ({})",
                song.name(),
                song.artists_text(),
                song.duration()
            );
        }
    }
    out
}

/// `"Road Trip"` becomes `"Road_Trip.txt"`.
pub fn export_file_name(playlist_name: &str) -> String {
    format!("{}.txt", playlist_name.replace(' ', "_"))
}

/// Write the rendered playlist into `dir`, overwriting an earlier export of
/// the same name.
pub fn write_export(dir: &Path, playlist: &Playlist) -> Result<PathBuf, PersistenceError> {
    fs::create_dir_all(dir).map_err(|err| PersistenceError::io(dir, err))?;
    let path = dir.join(export_file_name(playlist.name()));
    fs::write(&path, render_playlist(playlist)).map_err(|err| PersistenceError::io(&path, err))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::models::Song;

    #[test]
    fn empty_playlist_has_no_song_section() {
        let text = render_playlist(&Playlist::new("Empty Playlist"));
        assert_eq!(text, "Playlist: Empty Playlist\n");
        assert!(!text.contains("Songs:"));
    }

    #[test]
    fn lists_each_entry() {
        let mut playlist = Playlist::new("Mix");
        playlist.add_song(Rc::new(
            Song::new("Alpha", "A1, A2", "Alb", "Rock", "3:30").unwrap(),
        ));
        playlist.add_song(Rc::new(Song::new("Beta", "B", "", "", "4:10").unwrap()));

        assert_eq!(
            render_playlist(&playlist),
            "Playlist: Mix\nSongs:\nAlpha by A1, A2 (3:30)\nBeta by B (4:10)\n"
        );
    }

    #[test]
    fn file_name_replaces_spaces() {
        assert_eq!(export_file_name("Test Playlist"), "Test_Playlist.txt");
        assert_eq!(export_file_name("solo"), "solo.txt");
    }

    #[test]
    fn writes_into_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_export(dir.path(), &Playlist::new("Late Night")).unwrap();
        assert_eq!(path, dir.path().join("Late_Night.txt"));
        assert_eq!(fs::read_to_string(path).unwrap(), "Playlist: Late Night\n");
    }
}
