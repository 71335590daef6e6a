use std::mem;
use std::rc::Rc;

use anyhow::{anyhow, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{Playlist, Song};

/// Form state for adding songs to the library. Valid entries are queued and
/// the form is cleared for the next one; the queue is saved in one batch when
/// the form closes.
#[derive(Default, Clone)]
pub(crate) struct SongForm {
    pub(crate) queued: Vec<Song>,
    pub(crate) name: String,
    pub(crate) artists: String,
    pub(crate) album: String,
    pub(crate) genre: String,
    pub(crate) duration: String,
    pub(crate) active: SongField,
    pub(crate) error: Option<String>,
}

/// Fields of the song form in focus order.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub(crate) enum SongField {
    #[default]
    Name,
    Artists,
    Album,
    Genre,
    Duration,
}

impl SongField {
    pub(crate) const ALL: [SongField; 5] = [
        SongField::Name,
        SongField::Artists,
        SongField::Album,
        SongField::Genre,
        SongField::Duration,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            SongField::Name => "Name",
            SongField::Artists => "Artists",
            SongField::Album => "Album",
            SongField::Genre => "Genre",
            SongField::Duration => "Duration",
        }
    }

    fn placeholder(self) -> &'static str {
        match self {
            SongField::Name | SongField::Artists => "<required>",
            SongField::Album | SongField::Genre => "<optional>",
            SongField::Duration => "<mm:ss>",
        }
    }

    fn position(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }
}

impl SongForm {
    /// Move focus to the next field, wrapping around.
    pub(crate) fn next_field(&mut self) {
        let next = (self.active.position() + 1) % SongField::ALL.len();
        self.active = SongField::ALL[next];
    }

    /// Move focus to the previous field, wrapping around.
    pub(crate) fn previous_field(&mut self) {
        let len = SongField::ALL.len();
        let previous = (self.active.position() + len - 1) % len;
        self.active = SongField::ALL[previous];
    }

    fn value(&self, field: SongField) -> &String {
        match field {
            SongField::Name => &self.name,
            SongField::Artists => &self.artists,
            SongField::Album => &self.album,
            SongField::Genre => &self.genre,
            SongField::Duration => &self.duration,
        }
    }

    fn value_mut(&mut self, field: SongField) -> &mut String {
        match field {
            SongField::Name => &mut self.name,
            SongField::Artists => &mut self.artists,
            SongField::Album => &mut self.album,
            SongField::Genre => &mut self.genre,
            SongField::Duration => &mut self.duration,
        }
    }

    /// Insert a character into the active field.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        let field = self.active;
        self.value_mut(field).push(ch);
        true
    }

    /// Remove a character from the active field.
    pub(crate) fn backspace(&mut self) {
        let field = self.active;
        self.value_mut(field).pop();
    }

    /// Turn the inputs into a validated song. Artists are required here even
    /// though the model would accept an empty list entry, mirroring the
    /// prompt-for-everything behaviour users expect from the add flow.
    pub(crate) fn build_song(&self) -> Result<Song> {
        if self.artists.trim().is_empty() {
            return Err(anyhow!("At least one artist is required."));
        }
        Song::new(
            &self.name,
            &self.artists,
            self.album.trim(),
            self.genre.trim(),
            self.duration.trim(),
        )
        .map_err(|err| anyhow!("Invalid song: {err}."))
    }

    /// Validate the inputs, move the song onto the queue and clear the fields
    /// for the next entry. Returns the queued song's name.
    pub(crate) fn queue_current(&mut self) -> Result<String> {
        let song = self.build_song()?;
        let name = song.name().to_string();
        let mut queued = mem::take(&mut self.queued);
        queued.push(song);
        *self = SongForm {
            queued,
            ..SongForm::default()
        };
        Ok(name)
    }

    /// Render a styled line for the modal form.
    pub(crate) fn build_line(&self, field: SongField) -> Line<'static> {
        let value = self.value(field);
        let is_active = self.active == field;

        let display = if value.is_empty() {
            field.placeholder().to_string()
        } else {
            value.clone()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{}: ", field.label())),
            Span::styled(display, style),
        ])
    }

    /// Character length of the requested field.
    pub(crate) fn value_len(&self, field: SongField) -> usize {
        self.value(field).chars().count()
    }
}

/// Single-field form for naming a new playlist.
#[derive(Default, Clone)]
pub(crate) struct PlaylistForm {
    pub(crate) name: String,
    pub(crate) error: Option<String>,
}

impl PlaylistForm {
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.name.push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.name.pop();
    }

    pub(crate) fn parse_name(&self) -> Result<String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(anyhow!("Playlist name is required."));
        }
        Ok(name.to_string())
    }

    pub(crate) fn build_line(&self) -> Line<'static> {
        let (display, style) = if self.name.is_empty() {
            ("<required>".to_string(), Style::default().fg(Color::DarkGray))
        } else {
            (self.name.clone(), Style::default().fg(Color::Yellow))
        };
        Line::from(vec![Span::raw("Name: "), Span::styled(display, style)])
    }
}

/// State for confirming removal of a song from the whole library.
pub(crate) struct ConfirmSongRemove {
    pub(crate) song: Rc<Song>,
    pub(crate) playlist_count: usize,
}

/// State for confirming deletion of a playlist. `index` is its position in
/// the store, which stays exact when names repeat.
pub(crate) struct ConfirmPlaylistDelete {
    pub(crate) index: usize,
    pub(crate) name: String,
    pub(crate) song_count: usize,
}

impl ConfirmPlaylistDelete {
    pub(crate) fn new(index: usize, playlist: &Playlist) -> Self {
        Self {
            index,
            name: playlist.name().to_string(),
            song_count: playlist.len(),
        }
    }
}

/// State for confirming removal of a song from one playlist.
pub(crate) struct ConfirmEntryRemove {
    pub(crate) playlist_index: usize,
    pub(crate) playlist: String,
    pub(crate) song: Rc<Song>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> SongForm {
        SongForm {
            name: "Alpha".to_string(),
            artists: "A1, A2".to_string(),
            album: " Alb ".to_string(),
            genre: "Rock".to_string(),
            duration: "3:30".to_string(),
            ..SongForm::default()
        }
    }

    #[test]
    fn focus_wraps_both_ways() {
        let mut form = SongForm::default();
        form.previous_field();
        assert_eq!(form.active, SongField::Duration);
        form.next_field();
        assert_eq!(form.active, SongField::Name);
        form.next_field();
        assert_eq!(form.active, SongField::Artists);
    }

    #[test]
    fn typing_targets_active_field() {
        let mut form = SongForm::default();
        form.next_field();
        assert!(form.push_char('Z'));
        assert!(!form.push_char('\n'));
        assert_eq!(form.artists, "Z");
        form.backspace();
        assert!(form.artists.is_empty());
        assert!(form.name.is_empty());
    }

    #[test]
    fn builds_valid_song() {
        let song = filled().build_song().unwrap();
        assert_eq!(song.album(), "Alb");
        assert_eq!(song.artists(), ["A1", "A2"]);
    }

    #[test]
    fn reports_validation_problems() {
        let mut form = filled();
        form.duration = "5:99".to_string();
        assert!(form.build_song().unwrap_err().to_string().contains("bad duration"));

        let mut form = filled();
        form.artists.clear();
        assert!(form.build_song().is_err());
    }

    #[test]
    fn queueing_clears_fields_and_keeps_earlier_songs() {
        let mut form = filled();
        form.active = SongField::Genre;
        assert_eq!(form.queue_current().unwrap(), "Alpha");
        assert!(form.name.is_empty() && form.duration.is_empty());
        assert_eq!(form.active, SongField::Name);

        let mut second = filled();
        second.name = "Beta".to_string();
        second.queued = form.queued.clone();
        second.queue_current().unwrap();
        let names: Vec<&str> = second.queued.iter().map(|song| song.name()).collect();
        assert_eq!(names, ["Alpha", "Beta"]);

        // A rejected entry leaves the queue and the typed values alone.
        second.name = "Gamma".to_string();
        second.duration = "bad".to_string();
        assert!(second.queue_current().is_err());
        assert_eq!(second.queued.len(), 2);
        assert_eq!(second.name, "Gamma");
    }

    #[test]
    fn playlist_name_required() {
        let mut form = PlaylistForm::default();
        form.push_char(' ');
        assert!(form.parse_name().is_err());
        form.push_char('P');
        assert_eq!(form.parse_name().unwrap(), "P");
    }
}
