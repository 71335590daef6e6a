use std::rc::Rc;

use crossterm::event::KeyCode;

use crate::models::Song;

/// List navigation requested by a key press.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Nav {
    By(isize),
    First,
    Last,
}

impl Nav {
    pub(crate) fn from_key(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::Up => Some(Nav::By(-1)),
            KeyCode::Down => Some(Nav::By(1)),
            KeyCode::PageUp => Some(Nav::By(-5)),
            KeyCode::PageDown => Some(Nav::By(5)),
            KeyCode::Home => Some(Nav::First),
            KeyCode::End => Some(Nav::Last),
            _ => None,
        }
    }
}

/// Selected row within a list of `len` items.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct ListCursor {
    pub(crate) selected: usize,
}

impl ListCursor {
    pub(crate) fn at(selected: usize) -> Self {
        Self { selected }
    }

    pub(crate) fn apply(&mut self, nav: Nav, len: usize) {
        if len == 0 {
            self.selected = 0;
            return;
        }
        self.selected = match nav {
            Nav::First => 0,
            Nav::Last => len - 1,
            Nav::By(offset) => self.selected.saturating_add_signed(offset).min(len - 1),
        };
    }

    /// Pull the selection back inside the list after it shrank.
    pub(crate) fn clamp(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }
}

/// The library song list, optionally narrowed by a name search.
pub(crate) struct SongListScreen {
    pub(crate) songs: Vec<Rc<Song>>,
    pub(crate) filter: Option<String>,
    pub(crate) cursor: ListCursor,
}

impl SongListScreen {
    pub(crate) fn new(songs: Vec<Rc<Song>>) -> Self {
        Self {
            songs,
            filter: None,
            cursor: ListCursor::default(),
        }
    }

    pub(crate) fn current_song(&self) -> Option<&Rc<Song>> {
        self.songs.get(self.cursor.selected)
    }

    pub(crate) fn set_songs(&mut self, songs: Vec<Rc<Song>>) {
        self.songs = songs;
        self.cursor.clamp(self.songs.len());
    }

    pub(crate) fn navigate(&mut self, nav: Nav) {
        self.cursor.apply(nav, self.songs.len());
    }

    /// Search term, if one with visible content is set.
    pub(crate) fn active_filter(&self) -> Option<&str> {
        self.filter
            .as_deref()
            .filter(|query| !query.trim().is_empty())
    }
}

/// Overview of every playlist.
#[derive(Default)]
pub(crate) struct PlaylistListScreen {
    pub(crate) cursor: ListCursor,
}

/// Detail view for one playlist, tracked by position since names may repeat.
pub(crate) struct PlaylistScreen {
    pub(crate) index: usize,
    pub(crate) cursor: ListCursor,
}

/// Popup list of library songs to append to a playlist.
pub(crate) struct SongPicker {
    pub(crate) playlist_index: usize,
    pub(crate) playlist: String,
    pub(crate) songs: Vec<Rc<Song>>,
    pub(crate) cursor: ListCursor,
}

impl SongPicker {
    pub(crate) fn new(playlist_index: usize, playlist: String, songs: Vec<Rc<Song>>) -> Self {
        Self {
            playlist_index,
            playlist,
            songs,
            cursor: ListCursor::default(),
        }
    }

    pub(crate) fn current_song(&self) -> Option<&Rc<Song>> {
        self.songs.get(self.cursor.selected)
    }

    pub(crate) fn navigate(&mut self, nav: Nav) {
        self.cursor.apply(nav, self.songs.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_stays_in_bounds() {
        let mut cursor = ListCursor::default();
        cursor.apply(Nav::By(-1), 3);
        assert_eq!(cursor.selected, 0);
        cursor.apply(Nav::By(5), 3);
        assert_eq!(cursor.selected, 2);
        cursor.apply(Nav::First, 3);
        assert_eq!(cursor.selected, 0);
        cursor.apply(Nav::Last, 3);
        assert_eq!(cursor.selected, 2);
        cursor.clamp(1);
        assert_eq!(cursor.selected, 0);
        cursor.apply(Nav::Last, 0);
        assert_eq!(cursor.selected, 0);
    }

    #[test]
    fn blank_filter_is_inactive() {
        let mut screen = SongListScreen::new(Vec::new());
        screen.filter = Some("  ".to_string());
        assert_eq!(screen.active_filter(), None);
        screen.filter = Some("al".to_string());
        assert_eq!(screen.active_filter(), Some("al"));
    }
}
