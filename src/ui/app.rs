use std::mem;
use std::path::PathBuf;

use anyhow::{Context, Result};
use crossterm::event::KeyCode;
use open::that as open_path;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use tracing::warn;

use crate::error::PersistenceError;
use crate::models::{Playlist, Song};
use crate::store::LibraryStore;

use super::forms::{
    ConfirmEntryRemove, ConfirmPlaylistDelete, ConfirmSongRemove, PlaylistForm, SongField,
    SongForm,
};
use super::helpers::{centered_rect, key_hints, song_line, surface_error};
use super::screens::{
    ListCursor, Nav, PlaylistListScreen, PlaylistScreen, SongListScreen, SongPicker,
};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;

/// High-level navigation states.
enum Screen {
    Songs(SongListScreen),
    Playlists(PlaylistListScreen),
    Playlist(PlaylistScreen),
}

/// Fine-grained modes scoped to the current screen.
enum Mode {
    Normal,
    AddingSong(SongForm),
    ConfirmSongRemove(ConfirmSongRemove),
    CreatingPlaylist(PlaylistForm),
    ConfirmPlaylistDelete(ConfirmPlaylistDelete),
    ConfirmEntryRemove(ConfirmEntryRemove),
    SelectingSong(SongPicker),
    Searching,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state for the TUI. All library changes go through the
/// owned [`LibraryStore`]; the screens only keep cursors and snapshots.
pub struct App {
    store: LibraryStore,
    export_dir: PathBuf,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
    last_export: Option<PathBuf>,
}

impl App {
    /// `load_problem` is the diagnostic returned by [`LibraryStore::open`], if
    /// any; it is shown in the footer on the first frame.
    pub fn new(
        store: LibraryStore,
        export_dir: PathBuf,
        load_problem: Option<PersistenceError>,
    ) -> Self {
        let songs = SongListScreen::new(store.songs().to_vec());
        let mut app = Self {
            store,
            export_dir,
            screen: Screen::Songs(songs),
            mode: Mode::Normal,
            status: None,
            last_export: None,
        };
        if let Some(problem) = load_problem {
            let message = surface_error(&anyhow::Error::from(problem));
            app.set_status(
                format!("Could not load library ({message}). Starting empty."),
                StatusKind::Error,
            );
        }
        app
    }

    pub fn store(&self) -> &LibraryStore {
        &self.store
    }

    /// Route one key press. Returns `true` when the app should exit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::AddingSong(form) => self.handle_add_song(code, form)?,
            Mode::ConfirmSongRemove(confirm) => self.handle_confirm_song_remove(code, confirm)?,
            Mode::CreatingPlaylist(form) => self.handle_create_playlist(code, form)?,
            Mode::ConfirmPlaylistDelete(confirm) => {
                self.handle_confirm_playlist_delete(code, confirm)?
            }
            Mode::ConfirmEntryRemove(confirm) => self.handle_confirm_entry_remove(code, confirm)?,
            Mode::SelectingSong(picker) => self.handle_select_song(code, picker)?,
            Mode::Searching => self.handle_search(code),
        };

        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        if code == KeyCode::Char('q') {
            *exit = true;
            return Ok(Mode::Normal);
        }
        match self.screen {
            Screen::Songs(_) => self.handle_songs_key(code),
            Screen::Playlists(_) => self.handle_playlists_key(code),
            Screen::Playlist(_) => self.handle_playlist_key(code),
        }
    }

    fn handle_songs_key(&mut self, code: KeyCode) -> Result<Mode> {
        let Screen::Songs(songs) = &mut self.screen else {
            return Ok(Mode::Normal);
        };

        if let Some(nav) = Nav::from_key(code) {
            songs.navigate(nav);
            return Ok(Mode::Normal);
        }

        match code {
            KeyCode::Tab => {
                self.clear_status();
                self.screen = Screen::Playlists(PlaylistListScreen::default());
            }
            KeyCode::Esc => {
                if songs.active_filter().is_some() {
                    songs.filter = None;
                    self.refresh_views();
                    self.set_status("Search cleared.", StatusKind::Info);
                }
            }
            KeyCode::Char('f') | KeyCode::Char('/') => {
                if songs.filter.is_none() {
                    songs.filter = Some(String::new());
                }
                self.clear_status();
                return Ok(Mode::Searching);
            }
            KeyCode::Char('+') => {
                self.clear_status();
                return Ok(Mode::AddingSong(SongForm::default()));
            }
            KeyCode::Char('-') => {
                if let Some(song) = songs.current_song().cloned() {
                    let playlist_count = self
                        .store
                        .playlists()
                        .iter()
                        .filter(|playlist| {
                            playlist.songs().iter().any(|entry| entry.matches_name(song.name()))
                        })
                        .count();
                    self.clear_status();
                    return Ok(Mode::ConfirmSongRemove(ConfirmSongRemove {
                        song,
                        playlist_count,
                    }));
                }
                self.set_status("No song selected to remove.", StatusKind::Error);
            }
            KeyCode::Char('u') | KeyCode::Char('U') => self.undo_last_removal()?,
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_playlists_key(&mut self, code: KeyCode) -> Result<Mode> {
        let count = self.store.playlists().len();
        let Screen::Playlists(list) = &mut self.screen else {
            return Ok(Mode::Normal);
        };

        if let Some(nav) = Nav::from_key(code) {
            list.cursor.apply(nav, count);
            return Ok(Mode::Normal);
        }

        let selected = list.cursor.selected;
        match code {
            KeyCode::Tab | KeyCode::Esc => {
                self.clear_status();
                self.show_songs();
            }
            KeyCode::Enter => {
                if selected < count {
                    self.clear_status();
                    self.screen = Screen::Playlist(PlaylistScreen {
                        index: selected,
                        cursor: ListCursor::default(),
                    });
                } else {
                    self.set_status("No playlist selected.", StatusKind::Error);
                }
            }
            KeyCode::Char('+') => {
                self.clear_status();
                return Ok(Mode::CreatingPlaylist(PlaylistForm::default()));
            }
            KeyCode::Char('-') => {
                if let Some(playlist) = self.store.playlists().get(selected) {
                    let confirm = ConfirmPlaylistDelete::new(selected, playlist);
                    self.clear_status();
                    return Ok(Mode::ConfirmPlaylistDelete(confirm));
                }
                self.set_status("No playlist selected to delete.", StatusKind::Error);
            }
            KeyCode::Char('x') | KeyCode::Char('X') => {
                if selected < count {
                    self.export(selected);
                } else {
                    self.set_status("No playlist selected to export.", StatusKind::Error);
                }
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_playlist_key(&mut self, code: KeyCode) -> Result<Mode> {
        let Screen::Playlist(detail) = &mut self.screen else {
            return Ok(Mode::Normal);
        };
        let index = detail.index;
        let Some(playlist) = self.store.playlists().get(index) else {
            self.screen = Screen::Playlists(PlaylistListScreen::default());
            self.set_status("That playlist no longer exists.", StatusKind::Error);
            return Ok(Mode::Normal);
        };

        if let Some(nav) = Nav::from_key(code) {
            detail.cursor.apply(nav, playlist.len());
            return Ok(Mode::Normal);
        }

        let name = playlist.name().to_string();
        let current = playlist.songs().get(detail.cursor.selected).cloned();
        match code {
            KeyCode::Esc => {
                self.clear_status();
                self.screen = Screen::Playlists(PlaylistListScreen {
                    cursor: ListCursor::at(index),
                });
            }
            KeyCode::Char('+') => {
                if self.store.songs().is_empty() {
                    self.set_status("The library has no songs yet.", StatusKind::Error);
                } else {
                    self.clear_status();
                    let picker = SongPicker::new(index, name, self.store.songs().to_vec());
                    return Ok(Mode::SelectingSong(picker));
                }
            }
            KeyCode::Char('-') => match current {
                Some(song) => {
                    self.clear_status();
                    return Ok(Mode::ConfirmEntryRemove(ConfirmEntryRemove {
                        playlist_index: index,
                        playlist: name,
                        song,
                    }));
                }
                None => self.set_status("No song selected to remove.", StatusKind::Error),
            },
            KeyCode::Char('x') | KeyCode::Char('X') => self.export(index),
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_add_song(&mut self, code: KeyCode, mut form: SongForm) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                let queued = mem::take(&mut form.queued);
                if queued.is_empty() {
                    self.set_status("Add song cancelled.", StatusKind::Info);
                } else if let Err(err) = self.save_queued_songs(queued) {
                    self.set_status(surface_error(&err), StatusKind::Error);
                }
                return Ok(Mode::Normal);
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match form.queue_current() {
                Ok(name) => {
                    let message = format!(
                        "Queued '{name}' ({} pending). Add another or press Esc to save.",
                        form.queued.len()
                    );
                    self.set_status(message, StatusKind::Info);
                }
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Ok(Mode::AddingSong(form))
    }

    fn handle_confirm_song_remove(
        &mut self,
        code: KeyCode,
        confirm: ConfirmSongRemove,
    ) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Removal cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.store.remove_song(confirm.song.name()) {
                    Ok(Some(song)) => {
                        self.refresh_views();
                        self.set_status(
                            format!(
                                "Song '{}' removed from library and all playlists. Press u to undo.",
                                song.name()
                            ),
                            StatusKind::Info,
                        );
                        Ok(Mode::Normal)
                    }
                    Ok(None) => {
                        self.set_status(
                            format!("Song '{}' not found in the library.", confirm.song.name()),
                            StatusKind::Error,
                        );
                        Ok(Mode::Normal)
                    }
                    Err(err) => {
                        self.refresh_views();
                        self.report_store_error(err, "failed to save library");
                        Ok(Mode::Normal)
                    }
                }
            }
            _ => Ok(Mode::ConfirmSongRemove(confirm)),
        }
    }

    fn handle_create_playlist(&mut self, code: KeyCode, mut form: PlaylistForm) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Create playlist cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_new_playlist(&form) {
                Ok(_) => keep_open = false,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Ok(Mode::CreatingPlaylist(form))
        } else {
            Ok(Mode::Normal)
        }
    }

    fn handle_confirm_playlist_delete(
        &mut self,
        code: KeyCode,
        confirm: ConfirmPlaylistDelete,
    ) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.store.delete_playlist_at(confirm.index) {
                    Ok(Some(playlist)) => {
                        self.refresh_views();
                        self.set_status(
                            format!("Playlist '{}' deleted.", playlist.name()),
                            StatusKind::Info,
                        );
                    }
                    Ok(None) => self.set_status("Playlist not found.", StatusKind::Error),
                    Err(err) => {
                        self.refresh_views();
                        self.report_store_error(err, "failed to save library");
                    }
                }
                Ok(Mode::Normal)
            }
            _ => Ok(Mode::ConfirmPlaylistDelete(confirm)),
        }
    }

    fn handle_confirm_entry_remove(
        &mut self,
        code: KeyCode,
        confirm: ConfirmEntryRemove,
    ) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Removal cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self
                    .store
                    .remove_song_from_playlist_at(confirm.song.name(), confirm.playlist_index)
                {
                    Ok(Some(removed)) => {
                        self.refresh_views();
                        let message = if removed == 1 {
                            format!("Removed '{}' from the playlist.", confirm.song.name())
                        } else {
                            format!(
                                "Removed {removed} entries of '{}' from the playlist.",
                                confirm.song.name()
                            )
                        };
                        self.set_status(message, StatusKind::Info);
                    }
                    Ok(None) => self.set_status("Playlist not found.", StatusKind::Error),
                    Err(err) => {
                        self.refresh_views();
                        self.report_store_error(err, "failed to save library");
                    }
                }
                Ok(Mode::Normal)
            }
            _ => Ok(Mode::ConfirmEntryRemove(confirm)),
        }
    }

    fn handle_select_song(&mut self, code: KeyCode, mut picker: SongPicker) -> Result<Mode> {
        if let Some(nav) = Nav::from_key(code) {
            picker.navigate(nav);
            return Ok(Mode::SelectingSong(picker));
        }

        match code {
            KeyCode::Esc => Ok(Mode::Normal),
            KeyCode::Enter => {
                let Some(song) = picker.current_song().cloned() else {
                    return Ok(Mode::Normal);
                };
                match self.store.add_song_to_playlist_at(song.name(), picker.playlist_index) {
                    Ok(true) => {
                        self.refresh_views();
                        self.set_status(
                            format!("Added '{}' to '{}'.", song.name(), picker.playlist),
                            StatusKind::Info,
                        );
                    }
                    Ok(false) => self.set_status("Song or playlist not found.", StatusKind::Error),
                    Err(err) => {
                        self.refresh_views();
                        self.report_store_error(err, "failed to save library");
                    }
                }
                Ok(Mode::Normal)
            }
            _ => Ok(Mode::SelectingSong(picker)),
        }
    }

    fn handle_search(&mut self, code: KeyCode) -> Mode {
        let Screen::Songs(songs) = &mut self.screen else {
            return Mode::Normal;
        };

        if let Some(nav) = Nav::from_key(code) {
            songs.navigate(nav);
            return Mode::Searching;
        }

        match code {
            KeyCode::Esc => {
                songs.filter = None;
                self.refresh_views();
                return Mode::Normal;
            }
            KeyCode::Enter => return Mode::Normal,
            KeyCode::Backspace => {
                if let Some(query) = songs.filter.as_mut() {
                    query.pop();
                }
            }
            KeyCode::Char(ch) if !ch.is_control() => {
                songs.filter.get_or_insert_with(String::new).push(ch);
            }
            _ => return Mode::Searching,
        }

        self.refresh_views();
        if let Screen::Songs(songs) = &self.screen {
            if let Some(query) = songs.active_filter() {
                if songs.songs.is_empty() {
                    let message = format!("No matching songs found for '{query}'.");
                    self.set_status(message, StatusKind::Error);
                    return Mode::Searching;
                }
            }
        }
        self.clear_status();
        Mode::Searching
    }

    pub(crate) fn handle_ctrl_z(&mut self) -> Result<()> {
        if matches!(self.mode, Mode::Normal | Mode::Searching) {
            self.undo_last_removal()?;
        }
        Ok(())
    }

    pub(crate) fn handle_ctrl_o(&mut self) {
        let Some(path) = self.last_export.clone() else {
            self.set_status("Nothing exported yet.", StatusKind::Error);
            return;
        };
        match open_path(&path) {
            Ok(()) => self.set_status(format!("Opened {}.", path.display()), StatusKind::Info),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to open export");
                self.set_status(format!("Failed to open export: {err}"), StatusKind::Error);
            }
        }
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        match &self.screen {
            Screen::Songs(songs) => self.draw_song_list(frame, content_area, songs),
            Screen::Playlists(list) => self.draw_playlist_list(frame, content_area, list),
            Screen::Playlist(detail) => self.draw_playlist(frame, content_area, detail),
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::AddingSong(form) => self.draw_song_form(frame, area, form),
            Mode::ConfirmSongRemove(confirm) => self.draw_confirm_song_remove(frame, area, confirm),
            Mode::CreatingPlaylist(form) => self.draw_playlist_form(frame, area, form),
            Mode::ConfirmPlaylistDelete(confirm) => {
                self.draw_confirm_playlist_delete(frame, area, confirm)
            }
            Mode::ConfirmEntryRemove(confirm) => {
                self.draw_confirm_entry_remove(frame, area, confirm)
            }
            Mode::SelectingSong(picker) => self.draw_song_picker(frame, area, picker),
            Mode::Searching => self.draw_search_bar(frame, area),
            Mode::Normal => {}
        }
    }

    fn draw_song_list(&self, frame: &mut Frame, area: Rect, songs: &SongListScreen) {
        let title = match songs.active_filter() {
            Some(query) => format!(
                "Library • {} of {} songs match '{query}'",
                songs.songs.len(),
                self.store.songs().len()
            ),
            None => format!("Library • {} songs", songs.songs.len()),
        };
        let block = Block::default().borders(Borders::ALL).title(title);

        if songs.songs.is_empty() {
            let text = if songs.active_filter().is_some() {
                "No songs match the current search."
            } else {
                "No songs yet. Press '+' to add one."
            };
            let message = Paragraph::new(text)
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let items: Vec<ListItem> = songs
            .songs
            .iter()
            .map(|song| ListItem::new(song_line(song)))
            .collect();
        render_list(frame, area, items, block, songs.cursor.selected);
    }

    fn draw_playlist_list(&self, frame: &mut Frame, area: Rect, list: &PlaylistListScreen) {
        let playlists = self.store.playlists();
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("Playlists • {}", playlists.len()));

        if playlists.is_empty() {
            let message = Paragraph::new("No playlists yet. Press '+' to create one.")
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let items: Vec<ListItem> = playlists
            .iter()
            .map(|playlist| {
                let count = match playlist.len() {
                    1 => "1 song".to_string(),
                    n => format!("{n} songs"),
                };
                ListItem::new(Line::from(vec![
                    Span::styled(
                        playlist.name().to_string(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(format!("  {count}"), Style::default().fg(Color::Gray)),
                ]))
            })
            .collect();
        render_list(frame, area, items, block, list.cursor.selected);
    }

    fn draw_playlist(&self, frame: &mut Frame, area: Rect, detail: &PlaylistScreen) {
        let Some(playlist) = self.store.playlists().get(detail.index) else {
            let message = Paragraph::new("That playlist no longer exists.")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(message, area);
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(1)])
            .split(area);

        let header = Paragraph::new(Line::from(vec![
            Span::styled(
                playlist.name().to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("  •  {} entries", playlist.len())),
        ]))
        .block(Block::default().borders(Borders::ALL).title("Playlist"));
        frame.render_widget(header, chunks[0]);

        let block = Block::default().borders(Borders::ALL).title("Songs");
        if playlist.is_empty() {
            let message = Paragraph::new("No songs yet. Press '+' to add one.")
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, chunks[1]);
            return;
        }

        let items: Vec<ListItem> = playlist
            .songs()
            .iter()
            .map(|song| ListItem::new(song_line(song)))
            .collect();
        render_list(frame, chunks[1], items, block, detail.cursor.selected);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph = Paragraph::new(vec![status_line, self.footer_instructions()])
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        match (&self.screen, &self.mode) {
            (_, Mode::SelectingSong(_)) => {
                key_hints(&[("↑↓", "Navigate"), ("Enter", "Add to playlist"), ("Esc", "Cancel")])
            }
            (_, Mode::AddingSong(_)) => key_hints(&[
                ("Tab", "Next field"),
                ("Enter", "Queue song"),
                ("Esc", "Save queued and close"),
            ]),
            (_, Mode::CreatingPlaylist(_)) => key_hints(&[("Enter", "Save"), ("Esc", "Cancel")]),
            (
                _,
                Mode::ConfirmSongRemove(_)
                | Mode::ConfirmPlaylistDelete(_)
                | Mode::ConfirmEntryRemove(_),
            ) => key_hints(&[("y", "Confirm"), ("n/Esc", "Cancel")]),
            (_, Mode::Searching) => key_hints(&[
                ("Type", "Filter by name"),
                ("Enter", "Keep results"),
                ("Esc", "Clear search"),
            ]),
            (Screen::Songs(_), Mode::Normal) => key_hints(&[
                ("+", "Add"),
                ("-", "Remove"),
                ("u", "Undo remove"),
                ("f", "Search"),
                ("Tab", "Playlists"),
                ("q", "Quit"),
            ]),
            (Screen::Playlists(_), Mode::Normal) => key_hints(&[
                ("Enter", "Open"),
                ("+", "Create"),
                ("-", "Delete"),
                ("x", "Export"),
                ("Tab", "Songs"),
                ("q", "Quit"),
            ]),
            (Screen::Playlist(_), Mode::Normal) => key_hints(&[
                ("+", "Add song"),
                ("-", "Remove song"),
                ("x", "Export"),
                ("Ctrl+O", "Open export"),
                ("Esc", "Back"),
                ("q", "Quit"),
            ]),
        }
    }

    fn draw_search_bar(&self, frame: &mut Frame, area: Rect) {
        let query = match &self.screen {
            Screen::Songs(songs) => songs.filter.clone().unwrap_or_default(),
            _ => return,
        };
        let height = 3u16.min(area.height);
        let popup_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup_area);

        let block = Block::default().borders(Borders::ALL).title("Search");
        let paragraph = Paragraph::new(Span::raw(format!("Search: {query}")))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x = inner.x + "Search: ".len() as u16 + query.chars().count() as u16;
        frame.set_cursor_position((cursor_x, inner.y));
    }

    fn draw_song_form(&self, frame: &mut Frame, area: Rect, form: &SongForm) {
        let popup_area = centered_rect(70, 50, area);
        frame.render_widget(Clear, popup_area);

        let title = match form.queued.len() {
            0 => "Add Songs".to_string(),
            n => format!("Add Songs • {n} queued"),
        };
        let block = Block::default().title(title).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines: Vec<Line> = SongField::ALL
            .iter()
            .map(|field| form.build_line(*field))
            .collect();
        lines.push(Line::from(""));

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Separate artists with commas • duration as mm:ss • Enter queues, Esc saves",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let row = SongField::ALL
            .iter()
            .position(|field| *field == form.active)
            .unwrap_or(0) as u16;
        let prefix = form.active.label().len() as u16 + 2;
        frame.set_cursor_position((
            inner.x + prefix + form.value_len(form.active) as u16,
            inner.y + row,
        ));
    }

    fn draw_playlist_form(&self, frame: &mut Frame, area: Rect, form: &PlaylistForm) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Create Playlist").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![form.build_line(), Line::from("")];
        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
        frame.set_cursor_position((
            inner.x + "Name: ".len() as u16 + form.name.chars().count() as u16,
            inner.y,
        ));
    }

    fn draw_confirm_song_remove(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmSongRemove) {
        let detail = match confirm.playlist_count {
            0 => "It is not in any playlist.".to_string(),
            1 => "It will also be removed from 1 playlist.".to_string(),
            n => format!("It will also be removed from {n} playlists."),
        };
        draw_confirm(
            frame,
            area,
            "Remove Song",
            vec![
                Line::from(format!("Remove '{}' from the library?", confirm.song)),
                Line::from(detail),
                Line::from("Undo restores the song but not its playlist entries."),
            ],
        );
    }

    fn draw_confirm_playlist_delete(
        &self,
        frame: &mut Frame,
        area: Rect,
        confirm: &ConfirmPlaylistDelete,
    ) {
        draw_confirm(
            frame,
            area,
            "Delete Playlist",
            vec![
                Line::from(format!("Delete playlist '{}'?", confirm.name)),
                Line::from(format!(
                    "Its {} entries stay in the library. This cannot be undone.",
                    confirm.song_count
                )),
            ],
        );
    }

    fn draw_confirm_entry_remove(
        &self,
        frame: &mut Frame,
        area: Rect,
        confirm: &ConfirmEntryRemove,
    ) {
        draw_confirm(
            frame,
            area,
            "Remove from Playlist",
            vec![
                Line::from(format!(
                    "Remove '{}' from '{}'?",
                    confirm.song.name(),
                    confirm.playlist
                )),
                Line::from("Every entry with this name is removed; the library keeps the song."),
            ],
        );
    }

    fn draw_song_picker(&self, frame: &mut Frame, area: Rect, picker: &SongPicker) {
        let popup_area = centered_rect(70, 60, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(format!("Add Song to '{}'", picker.playlist))
            .borders(Borders::ALL);
        let items: Vec<ListItem> = picker
            .songs
            .iter()
            .map(|song| ListItem::new(song_line(song)))
            .collect();
        render_list(frame, popup_area, items, block, picker.cursor.selected);
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    fn report_store_error(&mut self, err: PersistenceError, context: &str) {
        let err = anyhow::Error::from(err).context(context.to_string());
        self.set_status(surface_error(&err), StatusKind::Error);
    }

    fn save_queued_songs(&mut self, songs: Vec<Song>) -> Result<usize> {
        let result = self.store.add_songs(songs);
        self.refresh_views();
        let added = result.context("failed to save library")?;
        let message = match added {
            1 => "1 song added successfully.".to_string(),
            n => format!("{n} songs added successfully."),
        };
        self.set_status(message, StatusKind::Info);
        Ok(added)
    }

    fn save_new_playlist(&mut self, form: &PlaylistForm) -> Result<()> {
        let name = form.parse_name()?;
        let result = self.store.create_playlist(&name).map(|_| ());
        let last = self.store.playlists().len().saturating_sub(1);
        if let Screen::Playlists(list) = &mut self.screen {
            list.cursor = ListCursor::at(last);
        }
        result.context("failed to save library")?;
        self.set_status(format!("Playlist '{name}' created."), StatusKind::Info);
        Ok(())
    }

    fn undo_last_removal(&mut self) -> Result<()> {
        match self.store.undo() {
            Ok(Some(song)) => {
                self.refresh_views();
                self.set_status(
                    format!("Undo: song '{}' has been restored.", song.name()),
                    StatusKind::Info,
                );
            }
            Ok(None) => self.set_status("Nothing to undo.", StatusKind::Info),
            Err(err) => {
                self.refresh_views();
                self.report_store_error(err, "failed to save library");
            }
        }
        Ok(())
    }

    fn export(&mut self, index: usize) {
        let playlist_name = match self.store.playlists().get(index) {
            Some(playlist) => playlist.name().to_string(),
            None => {
                self.set_status("Playlist not found.", StatusKind::Error);
                return;
            }
        };
        match self.store.export_playlist_at(index, &self.export_dir) {
            Ok(Some(path)) => {
                self.set_status(
                    format!(
                        "Playlist '{playlist_name}' exported to '{}'. Ctrl+O opens it.",
                        path.display()
                    ),
                    StatusKind::Info,
                );
                self.last_export = Some(path);
            }
            Ok(None) => self.set_status("Playlist not found.", StatusKind::Error),
            Err(err) => self.report_store_error(err, "failed to export playlist"),
        }
    }

    fn show_songs(&mut self) {
        self.screen = Screen::Songs(SongListScreen::new(self.store.songs().to_vec()));
    }

    /// Re-read the store into whichever screen is showing.
    fn refresh_views(&mut self) {
        let playlists = self.store.playlists();
        match &mut self.screen {
            Screen::Songs(screen) => {
                let songs = match screen.active_filter() {
                    Some(query) => self.store.search_songs_by_name(query),
                    None => self.store.songs().to_vec(),
                };
                screen.set_songs(songs);
            }
            Screen::Playlists(list) => list.cursor.clamp(playlists.len()),
            Screen::Playlist(detail) => {
                let len = playlists.get(detail.index).map_or(0, Playlist::len);
                detail.cursor.clamp(len);
            }
        }
    }
}

fn render_list(frame: &mut Frame, area: Rect, items: Vec<ListItem>, block: Block, selected: usize) {
    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");

    let mut list_state = ListState::default();
    list_state.select(Some(selected));
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn draw_confirm(frame: &mut Frame, area: Rect, title: &str, mut lines: Vec<Line<'static>>) {
    let popup_area = centered_rect(60, 30, area);
    frame.render_widget(Clear, popup_area);

    let block = Block::default().title(title.to_string()).borders(Borders::ALL);
    frame.render_widget(block.clone(), popup_area);
    let inner = block.inner(popup_area);

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Press Y to confirm or N / Esc to cancel.",
        Style::default().fg(Color::Gray),
    )));

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, inner);
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn app_with_twin_playlists() -> (TempDir, App) {
        let dir = TempDir::new().unwrap();
        let (mut store, _) = LibraryStore::open(dir.path().join("library.json"));
        store
            .add_song(Song::new("Alpha", "A1", "", "", "3:30").unwrap())
            .unwrap();
        store.create_playlist("P").unwrap();
        store.create_playlist("P").unwrap();
        store.add_song_to_playlist_at("Alpha", 0).unwrap();
        let app = App::new(store, dir.path().to_path_buf(), None);
        (dir, app)
    }

    fn press(app: &mut App, keys: &[KeyCode]) {
        for key in keys {
            assert!(!app.handle_key(*key).unwrap());
        }
    }

    fn playlist_lengths(app: &App) -> Vec<usize> {
        app.store().playlists().iter().map(Playlist::len).collect()
    }

    #[test]
    fn deleting_highlighted_playlist_spares_its_namesake() {
        let (_dir, mut app) = app_with_twin_playlists();
        press(
            &mut app,
            &[KeyCode::Tab, KeyCode::Down, KeyCode::Char('-'), KeyCode::Char('y')],
        );
        assert_eq!(playlist_lengths(&app), [1]);
    }

    #[test]
    fn detail_edits_target_the_opened_playlist() {
        let (_dir, mut app) = app_with_twin_playlists();
        press(
            &mut app,
            &[KeyCode::Tab, KeyCode::Down, KeyCode::Enter, KeyCode::Char('+'), KeyCode::Enter],
        );
        assert_eq!(playlist_lengths(&app), [1, 1]);

        press(&mut app, &[KeyCode::Char('-'), KeyCode::Char('y')]);
        assert_eq!(playlist_lengths(&app), [1, 0]);
    }

    #[test]
    fn export_writes_the_highlighted_playlist() {
        let (dir, mut app) = app_with_twin_playlists();
        press(&mut app, &[KeyCode::Tab, KeyCode::Down, KeyCode::Char('x')]);
        let written = std::fs::read_to_string(dir.path().join("P.txt")).unwrap();
        assert_eq!(written, "Playlist: P\n");
    }

    #[test]
    fn add_form_queues_songs_and_saves_them_together() {
        let (_dir, mut app) = app_with_twin_playlists();
        press(&mut app, &[KeyCode::Char('+')]);
        for (name, duration) in [("Beta", "1:00"), ("Gamma", "2:05")] {
            let fields = [name, "Band", "", "", duration];
            for (idx, value) in fields.iter().enumerate() {
                for ch in value.chars() {
                    press(&mut app, &[KeyCode::Char(ch)]);
                }
                if idx + 1 < fields.len() {
                    press(&mut app, &[KeyCode::Tab]);
                }
            }
            press(&mut app, &[KeyCode::Enter]);
        }
        // Nothing is written until the form closes.
        assert_eq!(app.store().songs().len(), 1);

        press(&mut app, &[KeyCode::Esc]);
        let names: Vec<&str> = app.store().songs().iter().map(|s| s.name()).collect();
        assert_eq!(names, ["Alpha", "Beta", "Gamma"]);
        assert!(matches!(app.mode, Mode::Normal));
    }
}
