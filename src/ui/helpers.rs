use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::models::Song;

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Outermost message plus the root cause, e.g. `failed to access x: denied`.
pub(crate) fn surface_error(err: &Error) -> String {
    let top = err.to_string();
    match err.chain().skip(1).last() {
        Some(cause) => format!("{top}: {cause}"),
        None => top,
    }
}

/// Footer line of `[key] action` pairs.
pub(crate) fn key_hints(hints: &[(&str, &str)]) -> Line<'static> {
    let key_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let mut spans = Vec::with_capacity(hints.len() * 2);
    for (idx, (key, action)) in hints.iter().enumerate() {
        let separator = if idx + 1 == hints.len() { "" } else { "   " };
        spans.push(Span::styled(format!("[{key}]"), key_style));
        spans.push(Span::raw(format!(" {action}{separator}")));
    }
    Line::from(spans)
}

/// One list row for a song: bold name, artists and duration, then album and
/// genre when present.
pub(crate) fn song_line(song: &Song) -> Line<'static> {
    let mut spans = vec![
        Span::styled(
            song.name().to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" by {} ({})", song.artists_text(), song.duration())),
    ];

    let extras: Vec<&str> = [song.album(), song.genre()]
        .into_iter()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .collect();
    if !extras.is_empty() {
        spans.push(Span::styled(
            format!("  {}", extras.join(" • ")),
            Style::default().fg(Color::Gray),
        ));
    }

    Line::from(spans)
}
