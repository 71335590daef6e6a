use std::rc::Rc;

use crate::models::Song;

/// A reversible destructive operation. Only song removal is recorded today.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoEntry {
    /// The song that was taken out of the library, restored verbatim.
    RemoveSong(Rc<Song>),
}

/// In-memory last-in-first-out history. It is unbounded and never written to
/// disk, so history ends with the process.
#[derive(Debug, Default)]
pub struct UndoLog {
    entries: Vec<UndoEntry>,
}

impl UndoLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: UndoEntry) {
        self.entries.push(entry);
    }

    pub fn pop(&mut self) -> Option<UndoEntry> {
        self.entries.pop()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn removal(name: &str) -> UndoEntry {
        UndoEntry::RemoveSong(Rc::new(Song::new(name, "A", "", "", "1:00").unwrap()))
    }

    #[test]
    fn pops_most_recent_first() {
        let mut log = UndoLog::new();
        log.push(removal("first"));
        log.push(removal("second"));

        assert_eq!(log.pop(), Some(removal("second")));
        assert_eq!(log.pop(), Some(removal("first")));
        assert_eq!(log.pop(), None);
        assert!(log.is_empty());
    }
}
