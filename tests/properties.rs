//! Property tests for song validation, record round trips and removal/undo.

use music_library_manager::error::ValidationError;
use music_library_manager::models::SongRecord;
use music_library_manager::{LibraryStore, Song};
use proptest::prelude::*;
use tempfile::TempDir;

// ===== Helpers =====

fn valid_duration() -> impl Strategy<Value = String> {
    (0u32..1000, 0u32..60).prop_map(|(minutes, seconds)| format!("{minutes}:{seconds:02}"))
}

fn invalid_duration() -> impl Strategy<Value = String> {
    prop_oneof![
        "[0-9]{1,3}:[6-9][0-9]",             // seconds out of range
        "[0-9]{1,3}:[0-5]",                  // one seconds digit
        "[0-9]{1,2}:[0-5][0-9]:[0-5][0-9]",  // hours not supported
        ":[0-5][0-9]",                       // no minutes
        "[a-z ]{0,6}",                       // not a time at all
    ]
}

fn song_fields() -> impl Strategy<Value = (String, String, String, String, String)> {
    (
        "[A-Za-z0-9][A-Za-z0-9 ]{0,20}",
        "[A-Za-z]{1,10}(, [A-Za-z]{1,10}){0,3}",
        "[A-Za-z ]{0,12}",
        "[A-Za-z]{0,8}",
        valid_duration(),
    )
}

// ===== Property Tests =====

proptest! {
    /// Property: valid inputs construct and survive a serialized round trip
    #[test]
    fn valid_songs_round_trip((name, artists, album, genre, duration) in song_fields()) {
        let song = Song::new(&name, &artists, &album, &genre, &duration).unwrap();
        prop_assert_eq!(song.name(), name.trim());
        prop_assert_eq!(song.duration(), duration.as_str());
        prop_assert_eq!(song.artists_text(), artists);

        let json = serde_json::to_string(&song.to_record()).unwrap();
        let record: SongRecord = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(Song::from_record(record).unwrap(), song);
    }

    /// Property: malformed durations never produce a song
    #[test]
    fn bad_durations_are_rejected(name in "[A-Za-z]{1,10}", duration in invalid_duration()) {
        let err = Song::new(&name, "Someone", "", "", &duration).unwrap_err();
        prop_assert_eq!(err, ValidationError::BadDuration(duration));
    }

    /// Property: a blank name fails whatever the other fields hold
    #[test]
    fn blank_names_are_rejected(
        name in " {0,5}",
        artists in "[A-Za-z, ]{0,10}",
        duration in prop_oneof![valid_duration(), invalid_duration()],
    ) {
        prop_assert_eq!(
            Song::new(&name, &artists, "", "", &duration).unwrap_err(),
            ValidationError::EmptyName
        );
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Property: removal clears every playlist; undo brings back only the song
    #[test]
    fn remove_then_undo_restores_library_not_playlists(
        names in prop::collection::hash_set("[a-z]{3,8}", 1..8),
        pick in any::<prop::sample::Index>(),
        playlists in 1usize..4,
    ) {
        let names: Vec<String> = names.into_iter().collect();
        let target = pick.get(&names).clone();

        let dir = TempDir::new().unwrap();
        let (mut store, _) = LibraryStore::open(dir.path().join("library.json"));
        for name in &names {
            store.add_song(Song::new(name, "Artist", "", "", "1:00").unwrap()).unwrap();
        }
        for p in 0..playlists {
            let playlist = format!("P{p}");
            store.create_playlist(&playlist).unwrap();
            for name in &names {
                store.add_song_to_playlist(name, &playlist).unwrap();
            }
        }

        let removed = store.remove_song(&target.to_uppercase()).unwrap().unwrap();
        prop_assert_eq!(removed.name(), target.as_str());
        prop_assert!(store.find_song(&target).is_none());
        for playlist in store.playlists() {
            prop_assert_eq!(playlist.len(), names.len() - 1);
            prop_assert!(playlist.songs().iter().all(|song| !song.matches_name(&target)));
        }

        let restored = store.undo().unwrap().unwrap();
        prop_assert_eq!(restored.name(), target.as_str());
        prop_assert_eq!(store.songs().len(), names.len());
        for playlist in store.playlists() {
            prop_assert_eq!(playlist.len(), names.len() - 1);
        }
        prop_assert!(store.undo().unwrap().is_none());
    }
}
