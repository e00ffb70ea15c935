#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use std::{
        collections::HashMap,
        fs,
        io::Write,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Mutex,
        },
        time::{Duration, SystemTime},
    };
    use tokio_test::block_on;

    use crate::app::state::{ActiveScreen, AppState, Notification, NowPlaying};
    use crate::config::Config;
    use crate::error::{AuthError, ConfigError, StoreError};
    use crate::events::{map_key_to_action, map_login_key, UserAction};
    use crate::library::{
        analysis::{self, Attribute, AttributeStats, RankedCount, TasteAnalysis},
        export,
        fetch::{fetch_all_liked, PAGE_SIZE},
        load,
        model::{format_duration, parse_duration},
        source::{ArtistGenres, AudioAttributes, LikedSource, TasteSource},
        store::write_new_file,
        LikedEntry, Provenance, SnapshotStore, TrackRecord, UserProfile,
    };
    use crate::spotify::auth::{parse_redirect_request, redirect_from_params};

    // ── Fixtures ─────────────────────────────────────────────────────────────

    fn track(id: &str, name: &str, artists: &[&str], album: &str, duration_ms: u64) -> TrackRecord {
        TrackRecord {
            id: id.to_string(),
            name: name.to_string(),
            artists: artists.iter().map(|a| a.to_string()).collect(),
            artist_ids: artists.iter().map(|a| format!("id-{a}")).collect(),
            album: album.to_string(),
            duration_ms,
            popularity: Some(40),
            external_url: format!("https://open.spotify.com/track/{id}"),
            release_date: Some("2019-05-01".to_string()),
        }
    }

    fn liked(t: TrackRecord, day: u32) -> LikedEntry {
        LikedEntry {
            added_at: Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap(),
            track: t,
        }
    }

    fn sample_entries(n: usize) -> Vec<LikedEntry> {
        (0..n)
            .map(|i| {
                liked(
                    track(&format!("t{i}"), &format!("Song {i}"), &["Artist"], "Album", 200_000),
                    1 + (i % 28) as u32,
                )
            })
            .collect()
    }

    fn user() -> UserProfile {
        UserProfile {
            id: "user1".to_string(),
            display_name: Some("Test User".to_string()),
        }
    }

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 8, 30, 0).unwrap()
    }

    fn set_mtime(path: &std::path::Path, time: SystemTime) {
        fs::File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(time)
            .unwrap();
    }

    /// Serves canned pages in call order and records the requested offsets.
    struct FakeLiked {
        pages: Vec<Vec<LikedEntry>>,
        fail_on_call: Option<usize>,
        offsets: Mutex<Vec<u32>>,
    }

    impl FakeLiked {
        fn new(pages: Vec<Vec<LikedEntry>>) -> Self {
            FakeLiked { pages, fail_on_call: None, offsets: Mutex::new(Vec::new()) }
        }

        fn calls(&self) -> usize {
            self.offsets.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl LikedSource for FakeLiked {
        async fn liked_page(&self, offset: u32, limit: u32) -> anyhow::Result<Vec<LikedEntry>> {
            assert_eq!(limit, PAGE_SIZE);
            let call = {
                let mut offsets = self.offsets.lock().unwrap();
                offsets.push(offset);
                offsets.len() - 1
            };
            if self.fail_on_call == Some(call) {
                anyhow::bail!("simulated network failure");
            }
            Ok(self.pages.get(call).cloned().unwrap_or_default())
        }
    }

    fn paged(entries: Vec<LikedEntry>) -> Vec<Vec<LikedEntry>> {
        entries.chunks(PAGE_SIZE as usize).map(|c| c.to_vec()).collect()
    }

    /// Returns the same attributes for every track and genres per artist id.
    struct FakeTaste {
        attrs: AudioAttributes,
        genres: HashMap<String, Vec<String>>,
        fail_feature_batch: Option<usize>,
        feature_calls: AtomicUsize,
        feature_ids: Mutex<Vec<String>>,
    }

    impl FakeTaste {
        fn new(attrs: AudioAttributes) -> Self {
            FakeTaste {
                attrs,
                genres: HashMap::new(),
                fail_feature_batch: None,
                feature_calls: AtomicUsize::new(0),
                feature_ids: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TasteSource for FakeTaste {
        async fn audio_attributes(&self, track_ids: &[String]) -> anyhow::Result<Vec<AudioAttributes>> {
            assert!(track_ids.len() <= analysis::BATCH_SIZE);
            let call = self.feature_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_feature_batch == Some(call) {
                anyhow::bail!("simulated batch failure");
            }
            self.feature_ids.lock().unwrap().extend(track_ids.iter().cloned());
            Ok(track_ids
                .iter()
                .map(|id| AudioAttributes { track_id: id.clone(), ..self.attrs.clone() })
                .collect())
        }

        async fn artist_genres(&self, artist_ids: &[String]) -> anyhow::Result<Vec<ArtistGenres>> {
            assert!(artist_ids.len() <= analysis::BATCH_SIZE);
            Ok(artist_ids
                .iter()
                .map(|id| ArtistGenres {
                    artist_id: id.clone(),
                    genres: self.genres.get(id).cloned().unwrap_or_default(),
                })
                .collect())
        }
    }

    fn moderate_attrs() -> AudioAttributes {
        AudioAttributes {
            danceability: Some(0.5),
            energy: Some(0.5),
            valence: Some(0.5),
            acousticness: Some(0.1),
            tempo: Some(100.0),
            ..Default::default()
        }
    }

    // ── Pagination ───────────────────────────────────────────────────────────

    #[test]
    fn test_fetch_pages_until_empty_page() {
        let source = FakeLiked::new(paged(sample_entries(123)));
        let entries = block_on(fetch_all_liked(&source)).unwrap();

        assert_eq!(entries.len(), 123);
        assert_eq!(entries[0].track.id, "t0");
        assert_eq!(entries[122].track.id, "t122");
        assert_eq!(*source.offsets.lock().unwrap(), vec![0, 50, 100, 123]);
    }

    #[test]
    fn test_fetch_empty_library() {
        let source = FakeLiked::new(vec![]);
        let entries = block_on(fetch_all_liked(&source)).unwrap();
        assert!(entries.is_empty());
        assert_eq!(source.calls(), 1);
    }

    #[test]
    fn test_fetch_failure_aborts_with_offset() {
        let mut source = FakeLiked::new(paged(sample_entries(120)));
        source.fail_on_call = Some(1);
        let err = block_on(fetch_all_liked(&source)).unwrap_err();
        assert_eq!(err.offset, 50);
        assert_eq!(source.calls(), 2);
    }

    // ── Snapshot store ───────────────────────────────────────────────────────

    #[test]
    fn test_snapshot_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(tmp.path());
        let entries = sample_entries(3);

        let path = store
            .write_snapshot_at("alice-a1", &entries, at(2024, 3, 1))
            .unwrap();
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("alice-a1-liked-songs-"));
        assert!(name.ends_with(".json"));

        let snapshot = store.read_snapshot(&path).unwrap();
        assert_eq!(snapshot.entries, entries);
        assert_eq!(snapshot.cached_at, at(2024, 3, 1));
    }

    #[test]
    fn test_find_latest_uses_modification_time_not_name() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(tmp.path());

        // name order: jan < mar < jun; mtime order: jun < jan < mar
        let jan = store.write_snapshot_at("bob-b", &sample_entries(1), at(2023, 1, 1)).unwrap();
        let mar = store.write_snapshot_at("bob-b", &sample_entries(2), at(2023, 3, 1)).unwrap();
        let jun = store.write_snapshot_at("bob-b", &sample_entries(3), at(2024, 6, 1)).unwrap();

        let now = SystemTime::now();
        set_mtime(&jun, now - Duration::from_secs(2 * 86_400));
        set_mtime(&jan, now - Duration::from_secs(86_400));
        set_mtime(&mar, now);

        assert_eq!(store.find_latest("bob-b"), Some(mar.clone()));

        let listed: Vec<_> = store
            .list_snapshots("bob-b")
            .unwrap()
            .into_iter()
            .map(|f| f.path)
            .collect();
        assert_eq!(listed, vec![mar, jan, jun]);
    }

    #[test]
    fn test_write_snapshot_never_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(tmp.path());
        let first = store.write_snapshot_at("ivy-i", &sample_entries(2), at(2024, 2, 2)).unwrap();
        let before = fs::read(&first).unwrap();

        let err = store
            .write_snapshot_at("ivy-i", &sample_entries(5), at(2024, 2, 2))
            .unwrap_err();
        match err {
            StoreError::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::AlreadyExists),
            other => panic!("expected an io error, got {other:?}"),
        }

        assert_eq!(fs::read(&first).unwrap(), before);
        assert_eq!(store.read_snapshot(&first).unwrap().entries.len(), 2);
    }

    #[test]
    fn test_failed_snapshot_write_leaves_no_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("jo-j-liked-songs-20240101_000000.json");

        let err = write_new_file(&path, |file| {
            file.write_all(b"{\"schema_version\": 1, \"entr")?;
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
        })
        .unwrap_err();

        assert_eq!(err.to_string(), "disk full");
        assert!(!path.exists());
        assert_eq!(SnapshotStore::new(tmp.path()).find_latest("jo-j"), None);
    }

    #[test]
    fn test_json_snapshot_bad_fields_are_defaulted() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(tmp.path());
        let path = tmp.path().join("kim-k-liked-songs-20240101_000000.json");
        fs::write(
            &path,
            r#"{
                "schema_version": 1,
                "user_key": "kim-k",
                "cached_at": "2024-01-01T00:00:00Z",
                "entries": [
                    {"added_at": "2024-01-05T10:00:00Z",
                     "track": {"id": "good", "name": "Fine", "artists": ["A"], "album": "X",
                               "duration_ms": 180000, "popularity": 55}},
                    {"added_at": "yesterday",
                     "track": {"id": "bad", "name": "Odd", "artists": ["B", 7], "album": "Y",
                               "duration_ms": -5, "popularity": "high"}},
                    {"added_at": "2024-01-06T10:00:00Z", "track": {"album": "Z"}},
                    "not an entry"
                ]
            }"#,
        )
        .unwrap();

        let snapshot = store.read_snapshot(&path).unwrap();
        assert_eq!(snapshot.entries.len(), 2);

        let good = &snapshot.entries[0].track;
        assert_eq!(good.popularity, Some(55));
        assert_eq!(good.duration_ms, 180_000);

        let bad = &snapshot.entries[1];
        assert_eq!(bad.track.id, "bad");
        assert_eq!(bad.track.popularity, Some(0));
        assert_eq!(bad.track.duration_ms, 0);
        assert_eq!(bad.track.artists, vec!["B".to_string()]);
        assert_eq!(bad.added_at, DateTime::<Utc>::default());
    }

    #[test]
    fn test_json_snapshot_with_only_bad_entries_is_empty_error() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(tmp.path());
        let path = tmp.path().join("lee-l-liked-songs-20240101_000000.json");
        fs::write(
            &path,
            r#"{"schema_version": 1, "user_key": "lee-l", "cached_at": "2024-01-01T00:00:00Z",
                "entries": [{"track": {}}, 42]}"#,
        )
        .unwrap();

        assert!(matches!(store.read_snapshot(&path), Err(StoreError::Empty(_))));
    }

    #[test]
    fn test_find_latest_ignores_other_users() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(tmp.path());
        store.write_snapshot_at("carol-c", &sample_entries(1), at(2024, 1, 1)).unwrap();
        fs::write(tmp.path().join("notes.txt"), "unrelated").unwrap();

        assert_eq!(store.find_latest("dave-d"), None);
        assert!(store.find_latest("carol-c").is_some());
    }

    #[test]
    fn test_find_latest_missing_dir_is_none() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(tmp.path().join("does-not-exist"));
        assert_eq!(store.find_latest("anyone"), None);
        assert!(store.list_snapshots("anyone").unwrap().is_empty());
    }

    #[test]
    fn test_snapshot_with_unknown_schema_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(tmp.path());
        let path = tmp.path().join("erin-e-liked-songs-20240101_000000.json");
        fs::write(
            &path,
            r#"{"schema_version": 99, "user_key": "erin-e", "cached_at": "2024-01-01T00:00:00Z", "entries": []}"#,
        )
        .unwrap();

        assert!(matches!(store.read_snapshot(&path), Err(StoreError::Schema(99))));
    }

    #[test]
    fn test_prune_keeps_newest() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(tmp.path());
        let base = SystemTime::now() - Duration::from_secs(3600);
        let mut written = Vec::new();
        for (i, month) in [1u32, 2, 3, 4].iter().enumerate() {
            let p = store.write_snapshot_at("fay-f", &sample_entries(1), at(2024, *month, 1)).unwrap();
            set_mtime(&p, base + Duration::from_secs(60 * i as u64));
            written.push(p);
        }

        assert_eq!(store.prune("fay-f", 2).unwrap(), 2);
        let left: Vec<_> = store
            .list_snapshots("fay-f")
            .unwrap()
            .into_iter()
            .map(|f| f.path)
            .collect();
        assert_eq!(left, vec![written[3].clone(), written[2].clone()]);
        assert!(!written[0].exists());
    }

    #[test]
    fn test_legacy_csv_snapshot_is_readable() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(tmp.path());
        let entries = sample_entries(4);
        let path = tmp.path().join("gus-g-liked-songs-20200101_000000.csv");
        export::export(&entries, &path).unwrap();

        assert_eq!(store.find_latest("gus-g"), Some(path.clone()));
        let snapshot = store.read_snapshot(&path).unwrap();
        assert_eq!(snapshot.entries.len(), 4);
        assert_eq!(snapshot.entries[2].track.name, "Song 2");
        assert_eq!(snapshot.entries[2].track.duration_ms, 200_000);
    }

    #[test]
    fn test_legacy_csv_bad_rows_are_skipped_or_defaulted() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(tmp.path());
        let path = tmp.path().join("hal-h-liked-songs-20200101_000000.csv");
        let header = export::HEADER.join(",");
        fs::write(
            &path,
            format!(
                "{header}\n\
                 1,Band,Tune,03:30,abc,https://x,2021-02-03,Record,id1\n\
                 2,,,,,,,,\n"
            ),
        )
        .unwrap();

        let snapshot = store.read_snapshot(&path).unwrap();
        assert_eq!(snapshot.entries.len(), 1);
        let t = &snapshot.entries[0].track;
        assert_eq!(t.popularity, Some(0));
        assert_eq!(t.duration_ms, 210_000);
    }

    // ── Load orchestration ───────────────────────────────────────────────────

    #[test]
    fn test_load_prefers_cache_without_network() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(tmp.path());
        let cached = sample_entries(2);
        store.write_snapshot_at(&user().user_key(), &cached, at(2024, 2, 2)).unwrap();

        let source = FakeLiked::new(paged(sample_entries(80)));
        let outcome = block_on(load(&source, &store, &user(), false)).unwrap();

        assert_eq!(source.calls(), 0);
        assert!(outcome.from_cache());
        assert_eq!(outcome.entries, cached);
        assert!(outcome.provenance_note().starts_with("Loaded 2 songs from cache"));
    }

    #[test]
    fn test_load_force_refresh_fetches_and_saves() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(tmp.path());
        store.write_snapshot_at(&user().user_key(), &sample_entries(2), at(2020, 2, 2)).unwrap();

        let source = FakeLiked::new(paged(sample_entries(70)));
        let outcome = block_on(load(&source, &store, &user(), true)).unwrap();

        assert_eq!(source.calls(), 3);
        assert_eq!(outcome.entries.len(), 70);
        match &outcome.provenance {
            Provenance::Fresh { saved: Ok(path), .. } => assert!(path.exists()),
            other => panic!("expected a saved fresh fetch, got {other:?}"),
        }
        assert!(outcome.provenance_note().starts_with("Fetched 70 songs from Spotify (saved"));
        assert_eq!(store.list_snapshots(&user().user_key()).unwrap().len(), 2);
    }

    #[test]
    fn test_load_cache_miss_fetches() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(tmp.path());
        let source = FakeLiked::new(paged(sample_entries(5)));

        let outcome = block_on(load(&source, &store, &user(), false)).unwrap();
        assert!(!outcome.from_cache());
        assert_eq!(outcome.entries.len(), 5);
        assert_eq!(outcome.user_key, "Test-User-user1");
        assert!(store.find_latest(&outcome.user_key).is_some());
    }

    #[test]
    fn test_load_unreadable_snapshot_counts_as_miss() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(tmp.path());
        let bad = tmp
            .path()
            .join(format!("{}-liked-songs-20990101_000000.json", user().user_key()));
        fs::write(&bad, "{ not json").unwrap();

        let source = FakeLiked::new(paged(sample_entries(3)));
        let outcome = block_on(load(&source, &store, &user(), false)).unwrap();
        assert!(source.calls() > 0);
        assert_eq!(outcome.entries.len(), 3);
    }

    #[test]
    fn test_load_write_failure_only_changes_note() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();
        let store = SnapshotStore::new(blocker.join("cache"));

        let source = FakeLiked::new(paged(sample_entries(4)));
        let outcome = block_on(load(&source, &store, &user(), false)).unwrap();

        assert_eq!(outcome.entries.len(), 4);
        assert!(matches!(outcome.provenance, Provenance::Fresh { saved: Err(_), .. }));
        assert!(outcome.provenance_note().contains("not cached"));
    }

    #[test]
    fn test_load_fetch_failure_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(tmp.path());
        let mut source = FakeLiked::new(paged(sample_entries(60)));
        source.fail_on_call = Some(0);

        assert!(block_on(load(&source, &store, &user(), true)).is_err());
        assert!(store.find_latest(&user().user_key()).is_none());
    }

    // ── CSV export ───────────────────────────────────────────────────────────

    fn read_rows(bytes: &[u8]) -> Vec<csv::StringRecord> {
        csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(bytes)
            .records()
            .map(|r| r.unwrap())
            .collect()
    }

    #[test]
    fn test_export_row_layout() {
        let mut t = track("abc", "Song", &["First", "Second"], "LP", 245_000);
        t.popularity = None;
        let mut out = Vec::new();
        export::write_entries(&[liked(t, 9)], &mut out).unwrap();

        let rows = read_rows(&out);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].iter().collect::<Vec<_>>(), export::HEADER.to_vec());
        let row: Vec<&str> = rows[1].iter().collect();
        assert_eq!(
            row,
            vec![
                "1",
                "First, Second",
                "Song",
                "04:05",
                "0",
                "https://open.spotify.com/track/abc",
                "2024-01-09",
                "LP",
                "abc",
            ]
        );
    }

    #[test]
    fn test_export_rows_map_back_to_entries() {
        let entries = vec![
            liked(track("a", "Ünïcode, with comma", &["X", "Y"], "Alb \"q\"", 61_000), 3),
            liked(track("b", "Plain", &["Z"], "Other", 3_599_000), 4),
        ];
        let mut out = Vec::new();
        export::write_entries(&entries, &mut out).unwrap();

        let rows = read_rows(&out);
        let back: Vec<LikedEntry> = rows[1..].iter().filter_map(export::entry_from_row).collect();
        assert_eq!(back.len(), 2);
        for (orig, got) in entries.iter().zip(&back) {
            assert_eq!(got.track.id, orig.track.id);
            assert_eq!(got.track.name, orig.track.name);
            assert_eq!(got.track.artists, orig.track.artists);
            assert_eq!(got.track.album, orig.track.album);
            assert_eq!(got.track.duration_ms, orig.track.duration_ms);
            assert_eq!(got.added_at.date_naive(), orig.added_at.date_naive());
        }
    }

    #[test]
    fn test_artist_with_comma_splits_on_the_way_back() {
        let entries = vec![liked(track("tc", "See You Again", &["Tyler, The Creator"], "Flower Boy", 180_000), 2)];
        let mut out = Vec::new();
        export::write_entries(&entries, &mut out).unwrap();

        let rows = read_rows(&out);
        assert_eq!(&rows[1][1], "Tyler, The Creator");
        let back = export::entry_from_row(&rows[1]).unwrap();
        assert_eq!(back.track.artists, vec!["Tyler".to_string(), "The Creator".to_string()]);
        assert!(back.track.artist_ids.is_empty());
    }

    #[test]
    fn test_export_creates_parent_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested/dir").join(export::EXPORT_FILE_NAME);
        export::export(&sample_entries(2), &path).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 3);
    }

    #[test]
    fn test_entry_from_row_defaults_and_rejects() {
        let row = csv::StringRecord::from(vec![
            "7", "Solo", "Name", "garbage", "n/a", "", "not a date", "", "id7",
        ]);
        let entry = export::entry_from_row(&row).unwrap();
        assert_eq!(entry.track.duration_ms, 0);
        assert_eq!(entry.track.popularity, Some(0));
        assert_eq!(entry.added_at, DateTime::<Utc>::default());

        let empty = csv::StringRecord::from(vec!["1", "Someone", "", "01:00", "3", "", "", "", ""]);
        assert!(export::entry_from_row(&empty).is_none());
    }

    // ── Model ────────────────────────────────────────────────────────────────

    #[test]
    fn test_duration_format_and_parse() {
        assert_eq!(format_duration(245_000), "04:05");
        assert_eq!(format_duration(0), "00:00");
        assert_eq!(format_duration(245_999), "04:05");
        assert_eq!(parse_duration("4:05"), Some(245_000));
        assert_eq!(parse_duration("04:75"), None);
        assert_eq!(parse_duration("abc"), None);
    }

    #[test]
    fn test_user_key_is_filesystem_safe() {
        let profile = UserProfile {
            id: "u:1".to_string(),
            display_name: Some("DJ Name/Remix".to_string()),
        };
        assert_eq!(profile.user_key(), "DJ-NameRemix-u1");
        assert_eq!(profile.label(), "DJ Name/Remix");

        let anon = UserProfile { id: "xyz".to_string(), display_name: None };
        assert_eq!(anon.user_key(), "xyz-xyz");
        assert_eq!(anon.label(), "xyz");
    }

    #[test]
    fn test_track_helpers() {
        let t = track("id9", "Night Drive", &["The Band"], "Roads", 1000);
        assert!(t.matches("night"));
        assert!(t.matches("BAND"));
        assert!(t.matches("roads"));
        assert!(t.matches(""));
        assert!(!t.matches("jazz"));
        assert_eq!(t.uri().as_deref(), Some("spotify:track:id9"));
        assert_eq!(t.release_year().as_deref(), Some("2019"));
        assert_eq!(TrackRecord::default().uri(), None);
    }

    // ── Taste analysis ───────────────────────────────────────────────────────

    #[test]
    fn test_analysis_genre_ties_keep_first_seen() {
        let tracks = vec![
            track("1", "One", &["a1"], "Alb", 1),
            track("2", "Two", &["a2"], "Alb", 1),
        ];
        let mut source = FakeTaste::new(moderate_attrs());
        source.genres.insert("id-a1".into(), vec!["pop".into(), "rock".into()]);
        source.genres.insert("id-a2".into(), vec!["rock".into(), "pop".into()]);

        let result = block_on(analysis::analyze(&source, &tracks, 100, "liked"));
        assert_eq!(result.top_genres[0], RankedCount { name: "pop".into(), count: 2 });
        assert_eq!(result.top_genres[1], RankedCount { name: "rock".into(), count: 2 });
        assert_eq!(result.top_albums[0].count, 2);
        assert_eq!(result.top_years[0].name, "2019");
        assert!(result
            .observations
            .contains(&"Your top genre is pop (2 tracks).".to_string()));
    }

    #[test]
    fn test_analysis_skips_failed_batch() {
        let tracks: Vec<TrackRecord> = sample_entries(60).into_iter().map(|e| e.track).collect();
        let mut source = FakeTaste::new(moderate_attrs());
        source.fail_feature_batch = Some(0);

        let result = block_on(analysis::analyze(&source, &tracks, 100, "liked"));
        assert_eq!(result.skipped_batches, 1);
        assert_eq!(result.tracks_analyzed, 60);
        let dance = result.stats(Attribute::Danceability).unwrap();
        assert_eq!(dance.samples, 10);
        assert!((dance.average - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_analysis_respects_limit_and_batches() {
        let tracks: Vec<TrackRecord> = sample_entries(150).into_iter().map(|e| e.track).collect();
        let source = FakeTaste::new(moderate_attrs());

        let result = block_on(analysis::analyze(&source, &tracks, 100, "playlist"));
        assert_eq!(result.tracks_analyzed, 100);
        assert_eq!(source.feature_calls.load(Ordering::SeqCst), 2);
        let ids = source.feature_ids.lock().unwrap();
        assert_eq!(ids.len(), 100);
        assert_eq!(ids[99], "t99");
    }

    fn analysis_with(attrs: &[(Attribute, f64)]) -> TasteAnalysis {
        TasteAnalysis {
            kind: "liked".into(),
            tracks_analyzed: 3,
            generated_at: at(2024, 5, 5),
            attributes: attrs
                .iter()
                .map(|&(a, v)| (a, AttributeStats { average: v, min: v, max: v, samples: 3 }))
                .collect(),
            top_genres: vec![],
            top_artists: vec![RankedCount { name: "Artist".into(), count: 3 }],
            top_albums: vec![],
            top_years: vec![],
            observations: vec![],
            skipped_batches: 0,
        }
    }

    #[test]
    fn test_observation_thresholds() {
        let a = analysis_with(&[
            (Attribute::Danceability, 0.8),
            (Attribute::Energy, 0.2),
            (Attribute::Valence, 0.5),
            (Attribute::Acousticness, 0.4),
            (Attribute::Tempo, 130.0),
        ]);
        let obs = analysis::observations(&a);
        assert_eq!(obs.len(), 4);
        assert!(obs[0].contains("highly danceable"));
        assert!(obs[1].contains("calm"));
        assert!(obs[2].contains("between happy and sad"));
        assert_eq!(obs[3], "You like fast tempos (average 130 BPM).");

        let b = analysis_with(&[
            (Attribute::Danceability, 0.7),
            (Attribute::Acousticness, 0.9),
            (Attribute::Tempo, 80.0),
        ]);
        let obs = analysis::observations(&b);
        assert!(obs[0].contains("balances"));
        assert!(obs[1].contains("acoustic"));
        assert!(obs[2].contains("slower tempos"));
    }

    #[test]
    fn test_analysis_without_attributes_has_no_observations() {
        assert!(analysis::observations(&analysis_with(&[])).is_empty());
    }

    #[test]
    fn test_export_analysis_layout() {
        let tmp = tempfile::tempdir().unwrap();
        let mut a = analysis_with(&[(Attribute::Energy, 0.25)]);
        a.top_genres = vec![RankedCount { name: "pop".into(), count: 2 }];

        let path = analysis::export_analysis(&a, tmp.path()).unwrap();
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("music_analysis_liked_"));
        assert!(name.ends_with(".csv"));

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "Music Analysis Summary,,");
        assert_eq!(lines[1], "Type,liked,");
        assert_eq!(lines[2], "Tracks Analyzed,3,");
        assert_eq!(lines[4], ",,");
        assert_eq!(lines[5], "Attribute,Average,Min,Max");
        assert_eq!(lines[6], "Energy,0.250,0.250,0.250");
        assert_eq!(lines[7], ",,");
        assert_eq!(lines[8], "Top Genres,,");
        assert_eq!(lines[9], "Rank,Genre,Count");
        assert_eq!(lines[10], "1,pop,2");
        assert!(lines.contains(&"Rank,Artist,Count"));
        assert!(lines.contains(&"1,Artist,3"));
        assert!(lines.contains(&"Rank,Year,Count"));
    }

    // ── Config ───────────────────────────────────────────────────────────────

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    const VALID: &[(&str, &str)] = &[
        ("SPOTIFY_CLIENT_ID", "cid"),
        ("SPOTIFY_CLIENT_SECRET", "secret"),
        ("SPOTIFY_REDIRECT_URI", "http://127.0.0.1:8888/callback"),
        ("LIKESHELF_DATA_DIR", "/tmp/likeshelf-test"),
    ];

    #[test]
    fn test_config_valid() {
        let config = config_from(VALID).unwrap();
        assert_eq!(config.client_id, "cid");
        assert_eq!(config.cache_dir(), std::path::PathBuf::from("/tmp/likeshelf-test/cache"));
        assert_eq!(config.export_dir(), std::path::PathBuf::from("/tmp/likeshelf-test/exports"));
        assert_eq!(config.callback_addr().unwrap(), "127.0.0.1:8888");
        assert_eq!(config.callback_path(), "/callback");
    }

    #[test]
    fn test_config_missing_and_blank_values() {
        let missing: Vec<_> = VALID.iter().copied().filter(|(k, _)| *k != "SPOTIFY_CLIENT_ID").collect();
        assert!(matches!(config_from(&missing), Err(ConfigError::Missing("SPOTIFY_CLIENT_ID"))));

        let mut blank = VALID.to_vec();
        blank[1] = ("SPOTIFY_CLIENT_SECRET", "   ");
        assert!(matches!(config_from(&blank), Err(ConfigError::Missing("SPOTIFY_CLIENT_SECRET"))));
    }

    #[test]
    fn test_config_redirect_uri_variants() {
        let mut vars = VALID.to_vec();
        vars[2] = ("SPOTIFY_REDIRECT_URI", "spotify-app://callback");
        assert!(matches!(config_from(&vars), Err(ConfigError::Invalid { .. })));

        vars[2] = ("SPOTIFY_REDIRECT_URI", "http://localhost/cb?x=1");
        let config = config_from(&vars).unwrap();
        assert_eq!(config.callback_addr().unwrap(), "localhost:80");
        assert_eq!(config.callback_path(), "/cb");

        vars[2] = ("SPOTIFY_REDIRECT_URI", "http://localhost:port/cb");
        assert!(config_from(&vars).unwrap().callback_addr().is_err());
    }

    // ── OAuth redirect ───────────────────────────────────────────────────────

    #[test]
    fn test_parse_redirect_request() {
        let req = "GET /callback?code=AQB123&state=s7 HTTP/1.1\r\nHost: 127.0.0.1:8888\r\n\r\n";
        let (path, params) = parse_redirect_request(req);
        assert_eq!(path, "/callback");
        assert_eq!(params.get("code").map(String::as_str), Some("AQB123"));

        let redirect = redirect_from_params(&params, "s7").unwrap();
        assert_eq!(redirect.code, "AQB123");
    }

    #[test]
    fn test_redirect_errors() {
        let (_, params) = parse_redirect_request("GET /callback?code=c&state=other HTTP/1.1");
        assert!(matches!(redirect_from_params(&params, "s7"), Err(AuthError::StateMismatch)));

        let (_, params) = parse_redirect_request("GET /callback?error=access_denied&state=s7 HTTP/1.1");
        assert!(matches!(redirect_from_params(&params, "s7"), Err(AuthError::Denied(e)) if e == "access_denied"));

        let (_, params) = parse_redirect_request("GET /callback?state=s7 HTTP/1.1");
        assert!(matches!(redirect_from_params(&params, "s7"), Err(AuthError::MissingCode)));
    }

    // ── NowPlaying ───────────────────────────────────────────────────────────

    #[test]
    fn test_progress_percent_zero_duration() {
        let np = NowPlaying::default();
        assert_eq!(np.progress_percent(), 0.0);
    }

    #[test]
    fn test_progress_percent_clamped() {
        let np = NowPlaying {
            duration_ms: 100,
            progress_ms: 200,
            ..Default::default()
        };
        assert_eq!(np.progress_percent(), 1.0);
    }

    #[test]
    fn test_progress_formatted() {
        let np = NowPlaying {
            duration_ms: 213_000,
            progress_ms: 90_000,
            ..Default::default()
        };
        assert_eq!(np.progress_formatted(), "1:30 / 3:33");
    }

    // ── AppState ─────────────────────────────────────────────────────────────

    #[test]
    fn test_navigate_to_changes_screen() {
        let mut state = AppState::default();
        assert_eq!(state.active_screen, ActiveScreen::Library);
        state.navigate_to(ActiveScreen::Insights);
        assert_eq!(state.active_screen, ActiveScreen::Insights);
        assert_eq!(state.previous_screen, Some(ActiveScreen::Library));

        state.navigate_to(ActiveScreen::Insights);
        assert_eq!(state.previous_screen, Some(ActiveScreen::Library));
    }

    #[test]
    fn test_notification_expires() {
        let mut state = AppState::default();
        state.set_notification(Notification::info("hello"));
        for _ in 0..31 {
            state.tick_notification();
        }
        assert!(state.notification.is_none());
    }

    #[test]
    fn test_library_filter_and_clamp() {
        let mut state = AppState::default();
        state.library.entries = vec![
            liked(track("1", "Blue Monday", &["New Order"], "Power", 1), 1),
            liked(track("2", "Blue Velvet", &["Bobby Vinton"], "Blue", 1), 2),
            liked(track("3", "Red Rain", &["Peter Gabriel"], "So", 1), 3),
        ];
        state.library.selected = 2;

        state.library.filter = "BLUE".to_string();
        assert_eq!(state.library.visible().len(), 2);
        state.clamp_selections();
        assert_eq!(state.library.selected, 1);

        state.library.filter = "gabriel".to_string();
        assert_eq!(state.library.visible_tracks()[0].id, "3");
    }

    #[test]
    fn test_unauthenticated_by_default() {
        let state = AppState::default();
        assert!(!state.is_authenticated());
        assert!(!state.is_editing());
    }

    #[test]
    fn test_display_title_scrolls_when_too_wide() {
        let mut state = AppState::default();
        state.now_playing.name = "Short".to_string();
        assert_eq!(state.get_display_title(10), "Short");

        state.now_playing.name = "A Very Long Track Title".to_string();
        state.ticker_offset = 2;
        assert_eq!(state.get_display_title(6), "Very L");
    }

    // ── Key mapping ──────────────────────────────────────────────────────────

    #[test]
    fn test_key_mapping() {
        use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
        let key = |c| KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE);

        assert_eq!(map_key_to_action(key('r'), false), Some(UserAction::Refresh));
        assert_eq!(map_key_to_action(key('x'), false), Some(UserAction::Export));
        assert_eq!(map_key_to_action(key('4'), false), Some(UserAction::SwitchScreen(4)));
        assert_eq!(map_key_to_action(key('r'), true), Some(UserAction::Input('r')));
        assert_eq!(
            map_key_to_action(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL), true),
            Some(UserAction::Quit)
        );
        assert_eq!(map_key_to_action(key('z'), false), None);
    }

    #[test]
    fn test_login_keys() {
        use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
        let plain = |code| KeyEvent::new(code, KeyModifiers::NONE);

        assert_eq!(map_login_key(plain(KeyCode::Esc)), Some(UserAction::Back));
        assert_eq!(map_login_key(plain(KeyCode::Char('q'))), Some(UserAction::Quit));
        assert_eq!(
            map_login_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(UserAction::Quit)
        );
        assert_eq!(map_login_key(plain(KeyCode::Char('c'))), None);
        assert_eq!(map_login_key(plain(KeyCode::Char('L'))), None);
        assert_eq!(map_login_key(plain(KeyCode::Enter)), None);
    }

    // ── Rendering ────────────────────────────────────────────────────────────

    #[test]
    fn test_every_screen_renders() {
        use ratatui::{backend::TestBackend, Terminal};

        let mut state = AppState::default();
        state.library.entries = sample_entries(30);
        state.library.provenance = Some("Loaded 30 songs from cache".into());
        state.search.tracks = sample_entries(3).into_iter().map(|e| e.track).collect();
        state.insights.analysis = Some(analysis_with(&[(Attribute::Energy, 0.9)]));
        state.now_playing.name = "Playing Now".into();
        state.set_notification(Notification::error("Something went wrong"));
        state.show_help = true;

        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        for screen in [
            ActiveScreen::Library,
            ActiveScreen::Search,
            ActiveScreen::Playlists,
            ActiveScreen::Insights,
        ] {
            state.navigate_to(screen);
            terminal.draw(|f| crate::ui::render(f, &state)).unwrap();
        }

        // tiny terminals must not panic either
        let mut small = Terminal::new(TestBackend::new(20, 6)).unwrap();
        small.draw(|f| crate::ui::render(f, &state)).unwrap();
    }
}
