use super::*;
use std::path::PathBuf;
use std::sync::mpsc;

fn make_track() -> Track {
    Track {
        id: 7,
        title: "Test Title".to_string(),
        artist: "Test Artist".to_string(),
        album: Some("Test Album".to_string()),
        duration_label: "0:01".to_string(),
        source: PathBuf::from("/tmp/music/test.mp3"),
        cover_art: Some("https://example.org/cover.jpg".to_string()),
        display: "Test Artist - Test Title".to_string(),
    }
}

fn iface() -> (PlayerIface, Arc<Mutex<SharedState>>, mpsc::Receiver<ControlCmd>) {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (tx, rx) = mpsc::channel::<ControlCmd>();
    let iface = PlayerIface {
        tx,
        state: state.clone(),
    };
    (iface, state, rx)
}

#[test]
fn set_track_metadata_replaces_the_previous_track() {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let handle = MprisHandle {
        state: state.clone(),
    };

    let track = make_track();
    handle.set_track_metadata(&track, Some(Duration::from_micros(1_234_567)));

    {
        let s = state.lock().unwrap();
        assert_eq!(s.title.as_deref(), Some("Test Title"));
        assert_eq!(s.artist, vec!["Test Artist".to_string()]);
        assert_eq!(s.album.as_deref(), Some("Test Album"));
        assert_eq!(s.url.as_deref(), Some("file:///tmp/music/test.mp3"));
        assert_eq!(s.art_url.as_deref(), Some("https://example.org/cover.jpg"));
        assert_eq!(s.length_micros, Some(1_234_567));
        assert_eq!(
            s.track_id.as_ref().map(|p| p.as_str()),
            Some("/org/mpris/MediaPlayer2/track/7")
        );
    }

    let bare = Track {
        id: 8,
        title: "Other".to_string(),
        album: None,
        cover_art: None,
        source: PathBuf::from("/tmp/music/other.mp3"),
        ..make_track()
    };
    handle.set_track_metadata(&bare, None);
    {
        let s = state.lock().unwrap();
        assert_eq!(s.title.as_deref(), Some("Other"));
        assert_eq!(s.album, None);
        assert_eq!(s.art_url, None);
        assert_eq!(s.url.as_deref(), Some("file:///tmp/music/other.mp3"));
        assert_eq!(s.length_micros, None);
        assert_eq!(
            s.track_id.as_ref().map(|p| p.as_str()),
            Some("/org/mpris/MediaPlayer2/track/8")
        );
    }
}

#[test]
fn unknown_artist_is_left_out_of_metadata() {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let handle = MprisHandle {
        state: state.clone(),
    };
    let track = Track {
        artist: String::new(),
        ..make_track()
    };
    handle.set_track_metadata(&track, None);

    let s = state.lock().unwrap();
    assert!(s.artist.is_empty());
    assert_eq!(s.length_micros, None);
}

#[test]
fn playback_status_reflects_playing_flag() {
    let (iface, state, _rx) = iface();

    assert_eq!(iface.playback_status(), "Paused");
    state.lock().unwrap().playing = true;
    assert_eq!(iface.playback_status(), "Playing");
}

#[test]
fn modes_and_position_are_exposed_as_properties() {
    let (iface, state, _rx) = iface();
    let handle = MprisHandle {
        state: state.clone(),
    };

    handle.set_modes(true, true, 0.25);
    handle.set_position(Duration::from_millis(1500));

    assert!(iface.shuffle());
    assert_eq!(iface.loop_status(), "Track");
    assert_eq!(iface.volume(), 0.25);
    assert_eq!(iface.position(), 1_500_000);

    handle.set_modes(false, false, 1.0);
    assert_eq!(iface.loop_status(), "None");
}

#[test]
fn property_writes_become_control_commands() {
    let (mut iface, _state, rx) = iface();

    iface.set_shuffle(true);
    iface.set_loop_status("Track".to_string());
    iface.set_loop_status("Playlist".to_string());
    iface.set_volume(0.5);
    iface.seek(-2_000_000);

    let cmds: Vec<ControlCmd> = rx.try_iter().collect();
    assert_eq!(
        cmds,
        vec![
            ControlCmd::SetShuffle(true),
            ControlCmd::SetRepeat(true),
            ControlCmd::SetRepeat(false),
            ControlCmd::SetVolume(0.5),
            ControlCmd::SeekBy(-2_000_000),
        ]
    );
}

#[test]
fn set_position_ignores_stale_track_ids() {
    let (iface, state, rx) = iface();
    state.lock().unwrap().track_id = track_object_path(3);

    let stale = ObjectPath::try_from("/org/mpris/MediaPlayer2/track/2").unwrap();
    iface.set_position(stale, 1_000);
    let current = ObjectPath::try_from("/org/mpris/MediaPlayer2/track/3").unwrap();
    iface.set_position(current.clone(), -5);
    iface.set_position(current, 1_000);

    let cmds: Vec<ControlCmd> = rx.try_iter().collect();
    assert_eq!(
        cmds,
        vec![ControlCmd::SetPosition(Duration::from_micros(1_000))]
    );
}

#[test]
fn metadata_includes_expected_keys_when_present() {
    let (iface, state, _rx) = iface();

    {
        let mut s = state.lock().unwrap();
        s.title = Some("Title".to_string());
        s.artist = vec!["Artist".to_string()];
        s.album = Some("Album".to_string());
        s.url = Some("file:///tmp/test.mp3".to_string());
        s.art_url = Some("file:///tmp/cover.png".to_string());
        s.length_micros = Some(42);
        s.track_id = track_object_path(1);
    }

    let map = iface.metadata();
    for k in [
        "mpris:trackid",
        "xesam:title",
        "xesam:artist",
        "xesam:album",
        "xesam:url",
        "mpris:artUrl",
        "mpris:length",
    ] {
        assert!(map.contains_key(k), "missing key: {k}");
    }
}

#[test]
fn metadata_is_empty_without_a_track() {
    let (iface, _state, _rx) = iface();
    assert!(iface.metadata().is_empty());
}
