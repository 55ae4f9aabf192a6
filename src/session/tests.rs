use super::primitive::MockPlaybackPrimitive;
use super::*;
use crate::library::{Playlist, Track, TrackId};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Load(PathBuf),
    Play,
    Pause,
    SetVolume(f32),
    SetPosition(Duration),
}

type Calls = Arc<Mutex<Vec<Call>>>;
type SharedDuration = Arc<Mutex<Option<Duration>>>;

fn track(id: TrackId) -> Track {
    Track {
        id,
        title: format!("Song {id}"),
        artist: format!("Artist {id}"),
        album: None,
        duration_label: "3:30".to_string(),
        source: PathBuf::from(format!("/music/song{id}.mp3")),
        cover_art: None,
        display: format!("Artist {id} - Song {id}"),
    }
}

fn playlist(len: u32) -> Playlist {
    Playlist::new((1..=len).map(track).collect()).unwrap()
}

fn source(id: TrackId) -> PathBuf {
    PathBuf::from(format!("/music/song{id}.mp3"))
}

/// A primitive that records every command and reports whatever duration is
/// stored in the returned handle.
fn recording_primitive() -> (MockPlaybackPrimitive, Calls, SharedDuration) {
    let calls: Calls = Arc::new(Mutex::new(Vec::new()));
    let duration: SharedDuration = Arc::new(Mutex::new(None));
    let mut mock = MockPlaybackPrimitive::new();

    let c = calls.clone();
    mock.expect_load()
        .returning(move |p: &Path| c.lock().unwrap().push(Call::Load(p.to_path_buf())));
    let c = calls.clone();
    mock.expect_play()
        .returning(move || c.lock().unwrap().push(Call::Play));
    let c = calls.clone();
    mock.expect_pause()
        .returning(move || c.lock().unwrap().push(Call::Pause));
    let c = calls.clone();
    mock.expect_set_volume()
        .returning(move |v| c.lock().unwrap().push(Call::SetVolume(v)));
    let c = calls.clone();
    mock.expect_set_position()
        .returning(move |p| c.lock().unwrap().push(Call::SetPosition(p)));
    let d = duration.clone();
    mock.expect_duration()
        .returning(move || *d.lock().unwrap());

    (mock, calls, duration)
}

fn controller(
    len: u32,
) -> (
    PlaybackSessionController<MockPlaybackPrimitive, StdRng>,
    Calls,
    SharedDuration,
) {
    let (mock, calls, duration) = recording_primitive();
    let controller =
        PlaybackSessionController::with_rng(playlist(len), mock, StdRng::seed_from_u64(7));
    calls.lock().unwrap().clear();
    (controller, calls, duration)
}

fn take(calls: &Calls) -> Vec<Call> {
    std::mem::take(&mut *calls.lock().unwrap())
}

#[test]
fn new_session_starts_on_first_track_paused_at_full_volume() {
    let (mock, calls, _) = recording_primitive();
    let controller =
        PlaybackSessionController::with_rng(playlist(4), mock, StdRng::seed_from_u64(1));

    let s = controller.snapshot();
    assert_eq!(s.current_track_id(), 1);
    assert!(!s.is_playing());
    assert_eq!(s.volume(), 1.0);
    assert_eq!(s.progress(), 0.0);
    assert!(!s.shuffle_enabled());
    assert!(!s.repeat_enabled());
    assert_eq!(
        take(&calls),
        vec![Call::SetVolume(1.0), Call::Load(source(1))]
    );
}

#[test]
fn select_track_sets_current_and_resets_progress_for_every_track() {
    let (mut controller, calls, _) = controller(4);

    for id in 1..=4 {
        controller.on_primitive_progress(Duration::from_secs(10), Some(Duration::from_secs(40)));
        controller.select_track(id).unwrap();

        let s = controller.snapshot();
        assert_eq!(s.current_track_id(), id);
        assert_eq!(s.progress(), 0.0);
        assert!(!s.is_playing());
        assert_eq!(take(&calls), vec![Call::Load(source(id))]);
    }
}

#[test]
fn select_track_while_playing_starts_output() {
    let (mut controller, calls, _) = controller(4);
    controller.toggle_play_pause();
    take(&calls);

    controller.select_track(3).unwrap();
    assert!(controller.snapshot().is_playing());
    assert_eq!(take(&calls), vec![Call::Load(source(3)), Call::Play]);
}

#[test]
fn selecting_the_current_track_restarts_it() {
    let (mut controller, calls, _) = controller(4);
    controller.on_primitive_progress(Duration::from_secs(30), Some(Duration::from_secs(60)));
    assert_eq!(controller.snapshot().progress(), 0.5);

    controller.select_track(1).unwrap();
    assert_eq!(controller.snapshot().progress(), 0.0);
    assert_eq!(take(&calls), vec![Call::Load(source(1))]);
}

#[test]
fn select_unknown_track_is_rejected_without_side_effects() {
    let (mut controller, calls, _) = controller(4);
    let before = controller.snapshot();

    assert_eq!(
        controller.select_track(42),
        Err(SessionError::UnknownTrack(42))
    );
    assert_eq!(controller.snapshot(), before);
    assert!(take(&calls).is_empty());
}

#[test]
fn toggle_play_pause_issues_exactly_one_matching_command() {
    let mut mock = MockPlaybackPrimitive::new();
    mock.expect_load().times(1).return_const(());
    mock.expect_set_volume().times(1).return_const(());
    mock.expect_play().times(1).return_const(());
    mock.expect_pause().times(1).return_const(());

    let mut controller =
        PlaybackSessionController::with_rng(playlist(2), mock, StdRng::seed_from_u64(3));

    assert!(controller.toggle_play_pause());
    assert!(controller.snapshot().is_playing());
    assert!(!controller.toggle_play_pause());
    assert!(!controller.snapshot().is_playing());
}

#[test]
fn advance_without_shuffle_wraps_in_playlist_order() {
    let (mut controller, calls, _) = controller(4);

    for start in 1..=4u32 {
        controller.select_track(start).unwrap();
        controller.advance(Direction::Next);
        assert_eq!(controller.snapshot().current_track_id(), start % 4 + 1);

        controller.select_track(start).unwrap();
        controller.advance(Direction::Previous);
        assert_eq!(controller.snapshot().current_track_id(), (start + 2) % 4 + 1);
    }
    take(&calls);
}

#[test]
fn advance_forces_playing_and_resets_progress() {
    let (mut controller, calls, _) = controller(4);
    controller.on_primitive_progress(Duration::from_secs(10), Some(Duration::from_secs(20)));

    let id = controller.advance(Direction::Next);
    let s = controller.snapshot();
    assert_eq!(id, 2);
    assert!(s.is_playing());
    assert_eq!(s.progress(), 0.0);
    assert_eq!(take(&calls), vec![Call::Load(source(2)), Call::Play]);
}

#[test]
fn next_then_previous_returns_to_the_original_track() {
    let (mut controller, _, _) = controller(4);
    controller.select_track(3).unwrap();

    controller.advance(Direction::Next);
    controller.advance(Direction::Previous);
    assert_eq!(controller.snapshot().current_track_id(), 3);
}

#[test]
fn previous_ignores_shuffle() {
    let (mut controller, _, _) = controller(4);
    controller.toggle_shuffle();

    for _ in 0..8 {
        let before = controller.current_index();
        controller.advance(Direction::Previous);
        assert_eq!(controller.current_index(), (before + 3) % 4);
    }
}

#[test]
fn shuffled_next_stays_inside_the_playlist_and_plays() {
    let (mut controller, calls, _) = controller(4);
    assert!(controller.toggle_shuffle());

    let mut seen = std::collections::HashSet::new();
    for _ in 0..64 {
        let id = controller.advance(Direction::Next);
        assert!((1..=4).contains(&id));
        assert!(controller.snapshot().is_playing());
        seen.insert(id);
    }
    // 64 uniform draws over 4 tracks hit more than one of them.
    assert!(seen.len() > 1);
    assert!(take(&calls).iter().any(|c| *c == Call::Play));
}

#[test]
fn single_track_playlist_reloads_the_same_track_in_both_directions() {
    let (mut controller, calls, _) = controller(1);

    assert_eq!(controller.advance(Direction::Next), 1);
    assert_eq!(controller.advance(Direction::Previous), 1);
    assert_eq!(
        take(&calls),
        vec![
            Call::Load(source(1)),
            Call::Play,
            Call::Load(source(1)),
            Call::Play
        ]
    );
}

#[test]
fn set_volume_clamps_out_of_range_and_keeps_in_range_values_exact() {
    let (mut controller, calls, _) = controller(2);

    assert_eq!(controller.set_volume(0.35), Ok(0.35));
    assert_eq!(controller.snapshot().volume(), 0.35);
    assert_eq!(controller.set_volume(1.7), Ok(1.0));
    assert_eq!(controller.snapshot().volume(), 1.0);
    assert_eq!(controller.set_volume(-0.2), Ok(0.0));
    assert_eq!(controller.snapshot().volume(), 0.0);

    assert_eq!(
        take(&calls),
        vec![
            Call::SetVolume(0.35),
            Call::SetVolume(1.0),
            Call::SetVolume(0.0)
        ]
    );
}

#[test]
fn set_volume_rejects_nan() {
    let (mut controller, calls, _) = controller(2);

    assert!(matches!(
        controller.set_volume(f32::NAN),
        Err(SessionError::InvalidArgument { name: "volume", .. })
    ));
    assert_eq!(controller.snapshot().volume(), 1.0);
    assert!(take(&calls).is_empty());
}

#[test]
fn seek_before_duration_is_known_is_a_silent_no_op() {
    let (mut controller, calls, duration) = controller(2);
    let before = controller.snapshot();

    assert_eq!(controller.seek(0.5), Ok(()));
    assert_eq!(controller.snapshot(), before);

    *duration.lock().unwrap() = Some(Duration::ZERO);
    assert_eq!(controller.seek(0.5), Ok(()));
    assert_eq!(controller.snapshot(), before);
    assert!(take(&calls).is_empty());
}

#[test]
fn seek_jumps_to_fraction_of_total() {
    let (mut controller, calls, duration) = controller(2);
    *duration.lock().unwrap() = Some(Duration::from_secs(200));

    controller.seek(0.25).unwrap();
    assert_eq!(controller.snapshot().progress(), 0.25);
    assert_eq!(controller.position(), Some(Duration::from_secs(50)));
    assert_eq!(
        take(&calls),
        vec![Call::SetPosition(Duration::from_secs(50))]
    );
}

#[test]
fn seek_rejects_out_of_range_fractions() {
    let (mut controller, calls, duration) = controller(2);
    *duration.lock().unwrap() = Some(Duration::from_secs(200));

    for bad in [-0.1, 1.5, f32::NAN] {
        assert!(controller.seek(bad).is_err());
    }
    assert_eq!(controller.snapshot().progress(), 0.0);
    assert!(take(&calls).is_empty());
}

#[test]
fn progress_is_elapsed_over_total_and_ignores_unknown_totals() {
    let (mut controller, _, _) = controller(2);

    controller.on_primitive_progress(Duration::from_secs(30), Some(Duration::from_secs(120)));
    assert_eq!(controller.snapshot().progress(), 0.25);

    controller.on_primitive_progress(Duration::from_secs(60), None);
    assert_eq!(controller.snapshot().progress(), 0.25);

    controller.on_primitive_progress(Duration::from_secs(60), Some(Duration::ZERO));
    assert_eq!(controller.snapshot().progress(), 0.25);
}

#[test]
fn ended_with_repeat_restarts_the_same_track() {
    let (mut controller, calls, _) = controller(4);
    controller.select_track(2).unwrap();
    controller.toggle_play_pause();
    assert!(controller.toggle_repeat());
    controller.on_primitive_progress(Duration::from_secs(100), Some(Duration::from_secs(100)));
    take(&calls);

    controller.on_primitive_ended();
    let s = controller.snapshot();
    assert_eq!(s.current_track_id(), 2);
    assert!(s.is_playing());
    assert_eq!(s.progress(), 0.0);
    assert_eq!(
        take(&calls),
        vec![Call::SetPosition(Duration::ZERO), Call::Play]
    );
}

#[test]
fn ended_without_repeat_behaves_like_advance_next() {
    let (mut ended, ended_calls, _) = controller(4);
    let (mut advanced, advanced_calls, _) = controller(4);

    for c in [&mut ended, &mut advanced] {
        c.select_track(4).unwrap();
    }
    take(&ended_calls);
    take(&advanced_calls);

    ended.on_primitive_ended();
    advanced.advance(Direction::Next);

    assert_eq!(ended.snapshot(), advanced.snapshot());
    assert_eq!(ended.snapshot().current_track_id(), 1);
    assert_eq!(take(&ended_calls), take(&advanced_calls));
}

#[test]
fn toggling_shuffle_and_repeat_has_no_primitive_side_effects() {
    let (mut controller, calls, _) = controller(3);

    assert!(controller.toggle_shuffle());
    assert!(controller.toggle_repeat());
    assert!(!controller.toggle_shuffle());
    assert!(!controller.toggle_repeat());

    assert_eq!(controller.snapshot().current_track_id(), 1);
    assert!(take(&calls).is_empty());
}

#[test]
fn primitive_events_dispatch_to_callbacks() {
    let (mut controller, _, _) = controller(3);

    controller.on_primitive_event(PrimitiveEvent::Progress {
        elapsed: Duration::from_secs(15),
        total: Some(Duration::from_secs(60)),
    });
    assert_eq!(controller.snapshot().progress(), 0.25);

    controller.on_primitive_event(PrimitiveEvent::Error("decode failed".to_string()));
    assert_eq!(controller.snapshot().current_track_id(), 1);

    controller.on_primitive_event(PrimitiveEvent::Ended);
    assert_eq!(controller.snapshot().current_track_id(), 2);
    assert!(controller.snapshot().is_playing());
}

#[test]
fn four_track_session_scenario() {
    let (mut controller, calls, _) = controller(4);
    assert_eq!(controller.snapshot().current_track_id(), 1);
    assert!(!controller.snapshot().is_playing());

    controller.toggle_play_pause();
    assert!(controller.snapshot().is_playing());
    assert_eq!(take(&calls), vec![Call::Play]);

    controller.advance(Direction::Next);
    let s = controller.snapshot();
    assert_eq!(s.current_track_id(), 2);
    assert_eq!(s.progress(), 0.0);
    assert!(s.is_playing());

    controller.toggle_shuffle();
    controller.advance(Direction::Next);
    let s = controller.snapshot();
    assert!((1..=4).contains(&s.current_track_id()));
    assert!(s.is_playing());

    let before = controller.snapshot();
    controller.seek(0.5).unwrap();
    assert_eq!(controller.snapshot(), before);

    controller.on_primitive_progress(Duration::from_secs(30), Some(Duration::from_secs(120)));
    assert_eq!(controller.snapshot().progress(), 0.25);
}
