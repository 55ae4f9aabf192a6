use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use log::{debug, warn};
use rand::Rng;
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::audio::AudioPlayer;
use crate::config;
use crate::mpris::{ControlCmd, MprisHandle};
use crate::runtime::mpris_sync::{MprisSnapshot, update_mpris};
use crate::session::{Direction, PlaybackPrimitive, PlaybackSessionController, PrimitiveEvent};
use crate::ui;

const SPINNER_INTERVAL: Duration = Duration::from_millis(200);

/// State tracked by the runtime event loop across iterations.
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
    /// Same for `zz`.
    pub pending_zz: bool,
    /// What was last published to MPRIS.
    pub last_mpris: Option<MprisSnapshot>,
    last_spin: Instant,
}

impl EventLoopState {
    pub fn new() -> Self {
        Self {
            pending_gg: false,
            pending_zz: false,
            last_mpris: None,
            last_spin: Instant::now(),
        }
    }
}

impl Default for EventLoopState {
    fn default() -> Self {
        Self::new()
    }
}

/// Main terminal event loop: feeds primitive events into the controller,
/// draws, and dispatches keys and MPRIS commands. Returns `Ok(())` when
/// shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    controller: &mut PlaybackSessionController<AudioPlayer>,
    mpris: &MprisHandle,
    control_rx: &mpsc::Receiver<ControlCmd>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    let fade_out = Duration::from_millis(settings.audio.quit_fade_out_ms);

    loop {
        for event in controller.primitive().poll_events() {
            apply_primitive_event(event, app, controller);
        }

        app.follow(controller.current_index());

        if controller.snapshot().is_playing() && state.last_spin.elapsed() >= SPINNER_INTERVAL {
            app.tick_spinner();
            state.last_spin = Instant::now();
        }

        // Keep MPRIS in sync even when playback changes come from media keys or auto-advance.
        let snapshot = MprisSnapshot::of(controller);
        if state.last_mpris != Some(snapshot) {
            update_mpris(mpris, controller);
            state.last_mpris = Some(snapshot);
        } else {
            mpris.set_position(controller.position().unwrap_or_default());
        }

        let session = controller.snapshot();
        let total = controller.duration();
        terminal.draw(|f| {
            ui::draw(
                f,
                app,
                controller.playlist(),
                &session,
                total,
                &settings.ui,
                &settings.controls,
            )
        })?;

        while let Ok(cmd) = control_rx.try_recv() {
            debug!("MPRIS command {cmd:?}");
            if apply_control(cmd, app, controller) {
                controller.primitive().quit_softly(fade_out);
                return Ok(());
            }
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, app, controller, state) {
                    controller.primitive().quit_softly(fade_out);
                    return Ok(());
                }
            }
        }
    }
}

/// Feed one primitive event to the controller; load failures are also shown
/// in the status line.
pub fn apply_primitive_event<P: PlaybackPrimitive, R: Rng>(
    event: PrimitiveEvent,
    app: &mut App,
    controller: &mut PlaybackSessionController<P, R>,
) {
    if let PrimitiveEvent::Error(msg) = &event {
        app.set_status(msg.clone());
    }
    controller.on_primitive_event(event);
}

/// Apply a remote or keyboard command. Returns `true` when the app should quit.
pub fn apply_control<P: PlaybackPrimitive, R: Rng>(
    cmd: ControlCmd,
    app: &mut App,
    controller: &mut PlaybackSessionController<P, R>,
) -> bool {
    let playing = controller.snapshot().is_playing();
    match cmd {
        ControlCmd::Quit => return true,
        ControlCmd::Play => {
            if !playing {
                controller.toggle_play_pause();
            }
        }
        // There is no stopped state; stop holds the current position like pause.
        ControlCmd::Pause | ControlCmd::Stop => {
            if playing {
                controller.toggle_play_pause();
            }
        }
        ControlCmd::PlayPause => {
            controller.toggle_play_pause();
        }
        ControlCmd::Next => {
            app.follow_playback_on();
            controller.advance(Direction::Next);
        }
        ControlCmd::Prev => {
            app.follow_playback_on();
            controller.advance(Direction::Previous);
        }
        ControlCmd::SeekBy(offset_micros) => seek_by(controller, offset_micros),
        ControlCmd::SetPosition(position) => {
            if let Some(total) = controller.duration().filter(|t| !t.is_zero()) {
                if position <= total {
                    seek_to(controller, position.as_secs_f32() / total.as_secs_f32());
                }
            }
        }
        ControlCmd::SetVolume(volume) => {
            if let Err(e) = controller.set_volume(volume as f32) {
                warn!("rejected volume change: {e}");
            }
        }
        ControlCmd::SetShuffle(on) => {
            if controller.snapshot().shuffle_enabled() != on {
                controller.toggle_shuffle();
            }
        }
        ControlCmd::SetRepeat(on) => {
            if controller.snapshot().repeat_enabled() != on {
                controller.toggle_repeat();
            }
        }
    }
    false
}

/// Relative seek; seeking past the end moves on to the next track.
fn seek_by<P: PlaybackPrimitive, R: Rng>(
    controller: &mut PlaybackSessionController<P, R>,
    offset_micros: i64,
) {
    let Some(total) = controller.duration().filter(|t| !t.is_zero()) else {
        return;
    };
    let position = controller.position().unwrap_or_default();
    let target = position.as_micros() as i128 + i128::from(offset_micros);
    if target > total.as_micros() as i128 {
        controller.advance(Direction::Next);
        return;
    }
    let fraction = target.max(0) as f64 / total.as_micros() as f64;
    seek_to(controller, fraction as f32);
}

fn seek_to<P: PlaybackPrimitive, R: Rng>(
    controller: &mut PlaybackSessionController<P, R>,
    fraction: f32,
) {
    if let Err(e) = controller.seek(fraction.clamp(0.0, 1.0)) {
        debug!("seek rejected: {e}");
    }
}

/// Handle one key press. Returns `true` when the app should quit.
pub fn handle_key_event<P: PlaybackPrimitive, R: Rng>(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    controller: &mut PlaybackSessionController<P, R>,
    state: &mut EventLoopState,
) -> bool {
    app.clear_status();

    let code = key.code;
    if code != KeyCode::Char('g') {
        state.pending_gg = false;
    }
    if code != KeyCode::Char('z') {
        state.pending_zz = false;
    }

    match code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('p') | KeyCode::Char(' ') => {
            return apply_control(ControlCmd::PlayPause, app, controller);
        }
        KeyCode::Char('l') | KeyCode::Char('n') => {
            return apply_control(ControlCmd::Next, app, controller);
        }
        KeyCode::Char('h') | KeyCode::Char('b') => {
            return apply_control(ControlCmd::Prev, app, controller);
        }
        KeyCode::Char('L') => {
            let progress = controller.snapshot().progress();
            seek_to(controller, progress + settings.controls.seek_step);
        }
        KeyCode::Char('H') => {
            let progress = controller.snapshot().progress();
            seek_to(controller, progress - settings.controls.seek_step);
        }
        KeyCode::Char('+') | KeyCode::Char('=') => {
            let volume = controller.snapshot().volume() + settings.controls.volume_step;
            return apply_control(ControlCmd::SetVolume(f64::from(volume)), app, controller);
        }
        KeyCode::Char('-') => {
            let volume = controller.snapshot().volume() - settings.controls.volume_step;
            return apply_control(ControlCmd::SetVolume(f64::from(volume)), app, controller);
        }
        KeyCode::Char('s') => {
            controller.toggle_shuffle();
        }
        KeyCode::Char('r') => {
            controller.toggle_repeat();
        }
        KeyCode::Char('j') => {
            app.follow_playback_off();
            app.next();
        }
        KeyCode::Char('k') => {
            app.follow_playback_off();
            app.prev();
        }
        KeyCode::Char('g') => {
            if state.pending_gg {
                state.pending_gg = false;
                app.follow_playback_off();
                app.first();
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => {
            app.follow_playback_off();
            app.last();
        }
        KeyCode::Char('z') => {
            if state.pending_zz {
                state.pending_zz = false;
                app.follow_playback_on();
                app.set_cursor(controller.current_index());
            } else {
                state.pending_zz = true;
            }
        }
        KeyCode::Enter => {
            if let Some(id) = controller.playlist().get(app.cursor).map(|t| t.id) {
                app.follow_playback_on();
                if let Err(e) = controller.select_track(id) {
                    warn!("cannot select track: {e}");
                }
            }
        }
        KeyCode::Char('t') => app.toggle_theme(),
        KeyCode::Char('P') | KeyCode::Tab => app.toggle_playlist(),
        KeyCode::Char('K') => app.toggle_metadata_window(),
        _ => {}
    }

    false
}
