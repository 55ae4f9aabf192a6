//! MPRIS (`org.mpris.MediaPlayer2`) integration over the session bus.
//!
//! Incoming method calls and property writes become `ControlCmd`s sent to the
//! runtime. Readable properties come from a `SharedState` the runtime refreshes
//! through `MprisHandle`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, mpsc::Sender};
use std::time::Duration;

use async_io::{Timer, block_on};
use log::{debug, warn};
use zbus::{Connection, interface};
use zvariant::{ObjectPath, OwnedObjectPath, OwnedValue, Value};

use crate::library::{Track, TrackId};

const OBJECT_PATH: &str = "/org/mpris/MediaPlayer2";
const BUS_NAME: &str = "org.mpris.MediaPlayer2.andante";

#[derive(Clone, Debug, PartialEq)]
pub enum ControlCmd {
    Quit,
    Play,
    Pause,
    PlayPause,
    Stop,
    Next,
    Prev,
    /// Relative seek in microseconds.
    SeekBy(i64),
    SetPosition(Duration),
    SetVolume(f64),
    SetShuffle(bool),
    SetRepeat(bool),
}

#[derive(Debug)]
struct SharedState {
    playing: bool,
    title: Option<String>,
    artist: Vec<String>,
    album: Option<String>,
    url: Option<String>,
    art_url: Option<String>,
    length_micros: Option<i64>,
    track_id: Option<OwnedObjectPath>,
    shuffle: bool,
    repeat: bool,
    volume: f64,
    position_micros: i64,
}

impl Default for SharedState {
    fn default() -> Self {
        Self {
            playing: false,
            title: None,
            artist: Vec::new(),
            album: None,
            url: None,
            art_url: None,
            length_micros: None,
            track_id: None,
            shuffle: false,
            repeat: false,
            volume: 1.0,
            position_micros: 0,
        }
    }
}

fn track_object_path(id: TrackId) -> Option<OwnedObjectPath> {
    OwnedObjectPath::try_from(format!("{OBJECT_PATH}/track/{id}")).ok()
}

fn micros(d: Duration) -> i64 {
    i64::try_from(d.as_micros()).unwrap_or(i64::MAX)
}

/// Sources that already carry a scheme are passed through; paths become `file://` URLs.
fn source_url(track: &Track) -> String {
    let source = track.source.display().to_string();
    if source.contains("://") {
        source
    } else {
        format!("file://{source}")
    }
}

pub struct MprisHandle {
    state: Arc<Mutex<SharedState>>,
}

impl MprisHandle {
    /// Publish the current track. `length` is the backend-reported duration, if known.
    pub fn set_track_metadata(&self, track: &Track, length: Option<Duration>) {
        let Ok(mut s) = self.state.lock() else {
            return;
        };
        s.title = Some(track.title.clone());
        s.artist = if track.artist.trim().is_empty() {
            Vec::new()
        } else {
            vec![track.artist.clone()]
        };
        s.album = track.album.clone();
        s.url = Some(source_url(track));
        s.art_url = track.cover_art.clone();
        s.length_micros = length.map(micros);
        s.track_id = track_object_path(track.id);
    }

    pub fn set_playback(&self, playing: bool) {
        if let Ok(mut s) = self.state.lock() {
            s.playing = playing;
        }
    }

    pub fn set_modes(&self, shuffle: bool, repeat: bool, volume: f32) {
        if let Ok(mut s) = self.state.lock() {
            s.shuffle = shuffle;
            s.repeat = repeat;
            s.volume = f64::from(volume);
        }
    }

    pub fn set_position(&self, position: Duration) {
        if let Ok(mut s) = self.state.lock() {
            s.position_micros = micros(position);
        }
    }
}

struct RootIface {
    tx: Sender<ControlCmd>,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {
        // No-op for TUI.
    }

    fn quit(&self) {
        let _ = self.tx.send(ControlCmd::Quit);
    }

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> &str {
        "andante"
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec!["file".to_string()]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        vec![]
    }
}

struct PlayerIface {
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
}

impl PlayerIface {
    fn send(&self, cmd: ControlCmd) {
        if self.tx.send(cmd).is_err() {
            debug!("MPRIS: runtime is gone, dropping command");
        }
    }
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn next(&self) {
        self.send(ControlCmd::Next);
    }

    fn previous(&self) {
        self.send(ControlCmd::Prev);
    }

    fn play(&self) {
        self.send(ControlCmd::Play);
    }

    fn pause(&self) {
        self.send(ControlCmd::Pause);
    }

    fn play_pause(&self) {
        self.send(ControlCmd::PlayPause);
    }

    fn stop(&self) {
        self.send(ControlCmd::Stop);
    }

    fn seek(&self, offset: i64) {
        self.send(ControlCmd::SeekBy(offset));
    }

    fn set_position(&self, track_id: ObjectPath<'_>, position: i64) {
        let current = self
            .state
            .lock()
            .ok()
            .and_then(|s| s.track_id.clone());
        // Requests for a stale track id or a negative position are ignored.
        if position < 0 || current.as_ref().map(|p| p.as_str()) != Some(track_id.as_str()) {
            return;
        }
        self.send(ControlCmd::SetPosition(Duration::from_micros(position as u64)));
    }

    #[zbus(property)]
    fn playback_status(&self) -> &str {
        let Ok(s) = self.state.lock() else {
            return "Stopped";
        };
        if s.playing { "Playing" } else { "Paused" }
    }

    #[zbus(property)]
    fn loop_status(&self) -> &str {
        let repeat = self.state.lock().map(|s| s.repeat).unwrap_or(false);
        if repeat { "Track" } else { "None" }
    }

    #[zbus(property)]
    fn set_loop_status(&mut self, value: String) {
        // The playlist always wraps around, so "Playlist" is the same as "None".
        self.send(ControlCmd::SetRepeat(value == "Track"));
    }

    #[zbus(property)]
    fn shuffle(&self) -> bool {
        self.state.lock().map(|s| s.shuffle).unwrap_or(false)
    }

    #[zbus(property)]
    fn set_shuffle(&mut self, value: bool) {
        self.send(ControlCmd::SetShuffle(value));
    }

    #[zbus(property)]
    fn volume(&self) -> f64 {
        self.state.lock().map(|s| s.volume).unwrap_or(1.0)
    }

    #[zbus(property)]
    fn set_volume(&mut self, value: f64) {
        self.send(ControlCmd::SetVolume(value));
    }

    #[zbus(property)]
    fn position(&self) -> i64 {
        self.state.lock().map(|s| s.position_micros).unwrap_or(0)
    }

    #[zbus(property)]
    fn rate(&self) -> f64 {
        1.0
    }

    #[zbus(property)]
    fn minimum_rate(&self) -> f64 {
        1.0
    }

    #[zbus(property)]
    fn maximum_rate(&self) -> f64 {
        1.0
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_seek(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        let mut map = HashMap::new();
        let Ok(s) = self.state.lock() else {
            return map;
        };

        let mut insert = |key: &str, value: Value<'_>| {
            if let Ok(v) = OwnedValue::try_from(value) {
                map.insert(key.to_string(), v);
            }
        };

        if let Some(id) = &s.track_id {
            insert("mpris:trackid", Value::from(id.clone().into_inner()));
        }
        if let Some(title) = &s.title {
            insert("xesam:title", Value::from(title.clone()));
        }
        if !s.artist.is_empty() {
            insert("xesam:artist", Value::from(s.artist.clone()));
        }
        if let Some(album) = &s.album {
            insert("xesam:album", Value::from(album.clone()));
        }
        if let Some(url) = &s.url {
            insert("xesam:url", Value::from(url.clone()));
        }
        if let Some(art) = &s.art_url {
            insert("mpris:artUrl", Value::from(art.clone()));
        }
        if let Some(len) = s.length_micros {
            insert("mpris:length", Value::from(len));
        }
        map
    }
}

/// Serve MPRIS on a background thread. Bus failures are logged and the
/// returned handle keeps working without a service behind it.
pub fn spawn_mpris(tx: Sender<ControlCmd>) -> MprisHandle {
    let state = Arc::new(Mutex::new(SharedState::default()));

    let state_for_thread = state.clone();
    let spawned = std::thread::Builder::new()
        .name("mpris".to_string())
        .spawn(move || {
            block_on(async move {
                let connection = match Connection::session().await {
                    Ok(c) => c,
                    Err(e) => {
                        warn!("MPRIS: failed to connect to session bus: {e}");
                        return;
                    }
                };

                if let Err(e) = connection.request_name(BUS_NAME).await {
                    warn!("MPRIS: failed to acquire name: {e}");
                    return;
                }

                let object_server = connection.object_server();

                if let Err(e) = object_server
                    .at(OBJECT_PATH, RootIface { tx: tx.clone() })
                    .await
                {
                    warn!("MPRIS: failed to register root iface: {e}");
                    return;
                }

                if let Err(e) = object_server
                    .at(
                        OBJECT_PATH,
                        PlayerIface {
                            tx,
                            state: state_for_thread,
                        },
                    )
                    .await
                {
                    warn!("MPRIS: failed to register player iface: {e}");
                    return;
                }

                debug!("MPRIS: serving {BUS_NAME}");
                // Keep the service alive.
                loop {
                    Timer::after(Duration::from_secs(3600)).await;
                }
            });
        });
    if let Err(e) = spawned {
        warn!("MPRIS: failed to spawn service thread: {e}");
    }

    MprisHandle { state }
}

#[cfg(test)]
mod tests;
