use std::path::Path;
use std::time::Duration;

#[cfg(test)]
use mockall::automock;

/// The facility that actually decodes a source and produces sound.
///
/// The session controller is the only caller. Commands are fire-and-forget;
/// readiness, progress and completion come back as [`PrimitiveEvent`]s.
#[cfg_attr(test, automock)]
pub trait PlaybackPrimitive {
    /// Start preparing `source` for playback, replacing whatever was loaded.
    fn load(&mut self, source: &Path);

    /// Start audio output of the loaded source.
    fn play(&mut self);

    /// Stop audio output, keeping the position.
    fn pause(&mut self);

    /// Set the output gain, `volume` in `[0, 1]`.
    fn set_volume(&mut self, volume: f32);

    /// Jump to an absolute position of the loaded source.
    /// Ignored when nothing is loaded.
    fn set_position(&mut self, position: Duration);

    /// Total length of the loaded source, once known.
    fn duration(&self) -> Option<Duration>;
}

/// Events reported by a [`PlaybackPrimitive`].
#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveEvent {
    /// Elapsed time changed. `total` is `None` while the length is unknown.
    Progress {
        elapsed: Duration,
        total: Option<Duration>,
    },
    /// The loaded source played to its end.
    Ended,
    /// The source could not be loaded or decoded.
    Error(String),
}
