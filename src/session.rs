//! The playback session: which track is current, whether it plays, volume,
//! progress and the shuffle/repeat policy, kept in sync with a
//! [`PlaybackPrimitive`].

use thiserror::Error;

use crate::library::TrackId;

mod controller;
mod model;
mod primitive;

pub use controller::PlaybackSessionController;
pub use model::{Direction, PlaybackSession};
pub use primitive::{PlaybackPrimitive, PrimitiveEvent};
#[cfg(test)]
pub use primitive::MockPlaybackPrimitive;

/// Rejected controller operations. The session is left untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("track {0} is not in the playlist")]
    UnknownTrack(TrackId),
    #[error("invalid {name}: {value}")]
    InvalidArgument { name: &'static str, value: f32 },
}

#[cfg(test)]
mod tests;
