//! Audio subsystem: the `rodio` playback primitive.
//!
//! `AudioPlayer` forwards commands to a background thread that owns the output
//! stream and sink, and hands back progress/ended/error events.

mod clock;
mod player;
mod sink;
mod thread;
mod transport;
mod types;

pub use player::AudioPlayer;
