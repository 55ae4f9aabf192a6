use std::time::{Duration, Instant};

/// Wall-clock estimate of the playback position.
///
/// Time accumulates only while running; `reset` jumps to an absolute position.
#[derive(Debug, Default)]
pub(super) struct PlaybackClock {
    started_at: Option<Instant>,
    accumulated: Duration,
}

impl PlaybackClock {
    pub fn start(&mut self) {
        if self.started_at.is_none() {
            self.started_at = Some(Instant::now());
        }
    }

    pub fn pause(&mut self) {
        if let Some(st) = self.started_at.take() {
            self.accumulated += st.elapsed();
        }
    }

    /// Jump to `position`, keeping the running/paused state.
    pub fn reset(&mut self, position: Duration) {
        let running = self.is_running();
        self.accumulated = position;
        self.started_at = running.then(Instant::now);
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn elapsed(&self) -> Duration {
        self.accumulated + self.started_at.map_or(Duration::ZERO, |st| st.elapsed())
    }
}
