use std::time::Duration;

use tokio::time::Instant;

/// Playback position derived from wall time, for backends with no render clock of their own.
#[derive(Debug)]
pub(crate) struct Timer {
    // Position at the moment the timer was last (re)anchored
    anchor: Duration,
    // When the timer was (re)anchored, None if it never ran since the last stop
    start: Option<Instant>,
    // When the timer was paused
    pause_start: Option<Instant>,
    // Total paused time since the anchor.
    // The clock keeps moving while paused, so all paused intervals are subtracted from it.
    pause_time: Duration,
    rate: f64,
}

impl Default for Timer {
    fn default() -> Self {
        Self {
            anchor: Duration::ZERO,
            start: None,
            pause_start: None,
            pause_time: Duration::ZERO,
            rate: 1.0,
        }
    }
}

impl Timer {
    pub(crate) fn resume(&mut self) {
        if self.start.is_none() {
            // Resuming a timer that never ran, start counting from the anchor
            self.start = Some(Instant::now());
            self.pause_start = None;
            self.pause_time = Duration::ZERO;
        } else if let Some(pause_start) = self.pause_start.take() {
            self.pause_time += Instant::now() - pause_start;
        }
    }

    pub(crate) fn pause(&mut self) {
        if self.start.is_some() && self.pause_start.is_none() {
            self.pause_start = Some(Instant::now());
        }
    }

    pub(crate) fn is_running(&self) -> bool {
        self.start.is_some() && self.pause_start.is_none()
    }

    pub(crate) fn stop(&mut self) {
        self.anchor = Duration::ZERO;
        self.start = None;
        self.pause_start = None;
        self.pause_time = Duration::ZERO;
    }

    pub(crate) fn set_position(&mut self, position: Duration) {
        let running = self.is_running();
        self.anchor = position;
        self.pause_time = Duration::ZERO;
        self.start = Some(Instant::now());
        // Keep a paused timer paused at the new position
        self.pause_start = if running { None } else { self.start };
    }

    pub(crate) fn set_rate(&mut self, rate: f64) {
        // Re-anchor so the new rate only applies from now on
        let position = self.position();
        let was_started = self.start.is_some();
        self.rate = rate;
        if was_started {
            self.set_position(position);
        } else {
            self.anchor = position;
        }
    }

    pub(crate) fn rate(&self) -> f64 {
        self.rate
    }

    pub(crate) fn position(&self) -> Duration {
        let Some(start) = self.start else {
            return self.anchor;
        };
        let now = Instant::now();
        let current_pause_time = match self.pause_start {
            Some(pause_start) => now - pause_start,
            None => Duration::ZERO,
        };
        let played = (now - start).saturating_sub(self.pause_time + current_pause_time);
        scale(played, self.rate)
            .and_then(|played| self.anchor.checked_add(played))
            .unwrap_or(Duration::MAX)
    }
}

/// `duration * factor`, or None if the result does not fit in a [`Duration`].
pub(crate) fn scale(duration: Duration, factor: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(duration.as_secs_f64() * factor).ok()
}
