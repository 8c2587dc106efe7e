use std::ops::RangeInclusive;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use derivative::Derivative;
use tap::TapFallible;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::probe::{local_path, probe_bytes, probe_path};
use super::{BackendFactory, Notifier};
use crate::dto::audio_attributes::AudioAttributes;
use crate::dto::playback_mode::PlaybackMode;
use crate::dto::player_id::PlayerId;
use crate::dto::release_mode::ReleaseMode;
use crate::player::{Capability, Player, PlayerError};
use crate::timer::{Timer, scale};

/// Playback rates the full decode player can render.
const MEDIA_PLAYER_RATES: RangeInclusive<f64> = 0.125..=8.0;
/// Playback rates a pooled sample can be played at.
const SOUND_POOL_RATES: RangeInclusive<f64> = 0.5..=2.0;

fn check_rate(rate: f64, supported: &RangeInclusive<f64>) -> Result<(), PlayerError> {
    if supported.contains(&rate) {
        Ok(())
    } else {
        Err(PlayerError::OutOfRange(format!("playback rate {rate}")))
    }
}

/// Builds clock driven players that never touch an audio device.
#[derive(Clone, Debug, Default)]
pub struct SimulatedBackendFactory;

impl BackendFactory for SimulatedBackendFactory {
    fn create(
        &self,
        player_id: &PlayerId,
        mode: PlaybackMode,
        notifier: Notifier,
    ) -> Result<Box<dyn Player>, PlayerError> {
        Ok(match mode {
            PlaybackMode::FullDecode => {
                Box::new(SimulatedMediaPlayer::new(player_id.clone(), notifier))
            }
            PlaybackMode::LowLatencyPooled => {
                Box::new(SimulatedSoundPool::new(player_id.clone(), notifier))
            }
        })
    }
}

#[derive(Debug, Default)]
struct MediaState {
    // Outer None: no source. Inner None: source with unknown length.
    source: Option<Option<Duration>>,
    timer: Timer,
    playing: bool,
    release_mode: ReleaseMode,
    volume: f64,
    attributes: AudioAttributes,
}

impl MediaState {
    fn duration(&self) -> Option<Duration> {
        self.source.flatten()
    }

    fn position(&self) -> Duration {
        let position = self.timer.position();
        match self.duration() {
            Some(duration) => position.min(duration),
            None => position,
        }
    }

    /// Wall time until the current run reaches the end.
    fn remaining(&self) -> Option<Duration> {
        if !self.playing {
            return None;
        }
        let left = self.duration()?.saturating_sub(self.position());
        scale(left, self.timer.rate().recip())
    }

    /// Applies the release mode at the end of a run. Returns the next run length when looping.
    fn complete(&mut self) -> Option<Duration> {
        match self.release_mode {
            ReleaseMode::Loop => {
                self.timer.set_position(Duration::ZERO);
                self.remaining()
            }
            ReleaseMode::Stop => {
                self.rewind();
                None
            }
            ReleaseMode::Release => {
                self.rewind();
                self.source = None;
                None
            }
        }
    }

    fn rewind(&mut self) {
        self.playing = false;
        self.timer.pause();
        self.timer.set_position(Duration::ZERO);
    }
}

fn lock(state: &Mutex<MediaState>) -> MutexGuard<'_, MediaState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Full decode player. Knows the media duration and reports a position driven by a timer.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct SimulatedMediaPlayer {
    player_id: PlayerId,
    #[derivative(Debug = "ignore")]
    notifier: Notifier,
    state: Arc<Mutex<MediaState>>,
    completion: Option<CancellationToken>,
}

impl SimulatedMediaPlayer {
    pub fn new(player_id: PlayerId, notifier: Notifier) -> Self {
        Self {
            player_id,
            notifier,
            state: Arc::new(Mutex::new(MediaState {
                volume: 1.0,
                ..Default::default()
            })),
            completion: None,
        }
    }

    pub fn volume(&self) -> f64 {
        lock(&self.state).volume
    }

    pub fn attributes(&self) -> AudioAttributes {
        lock(&self.state).attributes
    }

    pub fn release_mode(&self) -> ReleaseMode {
        lock(&self.state).release_mode
    }

    fn prepare(&mut self, duration: Option<Duration>) {
        self.cancel_completion();
        {
            let mut state = lock(&self.state);
            state.playing = false;
            state.timer.stop();
            state.source = Some(duration);
        }
        self.notifier.prepared();
    }

    fn cancel_completion(&mut self) {
        if let Some(token) = self.completion.take() {
            token.cancel();
        }
    }

    /// (Re)starts the completion timer for the current run, if the run has a known end.
    fn schedule_completion(&mut self) {
        self.cancel_completion();
        let Some(remaining) = lock(&self.state).remaining() else {
            return;
        };
        let Ok(handle) = Handle::try_current() else {
            warn!("No runtime available, {} will not complete", self.player_id);
            return;
        };
        let token = CancellationToken::new();
        self.completion = Some(token.clone());
        handle.spawn(run_completion(
            self.state.clone(),
            self.notifier.clone(),
            token,
            remaining,
        ));
    }
}

async fn run_completion(
    state: Arc<Mutex<MediaState>>,
    notifier: Notifier,
    token: CancellationToken,
    mut remaining: Duration,
) {
    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => return,
            _ = tokio::time::sleep(remaining) => {}
        }
        let next = lock(&state).complete();
        info!("Playback completed for {}", notifier.player_id());
        notifier.completed();
        match next {
            Some(next) => remaining = next,
            None => return,
        }
    }
}

impl Drop for SimulatedMediaPlayer {
    fn drop(&mut self) {
        self.cancel_completion();
    }
}

impl Player for SimulatedMediaPlayer {
    fn player_id(&self) -> &PlayerId {
        &self.player_id
    }

    fn set_url(&mut self, url: &str, is_local: bool) -> Result<(), PlayerError> {
        if !is_local {
            // Remote streams have no known length
            self.prepare(None);
            return Ok(());
        }
        // Probe failures are reported as an error event
        match probe_path(local_path(url)) {
            Ok(duration) => self.prepare(duration),
            Err(e) => {
                warn!("{e:?}");
                self.notifier.failed(format!("{e:#}"));
            }
        }
        Ok(())
    }

    fn set_bytes(&mut self, bytes: Vec<u8>) -> Result<(), PlayerError> {
        let duration = probe_bytes(&bytes)
            .tap_err(|e| warn!("{e:?}"))
            .map_err(|e| PlayerError::Backend(format!("{e:#}")))?;
        self.prepare(duration);
        Ok(())
    }

    fn play(&mut self) -> Result<(), PlayerError> {
        {
            let mut state = lock(&self.state);
            if state.source.is_none() {
                return Err(PlayerError::NoSource);
            }
            state.playing = true;
            state.timer.resume();
        }
        self.schedule_completion();
        self.notifier.became_playing();
        Ok(())
    }

    fn pause(&mut self) -> Result<(), PlayerError> {
        self.cancel_completion();
        let mut state = lock(&self.state);
        state.playing = false;
        state.timer.pause();
        Ok(())
    }

    fn stop(&mut self) -> Result<(), PlayerError> {
        self.cancel_completion();
        let mut state = lock(&self.state);
        state.rewind();
        if state.release_mode == ReleaseMode::Release {
            state.source = None;
        }
        Ok(())
    }

    fn release(&mut self) -> Result<(), PlayerError> {
        self.cancel_completion();
        let mut state = lock(&self.state);
        state.rewind();
        state.source = None;
        Ok(())
    }

    fn seek(&mut self, position_ms: i64) -> Result<(), PlayerError> {
        {
            let mut state = lock(&self.state);
            if state.source.is_none() {
                return Err(PlayerError::NoSource);
            }
            let mut position = Duration::from_millis(position_ms.max(0).unsigned_abs());
            if let Some(duration) = state.duration() {
                position = position.min(duration);
            }
            state.timer.set_position(position);
        }
        self.schedule_completion();
        self.notifier.seek_completed();
        Ok(())
    }

    fn set_volume(&mut self, volume: f64) -> Result<(), PlayerError> {
        lock(&self.state).volume = volume;
        Ok(())
    }

    fn set_playback_rate(&mut self, rate: f64) -> Result<(), PlayerError> {
        check_rate(rate, &MEDIA_PLAYER_RATES)?;
        lock(&self.state).timer.set_rate(rate);
        self.schedule_completion();
        Ok(())
    }

    fn set_release_mode(&mut self, release_mode: ReleaseMode) -> Result<(), PlayerError> {
        lock(&self.state).release_mode = release_mode;
        Ok(())
    }

    fn configure_attributes(&mut self, attributes: AudioAttributes) -> Result<(), PlayerError> {
        lock(&self.state).attributes = attributes;
        Ok(())
    }

    fn duration(&self) -> Result<Option<i64>, PlayerError> {
        Ok(lock(&self.state).duration().map(as_millis))
    }

    fn current_position(&self) -> Result<Option<i64>, PlayerError> {
        let state = lock(&self.state);
        Ok(state.source.map(|_| as_millis(state.position())))
    }

    fn is_actually_playing(&self) -> bool {
        lock(&self.state).playing
    }
}

fn as_millis(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

/// Low latency player for short, preloaded samples. Fire and forget: no progress, no seeking.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct SimulatedSoundPool {
    player_id: PlayerId,
    #[derivative(Debug = "ignore")]
    notifier: Notifier,
    url: Option<String>,
    volume: f64,
    rate: f64,
    release_mode: ReleaseMode,
    attributes: AudioAttributes,
}

impl SimulatedSoundPool {
    pub fn new(player_id: PlayerId, notifier: Notifier) -> Self {
        Self {
            player_id,
            notifier,
            url: None,
            volume: 1.0,
            rate: 1.0,
            release_mode: ReleaseMode::default(),
            attributes: AudioAttributes::default(),
        }
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }
}

impl Player for SimulatedSoundPool {
    fn player_id(&self) -> &PlayerId {
        &self.player_id
    }

    fn supports(&self, capability: Capability) -> bool {
        matches!(capability, Capability::PlaybackRate)
    }

    fn set_url(&mut self, url: &str, _is_local: bool) -> Result<(), PlayerError> {
        self.url = Some(url.to_owned());
        self.notifier.prepared();
        Ok(())
    }

    fn set_bytes(&mut self, _bytes: Vec<u8>) -> Result<(), PlayerError> {
        Err(PlayerError::Unsupported(Capability::BytesSource))
    }

    fn play(&mut self) -> Result<(), PlayerError> {
        if self.url.is_none() {
            return Err(PlayerError::NoSource);
        }
        // Samples are fired off and never tracked, so there is nothing to poll
        Ok(())
    }

    fn pause(&mut self) -> Result<(), PlayerError> {
        Ok(())
    }

    fn stop(&mut self) -> Result<(), PlayerError> {
        Ok(())
    }

    fn release(&mut self) -> Result<(), PlayerError> {
        self.url = None;
        Ok(())
    }

    fn seek(&mut self, _position_ms: i64) -> Result<(), PlayerError> {
        Err(PlayerError::Unsupported(Capability::Seek))
    }

    fn set_volume(&mut self, volume: f64) -> Result<(), PlayerError> {
        self.volume = volume;
        Ok(())
    }

    fn set_playback_rate(&mut self, rate: f64) -> Result<(), PlayerError> {
        check_rate(rate, &SOUND_POOL_RATES)?;
        self.rate = rate;
        Ok(())
    }

    fn set_release_mode(&mut self, release_mode: ReleaseMode) -> Result<(), PlayerError> {
        self.release_mode = release_mode;
        Ok(())
    }

    fn configure_attributes(&mut self, attributes: AudioAttributes) -> Result<(), PlayerError> {
        self.attributes = attributes;
        Ok(())
    }

    fn duration(&self) -> Result<Option<i64>, PlayerError> {
        Err(PlayerError::Unsupported(Capability::Duration))
    }

    fn current_position(&self) -> Result<Option<i64>, PlayerError> {
        Err(PlayerError::Unsupported(Capability::CurrentPosition))
    }

    fn is_actually_playing(&self) -> bool {
        false
    }
}

#[cfg(test)]
#[path = "./simulated_test.rs"]
mod simulated_test;
