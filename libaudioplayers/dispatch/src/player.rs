use crate::dto::audio_attributes::AudioAttributes;
pub use crate::dto::player_error::{Capability, PlayerError};
use crate::dto::player_id::PlayerId;
use crate::dto::release_mode::ReleaseMode;

/// Contract every backend variant implements.
///
/// Positions and durations are in milliseconds. `Ok(None)` from [`Player::duration`] or
/// [`Player::current_position`] means the backend has not buffered enough to know yet; callers
/// render that as 0. A backend that structurally cannot provide an operation reports it through
/// [`Player::supports`] and returns [`PlayerError::Unsupported`] if called anyway.
pub trait Player {
    fn player_id(&self) -> &PlayerId;

    fn supports(&self, _capability: Capability) -> bool {
        true
    }

    fn set_url(&mut self, url: &str, is_local: bool) -> Result<(), PlayerError>;

    fn set_bytes(&mut self, bytes: Vec<u8>) -> Result<(), PlayerError>;

    fn play(&mut self) -> Result<(), PlayerError>;

    fn pause(&mut self) -> Result<(), PlayerError>;

    fn stop(&mut self) -> Result<(), PlayerError>;

    fn release(&mut self) -> Result<(), PlayerError>;

    fn seek(&mut self, position_ms: i64) -> Result<(), PlayerError>;

    /// Gain in `0.0..=1.0`.
    fn set_volume(&mut self, volume: f64) -> Result<(), PlayerError>;

    fn set_playback_rate(&mut self, rate: f64) -> Result<(), PlayerError>;

    fn set_release_mode(&mut self, release_mode: ReleaseMode) -> Result<(), PlayerError>;

    fn configure_attributes(&mut self, attributes: AudioAttributes) -> Result<(), PlayerError>;

    fn duration(&self) -> Result<Option<i64>, PlayerError>;

    fn current_position(&self) -> Result<Option<i64>, PlayerError>;

    fn is_actually_playing(&self) -> bool;
}

/// Duration with unknown rendered as 0. Checks the capability before calling.
pub(crate) fn duration_or_zero(player: &dyn Player) -> Result<i64, PlayerError> {
    if !player.supports(Capability::Duration) {
        return Err(PlayerError::Unsupported(Capability::Duration));
    }
    Ok(player.duration()?.unwrap_or(0))
}

pub(crate) fn position_or_zero(player: &dyn Player) -> Result<i64, PlayerError> {
    if !player.supports(Capability::CurrentPosition) {
        return Err(PlayerError::Unsupported(Capability::CurrentPosition));
    }
    Ok(player.current_position()?.unwrap_or(0))
}
