mod probe;
mod simulated;

use flume::Sender;
use tap::TapFallible;
use tracing::warn;

pub use simulated::{SimulatedBackendFactory, SimulatedMediaPlayer, SimulatedSoundPool};

use crate::dto::backend_notification::BackendNotification;
use crate::dto::playback_mode::PlaybackMode;
use crate::dto::player_id::PlayerId;
use crate::player::{Player, PlayerError};

/// Builds the backend for a newly seen player id.
///
/// Called at most once per id while it stays registered. The mode has already been validated.
pub trait BackendFactory {
    fn create(
        &self,
        player_id: &PlayerId,
        mode: PlaybackMode,
        notifier: Notifier,
    ) -> Result<Box<dyn Player>, PlayerError>;
}

/// Handed to each backend so it can report lifecycle callbacks.
///
/// `Send` so backend worker threads can hold it; the dispatcher drains the channel on its own
/// event loop.
#[derive(Clone, Debug)]
pub struct Notifier {
    player_id: PlayerId,
    notification_tx: Sender<BackendNotification>,
}

impl Notifier {
    pub fn new(player_id: PlayerId, notification_tx: Sender<BackendNotification>) -> Self {
        Self {
            player_id,
            notification_tx,
        }
    }

    pub fn player_id(&self) -> &PlayerId {
        &self.player_id
    }

    pub fn became_playing(&self) {
        self.send(BackendNotification::BecamePlaying(self.player_id.clone()));
    }

    pub fn prepared(&self) {
        self.send(BackendNotification::Prepared(self.player_id.clone()));
    }

    pub fn completed(&self) {
        self.send(BackendNotification::Completed(self.player_id.clone()));
    }

    pub fn failed(&self, message: impl Into<String>) {
        self.send(BackendNotification::Failed(
            self.player_id.clone(),
            message.into(),
        ));
    }

    pub fn seek_completed(&self) {
        self.send(BackendNotification::SeekCompleted(self.player_id.clone()));
    }

    fn send(&self, notification: BackendNotification) {
        self.notification_tx
            .send(notification)
            .tap_err(|e| warn!("Dispatcher is gone, dropping {:?}", e.0))
            .ok();
    }
}
