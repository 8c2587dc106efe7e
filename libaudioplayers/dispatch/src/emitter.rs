use tokio::sync::broadcast;
use tracing::debug;

use crate::dto::player_event::PlayerEvent;
use crate::dto::player_id::PlayerId;

/// Fire and forget outbound notifications.
///
/// Nothing is acknowledged or retried. With no subscriber the event is dropped; a subscriber that
/// falls more than the channel capacity behind sees `Lagged`.
#[derive(Clone, Debug)]
pub struct EventEmitter {
    event_tx: broadcast::Sender<PlayerEvent>,
}

impl EventEmitter {
    pub fn new(capacity: usize) -> Self {
        let (event_tx, _) = broadcast::channel(capacity.max(1));
        Self { event_tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.event_tx.subscribe()
    }

    pub fn emit(&self, event: PlayerEvent) {
        debug!("Emitting {} for {}", event.method(), event.player_id());
        self.event_tx.send(event).unwrap_or_default();
    }

    pub fn duration(&self, player_id: &PlayerId, millis: i64) {
        self.emit(PlayerEvent::Duration {
            player_id: player_id.clone(),
            millis,
        });
    }

    pub fn current_position(&self, player_id: &PlayerId, millis: i64) {
        self.emit(PlayerEvent::CurrentPosition {
            player_id: player_id.clone(),
            millis,
        });
    }

    pub fn complete(&self, player_id: &PlayerId) {
        self.emit(PlayerEvent::Complete {
            player_id: player_id.clone(),
        });
    }

    pub fn error(&self, player_id: &PlayerId, message: impl Into<String>) {
        self.emit(PlayerEvent::Error {
            player_id: player_id.clone(),
            message: message.into(),
        });
    }

    pub fn seek_complete(&self, player_id: &PlayerId) {
        self.emit(PlayerEvent::SeekComplete {
            player_id: player_id.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tokio::sync::broadcast::error::TryRecvError;

    use super::*;

    #[test]
    fn test_emit_without_subscribers() {
        let emitter = EventEmitter::new(4);
        emitter.complete(&"p1".into());
    }

    #[test]
    fn test_fifo_per_subscriber() {
        let emitter = EventEmitter::new(4);
        let mut rx = emitter.subscribe();
        let id = PlayerId::from("p1");

        emitter.duration(&id, 1000);
        emitter.current_position(&id, 0);
        emitter.seek_complete(&id);

        assert_eq!(
            PlayerEvent::Duration {
                player_id: id.clone(),
                millis: 1000
            },
            rx.try_recv().unwrap()
        );
        assert_eq!(
            PlayerEvent::CurrentPosition {
                player_id: id.clone(),
                millis: 0
            },
            rx.try_recv().unwrap()
        );
        assert_eq!(
            PlayerEvent::SeekComplete { player_id: id },
            rx.try_recv().unwrap()
        );
        assert_eq!(Err(TryRecvError::Empty), rx.try_recv());
    }

    #[test]
    fn test_lagging_subscriber() {
        let emitter = EventEmitter::new(1);
        let mut rx = emitter.subscribe();
        emitter.complete(&"p1".into());
        emitter.error(&"p1".into(), "boom");

        assert_eq!(Err(TryRecvError::Lagged(1)), rx.try_recv());
        assert_eq!(
            PlayerEvent::Error {
                player_id: "p1".into(),
                message: "boom".to_owned()
            },
            rx.try_recv().unwrap()
        );
    }
}
