use std::collections::HashMap;
use std::collections::hash_map::Entry;

use derivative::Derivative;
use flume::Sender;
use tracing::info;

use crate::backend::{BackendFactory, Notifier};
use crate::dto::backend_notification::BackendNotification;
use crate::dto::dispatch_error::DispatchError;
use crate::dto::playback_mode::PlaybackMode;
use crate::dto::player_id::PlayerId;
use crate::player::Player;

/// A registered player. The mode is fixed when the record is built.
pub struct PlayerRecord {
    mode: PlaybackMode,
    player: Box<dyn Player>,
}

impl PlayerRecord {
    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    pub fn player(&self) -> &dyn Player {
        self.player.as_ref()
    }
}

/// Owns every live player, keyed by id. Each id is bound to one backend until released.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct PlayerRegistry {
    #[derivative(Debug = "ignore")]
    players: HashMap<PlayerId, PlayerRecord>,
    #[derivative(Debug = "ignore")]
    factory: Box<dyn BackendFactory>,
    notification_tx: Sender<BackendNotification>,
}

impl PlayerRegistry {
    pub fn new(
        factory: Box<dyn BackendFactory>,
        notification_tx: Sender<BackendNotification>,
    ) -> Self {
        Self {
            players: HashMap::new(),
            factory,
            notification_tx,
        }
    }

    /// Returns the player bound to `player_id`, building it on first use.
    ///
    /// `mode` is only consulted when the id is new; for a known id it is ignored entirely, even
    /// when it would not parse. A bad mode or a failing backend leaves the registry untouched.
    pub fn resolve(
        &mut self,
        player_id: &PlayerId,
        mode: Option<&str>,
    ) -> Result<&mut dyn Player, DispatchError> {
        match self.players.entry(player_id.clone()) {
            Entry::Occupied(entry) => Ok(entry.into_mut().player.as_mut()),
            Entry::Vacant(entry) => {
                let mode = PlaybackMode::from_argument(mode)?;
                let notifier = Notifier::new(player_id.clone(), self.notification_tx.clone());
                let player = self.factory.create(player_id, mode, notifier)?;
                info!("Created {mode} player {player_id}");
                Ok(entry.insert(PlayerRecord { mode, player }).player.as_mut())
            }
        }
    }

    pub fn get(&self, player_id: &PlayerId) -> Option<&dyn Player> {
        self.players.get(player_id).map(PlayerRecord::player)
    }

    pub fn mode_of(&self, player_id: &PlayerId) -> Option<PlaybackMode> {
        self.players.get(player_id).map(PlayerRecord::mode)
    }

    pub fn contains(&self, player_id: &PlayerId) -> bool {
        self.players.contains_key(player_id)
    }

    /// Unbinds the id. The next `resolve` builds a fresh player, possibly with another mode.
    pub fn release(&mut self, player_id: &PlayerId) -> Option<PlayerRecord> {
        let record = self.players.remove(player_id);
        if record.is_some() {
            info!("Released player {player_id}");
        }
        record
    }

    pub fn players(&self) -> impl Iterator<Item = &dyn Player> {
        self.players.values().map(PlayerRecord::player)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::mock_player::MockFactory;

    impl std::fmt::Debug for dyn Player + '_ {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_tuple("Player").field(self.player_id()).finish()
        }
    }

    fn registry() -> (PlayerRegistry, MockFactory) {
        let factory = MockFactory::default();
        let (tx, _rx) = flume::unbounded();
        (PlayerRegistry::new(Box::new(factory.clone()), tx), factory)
    }

    #[rstest]
    #[case(None, PlaybackMode::FullDecode)]
    #[case(Some("PlayerMode.MEDIA_PLAYER"), PlaybackMode::FullDecode)]
    #[case(Some("PlayerMode.LOW_LATENCY"), PlaybackMode::LowLatencyPooled)]
    fn test_resolve_new_id(#[case] mode: Option<&str>, #[case] expected: PlaybackMode) {
        let (mut registry, factory) = registry();
        let id = PlayerId::from("p1");

        registry.resolve(&id, mode).unwrap();

        assert_eq!(Some(expected), registry.mode_of(&id));
        assert_eq!(vec![(id, expected)], factory.created());
    }

    #[rstest]
    #[case(Some("PlayerMode.LOW_LATENCY"))]
    #[case(Some("bogus"))]
    #[case(None)]
    fn test_resolve_known_id_ignores_mode(#[case] mode: Option<&str>) {
        let (mut registry, factory) = registry();
        let id = PlayerId::from("p1");
        registry.resolve(&id, Some("PlayerMode.MEDIA_PLAYER")).unwrap();

        let player = registry.resolve(&id, mode).unwrap();

        assert_eq!(&id, player.player_id());
        assert_eq!(Some(PlaybackMode::FullDecode), registry.mode_of(&id));
        assert_eq!(1, factory.created().len());
    }

    #[test]
    fn test_resolve_same_instance() {
        let (mut registry, factory) = registry();
        let id = PlayerId::from("p1");
        registry.resolve(&id, None).unwrap().set_volume(0.25).unwrap();

        registry.resolve(&id, None).unwrap();

        assert_eq!(Some(0.25), factory.handle(&id).unwrap().state().volume);
    }

    #[test]
    fn test_resolve_bogus_mode() {
        let (mut registry, factory) = registry();
        let id = PlayerId::from("p1");

        assert_matches!(
            registry.resolve(&id, Some("bogus")),
            Err(DispatchError::InvalidArgument(msg)) if msg == "unknown mode bogus"
        );
        assert!(registry.is_empty());
        assert!(factory.created().is_empty());
    }

    #[test]
    fn test_resolve_failing_backend() {
        let (mut registry, factory) = registry();
        factory.fail_next("no audio device");

        assert_matches!(
            registry.resolve(&"p1".into(), None),
            Err(DispatchError::Player(_))
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_release_rebuilds() {
        let (mut registry, factory) = registry();
        let id = PlayerId::from("p1");
        registry.resolve(&id, None).unwrap();

        assert!(registry.release(&id).is_some());
        assert!(!registry.contains(&id));
        registry.resolve(&id, Some("PlayerMode.LOW_LATENCY")).unwrap();

        assert_eq!(Some(PlaybackMode::LowLatencyPooled), registry.mode_of(&id));
        assert_eq!(2, factory.created().len());
    }

    #[test]
    fn test_release_unknown() {
        let (mut registry, _) = registry();
        assert!(registry.release(&"nope".into()).is_none());
    }
}
