use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::backend::{BackendFactory, Notifier};
use crate::dto::audio_attributes::AudioAttributes;
use crate::dto::playback_mode::PlaybackMode;
use crate::dto::player_id::PlayerId;
use crate::dto::release_mode::ReleaseMode;
use crate::player::{Capability, Player, PlayerError};

#[derive(Clone, Debug, Default)]
pub(crate) struct MockState {
    pub(crate) playing: bool,
    /// `play` records the call without starting playback
    pub(crate) hold_playback: bool,
    pub(crate) duration: Option<i64>,
    pub(crate) position: Option<i64>,
    /// Reported as missing through `supports`
    pub(crate) unsupported: HashSet<Capability>,
    /// Claimed through `supports` but still failing with `Unsupported`
    pub(crate) failing: HashSet<Capability>,
    pub(crate) backend_error: Option<String>,
    pub(crate) panic_on: Option<&'static str>,
    pub(crate) url: Option<(String, bool)>,
    pub(crate) bytes: Option<Vec<u8>>,
    pub(crate) volume: Option<f64>,
    pub(crate) rate: Option<f64>,
    pub(crate) seek: Option<i64>,
    pub(crate) release_mode: Option<ReleaseMode>,
    pub(crate) attributes: Option<AudioAttributes>,
    pub(crate) calls: Vec<&'static str>,
}

/// Test-side view of a mock player living inside the registry.
#[derive(Clone, Debug)]
pub(crate) struct MockHandle {
    state: Rc<RefCell<MockState>>,
    notifier: Notifier,
}

impl MockHandle {
    pub(crate) fn state(&self) -> MockState {
        self.state.borrow().clone()
    }

    pub(crate) fn update(&self, f: impl FnOnce(&mut MockState)) {
        f(&mut self.state.borrow_mut());
    }

    pub(crate) fn set_playing(&self, playing: bool) {
        self.update(|s| s.playing = playing);
    }

    pub(crate) fn set_progress(&self, duration: Option<i64>, position: Option<i64>) {
        self.update(|s| {
            s.duration = duration;
            s.position = position;
        });
    }

    pub(crate) fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub(crate) fn calls(&self) -> Vec<&'static str> {
        self.state.borrow().calls.clone()
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct MockFactory {
    created: Rc<RefCell<Vec<(PlayerId, PlaybackMode)>>>,
    handles: Rc<RefCell<HashMap<PlayerId, MockHandle>>>,
    fail_next: Rc<RefCell<Option<String>>>,
}

impl MockFactory {
    pub(crate) fn created(&self) -> Vec<(PlayerId, PlaybackMode)> {
        self.created.borrow().clone()
    }

    /// Handle to the most recently created player for `player_id`.
    pub(crate) fn handle(&self, player_id: &PlayerId) -> Option<MockHandle> {
        self.handles.borrow().get(player_id).cloned()
    }

    pub(crate) fn fail_next(&self, message: &str) {
        *self.fail_next.borrow_mut() = Some(message.to_owned());
    }
}

impl BackendFactory for MockFactory {
    fn create(
        &self,
        player_id: &PlayerId,
        mode: PlaybackMode,
        notifier: Notifier,
    ) -> Result<Box<dyn Player>, PlayerError> {
        if let Some(message) = self.fail_next.borrow_mut().take() {
            return Err(PlayerError::Backend(message));
        }
        let state = Rc::new(RefCell::new(MockState::default()));
        self.created.borrow_mut().push((player_id.clone(), mode));
        self.handles.borrow_mut().insert(
            player_id.clone(),
            MockHandle {
                state: state.clone(),
                notifier,
            },
        );
        Ok(Box::new(MockPlayer {
            player_id: player_id.clone(),
            state,
        }))
    }
}

pub(crate) struct MockPlayer {
    player_id: PlayerId,
    state: Rc<RefCell<MockState>>,
}

impl MockPlayer {
    fn call(&self, name: &'static str) -> Result<(), PlayerError> {
        let mut state = self.state.borrow_mut();
        state.calls.push(name);
        if state.panic_on == Some(name) {
            drop(state);
            panic!("mock player panicked in {name}");
        }
        match &state.backend_error {
            Some(message) => Err(PlayerError::Backend(message.clone())),
            None => Ok(()),
        }
    }

    fn check(&self, capability: Capability) -> Result<(), PlayerError> {
        let state = self.state.borrow();
        if state.unsupported.contains(&capability) || state.failing.contains(&capability) {
            return Err(PlayerError::Unsupported(capability));
        }
        Ok(())
    }
}

impl Player for MockPlayer {
    fn player_id(&self) -> &PlayerId {
        &self.player_id
    }

    fn supports(&self, capability: Capability) -> bool {
        !self.state.borrow().unsupported.contains(&capability)
    }

    fn set_url(&mut self, url: &str, is_local: bool) -> Result<(), PlayerError> {
        self.call("set_url")?;
        self.state.borrow_mut().url = Some((url.to_owned(), is_local));
        Ok(())
    }

    fn set_bytes(&mut self, bytes: Vec<u8>) -> Result<(), PlayerError> {
        self.call("set_bytes")?;
        self.check(Capability::BytesSource)?;
        self.state.borrow_mut().bytes = Some(bytes);
        Ok(())
    }

    fn play(&mut self) -> Result<(), PlayerError> {
        self.call("play")?;
        let mut state = self.state.borrow_mut();
        if !state.hold_playback {
            state.playing = true;
        }
        Ok(())
    }

    fn pause(&mut self) -> Result<(), PlayerError> {
        self.call("pause")?;
        self.state.borrow_mut().playing = false;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), PlayerError> {
        self.call("stop")?;
        self.state.borrow_mut().playing = false;
        Ok(())
    }

    fn release(&mut self) -> Result<(), PlayerError> {
        self.call("release")?;
        self.state.borrow_mut().playing = false;
        Ok(())
    }

    fn seek(&mut self, position_ms: i64) -> Result<(), PlayerError> {
        self.call("seek")?;
        self.check(Capability::Seek)?;
        self.state.borrow_mut().seek = Some(position_ms);
        Ok(())
    }

    fn set_volume(&mut self, volume: f64) -> Result<(), PlayerError> {
        self.call("set_volume")?;
        self.state.borrow_mut().volume = Some(volume);
        Ok(())
    }

    fn set_playback_rate(&mut self, rate: f64) -> Result<(), PlayerError> {
        self.call("set_playback_rate")?;
        self.check(Capability::PlaybackRate)?;
        self.state.borrow_mut().rate = Some(rate);
        Ok(())
    }

    fn set_release_mode(&mut self, release_mode: ReleaseMode) -> Result<(), PlayerError> {
        self.call("set_release_mode")?;
        self.state.borrow_mut().release_mode = Some(release_mode);
        Ok(())
    }

    fn configure_attributes(&mut self, attributes: AudioAttributes) -> Result<(), PlayerError> {
        self.call("configure_attributes")?;
        self.state.borrow_mut().attributes = Some(attributes);
        Ok(())
    }

    fn duration(&self) -> Result<Option<i64>, PlayerError> {
        self.call("duration")?;
        self.check(Capability::Duration)?;
        Ok(self.state.borrow().duration)
    }

    fn current_position(&self) -> Result<Option<i64>, PlayerError> {
        self.call("current_position")?;
        self.check(Capability::CurrentPosition)?;
        Ok(self.state.borrow().position)
    }

    fn is_actually_playing(&self) -> bool {
        self.state.borrow().playing
    }
}
