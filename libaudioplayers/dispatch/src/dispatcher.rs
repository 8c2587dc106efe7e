use std::any::Any;
use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};

use flume::Receiver;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::backend::BackendFactory;
use crate::dto::arguments::Arguments;
use crate::dto::audio_attributes::AudioAttributes;
use crate::dto::backend_notification::BackendNotification;
use crate::dto::dispatch_error::DispatchError;
use crate::dto::log_level::LogLevel;
use crate::dto::method_call::MethodCall;
use crate::dto::outcome::{ErrorKind, Outcome};
use crate::dto::playback_mode::PlaybackMode;
use crate::dto::player_event::PlayerEvent;
use crate::dto::player_id::PlayerId;
use crate::dto::player_method::{CHANGE_LOG_LEVEL, PlayerMethod};
use crate::dto::release_mode::ReleaseMode;
use crate::emitter::EventEmitter;
use crate::logging::LogLevelControl;
use crate::player::{Player, duration_or_zero, position_or_zero};
use crate::registry::PlayerRegistry;
use crate::scheduler::PollingScheduler;
use crate::settings::Settings;

/// Entry point for inbound method calls.
///
/// Owns the registry, the polling scheduler and the event emitter. Everything runs on the
/// caller's event loop, so construct and drive it from within a `LocalSet`.
pub struct CommandDispatcher {
    registry: Rc<RefCell<PlayerRegistry>>,
    scheduler: PollingScheduler,
    emitter: EventEmitter,
    log_level: Box<dyn LogLevelControl>,
    shutdown: CancellationToken,
}

impl CommandDispatcher {
    pub fn new(
        factory: impl BackendFactory + 'static,
        log_level: impl LogLevelControl + 'static,
        settings: Settings,
    ) -> Self {
        let (notification_tx, notification_rx) = flume::unbounded();
        let registry = Rc::new(RefCell::new(PlayerRegistry::new(
            Box::new(factory),
            notification_tx,
        )));
        let emitter = EventEmitter::new(settings.event_capacity);
        let scheduler = PollingScheduler::new(
            Rc::downgrade(&registry),
            emitter.clone(),
            settings.polling_interval,
        );
        let shutdown = CancellationToken::new();
        tokio::task::spawn_local(pump_notifications(
            notification_rx,
            Rc::downgrade(&registry),
            scheduler.clone(),
            emitter.clone(),
            shutdown.clone(),
        ));

        Self {
            registry,
            scheduler,
            emitter,
            log_level: Box::new(log_level),
            shutdown,
        }
    }

    /// Handles one call. `None` means the call was dropped and gets no response at all.
    pub fn handle(&self, call: &MethodCall) -> Option<Outcome> {
        match panic::catch_unwind(AssertUnwindSafe(|| self.try_handle(call))) {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                error!("Error handling {}: {e:?}", call.method);
                Some(Outcome::from(&e))
            }
            Err(payload) => {
                let details = panic_message(payload.as_ref());
                error!("Panic handling {}: {details}", call.method);
                Some(Outcome::unexpected(ErrorKind::UnexpectedFailure, details))
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.emitter.subscribe()
    }

    pub fn scheduler(&self) -> &PollingScheduler {
        &self.scheduler
    }

    pub fn is_polling(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn player_count(&self) -> usize {
        self.registry.borrow().len()
    }

    pub fn mode_of(&self, player_id: &PlayerId) -> Option<PlaybackMode> {
        self.registry.borrow().mode_of(player_id)
    }

    fn try_handle(&self, call: &MethodCall) -> Result<Option<Outcome>, DispatchError> {
        if call.method == CHANGE_LOG_LEVEL {
            let level = call
                .arguments
                .enum_argument::<LogLevel>("value")?
                .ok_or_else(|| DispatchError::InvalidArgument("value".to_owned()))?;
            self.log_level.set_log_level(level)?;
            info!("Log level set to {level}");
            return Ok(Some(Outcome::ack()));
        }

        let Some(player_id) = call.player_id()? else {
            debug!("Dropping {} without a player id", call.method);
            return Ok(None);
        };
        let mut registry = self.registry.borrow_mut();
        let player = registry.resolve(&player_id, call.mode()?)?;
        let Ok(method) = call.method.parse::<PlayerMethod>() else {
            debug!("{} is not implemented", call.method);
            return Ok(Some(Outcome::NotImplemented));
        };
        let args = &call.arguments;
        let mut start_polling = false;

        let outcome = match method {
            PlayerMethod::SetSourceUrl => {
                let url = args.required::<String>("url")?;
                let is_local = args.optional::<bool>("isLocal")?.unwrap_or(false);
                player.set_url(&url, is_local)?;
                Outcome::ack()
            }
            PlayerMethod::SetSourceBytes => {
                player.set_bytes(args.required("bytes")?)?;
                Outcome::ack()
            }
            PlayerMethod::Resume => {
                player.play()?;
                start_polling = player.is_actually_playing();
                Outcome::ack()
            }
            PlayerMethod::Pause => {
                player.pause()?;
                Outcome::ack()
            }
            PlayerMethod::Stop => {
                player.stop()?;
                Outcome::ack()
            }
            PlayerMethod::Release => {
                player.release()?;
                registry.release(&player_id);
                Outcome::ack()
            }
            PlayerMethod::Seek => {
                player.seek(position(args)?)?;
                Outcome::ack()
            }
            PlayerMethod::SetVolume => {
                let volume = volume(args)?
                    .ok_or_else(|| DispatchError::InvalidArgument("volume".to_owned()))?;
                player.set_volume(volume)?;
                Outcome::ack()
            }
            PlayerMethod::SetPlaybackRate => {
                player.set_playback_rate(playback_rate(args)?)?;
                Outcome::ack()
            }
            PlayerMethod::GetDuration => Outcome::value(duration_or_zero(player)?),
            PlayerMethod::GetCurrentPosition => Outcome::value(position_or_zero(player)?),
            PlayerMethod::SetReleaseMode => {
                let release_mode = args
                    .enum_argument::<ReleaseMode>("releaseMode")?
                    .ok_or_else(|| DispatchError::InvalidArgument("releaseMode".to_owned()))?;
                player.set_release_mode(release_mode)?;
                Outcome::ack()
            }
            PlayerMethod::ConfigureAttributes => {
                configure_attributes(player, args)?;
                Outcome::ack()
            }
        };
        drop(registry);

        if start_polling {
            self.scheduler.start();
        }
        Ok(Some(outcome))
    }
}

impl Drop for CommandDispatcher {
    fn drop(&mut self) {
        self.shutdown.cancel();
        self.scheduler.stop();
    }
}

fn position(args: &Arguments) -> Result<i64, DispatchError> {
    let position = args.required::<i64>("position")?;
    if position < 0 {
        return Err(DispatchError::InvalidArgument("position".to_owned()));
    }
    Ok(position)
}

/// Gain in `0.0..=1.0`, `None` when absent.
fn volume(args: &Arguments) -> Result<Option<f64>, DispatchError> {
    let Some(volume) = args.optional::<f64>("volume")? else {
        return Ok(None);
    };
    if !volume.is_finite() || !(0.0..=1.0).contains(&volume) {
        return Err(DispatchError::InvalidArgument("volume".to_owned()));
    }
    Ok(Some(volume))
}

fn playback_rate(args: &Arguments) -> Result<f64, DispatchError> {
    let rate = args.required::<f64>("playbackRate")?;
    if !rate.is_finite() || rate <= 0.0 {
        return Err(DispatchError::InvalidArgument("playbackRate".to_owned()));
    }
    Ok(rate)
}

fn configure_attributes(player: &mut dyn Player, args: &Arguments) -> Result<(), DispatchError> {
    let attributes = AudioAttributes {
        respect_silence: args.optional("respectSilence")?.unwrap_or(false),
        stay_awake: args.optional("stayAwake")?.unwrap_or(false),
        duck_audio: args.optional("duckAudio")?.unwrap_or(false),
    };
    let volume = volume(args)?.unwrap_or(1.0);
    player.configure_attributes(attributes)?;
    player.set_volume(volume)?;
    Ok(())
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_owned()
    }
}

/// Moves backend callbacks onto the dispatcher's event loop.
async fn pump_notifications(
    notification_rx: Receiver<BackendNotification>,
    registry: Weak<RefCell<PlayerRegistry>>,
    scheduler: PollingScheduler,
    emitter: EventEmitter,
    shutdown: CancellationToken,
) {
    loop {
        let notification = tokio::select! {
            _ = shutdown.cancelled() => return,
            notification = notification_rx.recv_async() => match notification {
                Ok(notification) => notification,
                Err(_) => return,
            },
        };
        debug!("Got {notification:?}");
        match notification {
            BackendNotification::BecamePlaying(_) => scheduler.start(),
            BackendNotification::Prepared(player_id) => {
                let Some(registry) = registry.upgrade() else {
                    return;
                };
                let duration = registry
                    .borrow()
                    .get(&player_id)
                    .map(duration_or_zero);
                match duration {
                    Some(Ok(millis)) => emitter.duration(&player_id, millis),
                    Some(Err(e)) => debug!("No duration for {player_id}: {e}"),
                    None => {}
                }
            }
            BackendNotification::Completed(player_id) => emitter.complete(&player_id),
            BackendNotification::Failed(player_id, message) => {
                emitter.error(&player_id, message)
            }
            BackendNotification::SeekCompleted(player_id) => emitter.seek_complete(&player_id),
        }
    }
}

#[cfg(test)]
#[path = "./dispatcher_test.rs"]
mod dispatcher_test;
