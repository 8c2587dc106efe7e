mod backend;
mod dispatcher;
mod dto;
mod emitter;
mod logging;
#[cfg(test)]
mod mock_player;
mod player;
mod registry;
mod scheduler;
mod settings;
mod timer;

pub mod dispatch {
    pub use crate::backend::{
        BackendFactory, Notifier, SimulatedBackendFactory, SimulatedMediaPlayer,
        SimulatedSoundPool,
    };
    pub use crate::dispatcher::CommandDispatcher;
    pub use crate::dto::arguments::{Arguments, FromValue, Value};
    pub use crate::dto::audio_attributes::AudioAttributes;
    pub use crate::dto::backend_notification::BackendNotification;
    pub use crate::dto::dispatch_error::DispatchError;
    pub use crate::dto::log_level::LogLevel;
    pub use crate::dto::method_call::MethodCall;
    pub use crate::dto::outcome::{ErrorKind, ErrorOutcome, Outcome, UNEXPECTED_ERROR};
    pub use crate::dto::playback_mode::PlaybackMode;
    pub use crate::dto::player_event::PlayerEvent;
    pub use crate::dto::player_id::PlayerId;
    pub use crate::dto::release_mode::ReleaseMode;
    pub use crate::emitter::EventEmitter;
    pub use crate::logging::{LogLevelControl, LogLevelError, RecordedLogLevel};
    pub use crate::player::{Capability, Player, PlayerError};
    pub use crate::registry::{PlayerRecord, PlayerRegistry};
    pub use crate::scheduler::PollingScheduler;
    pub use crate::settings::Settings;
}
