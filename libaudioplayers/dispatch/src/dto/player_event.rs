use strum::{Display, IntoStaticStr};

use super::arguments::{Arguments, Value};
use super::player_id::PlayerId;

#[derive(Clone, Debug, PartialEq, Display, IntoStaticStr)]
pub enum PlayerEvent {
    #[strum(serialize = "audio.onDuration")]
    Duration { player_id: PlayerId, millis: i64 },
    #[strum(serialize = "audio.onCurrentPosition")]
    CurrentPosition { player_id: PlayerId, millis: i64 },
    #[strum(serialize = "audio.onComplete")]
    Complete { player_id: PlayerId },
    #[strum(serialize = "audio.onError")]
    Error { player_id: PlayerId, message: String },
    #[strum(serialize = "audio.onSeekComplete")]
    SeekComplete { player_id: PlayerId },
}

impl PlayerEvent {
    /// Outbound method name, e.g. `audio.onDuration`.
    pub fn method(&self) -> &'static str {
        self.into()
    }

    pub fn player_id(&self) -> &PlayerId {
        match self {
            Self::Duration { player_id, .. }
            | Self::CurrentPosition { player_id, .. }
            | Self::Complete { player_id }
            | Self::Error { player_id, .. }
            | Self::SeekComplete { player_id } => player_id,
        }
    }

    pub fn value(&self) -> Option<Value> {
        match self {
            Self::Duration { millis, .. } | Self::CurrentPosition { millis, .. } => {
                Some(Value::Int(*millis))
            }
            Self::Error { message, .. } => Some(Value::Str(message.clone())),
            Self::Complete { .. } | Self::SeekComplete { .. } => None,
        }
    }

    /// Outbound argument bag: `playerId`, plus `value` when the event carries one.
    pub fn arguments(&self) -> Arguments {
        let arguments = Arguments::new().with("playerId", self.player_id().as_str());
        match self.value() {
            Some(value) => arguments.with("value", value),
            None => arguments,
        }
    }
}
