use strum::{Display, EnumString};

use super::dispatch_error::DispatchError;
use super::enum_name;

/// Selects which backend variant serves a player id.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, EnumString)]
pub enum PlaybackMode {
    #[default]
    #[strum(serialize = "MEDIA_PLAYER")]
    FullDecode,
    #[strum(serialize = "LOW_LATENCY")]
    LowLatencyPooled,
}

impl PlaybackMode {
    /// Parses the optional `mode` argument. Absent means full decode.
    pub fn from_argument(mode: Option<&str>) -> Result<Self, DispatchError> {
        match mode {
            None => Ok(Self::default()),
            Some(raw) => enum_name(raw)
                .parse()
                .map_err(|_| DispatchError::InvalidArgument(format!("unknown mode {raw}"))),
        }
    }
}
