use strum::Display;
use thiserror::Error;

/// Optional operations a backend variant may structurally lack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
pub enum Capability {
    Duration,
    CurrentPosition,
    Seek,
    PlaybackRate,
    BytesSource,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PlayerError {
    #[error("{0} is not supported by this player")]
    Unsupported(Capability),
    #[error("{0} is out of range")]
    OutOfRange(String),
    #[error("no source has been set")]
    NoSource,
    #[error("{0}")]
    Backend(String),
}
