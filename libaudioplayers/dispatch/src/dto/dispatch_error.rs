use thiserror::Error;

use super::outcome::ErrorKind;
use super::player_error::PlayerError;
use crate::logging::LogLevelError;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Player(#[from] PlayerError),
    #[error(transparent)]
    LogLevel(#[from] LogLevelError),
}

impl DispatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) | Self::Player(PlayerError::OutOfRange(_)) => {
                ErrorKind::InvalidArgument
            }
            Self::Player(PlayerError::Unsupported(_)) => ErrorKind::UnsupportedOperation,
            Self::Player(_) | Self::LogLevel(_) => ErrorKind::UnexpectedFailure,
        }
    }
}
