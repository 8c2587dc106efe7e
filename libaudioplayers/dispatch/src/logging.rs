use std::cell::Cell;
use std::rc::Rc;

use thiserror::Error;

use crate::dto::log_level::LogLevel;

#[derive(Debug, Error)]
#[error("failed to change log level: {0}")]
pub struct LogLevelError(pub String);

/// Process-wide log level, owned by whoever installed the subscriber.
pub trait LogLevelControl {
    fn set_log_level(&self, level: LogLevel) -> Result<(), LogLevelError>;
}

/// Keeps the requested level without touching any subscriber. For embedders that manage
/// logging themselves.
#[derive(Clone, Debug, Default)]
pub struct RecordedLogLevel(Rc<Cell<LogLevel>>);

impl RecordedLogLevel {
    pub fn get(&self) -> LogLevel {
        self.0.get()
    }
}

impl LogLevelControl for RecordedLogLevel {
    fn set_log_level(&self, level: LogLevel) -> Result<(), LogLevelError> {
        self.0.set(level);
        Ok(())
    }
}
