use serde::Serialize;
use strum::Display;

use super::arguments::Value;
use super::dispatch_error::DispatchError;

pub const UNEXPECTED_ERROR: &str = "Unexpected error!";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    InvalidArgument,
    UnsupportedOperation,
    UnexpectedFailure,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ErrorOutcome {
    pub kind: ErrorKind,
    pub message: String,
    pub details: String,
}

/// Result of dispatching one method call.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Success(Value),
    Error(ErrorOutcome),
    NotImplemented,
}

impl Outcome {
    pub fn ack() -> Self {
        Self::Success(Value::Int(1))
    }

    pub fn value(value: i64) -> Self {
        Self::Success(Value::Int(value))
    }

    pub fn unexpected(kind: ErrorKind, details: impl Into<String>) -> Self {
        Self::Error(ErrorOutcome {
            kind,
            message: UNEXPECTED_ERROR.to_owned(),
            details: details.into(),
        })
    }
}

impl From<&DispatchError> for Outcome {
    fn from(error: &DispatchError) -> Self {
        Self::unexpected(error.kind(), error.to_string())
    }
}
