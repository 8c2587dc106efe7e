use serde::{Deserialize, Serialize};

use super::arguments::{Arguments, Value};
use super::dispatch_error::DispatchError;
use super::player_id::PlayerId;

/// One inbound call: a method name plus its argument bag.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default, alias = "args")]
    pub arguments: Arguments,
}

impl MethodCall {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            arguments: Arguments::new(),
        }
    }

    pub fn arg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(name, value);
        self
    }

    /// `None` when the id is missing or empty.
    pub fn player_id(&self) -> Result<Option<PlayerId>, DispatchError> {
        Ok(self
            .arguments
            .optional::<String>("playerId")?
            .filter(|id| !id.is_empty())
            .map(PlayerId))
    }

    pub fn mode(&self) -> Result<Option<&str>, DispatchError> {
        match self.arguments.get("mode") {
            None => Ok(None),
            Some(Value::Str(mode)) => Ok(Some(mode.as_str())),
            Some(_) => Err(DispatchError::InvalidArgument("mode".to_owned())),
        }
    }
}
