use eyre::{Context, Result};
use libaudioplayers_dispatch::dispatch::{LogLevel, LogLevelControl, LogLevelError};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{Registry, reload};

/// Changes the level of the installed subscriber at runtime.
pub(crate) struct ReloadLogLevel {
    handle: reload::Handle<LevelFilter, Registry>,
}

impl LogLevelControl for ReloadLogLevel {
    fn set_log_level(&self, level: LogLevel) -> Result<(), LogLevelError> {
        self.handle
            .reload(LevelFilter::from(level))
            .map_err(|e| LogLevelError(e.to_string()))
    }
}

/// Installs the global subscriber. Stdout carries the protocol, so logs go to stderr.
pub(crate) fn init_logging(level: LogLevel) -> Result<ReloadLogLevel> {
    let (filter, handle) = reload::Layer::new(LevelFilter::from(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .try_init()
        .wrap_err("Error installing the logger")?;
    Ok(ReloadLogLevel { handle })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_reload() {
        let (_layer, handle) = reload::Layer::<LevelFilter, Registry>::new(LevelFilter::INFO);
        let control = ReloadLogLevel {
            handle: handle.clone(),
        };

        control.set_log_level(LogLevel::None).unwrap();

        assert_eq!(Some(LevelFilter::OFF), handle.clone_current());
    }

    #[test]
    fn test_reload_without_subscriber() {
        let (layer, handle) = reload::Layer::<LevelFilter, Registry>::new(LevelFilter::INFO);
        drop(layer);
        let control = ReloadLogLevel { handle };

        assert!(control.set_log_level(LogLevel::Error).is_err());
    }
}
