use std::time::Duration;

use clap::Parser;
use libaudioplayers_dispatch::dispatch::{LogLevel, Settings};

/// Drives simulated audio players over JSON lines on stdin and stdout.
#[derive(Parser, Debug)]
#[command(name = "audioplayersd", version, about, long_about = None)]
pub(crate) struct Args {
    /// Initial log level, one of INFO, ERROR or NONE. Logs go to stderr.
    #[arg(long, default_value = "INFO")]
    pub(crate) log_level: LogLevel,

    /// Period between position updates while anything is playing.
    #[arg(long, default_value_t = 200)]
    pub(crate) polling_interval_ms: u64,

    /// Events buffered per subscriber before the oldest are dropped.
    #[arg(long, default_value_t = 32)]
    pub(crate) event_capacity: usize,
}

impl Args {
    pub(crate) fn settings(&self) -> Settings {
        Settings {
            polling_interval: Duration::from_millis(self.polling_interval_ms.max(1)),
            event_capacity: self.event_capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["audioplayersd"]).unwrap();
        assert_eq!(LogLevel::Info, args.log_level);
        assert_eq!(Duration::from_millis(200), args.settings().polling_interval);
        assert_eq!(32, args.settings().event_capacity);
    }

    #[test]
    fn test_overrides() {
        let args = Args::try_parse_from([
            "audioplayersd",
            "--log-level",
            "error",
            "--polling-interval-ms",
            "50",
        ])
        .unwrap();
        assert_eq!(LogLevel::Error, args.log_level);
        assert_eq!(Duration::from_millis(50), args.settings().polling_interval);
    }

    #[test]
    fn test_bad_log_level() {
        assert!(Args::try_parse_from(["audioplayersd", "--log-level", "loud"]).is_err());
    }
}
