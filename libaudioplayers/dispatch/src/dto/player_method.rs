use strum::{Display, EnumString};

pub(crate) const CHANGE_LOG_LEVEL: &str = "changeLogLevel";

/// Methods that operate on a single player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "camelCase")]
pub(crate) enum PlayerMethod {
    SetSourceUrl,
    SetSourceBytes,
    Resume,
    Pause,
    Stop,
    Release,
    Seek,
    SetVolume,
    SetPlaybackRate,
    GetDuration,
    GetCurrentPosition,
    SetReleaseMode,
    ConfigureAttributes,
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::PlayerMethod;

    #[rstest]
    #[case("setSourceUrl", PlayerMethod::SetSourceUrl)]
    #[case("getCurrentPosition", PlayerMethod::GetCurrentPosition)]
    #[case("resume", PlayerMethod::Resume)]
    fn test_parse(#[case] name: &str, #[case] expected: PlayerMethod) {
        assert_eq!(expected, name.parse::<PlayerMethod>().unwrap());
    }

    #[test]
    fn test_parse_unknown() {
        assert!("play".parse::<PlayerMethod>().is_err());
    }
}
