use strum::{Display, EnumString};

/// What a player does with its resources once playback completes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum ReleaseMode {
    #[default]
    Release,
    Loop,
    Stop,
}
