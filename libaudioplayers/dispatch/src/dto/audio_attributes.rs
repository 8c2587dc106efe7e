#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AudioAttributes {
    /// Stay silent when the device is in silent mode
    pub respect_silence: bool,
    /// Keep the device awake while playing
    pub stay_awake: bool,
    /// Lower other audio instead of taking exclusive focus
    pub duck_audio: bool,
}
