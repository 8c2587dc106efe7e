use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Settings {
    pub polling_interval: Duration,
    pub event_capacity: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            polling_interval: Duration::from_millis(200),
            event_capacity: 32,
        }
    }
}
