use super::player_id::PlayerId;

/// Callbacks posted by backends, possibly from their own threads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackendNotification {
    BecamePlaying(PlayerId),
    Prepared(PlayerId),
    Completed(PlayerId),
    Failed(PlayerId, String),
    SeekCompleted(PlayerId),
}
