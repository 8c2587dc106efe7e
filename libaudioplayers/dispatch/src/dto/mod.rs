pub(crate) mod arguments;
pub(crate) mod audio_attributes;
pub(crate) mod backend_notification;
pub(crate) mod dispatch_error;
pub(crate) mod log_level;
pub(crate) mod method_call;
pub(crate) mod outcome;
pub(crate) mod playback_mode;
pub(crate) mod player_error;
pub(crate) mod player_event;
pub(crate) mod player_id;
pub(crate) mod player_method;
pub(crate) mod release_mode;

/// Enum arguments arrive as `Type.VALUE`; only the part after the last `.` names the variant.
pub(crate) fn enum_name(value: &str) -> &str {
    value.rsplit_once('.').map_or(value, |(_, name)| name)
}
