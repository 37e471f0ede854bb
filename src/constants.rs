pub const CHECK_IN_MESSAGE: &str = "👋 Good morning, everyone! Time for our daily check-in. \
    How are you doing today? React ✅ to get your daily EXP! ";

pub const ALLOWED_REACTION_EMOJI: &str = "✅";

pub const COMMAND_PREFIX: &str = "!";
pub const COMMAND_SEND_NOW: &str = "send_checkin_now";
pub const COMMAND_CHECK_TIME: &str = "check_time";

// Default daily fire time, 07:00:00 UTC
pub const DEFAULT_FIRE_HOUR: u32 = 7;
pub const DEFAULT_FIRE_MINUTE: u32 = 0;
pub const DEFAULT_FIRE_SECOND: u32 = 0;

pub const FIRE_TIME_FORMAT: &str = "%H:%M:%S";
