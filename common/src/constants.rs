/// Number of channels delivered by every sensor (x, y, z).
pub const N_CHANNELS: usize = 3;

/// Placeholder user id stamped on every payload unless configured otherwise.
pub const DEFAULT_USER_ID: u32 = 0;
