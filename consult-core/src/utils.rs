//! Defaults shared by every consumer of the signaling model.

pub const DEFAULT_STUN_ADDR: &str = "stun:stun.l.google.com:19302";
pub const DEFAULT_STUN_ADDR_2: &str = "stun:stun1.l.google.com:19302";

pub const POLL_INTERVAL_MS: u64 = 2_000;
pub const HEARTBEAT_INTERVAL_MS: u64 = 5_000;
pub const PRESENCE_CHECK_INTERVAL_MS: u64 = 5_000;
pub const PRESENCE_TIMEOUT_MS: u64 = 15_000;

pub const MAX_SOFT_RETRIES: u32 = 3;
pub const SOFT_RETRY_BASE_MS: u64 = 1_000;
pub const MEDIA_GRACE_MS: u64 = 2_000;
pub const RESET_SETTLE_MS: u64 = 500;

/// Upper bound of the processed-signal cache.
pub const PROCESSED_SIGNAL_CAPACITY: usize = 100;
