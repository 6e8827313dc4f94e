use std::time::{SystemTime, UNIX_EPOCH};

/// Clock collaborator, injected so backup timestamps are deterministic in
/// tests.
pub trait Clock {
    fn epoch_secs(&self) -> u64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn epoch_secs(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

/// Fixed-time clock for tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn epoch_secs(&self) -> u64 {
        self.0
    }
}
