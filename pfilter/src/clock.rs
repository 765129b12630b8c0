use std::time::{Duration, Instant};

#[repr(transparent)]
#[derive(Debug, Clone, Copy, Eq, PartialEq, PartialOrd, Ord, Default)]
pub struct Timestamp(pub Duration);

impl Timestamp {
    pub fn saturating_elapsed_since(&self, other: &Timestamp) -> Duration {
        other.0.saturating_sub(self.0)
    }

    pub fn as_nanos(&self) -> u64 {
        self.0.as_nanos() as u64
    }
}

impl From<Duration> for Timestamp {
    fn from(val: Duration) -> Self {
        Self(val)
    }
}

/// Source of monotonic time handed to the components that stamp matches.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Nanoseconds elapsed since the clock was created.
pub struct ClockNano(Instant);

impl Default for ClockNano {
    fn default() -> Self {
        Self(Instant::now())
    }
}

impl Clock for ClockNano {
    fn now(&self) -> Timestamp {
        Timestamp(self.0.elapsed())
    }
}
