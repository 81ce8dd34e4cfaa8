//! Time management for the air-data cycle
//!
//! The engine itself is clock-agnostic: every operation takes `now` as an
//! argument. This module provides the clock abstraction used by the
//! [`AirDataEngine::run`](crate::engine::AirDataEngine::run) convenience
//! wrapper:
//! - Monotonic system clock (when `std` is available)
//! - Fixed, manually stepped clock (tests and replay)

/// Timestamp in milliseconds since device boot
pub type Timestamp = u64;

/// Source of time for the system
pub trait TimeSource {
    /// Get current timestamp in milliseconds
    fn now(&self) -> Timestamp;
}

/// Monotonic clock backed by `std::time::Instant` (requires std)
///
/// Starts at 0 when created.
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct SystemTime {
    start: std::time::Instant,
}

#[cfg(feature = "std")]
impl SystemTime {
    /// Clock starting at 0 now
    pub fn new() -> Self {
        Self { start: std::time::Instant::now() }
    }
}

#[cfg(feature = "std")]
impl Default for SystemTime {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl TimeSource for SystemTime {
    fn now(&self) -> Timestamp {
        self.start.elapsed().as_millis() as Timestamp
    }
}

/// Fixed time source for testing and log replay
#[derive(Debug, Clone)]
pub struct FixedTime {
    timestamp: Timestamp,
}

impl FixedTime {
    /// Clock frozen at `timestamp`
    pub fn new(timestamp: Timestamp) -> Self {
        Self { timestamp }
    }

    /// Move the clock forward
    pub fn advance(&mut self, ms: u64) {
        self.timestamp += ms;
    }
}

impl TimeSource for FixedTime {
    fn now(&self) -> Timestamp {
        self.timestamp
    }
}

/// Elapsed milliseconds between two timestamps, zero if `later` is earlier
pub fn elapsed_ms(earlier: Timestamp, later: Timestamp) -> u64 {
    later.saturating_sub(earlier)
}

/// Convert a millisecond duration to seconds
pub fn ms_to_s(ms: u64) -> f32 {
    ms as f32 * 1.0e-3
}
