//! Clock and rate-gating utilities for the cursor stream.
//!
//! Every cursor sample and frame is stamped against a monotonic epoch
//! captured when the stream starts. This module provides:
//! - The stream epoch and elapsed-time queries
//! - Wall-clock milliseconds for bundle time tags
//! - Interval gates that bound the output frame rate

use std::time::{Duration, Instant};

/// A stream clock that provides monotonic timestamps relative to
/// a fixed epoch (the moment the stream started).
#[derive(Debug, Clone)]
pub struct StreamClock {
    epoch: Instant,

    /// Wall-clock time at epoch (RFC 3339).
    epoch_wall: String,
}

impl StreamClock {
    /// Create a new stream clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Get nanoseconds elapsed since stream start.
    pub fn elapsed_ns(&self) -> u64 {
        self.epoch.elapsed().as_nanos() as u64
    }

    /// Get seconds elapsed since stream start.
    pub fn elapsed_secs(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    /// Wall-clock time at stream start.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }

    /// Convert milliseconds to nanoseconds.
    pub fn ms_to_ns(ms: u64) -> u64 {
        ms.saturating_mul(1_000_000)
    }
}

/// Current wall-clock time in Unix milliseconds.
pub fn wall_clock_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Minimum-interval gate for frame emission.
#[derive(Debug, Clone)]
pub struct RateController {
    target_interval_ns: u64,
    last_tick_ns: Option<u64>,
}

impl RateController {
    /// Create a controller from an explicit minimum interval.
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            target_interval_ns: interval.as_nanos() as u64,
            last_tick_ns: None,
        }
    }

    /// Check if enough time has passed for the next tick.
    /// Returns true and updates internal state if ready.
    /// The first call always returns true.
    pub fn should_tick(&mut self, current_ns: u64) -> bool {
        if self.is_due(current_ns) {
            self.mark(current_ns);
            true
        } else {
            false
        }
    }

    /// Like [`should_tick`](Self::should_tick) but without recording the tick.
    pub fn is_due(&self, current_ns: u64) -> bool {
        match self.last_tick_ns {
            None => true,
            Some(last) => current_ns >= last.saturating_add(self.target_interval_ns),
        }
    }

    /// Record a tick at `current_ns` regardless of the gate.
    pub fn mark(&mut self, current_ns: u64) {
        self.last_tick_ns = Some(current_ns);
    }

    /// Forget the last tick so the next check passes.
    pub fn reset(&mut self) {
        self.last_tick_ns = None;
    }
}
