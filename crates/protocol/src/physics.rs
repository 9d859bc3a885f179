//! Finite-difference cursor kinematics.
//!
//! Velocity is the position delta over the sample interval; acceleration is
//! the magnitude of the velocity delta over the same interval. Neither is
//! clamped, so a fast flick can report very large values.

use crate::cursor::Cursor;
use crate::event::TimestampNs;

/// Samples closer together than this are treated as position-only updates.
pub const DEFAULT_MIN_DT_SECS: f64 = 0.001;

/// Stateless velocity/acceleration estimator.
#[derive(Debug, Clone, Copy)]
pub struct PhysicsEstimator {
    min_dt_secs: f64,
}

impl Default for PhysicsEstimator {
    fn default() -> Self {
        Self {
            min_dt_secs: DEFAULT_MIN_DT_SECS,
        }
    }
}

impl PhysicsEstimator {
    /// Create an estimator with a custom minimum sample interval (seconds).
    pub fn with_min_dt(min_dt_secs: f64) -> Self {
        Self { min_dt_secs }
    }

    /// Advance `cursor` to a new normalized position sampled at `now_ns`.
    ///
    /// When the interval since the previous sample is at most the minimum
    /// (including duplicate or backwards timestamps) only the position
    /// moves and the kinematics are kept. The sample time never goes
    /// backwards.
    pub fn update(&self, cursor: &Cursor, new_x: f64, new_y: f64, now_ns: TimestampNs) -> Cursor {
        let dt = (now_ns as f64 - cursor.last_sample_ns as f64) / 1_000_000_000.0;

        if dt <= self.min_dt_secs {
            return Cursor {
                x: new_x,
                y: new_y,
                last_sample_ns: cursor.last_sample_ns.max(now_ns),
                ..*cursor
            };
        }

        let vx = (new_x - cursor.x) / dt;
        let vy = (new_y - cursor.y) / dt;
        let dv = ((vx - cursor.vx).powi(2) + (vy - cursor.vy).powi(2)).sqrt();

        Cursor {
            session_id: cursor.session_id,
            x: new_x,
            y: new_y,
            vx,
            vy,
            accel: dv / dt,
            last_sample_ns: now_ns,
        }
    }
}
