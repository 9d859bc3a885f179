//! Active cursor state.
//!
//! Kinematic fields are private: a [`Cursor`] is created at rest by
//! [`Cursor::new`] and only ever advanced by the
//! [`PhysicsEstimator`](crate::physics::PhysicsEstimator).

use serde::Serialize;

use crate::event::TimestampNs;

/// TUIO session identifier.
pub type SessionId = i32;

/// One active contact point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Cursor {
    pub(crate) session_id: SessionId,
    pub(crate) x: f64,
    pub(crate) y: f64,
    pub(crate) vx: f64,
    pub(crate) vy: f64,
    pub(crate) accel: f64,
    pub(crate) last_sample_ns: TimestampNs,
}

impl Cursor {
    /// Create a cursor at rest at a normalized position.
    pub fn new(session_id: SessionId, x: f64, y: f64, now_ns: TimestampNs) -> Self {
        Self {
            session_id,
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            accel: 0.0,
            last_sample_ns: now_ns,
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Normalized X coordinate [0.0, 1.0].
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Normalized Y coordinate [0.0, 1.0].
    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    /// Velocity in normalized units per second.
    pub fn velocity(&self) -> (f64, f64) {
        (self.vx, self.vy)
    }

    /// Acceleration magnitude in normalized units per second squared.
    pub fn acceleration(&self) -> f64 {
        self.accel
    }

    pub fn last_sample_ns(&self) -> TimestampNs {
        self.last_sample_ns
    }

    /// Position multiplied by a display scale. Wire values never use this.
    pub fn scaled_position(&self, scale: f64) -> (f64, f64) {
        (self.x * scale, self.y * scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_cursor_is_at_rest() {
        let cursor = Cursor::new(4, 0.2, 0.3, 1_000);
        assert_eq!(cursor.session_id(), 4);
        assert_eq!(cursor.position(), (0.2, 0.3));
        assert_eq!(cursor.velocity(), (0.0, 0.0));
        assert_eq!(cursor.acceleration(), 0.0);
        assert_eq!(cursor.last_sample_ns(), 1_000);
    }

    #[test]
    fn test_scaled_position_is_display_only() {
        let cursor = Cursor::new(0, 0.25, 0.5, 0);
        assert_eq!(cursor.scaled_position(2.0), (0.5, 1.0));
        assert_eq!(cursor.position(), (0.25, 0.5));
    }
}
