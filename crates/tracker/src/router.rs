//! Pointer event routing.
//!
//! Each capture-layer identifier is either absent or active:
//!
//! | event      | absent          | active                          |
//! |------------|-----------------|---------------------------------|
//! | start      | create cursor   | treated as move                 |
//! | move       | ignored         | update kinematics               |
//! | end/cancel | ignored         | remove cursor, release id       |
//!
//! Start, end, and cancel always produce a frame. Moves produce one only
//! when the move gate is open; otherwise the state is updated and the next
//! frame (move or heartbeat) carries it.

use std::collections::HashMap;
use std::time::Duration;

use webtuio_common::clock::RateController;
use webtuio_common::config::AppConfig;
use webtuio_protocol::cursor::Cursor;
use webtuio_protocol::event::{PointerEvent, PointerPhase, TimestampNs};
use webtuio_protocol::osc::OscPacket;
use webtuio_protocol::physics::PhysicsEstimator;

use crate::encoder::EncoderSession;

/// Routes pointer events into cursor state and encoded frames.
pub struct InputRouter {
    encoder: EncoderSession,
    estimator: PhysicsEstimator,
    cursors: HashMap<String, Cursor>,
    invert_y: bool,
    coordinate_scale: f64,
    periodic_updates: bool,
    move_gate: RateController,
    heartbeat_gate: RateController,
}

impl InputRouter {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            encoder: EncoderSession::new(&config.encoder, &config.session),
            estimator: PhysicsEstimator::with_min_dt(
                config.timing.min_sample_interval_us as f64 / 1_000_000.0,
            ),
            cursors: HashMap::new(),
            invert_y: config.encoder.invert_y,
            coordinate_scale: config.encoder.coordinate_scale,
            periodic_updates: config.encoder.periodic_updates,
            move_gate: RateController::with_interval(Duration::from_millis(
                config.timing.move_interval_ms,
            )),
            heartbeat_gate: RateController::with_interval(Duration::from_millis(
                config.timing.heartbeat_interval_ms,
            )),
        }
    }

    /// Apply one pointer event observed at `now_ns`.
    ///
    /// Returns the frame to send, if this event produced one.
    pub fn handle(&mut self, event: &PointerEvent, now_ns: TimestampNs) -> Option<OscPacket> {
        match event.phase {
            PointerPhase::Start => self.start(event, now_ns),
            PointerPhase::Move => self.move_to(event, now_ns),
            PointerPhase::End | PointerPhase::Cancel => self.end(event, now_ns),
        }
    }

    /// Heartbeat check, called at the run-loop tick cadence.
    ///
    /// Produces a frame when periodic updates are on, a cursor is active,
    /// and no frame went out within the heartbeat interval.
    pub fn tick(&mut self, now_ns: TimestampNs) -> Option<OscPacket> {
        if !self.periodic_updates || self.cursors.is_empty() {
            return None;
        }
        if !self.heartbeat_gate.is_due(now_ns) {
            return None;
        }
        tracing::trace!(active = self.cursors.len(), "Heartbeat frame");
        Some(self.emit(now_ns))
    }

    /// Drop cursors whose identifiers are missing from `live`.
    ///
    /// Capture layers can lose a contact without ever reporting its end;
    /// calling this with the identifiers they still report removes the
    /// leftovers. Produces a frame if anything was removed.
    pub fn retain_identifiers<S: AsRef<str>>(
        &mut self,
        live: &[S],
        now_ns: TimestampNs,
    ) -> Option<OscPacket> {
        let stale: Vec<String> = self
            .cursors
            .keys()
            .filter(|id| !live.iter().any(|l| l.as_ref() == id.as_str()))
            .cloned()
            .collect();
        if stale.is_empty() {
            return None;
        }

        for id in &stale {
            if let Some(cursor) = self.cursors.remove(id) {
                self.encoder.release(cursor.session_id());
                tracing::debug!(
                    id = %id,
                    session_id = cursor.session_id(),
                    "Removed cursor with no end event"
                );
            }
        }
        Some(self.emit(now_ns))
    }

    /// Remove every cursor and return a final frame with an empty alive set.
    ///
    /// The move gate is reopened, so the first move of the next contact
    /// produces a frame immediately.
    pub fn release_all(&mut self, now_ns: TimestampNs) -> OscPacket {
        for (_, cursor) in self.cursors.drain() {
            self.encoder.release(cursor.session_id());
        }
        self.move_gate.reset();
        self.emit(now_ns)
    }

    /// Cursor currently bound to a capture-layer identifier.
    pub fn cursor(&self, id: &str) -> Option<&Cursor> {
        self.cursors.get(id)
    }

    /// Active cursors ordered by session id.
    pub fn active_cursors(&self) -> Vec<&Cursor> {
        let mut cursors: Vec<&Cursor> = self.cursors.values().collect();
        cursors.sort_by_key(|c| c.session_id());
        cursors
    }

    pub fn active_count(&self) -> usize {
        self.cursors.len()
    }

    pub fn encoder(&self) -> &EncoderSession {
        &self.encoder
    }

    fn start(&mut self, event: &PointerEvent, now_ns: TimestampNs) -> Option<OscPacket> {
        if self.cursors.contains_key(&event.id) {
            tracing::debug!(
                id = %event.id,
                "Repeated start for active pointer, treating as move"
            );
            return self.move_to(event, now_ns);
        }
        let (x, y) = self.normalize(event)?;

        let session_id = self.encoder.acquire();
        self.cursors
            .insert(event.id.clone(), Cursor::new(session_id, x, y, now_ns));
        tracing::debug!(id = %event.id, session_id, x, y, "Cursor added");

        Some(self.emit(now_ns))
    }

    fn move_to(&mut self, event: &PointerEvent, now_ns: TimestampNs) -> Option<OscPacket> {
        let Some(previous) = self.cursors.get(&event.id).copied() else {
            tracing::trace!(id = %event.id, "Ignoring move for inactive pointer");
            return None;
        };
        let (x, y) = self.normalize(event)?;

        let cursor = self.estimator.update(&previous, x, y, now_ns);
        let (display_x, display_y) = cursor.scaled_position(self.coordinate_scale);
        tracing::trace!(
            session_id = cursor.session_id(),
            x,
            y,
            display_x,
            display_y,
            accel = cursor.acceleration(),
            "Cursor moved"
        );
        self.cursors.insert(event.id.clone(), cursor);

        if self.move_gate.should_tick(now_ns) {
            Some(self.emit(now_ns))
        } else {
            None
        }
    }

    fn end(&mut self, event: &PointerEvent, now_ns: TimestampNs) -> Option<OscPacket> {
        let Some(cursor) = self.cursors.remove(&event.id) else {
            tracing::trace!(
                id = %event.id,
                phase = ?event.phase,
                "Ignoring end for inactive pointer"
            );
            return None;
        };
        self.encoder.release(cursor.session_id());
        tracing::debug!(
            id = %event.id,
            session_id = cursor.session_id(),
            phase = ?event.phase,
            "Cursor removed"
        );

        Some(self.emit(now_ns))
    }

    fn normalize(&self, event: &PointerEvent) -> Option<(f64, f64)> {
        match event.normalized() {
            Some((x, y)) if self.invert_y => Some((x, 1.0 - y)),
            Some(position) => Some(position),
            None => {
                tracing::warn!(
                    id = %event.id,
                    x = event.x,
                    y = event.y,
                    bounds = ?event.bounds,
                    "Ignoring pointer event with unusable coordinates"
                );
                None
            }
        }
    }

    fn emit(&mut self, now_ns: TimestampNs) -> OscPacket {
        let mut cursors: Vec<&Cursor> = self.cursors.values().collect();
        cursors.sort_by_key(|c| c.session_id());
        let packet = self.encoder.encode_frame(cursors);
        self.heartbeat_gate.mark(now_ns);
        packet
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use webtuio_protocol::event::BoundingBox;
    use webtuio_protocol::osc::{OscArg, OscMessage};

    const MS: u64 = 1_000_000;

    fn unit() -> BoundingBox {
        BoundingBox::new(0.0, 0.0, 1.0, 1.0)
    }

    fn router() -> InputRouter {
        InputRouter::new(&AppConfig::default())
    }

    fn commands(packet: &OscPacket) -> Vec<&str> {
        packet
            .messages()
            .iter()
            .filter_map(OscMessage::command)
            .collect()
    }

    fn alive_ids(packet: &OscPacket) -> Vec<OscArg> {
        packet
            .messages()
            .iter()
            .find(|m| m.command() == Some("alive"))
            .map(|m| m.args[1..].to_vec())
            .unwrap_or_default()
    }

    #[test]
    fn test_start_creates_cursor_and_frame() {
        let mut router = router();
        let packet = router
            .handle(&PointerEvent::start("a", 0.2, 0.3, unit()), 0)
            .unwrap();

        assert_eq!(commands(&packet), ["source", "set", "alive", "fseq"]);
        let cursor = router.cursor("a").unwrap();
        assert_eq!(cursor.position(), (0.2, 0.3));
        assert_eq!(cursor.velocity(), (0.0, 0.0));
    }

    #[test]
    fn test_move_updates_kinematics() {
        let mut router = router();
        router.handle(&PointerEvent::start("a", 0.0, 0.0, unit()), 0);
        let packet = router.handle(&PointerEvent::moved("a", 0.5, 0.0, unit()), 500 * MS);

        assert!(packet.is_some());
        let cursor = router.cursor("a").unwrap();
        assert!((cursor.velocity().0 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_move_frames_are_rate_limited() {
        let mut router = router();
        router.handle(&PointerEvent::start("a", 0.0, 0.0, unit()), 0);
        assert!(router
            .handle(&PointerEvent::moved("a", 0.1, 0.0, unit()), 100 * MS)
            .is_some());
        // 5ms later: state updates, frame dropped
        assert!(router
            .handle(&PointerEvent::moved("a", 0.2, 0.0, unit()), 105 * MS)
            .is_none());
        assert_eq!(router.cursor("a").unwrap().x(), 0.2);
        assert!(router
            .handle(&PointerEvent::moved("a", 0.3, 0.0, unit()), 117 * MS)
            .is_some());
    }

    #[test]
    fn test_gated_move_is_carried_by_next_heartbeat() {
        let mut router = router();
        router.handle(&PointerEvent::start("a", 0.0, 0.0, unit()), 0);
        assert!(router
            .handle(&PointerEvent::moved("a", 0.1, 0.0, unit()), 100 * MS)
            .is_some());
        assert!(router
            .handle(&PointerEvent::moved("a", 0.2, 0.0, unit()), 105 * MS)
            .is_none());

        let packet = router.tick(138 * MS).unwrap();
        let set = &packet.messages()[1];
        assert_eq!(set.command(), Some("set"));
        assert_eq!(set.args[2], OscArg::Float(0.2));
        // 0.1 over 5ms
        let vx = set.args[4].as_float().unwrap();
        assert!((vx - 20.0).abs() < 1e-9);
        let accel = set.args[6].as_float().unwrap();
        assert!((accel - 3_800.0).abs() < 1e-6);
    }

    #[test]
    fn test_min_sample_interval_from_config() {
        let mut config = AppConfig::default();
        config.timing.min_sample_interval_us = 50_000;
        let mut router = InputRouter::new(&config);
        router.handle(&PointerEvent::start("a", 0.0, 0.0, unit()), 0);
        router.handle(&PointerEvent::moved("a", 0.5, 0.0, unit()), 10 * MS);

        let cursor = router.cursor("a").unwrap();
        assert_eq!(cursor.x(), 0.5);
        assert_eq!(cursor.velocity(), (0.0, 0.0));
    }

    #[test]
    fn test_end_after_end_is_noop() {
        let mut router = router();
        router.handle(&PointerEvent::start("a", 0.2, 0.3, unit()), 0);
        let packet = router
            .handle(&PointerEvent::end("a", 0.2, 0.3, unit()), 10 * MS)
            .unwrap();
        assert!(alive_ids(&packet).is_empty());
        assert!(router
            .handle(&PointerEvent::cancel("a", unit()), 20 * MS)
            .is_none());
    }

    #[test]
    fn test_invert_y() {
        let mut config = AppConfig::default();
        config.encoder.invert_y = true;
        let mut router = InputRouter::new(&config);
        router.handle(&PointerEvent::start("a", 0.5, 0.2, unit()), 0);
        assert!((router.cursor("a").unwrap().y() - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_coordinate_scale_does_not_reach_the_wire() {
        let mut config = AppConfig::default();
        config.encoder.coordinate_scale = 4.0;
        let mut router = InputRouter::new(&config);
        let packet = router
            .handle(&PointerEvent::start("a", 0.25, 0.5, unit()), 0)
            .unwrap();
        let set = &packet.messages()[1];
        assert_eq!(set.args[2], OscArg::Float(0.25));
        assert_eq!(set.args[3], OscArg::Float(0.5));
    }

    #[test]
    fn test_degenerate_bounds_are_ignored() {
        let mut router = router();
        let zero = BoundingBox::new(0.0, 0.0, 0.0, 0.0);
        assert!(router
            .handle(&PointerEvent::start("a", 1.0, 1.0, zero), 0)
            .is_none());
        assert_eq!(router.active_count(), 0);
        assert_eq!(router.encoder().registry().active_count(), 0);
    }

    #[test]
    fn test_repeated_start_keeps_session() {
        let mut router = router();
        router.handle(&PointerEvent::start("a", 0.1, 0.1, unit()), 0);
        let session = router.cursor("a").unwrap().session_id();
        router.handle(&PointerEvent::start("a", 0.4, 0.1, unit()), 50 * MS);

        assert_eq!(router.active_count(), 1);
        assert_eq!(router.cursor("a").unwrap().session_id(), session);
        assert_eq!(router.cursor("a").unwrap().x(), 0.4);
    }

    #[test]
    fn test_heartbeat_gating() {
        let mut router = router();
        assert!(router.tick(0).is_none()); // nothing active

        router.handle(&PointerEvent::start("a", 0.1, 0.1, unit()), 0);
        assert!(router.tick(10 * MS).is_none()); // start frame just went out
        assert!(router.tick(33 * MS).is_some());
        assert!(router.tick(40 * MS).is_none());
        assert!(router.tick(66 * MS).is_some());
    }

    #[test]
    fn test_heartbeat_disabled() {
        let mut config = AppConfig::default();
        config.encoder.periodic_updates = false;
        let mut router = InputRouter::new(&config);
        router.handle(&PointerEvent::start("a", 0.1, 0.1, unit()), 0);
        assert!(router.tick(1_000 * MS).is_none());
    }

    #[test]
    fn test_retain_identifiers_removes_stale_cursors() {
        let mut router = router();
        router.handle(&PointerEvent::start("a", 0.1, 0.1, unit()), 0);
        router.handle(&PointerEvent::start("b", 0.2, 0.2, unit()), 0);

        assert!(router.retain_identifiers(&["a", "b"], 5 * MS).is_none());
        let packet = router.retain_identifiers(&["b"], 10 * MS).unwrap();

        assert!(router.cursor("a").is_none());
        assert_eq!(alive_ids(&packet), [OscArg::Int(1)]);
        assert_eq!(router.encoder().registry().active_count(), 1);
    }

    #[test]
    fn test_release_all_sends_empty_alive() {
        let mut router = router();
        router.handle(&PointerEvent::start("a", 0.1, 0.1, unit()), 0);
        router.handle(&PointerEvent::start("b", 0.2, 0.2, unit()), 0);

        let packet = router.release_all(10 * MS);
        assert_eq!(commands(&packet), ["source", "alive", "fseq"]);
        assert_eq!(router.active_count(), 0);
        assert_eq!(router.encoder().registry().active_count(), 0);
    }

    #[test]
    fn test_release_all_reopens_move_gate() {
        let mut router = router();
        router.handle(&PointerEvent::start("a", 0.1, 0.1, unit()), 0);
        assert!(router
            .handle(&PointerEvent::moved("a", 0.2, 0.1, unit()), 10 * MS)
            .is_some());
        router.release_all(12 * MS);

        router.handle(&PointerEvent::start("b", 0.5, 0.5, unit()), 13 * MS);
        assert!(router
            .handle(&PointerEvent::moved("b", 0.6, 0.5, unit()), 20 * MS)
            .is_some());
    }

    #[test]
    fn test_sets_are_ordered_by_session_id() {
        let mut router = router();
        for (i, id) in ["z", "y", "x"].iter().enumerate() {
            router.handle(&PointerEvent::start(*id, 0.1, 0.1, unit()), i as u64 * MS);
        }
        let packet = router.tick(100 * MS).unwrap();
        assert_eq!(
            alive_ids(&packet),
            [OscArg::Int(0), OscArg::Int(1), OscArg::Int(2)]
        );
        let ordered: Vec<_> = router
            .active_cursors()
            .iter()
            .map(|c| c.session_id())
            .collect();
        assert_eq!(ordered, [0, 1, 2]);
    }
}
