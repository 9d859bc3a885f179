//! TUIO 1.1 `2Dcur` profile messages.
//!
//! A frame is always laid out as:
//!
//! ```text
//! /tuio/2Dcur source <name>
//! /tuio/2Dcur set    <s_id> <x> <y> <vx> <vy> <a>   (one per active cursor)
//! /tuio/2Dcur alive  <s_id>...
//! /tuio/2Dcur fseq   <n>
//! ```
//!
//! Every frame restates the full active set, so a dropped frame is repaired
//! by the next one.

use crate::cursor::{Cursor, SessionId};
use crate::osc::{OscArg, OscMessage};

/// OSC address of the 2D cursor profile.
pub const PROFILE_2DCUR: &str = "/tuio/2Dcur";

/// Frame sequence numbers stay in `0..2^31`.
const FSEQ_MASK: i32 = i32::MAX;

/// Per-source frame sequence counter.
#[derive(Debug, Clone, Default)]
pub struct FrameSequence {
    current: i32,
}

impl FrameSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from a known value; the next [`advance`](Self::advance)
    /// returns `value + 1` (wrapped).
    pub fn starting_at(value: i32) -> Self {
        Self {
            current: value & FSEQ_MASK,
        }
    }

    /// Increment modulo 2^31 and return the new value.
    pub fn advance(&mut self) -> i32 {
        self.current = self.current.wrapping_add(1) & FSEQ_MASK;
        self.current
    }

    /// Last value returned by [`advance`](Self::advance).
    pub fn current(&self) -> i32 {
        self.current
    }
}

/// Builds `/tuio/2Dcur` messages for one input source.
#[derive(Debug, Clone)]
pub struct CursorMessageBuilder {
    source_name: String,
    fseq: FrameSequence,
}

impl CursorMessageBuilder {
    pub fn new(source_name: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            fseq: FrameSequence::new(),
        }
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn frame_sequence(&self) -> &FrameSequence {
        &self.fseq
    }

    /// `source <name>`
    pub fn source(&self) -> OscMessage {
        message(vec![
            OscArg::from("source"),
            OscArg::from(self.source_name.as_str()),
        ])
    }

    /// `set <s_id> <x> <y> <vx> <vy> <a>` with normalized coordinates.
    pub fn set(&self, cursor: &Cursor) -> OscMessage {
        let (x, y) = cursor.position();
        let (vx, vy) = cursor.velocity();
        message(vec![
            OscArg::from("set"),
            OscArg::Int(cursor.session_id()),
            OscArg::Float(x),
            OscArg::Float(y),
            OscArg::Float(vx),
            OscArg::Float(vy),
            OscArg::Float(cursor.acceleration()),
        ])
    }

    /// `alive <s_id>...`
    pub fn alive(&self, session_ids: &[SessionId]) -> OscMessage {
        let mut args = Vec::with_capacity(session_ids.len() + 1);
        args.push(OscArg::from("alive"));
        args.extend(session_ids.iter().copied().map(OscArg::Int));
        message(args)
    }

    /// `fseq <n>`, advancing the frame counter.
    pub fn fseq(&mut self) -> OscMessage {
        let n = self.fseq.advance();
        message(vec![OscArg::from("fseq"), OscArg::Int(n)])
    }

    /// Build one complete frame over `cursors`, in the order given.
    pub fn frame<'a, I>(&mut self, cursors: I) -> Vec<OscMessage>
    where
        I: IntoIterator<Item = &'a Cursor>,
    {
        let mut messages = vec![self.source()];
        let mut alive = Vec::new();
        for cursor in cursors {
            messages.push(self.set(cursor));
            alive.push(cursor.session_id());
        }
        messages.push(self.alive(&alive));
        messages.push(self.fseq());
        messages
    }
}

fn message(args: Vec<OscArg>) -> OscMessage {
    OscMessage::new(PROFILE_2DCUR, args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::PhysicsEstimator;
    use proptest::prelude::*;

    fn builder() -> CursorMessageBuilder {
        CursorMessageBuilder::new("WebTUIO@test")
    }

    #[test]
    fn test_source_message() {
        let source = builder().source();
        assert_eq!(source.address, PROFILE_2DCUR);
        assert_eq!(
            source.args,
            vec![OscArg::from("source"), OscArg::from("WebTUIO@test")]
        );
    }

    #[test]
    fn test_set_message_field_order() {
        let cursor = Cursor::new(12, 0.0, 0.0, 0);
        let cursor = PhysicsEstimator::default().update(&cursor, 0.5, 0.25, 500_000_000);
        let set = builder().set(&cursor);

        assert_eq!(set.type_tags(), ",sifffff");
        assert_eq!(set.args[0], OscArg::from("set"));
        assert_eq!(set.args[1], OscArg::Int(12));
        assert_eq!(set.args[2], OscArg::Float(0.5));
        assert_eq!(set.args[3], OscArg::Float(0.25));
        assert_eq!(set.args[4], OscArg::Float(1.0));
        assert_eq!(set.args[5], OscArg::Float(0.5));
    }

    #[test]
    fn test_alive_lists_ids_in_order() {
        let alive = builder().alive(&[3, 1, 2]);
        assert_eq!(alive.type_tags(), ",siii");
        assert_eq!(alive.args[1..], [OscArg::Int(3), OscArg::Int(1), OscArg::Int(2)]);
    }

    #[test]
    fn test_fseq_increments_per_call() {
        let mut builder = builder();
        assert_eq!(builder.fseq().args[1], OscArg::Int(1));
        assert_eq!(builder.fseq().args[1], OscArg::Int(2));
        assert_eq!(builder.frame_sequence().current(), 2);
    }

    #[test]
    fn test_fseq_wraps_to_zero() {
        let mut seq = FrameSequence::starting_at(i32::MAX - 1);
        assert_eq!(seq.advance(), i32::MAX);
        assert_eq!(seq.advance(), 0);
        assert_eq!(seq.advance(), 1);
    }

    #[test]
    fn test_empty_frame_has_no_set() {
        let frame = builder().frame(std::iter::empty());
        let commands: Vec<_> = frame.iter().filter_map(OscMessage::command).collect();
        assert_eq!(commands, ["source", "alive", "fseq"]);
        assert_eq!(frame[1].args.len(), 1);
    }

    #[test]
    fn test_frame_layout() {
        let cursors = [Cursor::new(4, 0.1, 0.2, 0), Cursor::new(9, 0.3, 0.4, 0)];
        let frame = builder().frame(cursors.iter());
        let commands: Vec<_> = frame.iter().filter_map(OscMessage::command).collect();
        assert_eq!(commands, ["source", "set", "set", "alive", "fseq"]);
        assert_eq!(frame[1].args[1], OscArg::Int(4));
        assert_eq!(frame[2].args[1], OscArg::Int(9));
        assert_eq!(frame[3].args[1..], [OscArg::Int(4), OscArg::Int(9)]);
    }

    proptest! {
        #[test]
        fn prop_fseq_never_negative(start in any::<i32>(), steps in 1usize..64) {
            let mut seq = FrameSequence::starting_at(start);
            for _ in 0..steps {
                prop_assert!(seq.advance() >= 0);
            }
        }
    }
}
