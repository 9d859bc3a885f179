//! Frame-to-packet bundling policy.

use webtuio_common::clock::wall_clock_ms;

use crate::osc::{OscBundle, OscMessage, OscPacket};

/// Wraps one frame's messages into the payload handed to the transport.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundleFramer;

impl BundleFramer {
    pub fn new() -> Self {
        Self
    }

    /// Encode `messages` with the current wall-clock time as the time tag.
    pub fn encode(&self, messages: Vec<OscMessage>, full_bundle: bool) -> OscPacket {
        self.encode_at(messages, full_bundle, wall_clock_ms())
    }

    /// Encode `messages` with an explicit time tag (Unix milliseconds).
    ///
    /// With `full_bundle` the frame is always a bundle. Otherwise a single
    /// message is sent bare, and anything else falls back to a bundle since
    /// a bare message carries exactly one address.
    pub fn encode_at(
        &self,
        mut messages: Vec<OscMessage>,
        full_bundle: bool,
        time_tag_ms: i64,
    ) -> OscPacket {
        if !full_bundle && messages.len() == 1 {
            if let Some(message) = messages.pop() {
                return OscPacket::Message(message);
            }
        }
        OscPacket::Bundle(OscBundle {
            time_tag: time_tag_ms,
            packets: messages,
        })
    }
}
