//! Per-source encoding state.
//!
//! An [`EncoderSession`] owns both stream counters (session ids and frame
//! sequence), so independent input sources in one process each get their
//! own.

use webtuio_common::config::{EncoderConfig, SessionConfig};
use webtuio_protocol::cursor::{Cursor, SessionId};
use webtuio_protocol::framer::BundleFramer;
use webtuio_protocol::osc::OscPacket;
use webtuio_protocol::tuio::CursorMessageBuilder;

use crate::registry::SessionRegistry;

pub struct EncoderSession {
    registry: SessionRegistry,
    builder: CursorMessageBuilder,
    framer: BundleFramer,
    full_bundle: bool,
    frames_encoded: u64,
}

impl EncoderSession {
    pub fn new(encoder: &EncoderConfig, session: &SessionConfig) -> Self {
        Self {
            registry: SessionRegistry::new(session.id_ceiling),
            builder: CursorMessageBuilder::new(encoder.source_name.clone()),
            framer: BundleFramer::new(),
            full_bundle: encoder.full_bundle,
            frames_encoded: 0,
        }
    }

    pub fn acquire(&mut self) -> SessionId {
        self.registry.acquire()
    }

    pub fn release(&mut self, session_id: SessionId) {
        self.registry.release(session_id);
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn builder(&self) -> &CursorMessageBuilder {
        &self.builder
    }

    /// Build and frame one snapshot of `cursors`, stamped with the wall clock.
    pub fn encode_frame<'a, I>(&mut self, cursors: I) -> OscPacket
    where
        I: IntoIterator<Item = &'a Cursor>,
    {
        let messages = self.builder.frame(cursors);
        self.frames_encoded += 1;
        self.framer.encode(messages, self.full_bundle)
    }

    /// Like [`encode_frame`](Self::encode_frame) with an explicit time tag.
    pub fn encode_frame_at<'a, I>(&mut self, cursors: I, time_tag_ms: i64) -> OscPacket
    where
        I: IntoIterator<Item = &'a Cursor>,
    {
        let messages = self.builder.frame(cursors);
        self.frames_encoded += 1;
        self.framer.encode_at(messages, self.full_bundle, time_tag_ms)
    }

    pub fn frames_encoded(&self) -> u64 {
        self.frames_encoded
    }
}
