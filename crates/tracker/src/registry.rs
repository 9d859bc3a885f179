//! Session id allocation.
//!
//! Ids come from a counter that wraps to 0 once it passes the ceiling.
//! Ids still held by an active cursor are skipped on the way round, so a
//! collision is only possible when every id in `0..=ceiling` is in use.

use std::collections::BTreeSet;

use webtuio_protocol::cursor::SessionId;

/// Default highest session id before wrap-around.
pub const DEFAULT_ID_CEILING: SessionId = 10_000;

/// Hands out session ids and tracks which are active.
#[derive(Debug, Clone)]
pub struct SessionRegistry {
    next: SessionId,
    ceiling: SessionId,
    active: BTreeSet<SessionId>,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_ID_CEILING)
    }
}

impl SessionRegistry {
    pub fn new(ceiling: SessionId) -> Self {
        Self {
            next: 0,
            ceiling: ceiling.max(0),
            active: BTreeSet::new(),
        }
    }

    /// Allocate the next free session id.
    pub fn acquire(&mut self) -> SessionId {
        let mut candidate = self.advance();
        let mut probes: SessionId = 0;
        while self.active.contains(&candidate) {
            if probes >= self.ceiling {
                tracing::warn!(
                    session_id = candidate,
                    active = self.active.len(),
                    "All session ids are in use; reusing an active id"
                );
                break;
            }
            probes += 1;
            candidate = self.advance();
        }
        self.active.insert(candidate);
        candidate
    }

    /// Mark an id as no longer in use. Unknown ids are ignored.
    pub fn release(&mut self, session_id: SessionId) {
        self.active.remove(&session_id);
    }

    pub fn is_active(&self, session_id: SessionId) -> bool {
        self.active.contains(&session_id)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Release every id. The counter keeps its position.
    pub fn clear(&mut self) {
        self.active.clear();
    }

    pub fn ceiling(&self) -> SessionId {
        self.ceiling
    }

    fn advance(&mut self) -> SessionId {
        let id = self.next;
        self.next = if self.next >= self.ceiling {
            0
        } else {
            self.next + 1
        };
        id
    }
}
