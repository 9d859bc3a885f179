//! Pointer event types delivered by the input-capture layer.
//!
//! The capture layer reports raw device coordinates together with the
//! bounding box of the touch surface; normalization to `[0.0, 1.0]` happens
//! here so the router only ever sees normalized positions. Recorded event
//! streams use the same append-only JSONL layout as frame output.

use serde::{Deserialize, Serialize};

/// Monotonic timestamp in nanoseconds since stream start.
pub type TimestampNs = u64;

/// Identifier used by the capture layer for mouse input.
pub const MOUSE_POINTER_ID: &str = "mouse";

/// Contact lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerPhase {
    /// A new contact touched down.
    Start,
    /// An existing contact moved.
    Move,
    /// The contact lifted.
    End,
    /// The platform aborted the contact.
    Cancel,
}

/// Bounding box of the touch surface in device coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Whether the box has a usable, finite, positive area.
    pub fn is_valid(&self) -> bool {
        self.left.is_finite()
            && self.top.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }

    /// Normalize a device-space point into `[0.0, 1.0]`, clamping points
    /// outside the box to its edges.
    ///
    /// Returns `None` for a degenerate box or non-finite coordinates.
    pub fn normalize(&self, raw_x: f64, raw_y: f64) -> Option<(f64, f64)> {
        if !self.is_valid() || !raw_x.is_finite() || !raw_y.is_finite() {
            return None;
        }
        let x = ((raw_x - self.left) / self.width).clamp(0.0, 1.0);
        let y = ((raw_y - self.top) / self.height).clamp(0.0, 1.0);
        Some((x, y))
    }
}

/// A single raw pointer event from the capture layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub phase: PointerPhase,

    /// Capture-layer identifier (touch identifier or [`MOUSE_POINTER_ID`]).
    pub id: String,

    /// Raw device X coordinate.
    pub x: f64,

    /// Raw device Y coordinate.
    pub y: f64,

    /// Surface the coordinates are relative to.
    pub bounds: BoundingBox,
}

impl PointerEvent {
    pub fn new(
        phase: PointerPhase,
        id: impl Into<String>,
        x: f64,
        y: f64,
        bounds: BoundingBox,
    ) -> Self {
        Self {
            phase,
            id: id.into(),
            x,
            y,
            bounds,
        }
    }

    pub fn start(id: impl Into<String>, x: f64, y: f64, bounds: BoundingBox) -> Self {
        Self::new(PointerPhase::Start, id, x, y, bounds)
    }

    pub fn moved(id: impl Into<String>, x: f64, y: f64, bounds: BoundingBox) -> Self {
        Self::new(PointerPhase::Move, id, x, y, bounds)
    }

    pub fn end(id: impl Into<String>, x: f64, y: f64, bounds: BoundingBox) -> Self {
        Self::new(PointerPhase::End, id, x, y, bounds)
    }

    pub fn cancel(id: impl Into<String>, bounds: BoundingBox) -> Self {
        Self::new(PointerPhase::Cancel, id, 0.0, 0.0, bounds)
    }

    /// Normalized position of this event, if the bounds allow one.
    pub fn normalized(&self) -> Option<(f64, f64)> {
        self.bounds.normalize(self.x, self.y)
    }
}

/// A pointer event stamped with its arrival time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedPointerEvent {
    /// Monotonic nanoseconds since stream start.
    #[serde(rename = "t")]
    pub timestamp_ns: TimestampNs,

    #[serde(flatten)]
    pub event: PointerEvent,
}

impl TimedPointerEvent {
    pub fn new(timestamp_ns: TimestampNs, event: PointerEvent) -> Self {
        Self {
            timestamp_ns,
            event,
        }
    }
}

/// Parse events from JSONL content (one JSON object per line).
///
/// Blank lines and lines starting with `#` are skipped.
pub fn parse_events(jsonl: &str) -> Result<Vec<TimedPointerEvent>, serde_json::Error> {
    jsonl
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(serde_json::from_str)
        .collect()
}

/// Serialize events to JSONL format.
pub fn serialize_events(events: &[TimedPointerEvent]) -> Result<String, serde_json::Error> {
    let mut output = String::new();
    for event in events {
        output.push_str(&serde_json::to_string(event)?);
        output.push('\n');
    }
    Ok(output)
}
