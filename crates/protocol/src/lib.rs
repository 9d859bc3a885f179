//! WebTUIO Protocol
//!
//! Defines the data contracts and encoders of the cursor stream:
//! - **Events:** Raw pointer events (start, move, end, cancel) from a capture layer
//! - **Cursors:** Per-contact state with finite-difference kinematics
//! - **TUIO:** The `/tuio/2Dcur` source, set, alive, and fseq messages
//! - **OSC:** Structured message/bundle records and the binary OSC 1.0 codec
//!
//! Cursor positions are normalized to `[0.0, 1.0]` relative to the capture
//! surface and stay normalized on the wire.

pub mod cursor;
pub mod event;
pub mod framer;
pub mod osc;
pub mod physics;
pub mod tuio;
pub mod wire;

pub use cursor::*;
pub use event::*;
pub use framer::*;
pub use osc::*;
pub use physics::*;
pub use tuio::*;
