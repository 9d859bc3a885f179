//! Frame hand-off to the transport collaborator.
//!
//! Sending is fire-and-forget: a transport that is not ready simply misses
//! the frame, and a failed send is logged and counted. Neither touches
//! cursor state, and the next frame restates everything.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use tokio::sync::mpsc;
use webtuio_common::error::{TuioError, TuioResult};
use webtuio_protocol::osc::OscPacket;

/// Destination for encoded frames.
pub trait Transport: Send {
    /// Transport name for logging.
    fn name(&self) -> &str;

    /// Whether a frame can be handed over right now.
    fn is_ready(&self) -> bool;

    /// Hand one packet over.
    fn send(&mut self, packet: &OscPacket) -> TuioResult<()>;

    /// Flush anything buffered.
    fn flush(&mut self) -> TuioResult<()> {
        Ok(())
    }
}

/// Outcome of one hand-off attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    NotReady,
    Failed,
}

/// Frame counters for a stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeliveryStats {
    pub frames: u64,
    pub sent: u64,
    pub skipped: u64,
    pub failed: u64,
}

impl DeliveryStats {
    pub fn record(&mut self, delivery: Delivery) {
        self.frames += 1;
        match delivery {
            Delivery::Sent => self.sent += 1,
            Delivery::NotReady => self.skipped += 1,
            Delivery::Failed => self.failed += 1,
        }
    }
}

/// Offer `packet` to `transport` without propagating failures.
pub fn deliver(transport: &mut dyn Transport, packet: &OscPacket) -> Delivery {
    if !transport.is_ready() {
        tracing::debug!(transport = transport.name(), "Transport not ready, frame skipped");
        return Delivery::NotReady;
    }
    match transport.send(packet) {
        Ok(()) => Delivery::Sent,
        Err(e) => {
            tracing::warn!(transport = transport.name(), error = %e, "Frame send failed");
            Delivery::Failed
        }
    }
}

/// Writes each packet as one JSON line.
pub struct JsonLinesTransport<W: Write + Send> {
    writer: BufWriter<W>,
    line_buffered: bool,
    frames_written: u64,
}

impl<W: Write + Send> JsonLinesTransport<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
            line_buffered: false,
            frames_written: 0,
        }
    }

    /// Flush after every frame, for live consumers reading a pipe.
    pub fn line_buffered(mut self) -> Self {
        self.line_buffered = true;
        self
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }
}

impl JsonLinesTransport<File> {
    /// Create (or truncate) a file and write frames to it.
    pub fn create(path: &Path) -> TuioResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        Ok(Self::new(file))
    }
}

impl<W: Write + Send> Transport for JsonLinesTransport<W> {
    fn name(&self) -> &str {
        "jsonl"
    }

    fn is_ready(&self) -> bool {
        true
    }

    fn send(&mut self, packet: &OscPacket) -> TuioResult<()> {
        let json = serde_json::to_string(packet)?;
        writeln!(self.writer, "{json}")
            .map_err(|e| TuioError::transport(format!("Failed to write frame: {e}")))?;
        self.frames_written += 1;

        if self.line_buffered || self.frames_written % 1000 == 0 {
            self.flush()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> TuioResult<()> {
        self.writer
            .flush()
            .map_err(|e| TuioError::transport(format!("Failed to flush frames: {e}")))
    }
}

impl<W: Write + Send> Drop for JsonLinesTransport<W> {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

/// Forwards packets to an in-process receiver.
///
/// Ready for as long as the receiving half is alive.
pub struct ChannelTransport {
    tx: mpsc::UnboundedSender<OscPacket>,
}

impl ChannelTransport {
    pub fn new(tx: mpsc::UnboundedSender<OscPacket>) -> Self {
        Self { tx }
    }

    /// Create a transport together with its receiving half.
    pub fn pair() -> (Self, mpsc::UnboundedReceiver<OscPacket>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl Transport for ChannelTransport {
    fn name(&self) -> &str {
        "channel"
    }

    fn is_ready(&self) -> bool {
        !self.tx.is_closed()
    }

    fn send(&mut self, packet: &OscPacket) -> TuioResult<()> {
        self.tx
            .send(packet.clone())
            .map_err(|_| TuioError::transport("receiver dropped"))
    }
}

/// Collects packets in memory. Can be toggled unready to model a transport
/// that has not connected yet.
#[derive(Debug)]
pub struct MemoryTransport {
    pub packets: Vec<OscPacket>,
    ready: bool,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self {
            packets: Vec::new(),
            ready: true,
        }
    }

    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for MemoryTransport {
    fn name(&self) -> &str {
        "memory"
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    fn send(&mut self, packet: &OscPacket) -> TuioResult<()> {
        self.packets.push(packet.clone());
        Ok(())
    }
}
