//! WebTUIO Tracker
//!
//! Turns a stream of raw pointer events into TUIO `2Dcur` frames and hands
//! them to a transport. The pieces, leaf first:
//!
//! - **Registry:** session id allocation with wrap-around
//! - **Encoder session:** per-source counters, message builder, and framer
//! - **Router:** the per-identifier state machine and send gating
//! - **Transports:** fire-and-forget frame hand-off
//! - **Runner / replay:** the live run loop and its offline equivalent
//!
//! Everything runs on one logical thread; the run loop only interleaves
//! input events with heartbeat ticks.

pub mod encoder;
pub mod registry;
pub mod replay;
pub mod router;
pub mod sources;
pub mod transport;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use webtuio_common::clock::StreamClock;
use webtuio_common::config::AppConfig;
use webtuio_common::error::TuioResult;
use webtuio_protocol::event::PointerEvent;
use webtuio_protocol::osc::OscPacket;

use crate::router::InputRouter;
use crate::transport::{deliver, DeliveryStats, Transport};

/// Counters reported when a stream stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StreamStats {
    pub events: u64,
    #[serde(flatten)]
    pub delivery: DeliveryStats,
}

/// Live run loop: pointer events and heartbeat ticks in, frames out.
pub struct StreamRunner {
    router: InputRouter,
    transport: Box<dyn Transport>,
    clock: StreamClock,
    tick_interval: Duration,
    stop_flag: Arc<AtomicBool>,
    stats: StreamStats,
}

impl StreamRunner {
    pub fn new(config: &AppConfig, transport: Box<dyn Transport>) -> Self {
        Self {
            router: InputRouter::new(config),
            transport,
            clock: StreamClock::start(),
            tick_interval: Duration::from_millis(config.timing.tick_interval_ms.max(1)),
            stop_flag: Arc::new(AtomicBool::new(false)),
            stats: StreamStats::default(),
        }
    }

    /// Run until the event channel closes or the stop flag is set.
    ///
    /// On exit every remaining cursor is released and a final frame with
    /// an empty alive set is sent.
    pub async fn run(
        &mut self,
        mut events: mpsc::Receiver<PointerEvent>,
    ) -> TuioResult<StreamStats> {
        tracing::info!(
            transport = self.transport.name(),
            tick_ms = self.tick_interval.as_millis() as u64,
            epoch = %self.clock.epoch_wall(),
            "Stream started"
        );

        let mut ticker = tokio::time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        while !self.stop_flag.load(Ordering::Relaxed) {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => {
                        self.stats.events += 1;
                        let now = self.clock.elapsed_ns();
                        if let Some(packet) = self.router.handle(&event, now) {
                            self.send(&packet);
                        }
                    }
                    None => break,
                },
                _ = ticker.tick() => {
                    let now = self.clock.elapsed_ns();
                    if let Some(packet) = self.router.tick(now) {
                        self.send(&packet);
                    }
                }
            }
        }

        let packet = self.router.release_all(self.clock.elapsed_ns());
        self.send(&packet);
        self.transport.flush()?;

        tracing::info!(
            events = self.stats.events,
            frames = self.stats.delivery.frames,
            sent = self.stats.delivery.sent,
            skipped = self.stats.delivery.skipped,
            failed = self.stats.delivery.failed,
            elapsed_secs = self.clock.elapsed_secs(),
            "Stream stopped"
        );
        Ok(self.stats)
    }

    /// Set the stop flag.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::SeqCst);
    }

    /// Get the stop flag for external coordination.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    pub fn router(&self) -> &InputRouter {
        &self.router
    }

    pub fn stats(&self) -> StreamStats {
        self.stats
    }

    fn send(&mut self, packet: &OscPacket) {
        let delivery = deliver(self.transport.as_mut(), packet);
        self.stats.delivery.record(delivery);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::ChannelTransport;
    use webtuio_protocol::event::BoundingBox;
    use webtuio_protocol::osc::OscMessage;

    fn unit() -> BoundingBox {
        BoundingBox::new(0.0, 0.0, 1.0, 1.0)
    }

    #[tokio::test]
    async fn test_run_sends_frames_and_final_empty_alive() {
        let (transport, mut frames) = ChannelTransport::pair();
        let mut runner = StreamRunner::new(&AppConfig::default(), Box::new(transport));

        let (tx, rx) = mpsc::channel(16);
        tx.send(PointerEvent::start("a", 0.5, 0.5, unit())).await.unwrap();
        tx.send(PointerEvent::end("a", 0.5, 0.5, unit())).await.unwrap();
        drop(tx);

        let stats = runner.run(rx).await.unwrap();
        assert_eq!(stats.events, 2);
        assert!(stats.delivery.sent >= 3);

        let mut last = None;
        while let Ok(packet) = frames.try_recv() {
            last = Some(packet);
        }
        let last = last.unwrap();
        let commands: Vec<_> = last.messages().iter().filter_map(OscMessage::command).collect();
        assert_eq!(commands, ["source", "alive", "fseq"]);
    }

    #[tokio::test]
    async fn test_stop_flag_ends_run() {
        let (transport, _frames) = ChannelTransport::pair();
        let mut runner = StreamRunner::new(&AppConfig::default(), Box::new(transport));
        runner.stop();

        let (_tx, rx) = mpsc::channel(1);
        let stats = runner.run(rx).await.unwrap();
        assert_eq!(stats.events, 0);
        assert_eq!(stats.delivery.frames, 1);
    }

    #[tokio::test]
    async fn test_heartbeat_keeps_active_cursor_alive() {
        let (transport, mut frames) = ChannelTransport::pair();
        let mut runner = StreamRunner::new(&AppConfig::default(), Box::new(transport));
        let stop = runner.stop_flag();

        let (tx, rx) = mpsc::channel(16);
        tx.send(PointerEvent::start("a", 0.5, 0.5, unit())).await.unwrap();

        let handle = tokio::spawn(async move {
            let stats = runner.run(rx).await;
            drop(tx);
            stats
        });
        tokio::time::sleep(Duration::from_millis(200)).await;
        stop.store(true, Ordering::SeqCst);
        let stats = handle.await.unwrap().unwrap();

        // start frame + several heartbeats + final frame
        assert!(stats.delivery.frames >= 3);
        let first = frames.try_recv().unwrap();
        assert_eq!(first.messages()[1].command(), Some("set"));
    }
}
