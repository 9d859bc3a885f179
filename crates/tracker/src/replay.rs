//! Offline replay of recorded pointer events.
//!
//! Replay feeds timestamped events through an [`InputRouter`] in order and
//! synthesizes heartbeat ticks on the tick cadence between them, so the
//! output matches what the live loop would send at those instants.

use serde::Serialize;
use webtuio_common::error::TuioResult;
use webtuio_protocol::event::TimedPointerEvent;

use crate::router::InputRouter;
use crate::transport::{deliver, DeliveryStats, Transport};

/// Counters for one replay run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReplaySummary {
    pub events: u64,
    pub heartbeats: u64,
    #[serde(flatten)]
    pub delivery: DeliveryStats,
}

/// Replay `events` through `router`, sending frames to `transport`.
///
/// After the last event every remaining cursor is released with a final
/// frame.
pub fn replay(
    router: &mut InputRouter,
    events: &[TimedPointerEvent],
    tick_interval_ns: u64,
    transport: &mut dyn Transport,
) -> TuioResult<ReplaySummary> {
    let mut summary = ReplaySummary::default();
    let interval = tick_interval_ns.max(1);
    let Some(first) = events.first() else {
        return Ok(summary);
    };

    let mut next_tick = first.timestamp_ns.saturating_add(interval);
    let mut last_ns = first.timestamp_ns;

    for timed in events {
        let now = timed.timestamp_ns.max(last_ns);
        while next_tick <= now {
            if router.active_count() == 0 {
                // nothing to keep alive: jump to the first tick after `now`
                let missed = (now - next_tick) / interval + 1;
                next_tick = next_tick.saturating_add(missed.saturating_mul(interval));
                break;
            }
            if let Some(packet) = router.tick(next_tick) {
                summary.heartbeats += 1;
                summary.delivery.record(deliver(transport, &packet));
            }
            next_tick = next_tick.saturating_add(interval);
        }

        summary.events += 1;
        if let Some(packet) = router.handle(&timed.event, now) {
            summary.delivery.record(deliver(transport, &packet));
        }
        last_ns = now;
    }

    let packet = router.release_all(last_ns);
    summary.delivery.record(deliver(transport, &packet));
    transport.flush()?;

    tracing::info!(
        events = summary.events,
        frames = summary.delivery.frames,
        heartbeats = summary.heartbeats,
        "Replay finished"
    );
    Ok(summary)
}
