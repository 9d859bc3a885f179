//! Replay recorded pointer events into TUIO frames.

use std::path::PathBuf;

use webtuio_common::clock::StreamClock;
use webtuio_common::config::AppConfig;
use webtuio_protocol::event::parse_events;
use webtuio_tracker::replay::replay;
use webtuio_tracker::router::InputRouter;
use webtuio_tracker::transport::{JsonLinesTransport, Transport};

pub fn run(config: &AppConfig, path: PathBuf, output: Option<PathBuf>) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(&path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?;
    let events = parse_events(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse events in {}: {e}", path.display()))?;

    tracing::info!(
        path = %path.display(),
        events = events.len(),
        "Replaying pointer events"
    );

    let mut transport: Box<dyn Transport> = match &output {
        Some(out) => Box::new(JsonLinesTransport::create(out)?),
        None => Box::new(JsonLinesTransport::new(std::io::stdout())),
    };

    let mut router = InputRouter::new(config);
    let tick_ns = StreamClock::ms_to_ns(config.timing.tick_interval_ms);
    let summary = replay(&mut router, &events, tick_ns, transport.as_mut())?;

    eprintln!("{}", serde_json::to_string(&summary)?);
    if let Some(out) = output {
        eprintln!("Frames written to {}", out.display());
    }
    Ok(())
}
