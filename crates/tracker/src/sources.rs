//! Pointer event sources.
//!
//! A source stands in for the input-capture layer. Sources are blocking, so
//! [`spawn_source`] drives one on its own thread and forwards events into
//! the run loop's channel.

use std::collections::VecDeque;
use std::io::{BufRead, ErrorKind};
use std::thread::JoinHandle;

use tokio::sync::mpsc;
use webtuio_common::error::{TuioError, TuioResult};
use webtuio_protocol::event::PointerEvent;

/// Trait for pointer event sources.
pub trait PointerSource: Send {
    /// Block until the next event. `Ok(None)` means the source is finished.
    fn next_event(&mut self) -> TuioResult<Option<PointerEvent>>;

    /// Source name for logging.
    fn name(&self) -> &str;
}

/// Reads one JSON [`PointerEvent`] per line.
///
/// Blank lines and `#` comments are skipped. Lines that fail to parse,
/// including lines that are not valid UTF-8, are reported as
/// [`TuioError::Input`] and the reader moves on.
pub struct JsonLinesSource<R: BufRead + Send> {
    reader: R,
    line: String,
    line_number: u64,
}

impl<R: BufRead + Send> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            line_number: 0,
        }
    }
}

impl<R: BufRead + Send> PointerSource for JsonLinesSource<R> {
    fn next_event(&mut self) -> TuioResult<Option<PointerEvent>> {
        loop {
            self.line.clear();
            let read = match self.reader.read_line(&mut self.line) {
                Ok(read) => read,
                // the bytes up to the newline are already consumed
                Err(e) if e.kind() == ErrorKind::InvalidData => {
                    self.line_number += 1;
                    return Err(TuioError::input(format!(
                        "line {}: invalid UTF-8",
                        self.line_number
                    )));
                }
                Err(e) => return Err(e.into()),
            };
            if read == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let trimmed = self.line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            return serde_json::from_str(trimmed).map(Some).map_err(|e| {
                TuioError::input(format!("line {}: {e}", self.line_number))
            });
        }
    }

    fn name(&self) -> &str {
        "jsonl"
    }
}

/// Source with pre-loaded events, for tests and scripted input.
pub struct StubSource {
    events: VecDeque<PointerEvent>,
}

impl StubSource {
    pub fn new(events: Vec<PointerEvent>) -> Self {
        Self {
            events: events.into(),
        }
    }

    /// Create an empty stub that finishes immediately.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

impl PointerSource for StubSource {
    fn next_event(&mut self) -> TuioResult<Option<PointerEvent>> {
        Ok(self.events.pop_front())
    }

    fn name(&self) -> &str {
        "stub"
    }
}

/// Drive `source` on a dedicated thread, forwarding events into `tx`.
///
/// The thread ends when the source finishes, an I/O error occurs, or the
/// receiver is dropped. Its result is the number of events forwarded.
pub fn spawn_source(
    mut source: Box<dyn PointerSource>,
    tx: mpsc::Sender<PointerEvent>,
) -> JoinHandle<u64> {
    std::thread::spawn(move || {
        let mut forwarded = 0u64;
        loop {
            match source.next_event() {
                Ok(Some(event)) => {
                    if tx.blocking_send(event).is_err() {
                        tracing::debug!(source = source.name(), "Event receiver closed");
                        break;
                    }
                    forwarded += 1;
                }
                Ok(None) => break,
                Err(TuioError::Input { message }) => {
                    tracing::warn!(source = source.name(), %message, "Skipping malformed event");
                }
                Err(e) => {
                    tracing::error!(
                        source = source.name(),
                        error = %e,
                        "Pointer source failed"
                    );
                    break;
                }
            }
        }
        tracing::info!(source = source.name(), events = forwarded, "Pointer source finished");
        forwarded
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use webtuio_protocol::event::{BoundingBox, PointerPhase};

    #[test]
    fn test_json_lines_source() {
        let input = "# capture session\n\
            {\"phase\":\"start\",\"id\":\"1\",\"x\":5,\"y\":5,\
            \"bounds\":{\"left\":0,\"top\":0,\"width\":10,\"height\":10}}\n\
            not json\n\
            \n\
            {\"phase\":\"end\",\"id\":\"1\",\"x\":5,\"y\":5,\
            \"bounds\":{\"left\":0,\"top\":0,\"width\":10,\"height\":10}}\n";
        let mut source = JsonLinesSource::new(input.as_bytes());

        let first = source.next_event().unwrap().unwrap();
        assert_eq!(first.phase, PointerPhase::Start);
        assert_eq!(first.normalized(), Some((0.5, 0.5)));

        let err = source.next_event().unwrap_err();
        assert!(err.to_string().contains("line 3"));

        let last = source.next_event().unwrap().unwrap();
        assert_eq!(last.phase, PointerPhase::End);
        assert!(source.next_event().unwrap().is_none());
    }

    #[test]
    fn test_invalid_utf8_line_is_skipped() {
        let start = "{\"phase\":\"start\",\"id\":\"1\",\"x\":5,\"y\":5,\
            \"bounds\":{\"left\":0,\"top\":0,\"width\":10,\"height\":10}}\n";
        let end = "{\"phase\":\"end\",\"id\":\"1\",\"x\":5,\"y\":5,\
            \"bounds\":{\"left\":0,\"top\":0,\"width\":10,\"height\":10}}\n";
        let mut input = start.as_bytes().to_vec();
        input.extend_from_slice(b"\xff\xfe garbage\n");
        input.extend_from_slice(end.as_bytes());

        let mut source = JsonLinesSource::new(input.as_slice());
        assert_eq!(source.next_event().unwrap().unwrap().phase, PointerPhase::Start);
        let err = source.next_event().unwrap_err();
        assert!(matches!(err, TuioError::Input { .. }));
        assert!(err.to_string().contains("line 2"));
        assert_eq!(source.next_event().unwrap().unwrap().phase, PointerPhase::End);

        // the live path keeps going past the bad line
        let (tx, mut rx) = mpsc::channel(8);
        let source = JsonLinesSource::new(std::io::Cursor::new(input));
        let handle = spawn_source(Box::new(source), tx);
        assert_eq!(handle.join().unwrap(), 2);
        assert_eq!(rx.blocking_recv().unwrap().phase, PointerPhase::Start);
        assert_eq!(rx.blocking_recv().unwrap().phase, PointerPhase::End);
    }

    #[test]
    fn test_spawn_source_forwards_events() {
        let bounds = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        let source = StubSource::new(vec![
            PointerEvent::start("a", 0.1, 0.1, bounds),
            PointerEvent::end("a", 0.1, 0.1, bounds),
        ]);
        let (tx, mut rx) = mpsc::channel(8);
        let handle = spawn_source(Box::new(source), tx);

        assert_eq!(handle.join().unwrap(), 2);
        assert_eq!(rx.blocking_recv().unwrap().phase, PointerPhase::Start);
        assert_eq!(rx.blocking_recv().unwrap().phase, PointerPhase::End);
        assert!(rx.blocking_recv().is_none());
    }

    #[test]
    fn test_empty_stub() {
        assert!(StubSource::empty().next_event().unwrap().is_none());
    }
}
