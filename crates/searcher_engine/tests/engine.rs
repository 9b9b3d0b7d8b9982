use std::sync::Arc;
use std::time::{Duration, Instant};

use searcher_engine::{
    CancellationToken, EngineEvent, EngineEvents, EngineHandle, EventSink, EventStreamer,
    FailureKind, SseFrame, StreamEnd, StreamError, StreamId,
};

/// Emits one token frame every few milliseconds. Queries starting with
/// `short` end after three frames, `broken` fails straight away.
struct TickingStreamer;

#[async_trait::async_trait]
impl EventStreamer for TickingStreamer {
    async fn stream(
        &self,
        stream_id: StreamId,
        query: &str,
        sink: &dyn EventSink,
        cancel: &CancellationToken,
    ) -> Result<StreamEnd, StreamError> {
        if query.starts_with("broken") {
            return Err(StreamError::new(FailureKind::Network, "connection refused"));
        }
        let mut sent = 0usize;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => return Ok(StreamEnd::Cancelled),
                _ = tokio::time::sleep(Duration::from_millis(5)) => {}
            }
            sink.emit(EngineEvent::Frame {
                stream_id,
                frame: SseFrame {
                    event: "token".to_string(),
                    data: format!("\"{query}{sent}\""),
                },
            });
            sent += 1;
            if query.starts_with("short") && sent == 3 {
                return Ok(StreamEnd::Eof);
            }
        }
    }
}

fn collect_for(events: &EngineEvents, window: Duration) -> Vec<EngineEvent> {
    let deadline = Instant::now() + window;
    let mut collected = Vec::new();
    while let Some(remaining) = deadline.checked_duration_since(Instant::now()) {
        match events.recv_timeout(remaining) {
            Some(event) => collected.push(event),
            None => break,
        }
    }
    collected
}

fn wait_for_first(events: &EngineEvents, stream_id: StreamId) -> EngineEvent {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if let Some(event) = events.recv_timeout(Duration::from_millis(50)) {
            if event.stream_id() == stream_id {
                return event;
            }
        }
    }
    panic!("no event for stream {stream_id}");
}

#[test]
fn opening_new_stream_silences_previous_one() {
    let (engine, events) = EngineHandle::with_streamer(Arc::new(TickingStreamer));
    engine.open(1, "first");
    wait_for_first(&events, 1);

    engine.open(2, "second");
    assert_eq!(engine.active_stream(), Some(2));
    // Anything stream 1 had in flight when it was cancelled lands here.
    let _ = collect_for(&events, Duration::from_millis(50));

    let later = collect_for(&events, Duration::from_millis(150));
    assert!(!later.is_empty());
    assert!(later.iter().all(|event| event.stream_id() == 2));
}

#[test]
fn finished_stream_reports_end() {
    let (engine, events) = EngineHandle::with_streamer(Arc::new(TickingStreamer));
    engine.open(7, "short");
    let received = collect_for(&events, Duration::from_millis(300));
    let frames = received
        .iter()
        .filter(|event| matches!(event, EngineEvent::Frame { .. }))
        .count();
    assert_eq!(frames, 3);
    assert_eq!(received.last(), Some(&EngineEvent::Ended { stream_id: 7 }));
}

#[test]
fn transport_failure_is_forwarded() {
    let (engine, events) = EngineHandle::with_streamer(Arc::new(TickingStreamer));
    engine.open(3, "broken");
    match wait_for_first(&events, 3) {
        EngineEvent::Failed { error, .. } => assert_eq!(error.kind, FailureKind::Network),
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn closed_stream_sends_no_end_event() {
    let (engine, events) = EngineHandle::with_streamer(Arc::new(TickingStreamer));
    engine.open(4, "endless");
    wait_for_first(&events, 4);
    engine.close(4);
    assert_eq!(engine.active_stream(), None);
    let _ = collect_for(&events, Duration::from_millis(50));
    assert!(collect_for(&events, Duration::from_millis(100)).is_empty());

    // Closing a stream that is no longer active leaves the open one alone.
    engine.open(5, "endless");
    engine.close(4);
    assert_eq!(engine.active_stream(), Some(5));
}
