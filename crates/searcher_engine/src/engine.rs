use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use engine_logging::{engine_debug, engine_error, engine_info};
use tokio_util::sync::CancellationToken;

use crate::stream::{ChannelEventSink, EventStreamer, ReqwestStreamer, StreamSettings};
use crate::{EngineEvent, StreamEnd, StreamId};

enum EngineCommand {
    Open {
        stream_id: StreamId,
        query: String,
        cancel: CancellationToken,
    },
}

struct ActiveStream {
    stream_id: StreamId,
    cancel: CancellationToken,
}

/// Owns the background runtime and the single open event stream.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    active: Arc<Mutex<Option<ActiveStream>>>,
}

/// Receiving end for events of every stream the engine opened.
pub struct EngineEvents {
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineEvents {
    /// Blocks for the next event; `None` once the engine has shut down.
    pub fn recv(&self) -> Option<EngineEvent> {
        self.event_rx.recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

impl EngineHandle {
    pub fn new(settings: StreamSettings) -> (Self, EngineEvents) {
        Self::with_streamer(Arc::new(ReqwestStreamer::new(settings)))
    }

    pub fn with_streamer(streamer: Arc<dyn EventStreamer>) -> (Self, EngineEvents) {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    engine_error!("Failed to start stream runtime: {}", err);
                    return;
                }
            };
            while let Ok(command) = cmd_rx.recv() {
                let streamer = streamer.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    handle_command(streamer.as_ref(), command, event_tx).await;
                });
            }
        });

        let handle = Self {
            cmd_tx,
            active: Arc::new(Mutex::new(None)),
        };
        (handle, EngineEvents { event_rx })
    }

    /// Opens a stream for `query`. Any stream still open is cancelled
    /// before this returns, so it cannot deliver further events.
    pub fn open(&self, stream_id: StreamId, query: impl Into<String>) {
        let cancel = CancellationToken::new();
        {
            let mut active = self.lock_active();
            if let Some(previous) = active.take() {
                engine_info!(
                    "Closing stream {} superseded by {}",
                    previous.stream_id,
                    stream_id
                );
                previous.cancel.cancel();
            }
            *active = Some(ActiveStream {
                stream_id,
                cancel: cancel.clone(),
            });
        }
        let _ = self.cmd_tx.send(EngineCommand::Open {
            stream_id,
            query: query.into(),
            cancel,
        });
    }

    /// Closes `stream_id` if it is still the open stream.
    pub fn close(&self, stream_id: StreamId) {
        let mut active = self.lock_active();
        if active.as_ref().map(|a| a.stream_id) == Some(stream_id) {
            if let Some(stream) = active.take() {
                engine_debug!("Closing stream {}", stream_id);
                stream.cancel.cancel();
            }
        }
    }

    pub fn active_stream(&self) -> Option<StreamId> {
        self.lock_active().as_ref().map(|a| a.stream_id)
    }

    fn lock_active(&self) -> std::sync::MutexGuard<'_, Option<ActiveStream>> {
        // A poisoned lock still holds a valid token; keep using it.
        self.active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        if let Some(stream) = self.lock_active().take() {
            stream.cancel.cancel();
        }
    }
}

async fn handle_command(
    streamer: &dyn EventStreamer,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Open {
            stream_id,
            query,
            cancel,
        } => {
            let sink = ChannelEventSink::new(event_tx.clone(), cancel.clone());
            let result = streamer.stream(stream_id, &query, &sink, &cancel).await;
            if cancel.is_cancelled() {
                engine_debug!("Stream {} cancelled", stream_id);
                return;
            }
            let event = match result {
                Ok(StreamEnd::Eof) => EngineEvent::Ended { stream_id },
                Ok(StreamEnd::Cancelled) => return,
                Err(error) => EngineEvent::Failed { stream_id, error },
            };
            let _ = event_tx.send(event);
        }
    }
}
