use std::sync::mpsc;
use std::thread;

use engine_logging::{engine_error, engine_info, engine_warn};
use searcher_core::{Effect, Msg, SessionId, TransportFailure, TransportFailureKind};
use searcher_engine::{
    EngineEvent, EngineEvents, EngineHandle, FailureKind, HistoryStore, StreamError,
    StreamSettings,
};

use super::app::LoopEvent;

pub struct EffectRunner {
    engine: EngineHandle,
    history: HistoryStore,
}

impl EffectRunner {
    pub fn new(
        settings: StreamSettings,
        history: HistoryStore,
        loop_tx: mpsc::Sender<LoopEvent>,
    ) -> Self {
        let (engine, events) = EngineHandle::new(settings);
        spawn_event_loop(events, loop_tx);
        Self { engine, history }
    }

    pub fn load_history(&self) -> Vec<String> {
        self.history.load()
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::OpenStream { session, query } => {
                    engine_info!(
                        "OpenStream session={} query_len={} query={}",
                        session,
                        query.len(),
                        query
                    );
                    self.engine.open(session.0, query);
                }
                Effect::CloseStream { session } => {
                    self.engine.close(session.0);
                }
                Effect::PersistHistory(entries) => {
                    if let Err(err) = self.history.save(&entries) {
                        engine_error!("Failed to save search history: {}", err);
                    }
                }
            }
        }
    }
}

fn spawn_event_loop(events: EngineEvents, loop_tx: mpsc::Sender<LoopEvent>) {
    thread::spawn(move || {
        while let Some(event) = events.recv() {
            if loop_tx.send(LoopEvent::Msg(map_event(event))).is_err() {
                break;
            }
        }
    });
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Frame { stream_id, frame } => Msg::StreamEvent {
            session: SessionId(stream_id),
            event: frame.event,
            data: frame.data,
        },
        EngineEvent::Ended { stream_id } => Msg::StreamEnded {
            session: SessionId(stream_id),
        },
        EngineEvent::Failed { stream_id, error } => {
            engine_warn!("Stream {} failed: {}", stream_id, error);
            Msg::StreamFailed {
                session: SessionId(stream_id),
                failure: map_failure(error),
            }
        }
    }
}

fn map_failure(error: StreamError) -> TransportFailure {
    let kind = match error.kind {
        FailureKind::InvalidUrl => TransportFailureKind::InvalidUrl,
        FailureKind::HttpStatus(code) => TransportFailureKind::HttpStatus(code),
        FailureKind::ConnectTimeout => TransportFailureKind::ConnectTimeout,
        FailureKind::UnsupportedContentType { .. } => TransportFailureKind::UnsupportedContentType,
        FailureKind::Network => TransportFailureKind::Network,
    };
    TransportFailure::new(kind, error.message)
}
