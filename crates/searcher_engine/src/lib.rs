//! Searcher engine: event-stream transport and persistent storage.
mod engine;
mod history;
mod persist;
mod sse;
mod stream;
mod types;

pub use engine::{EngineEvents, EngineHandle};
pub use history::{HistoryStore, HISTORY_KEY};
pub use persist::{ensure_store_dir, JsonFileStore, PersistError};
pub use sse::{SseDecoder, SseFrame};
pub use stream::{
    ChannelEventSink, EventSink, EventStreamer, ReqwestStreamer, StreamSettings,
    EVENT_STREAM_CONTENT_TYPE,
};
pub use tokio_util::sync::CancellationToken;
pub use types::{EngineEvent, FailureKind, StreamEnd, StreamError, StreamId};
