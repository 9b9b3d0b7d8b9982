use std::time::Duration;

use engine_logging::engine_debug;
use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tokio_util::sync::CancellationToken;

use crate::sse::SseDecoder;
use crate::{EngineEvent, FailureKind, StreamEnd, StreamError, StreamId};

pub const EVENT_STREAM_CONTENT_TYPE: &str = "text/event-stream";

#[derive(Debug, Clone)]
pub struct StreamSettings {
    /// Search endpoint; the query is appended as `q`.
    pub endpoint: String,
    pub connect_timeout: Duration,
    pub allowed_content_types: Vec<String>,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:5000/api/search".to_string(),
            connect_timeout: Duration::from_secs(10),
            allowed_content_types: vec![EVENT_STREAM_CONTENT_TYPE.to_string()],
        }
    }
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

/// Forwards events over a channel until its stream is cancelled.
pub struct ChannelEventSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
    cancel: CancellationToken,
}

impl ChannelEventSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>, cancel: CancellationToken) -> Self {
        Self { tx, cancel }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        if self.cancel.is_cancelled() {
            return;
        }
        let _ = self.tx.send(event);
    }
}

#[async_trait::async_trait]
pub trait EventStreamer: Send + Sync {
    /// Opens the stream for `query` and forwards every frame to `sink`
    /// until the server closes it or `cancel` fires.
    async fn stream(
        &self,
        stream_id: StreamId,
        query: &str,
        sink: &dyn EventSink,
        cancel: &CancellationToken,
    ) -> Result<StreamEnd, StreamError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestStreamer {
    settings: StreamSettings,
}

impl ReqwestStreamer {
    pub fn new(settings: StreamSettings) -> Self {
        Self { settings }
    }

    pub fn request_url(&self, query: &str) -> Result<reqwest::Url, StreamError> {
        let mut url = reqwest::Url::parse(&self.settings.endpoint)
            .map_err(|err| StreamError::new(FailureKind::InvalidUrl, err.to_string()))?;
        url.query_pairs_mut().append_pair("q", query);
        Ok(url)
    }

    fn build_client(&self) -> Result<reqwest::Client, StreamError> {
        // No overall request timeout: answers stream for as long as the model talks.
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .build()
            .map_err(|err| StreamError::new(FailureKind::Network, err.to_string()))
    }

    fn is_content_type_allowed(&self, content_type: &str) -> bool {
        let ct = content_type.split(';').next().unwrap_or(content_type).trim();
        self.settings
            .allowed_content_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ct))
    }
}

#[async_trait::async_trait]
impl EventStreamer for ReqwestStreamer {
    async fn stream(
        &self,
        stream_id: StreamId,
        query: &str,
        sink: &dyn EventSink,
        cancel: &CancellationToken,
    ) -> Result<StreamEnd, StreamError> {
        let url = self.request_url(query)?;
        let client = self.build_client()?;

        let request = client
            .get(url)
            .header(ACCEPT, EVENT_STREAM_CONTENT_TYPE)
            .send();
        let response = tokio::select! {
            _ = cancel.cancelled() => return Ok(StreamEnd::Cancelled),
            response = request => response.map_err(map_reqwest_error)?,
        };

        let status = response.status();
        if !status.is_success() {
            return Err(StreamError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());
        if let Some(ct) = content_type.as_deref() {
            if !self.is_content_type_allowed(ct) {
                return Err(StreamError::new(
                    FailureKind::UnsupportedContentType {
                        content_type: ct.to_string(),
                    },
                    "response is not an event stream",
                ));
            }
        }

        let mut decoder = SseDecoder::new();
        let mut body = response.bytes_stream();
        loop {
            let chunk = tokio::select! {
                _ = cancel.cancelled() => return Ok(StreamEnd::Cancelled),
                chunk = body.next() => chunk,
            };
            match chunk {
                Some(Ok(bytes)) => {
                    for frame in decoder.push(&bytes) {
                        sink.emit(EngineEvent::Frame { stream_id, frame });
                    }
                }
                Some(Err(err)) => return Err(map_reqwest_error(err)),
                None => break,
            }
        }

        if decoder.has_pending() {
            engine_debug!("Stream {} ended inside a frame; discarding it", stream_id);
        }
        Ok(StreamEnd::Eof)
    }
}

fn map_reqwest_error(err: reqwest::Error) -> StreamError {
    if err.is_timeout() {
        return StreamError::new(FailureKind::ConnectTimeout, err.to_string());
    }
    StreamError::new(FailureKind::Network, err.to_string())
}
