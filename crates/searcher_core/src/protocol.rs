use engine_logging::engine_warn;

use crate::document::DocumentRecord;
use crate::error::SearchError;

pub const EVENT_RESULTS: &str = "results";
pub const EVENT_TOKEN: &str = "token";
pub const EVENT_DONE: &str = "done";

/// A named server-push event with its payload decoded.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Results(Vec<DocumentRecord>),
    Token(String),
    Done,
    /// Event name this client does not handle.
    Other(String),
}

pub fn decode_event(name: &str, data: &str) -> Result<StreamEvent, SearchError> {
    match name {
        EVENT_RESULTS => {
            if data.trim().is_empty() {
                return Ok(StreamEvent::Results(Vec::new()));
            }
            let items: Vec<serde_json::Value> =
                serde_json::from_str(data).map_err(|err| malformed(name, err))?;
            Ok(StreamEvent::Results(decode_records(items)))
        }
        EVENT_TOKEN => serde_json::from_str::<String>(data)
            .map(StreamEvent::Token)
            .map_err(|err| malformed(name, err)),
        EVENT_DONE => Ok(StreamEvent::Done),
        other => Ok(StreamEvent::Other(other.to_string())),
    }
}

/// Decodes each item on its own; an item that is not a record is skipped.
fn decode_records(items: Vec<serde_json::Value>) -> Vec<DocumentRecord> {
    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value(item) {
            Ok(record) => records.push(record),
            Err(err) => engine_warn!("Skipping results item {}: {}", index, err),
        }
    }
    records
}

fn malformed(event: &str, err: serde_json::Error) -> SearchError {
    SearchError::MalformedEvent {
        event: event.to_string(),
        reason: err.to_string(),
    }
}
