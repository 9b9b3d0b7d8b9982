use crate::{SessionId, TransportFailure, TypeChoice};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the query input.
    InputChanged(String),
    /// User submitted the current query input.
    SearchSubmitted,
    /// User picked an entry from the search history.
    HistorySelected(String),
    /// History list read back from the persistent store.
    HistoryLoaded(Vec<String>),
    /// Named server-push event, payload still undecoded.
    StreamEvent {
        session: SessionId,
        event: String,
        data: String,
    },
    /// Transport reached end of stream.
    StreamEnded { session: SessionId },
    /// Transport failed to open or broke off.
    StreamFailed {
        session: SessionId,
        failure: TransportFailure,
    },
    /// User toggled a checkbox of the type picker.
    TypeToggled(TypeChoice),
    /// User picked a page of the result list.
    PageSelected(usize),
    /// Render tick.
    Tick,
    NoOp,
}
