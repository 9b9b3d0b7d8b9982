use crate::SessionId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Open the event stream for `query`, closing any other stream first.
    OpenStream { session: SessionId, query: String },
    CloseStream { session: SessionId },
    /// Replace the stored history list.
    PersistHistory(Vec<String>),
}
