//! Searcher core: pure session state machine, result reducer and view-model helpers.
mod answer;
mod dedup;
mod document;
mod effect;
mod error;
mod filter;
mod history;
mod msg;
mod protocol;
mod state;
mod update;
mod view_model;

pub use answer::AnswerBuffer;
pub use dedup::{dedup_key, normalize_url, reduce};
pub use document::{
    classify_type, display_keywords, display_title, download_target, preview_target, score_label,
    CanonicalDocument, DocType, DocumentRecord, DownloadTarget, PreviewTarget,
    KEYWORD_DISPLAY_LIMIT,
};
pub use effect::Effect;
pub use error::{validate_query, SearchError, TransportFailure, TransportFailureKind};
pub use filter::{TypeChoice, TypeFilter, TypeSelection};
pub use history::{record_query, sanitize_history, HISTORY_LIMIT};
pub use msg::Msg;
pub use protocol::{decode_event, StreamEvent, EVENT_DONE, EVENT_RESULTS, EVENT_TOKEN};
pub use state::{AppState, SessionId, SessionPhase};
pub use update::update;
pub use view_model::{derive, pager, AppViewModel, PageView, PagerItem, PAGE_SIZE};
