use std::fmt;

use crate::answer::AnswerBuffer;
use crate::dedup::reduce;
use crate::document::{CanonicalDocument, DocumentRecord};
use crate::error::TransportFailure;
use crate::filter::{TypeChoice, TypeSelection};
use crate::view_model::{derive, pager, AppViewModel};

/// Generation number of a search session; every submission gets a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Idle,
    Connecting,
    Streaming,
    Done,
    Errored,
}

impl SessionPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionPhase::Done | SessionPhase::Errored)
    }

    /// A transport handle is open in this phase.
    pub fn is_open(self) -> bool {
        matches!(self, SessionPhase::Connecting | SessionPhase::Streaming)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    input: String,
    last_session: u64,
    session: Option<SessionId>,
    phase: SessionPhase,
    query: String,
    ranked: Vec<CanonicalDocument>,
    results_ready: bool,
    results_generation: u64,
    answer: AnswerBuffer,
    selection: TypeSelection,
    page: usize,
    failure: Option<String>,
    degraded: bool,
    history: Vec<String>,
    malformed_dropped: usize,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            input: String::new(),
            last_session: 0,
            session: None,
            phase: SessionPhase::Idle,
            query: String::new(),
            ranked: Vec::new(),
            results_ready: false,
            results_generation: 0,
            answer: AnswerBuffer::new(),
            selection: TypeSelection::new(),
            page: 1,
            failure: None,
            degraded: false,
            history: Vec::new(),
            malformed_dropped: 0,
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        let filter = self.selection.effective();
        let page = derive(&self.ranked, &filter, self.page);
        let pager = pager(page.total_pages, self.page);
        AppViewModel {
            session: self.session,
            phase: self.phase,
            query: self.query.clone(),
            input: self.input.clone(),
            page,
            pager,
            selection: self.selection.clone(),
            filter,
            results_ready: self.results_ready,
            results_generation: self.results_generation,
            answer: self.answer.snapshot(),
            answer_fragments: self.answer.fragment_count(),
            failure: self.failure.clone(),
            degraded: self.degraded,
            search_enabled: !self.phase.is_open(),
            history: self.history.clone(),
            malformed_dropped: self.malformed_dropped,
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn session(&self) -> Option<SessionId> {
        self.session
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn ranked(&self) -> &[CanonicalDocument] {
        &self.ranked
    }

    pub fn results_ready(&self) -> bool {
        self.results_ready
    }

    pub fn answer(&self) -> &str {
        self.answer.as_str()
    }

    pub fn answer_fragments(&self) -> usize {
        self.answer.fragment_count()
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// True when `session` is the live session and it has not terminated.
    pub fn accepts(&self, session: SessionId) -> bool {
        self.session == Some(session) && !self.phase.is_terminal()
    }

    pub(crate) fn set_input(&mut self, input: String) {
        if self.input != input {
            self.input = input;
            self.dirty = true;
        }
    }

    pub(crate) fn set_history(&mut self, history: Vec<String>) {
        self.history = history;
        self.dirty = true;
    }

    /// Replaces every per-session value and hands out the next session id.
    pub(crate) fn start_session(&mut self, query: &str) -> SessionId {
        self.last_session += 1;
        let session = SessionId(self.last_session);
        self.session = Some(session);
        self.phase = SessionPhase::Connecting;
        self.query = query.to_string();
        self.ranked.clear();
        self.results_ready = false;
        self.answer.reset();
        self.page = 1;
        self.failure = None;
        self.degraded = false;
        self.malformed_dropped = 0;
        self.dirty = true;
        session
    }

    pub(crate) fn mark_streaming(&mut self) {
        if self.phase == SessionPhase::Connecting {
            self.phase = SessionPhase::Streaming;
            self.dirty = true;
        }
    }

    pub(crate) fn apply_results(&mut self, records: Vec<DocumentRecord>) -> usize {
        self.ranked = reduce(records);
        self.results_ready = true;
        self.results_generation += 1;
        self.page = 1;
        self.dirty = true;
        self.ranked.len()
    }

    pub(crate) fn apply_token(&mut self, fragment: &str) {
        self.answer.append(fragment);
        self.dirty = true;
    }

    pub(crate) fn note_malformed(&mut self) {
        self.malformed_dropped += 1;
        self.dirty = true;
    }

    pub(crate) fn finish(&mut self) {
        self.phase = SessionPhase::Done;
        self.dirty = true;
    }

    /// Ends the session on a transport failure. Returns true when the
    /// failure is soft because part of an answer already arrived.
    pub(crate) fn fail(&mut self, failure: &TransportFailure) -> bool {
        self.phase = SessionPhase::Errored;
        self.dirty = true;
        if self.answer.is_empty() {
            self.failure = Some(format!("Connection failed: {failure}"));
            false
        } else {
            self.degraded = true;
            true
        }
    }

    pub(crate) fn toggle_type(&mut self, choice: TypeChoice) {
        self.selection.toggle(choice);
        self.page = 1;
        self.dirty = true;
    }

    pub(crate) fn select_page(&mut self, page: usize) {
        if self.page != page {
            self.page = page;
            self.dirty = true;
        }
    }
}
