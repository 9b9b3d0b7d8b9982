use engine_logging::{engine_debug, engine_info, engine_warn};

use crate::error::{validate_query, TransportFailure, TransportFailureKind};
use crate::history::{record_query, sanitize_history};
use crate::protocol::{decode_event, StreamEvent};
use crate::{AppState, Effect, Msg, SessionId};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::InputChanged(text) => {
            state.set_input(text);
            Vec::new()
        }
        Msg::SearchSubmitted => {
            let raw = state.input().to_string();
            submit(&mut state, &raw)
        }
        Msg::HistorySelected(query) => {
            state.set_input(query.clone());
            submit(&mut state, &query)
        }
        Msg::HistoryLoaded(entries) => {
            state.set_history(sanitize_history(entries));
            Vec::new()
        }
        Msg::StreamEvent {
            session,
            event,
            data,
        } => apply_event(&mut state, session, &event, &data),
        Msg::StreamEnded { session } => {
            let failure = TransportFailure::new(
                TransportFailureKind::ClosedBeforeDone,
                "event stream ended without a done event",
            );
            apply_failure(&mut state, session, &failure)
        }
        Msg::StreamFailed { session, failure } => apply_failure(&mut state, session, &failure),
        Msg::TypeToggled(choice) => {
            state.toggle_type(choice);
            Vec::new()
        }
        Msg::PageSelected(page) => {
            state.select_page(page);
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn submit(state: &mut AppState, raw: &str) -> Vec<Effect> {
    let query = match validate_query(raw) {
        Ok(query) => query.to_string(),
        Err(err) => {
            engine_debug!("Search rejected: {}", err);
            return Vec::new();
        }
    };

    let mut effects = Vec::with_capacity(3);
    if let Some(previous) = state.session() {
        if state.phase().is_open() {
            engine_info!("Superseding session {}", previous);
            effects.push(Effect::CloseStream { session: previous });
        }
    }

    let session = state.start_session(&query);
    engine_info!("Session {} started query_len={}", session, query.len());
    let history = record_query(state.history(), &query);
    state.set_history(history.clone());

    effects.push(Effect::OpenStream { session, query });
    effects.push(Effect::PersistHistory(history));
    effects
}

fn apply_event(state: &mut AppState, session: SessionId, name: &str, data: &str) -> Vec<Effect> {
    if !state.accepts(session) {
        engine_debug!("Dropping `{}` event from stale session {}", name, session);
        return Vec::new();
    }
    state.mark_streaming();

    match decode_event(name, data) {
        Ok(StreamEvent::Results(records)) => {
            let received = records.len();
            let kept = state.apply_results(records);
            engine_info!(
                "Session {} results received={} kept={}",
                session,
                received,
                kept
            );
            Vec::new()
        }
        Ok(StreamEvent::Token(fragment)) => {
            state.apply_token(&fragment);
            Vec::new()
        }
        Ok(StreamEvent::Done) => {
            state.finish();
            engine_info!(
                "Session {} done fragments={} answer_len={}",
                session,
                state.answer_fragments(),
                state.answer().len()
            );
            vec![Effect::CloseStream { session }]
        }
        Ok(StreamEvent::Other(other)) => {
            engine_debug!("Ignoring unknown event `{}` in session {}", other, session);
            Vec::new()
        }
        Err(err) => {
            engine_warn!("Session {}: {}", session, err);
            state.note_malformed();
            Vec::new()
        }
    }
}

fn apply_failure(
    state: &mut AppState,
    session: SessionId,
    failure: &TransportFailure,
) -> Vec<Effect> {
    if !state.accepts(session) {
        engine_debug!("Ignoring failure of stale session {}: {}", session, failure);
        return Vec::new();
    }
    if state.fail(failure) {
        engine_warn!(
            "Session {} interrupted after partial answer: {}",
            session,
            failure
        );
    } else {
        engine_warn!("Session {} failed: {}", session, failure);
    }
    vec![Effect::CloseStream { session }]
}
