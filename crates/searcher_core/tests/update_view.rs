use pretty_assertions::assert_eq;
use searcher_core::{
    update, AppState, DocType, Msg, PagerItem, SessionId, TypeChoice, TypeFilter, PAGE_SIZE,
};

fn init_logging() {
    engine_logging::initialize_for_tests();
}

fn results_json(specs: &[(&str, usize)]) -> String {
    let mut records = Vec::new();
    let mut score = 100.0;
    for (ext, count) in specs {
        for i in 0..*count {
            records.push(serde_json::json!({
                "title": format!("{ext} {i}"),
                "url": format!("http://files.example.edu/{ext}/{i}.{ext}"),
                "score": score,
            }));
            score -= 1.0;
        }
    }
    serde_json::Value::Array(records).to_string()
}

fn with_results(specs: &[(&str, usize)]) -> AppState {
    let (state, _) = update(AppState::new(), Msg::InputChanged("q".to_string()));
    let (state, _) = update(state, Msg::SearchSubmitted);
    let (state, _) = update(
        state,
        Msg::StreamEvent {
            session: SessionId(1),
            event: "results".to_string(),
            data: results_json(specs),
        },
    );
    state
}

#[test]
fn pdf_filter_counts_three_of_five() {
    init_logging();
    let state = with_results(&[("pdf", 3), ("docx", 2)]);
    let (state, _) = update(state, Msg::TypeToggled(TypeChoice::Type(DocType::Pdf)));

    let view = state.view();
    assert_eq!(view.filter, TypeFilter::only([DocType::Pdf]));
    assert_eq!(view.page.filtered_count, 3);
    assert_eq!(view.page.total_count, 5);
    assert_eq!(view.page.total_pages, 1);
}

#[test]
fn paging_slices_ranked_list() {
    init_logging();
    let state = with_results(&[("pdf", 25)]);
    let (state, _) = update(state, Msg::PageSelected(3));

    let view = state.view();
    assert_eq!(view.page.total_pages, 3);
    assert_eq!(view.page.items.len(), 5);
    assert_eq!(view.page.items[0].record.title.as_deref(), Some("pdf 20"));
    assert!(view.pager.contains(&PagerItem::Page {
        number: 3,
        current: true
    }));
}

#[test]
fn changing_filter_resets_page() {
    init_logging();
    let state = with_results(&[("pdf", 15), ("zip", 15)]);
    let (state, _) = update(state, Msg::PageSelected(3));
    assert_eq!(state.view().page.items.len(), PAGE_SIZE);

    let (state, _) = update(state, Msg::TypeToggled(TypeChoice::Type(DocType::Zip)));
    let view = state.view();
    assert_eq!(view.page.page, 1);
    assert_eq!(view.page.filtered_count, 15);
    assert!(view.page.items.iter().all(|doc| doc.doc_type == DocType::Zip));
}

#[test]
fn out_of_range_page_is_empty_not_an_error() {
    init_logging();
    let state = with_results(&[("pdf", 4)]);
    let (state, effects) = update(state, Msg::PageSelected(9));
    assert!(effects.is_empty());
    let view = state.view();
    assert!(view.page.items.is_empty());
    assert_eq!(view.page.total_pages, 1);
}

#[test]
fn all_toggle_round_trip_restores_selection() {
    init_logging();
    let state = with_results(&[("pdf", 2), ("csv", 2)]);
    let (state, _) = update(state, Msg::TypeToggled(TypeChoice::All));
    let before = state.view().selection;
    assert!(before.is_all_checked());

    let (state, _) = update(state, Msg::TypeToggled(TypeChoice::All));
    let (state, _) = update(state, Msg::TypeToggled(TypeChoice::All));
    let view = state.view();
    assert_eq!(view.selection, before);
    assert_eq!(view.page.filtered_count, 4);
}

#[test]
fn new_results_batch_replaces_previous_list() {
    init_logging();
    let state = with_results(&[("pdf", 12)]);
    let (state, _) = update(state, Msg::PageSelected(2));
    let (state, _) = update(
        state,
        Msg::StreamEvent {
            session: SessionId(1),
            event: "results".to_string(),
            data: results_json(&[("pptx", 1)]),
        },
    );
    let view = state.view();
    assert_eq!(view.page.page, 1);
    assert_eq!(view.page.total_count, 1);
    assert_eq!(view.page.items[0].doc_type, DocType::Ppt);
}
