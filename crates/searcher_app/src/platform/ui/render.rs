use std::fmt::Write as _;

use searcher_core::{
    display_keywords, display_title, download_target, preview_target, score_label,
    AppViewModel, CanonicalDocument, DownloadTarget, PagerItem, SessionId, TypeFilter,
};
use url::Url;

const SNIPPET_WIDTH: usize = 160;

/// Tracks what already reached the terminal so each render only appends
/// what changed: new answer text, a changed result page, the session outcome.
pub struct TerminalRenderer {
    origin: Url,
    session: Option<SessionId>,
    answer_printed: usize,
    results: Option<ResultsSignature>,
    outcome_printed: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct ResultsSignature {
    generation: u64,
    page: usize,
    total_count: usize,
    filtered_count: usize,
    filter: TypeFilter,
}

impl TerminalRenderer {
    pub fn new(origin: Url) -> Self {
        Self {
            origin,
            session: None,
            answer_printed: 0,
            results: None,
            outcome_printed: false,
        }
    }

    pub fn render(&mut self, view: &AppViewModel) -> String {
        let mut out = String::new();

        if view.session != self.session {
            self.session = view.session;
            self.answer_printed = 0;
            self.results = None;
            self.outcome_printed = false;
            if view.session.is_some() {
                let _ = writeln!(out, "\nSearching for \"{}\"...", view.query);
            }
        }

        if view.results_ready {
            let signature = ResultsSignature {
                generation: view.results_generation,
                page: view.page.page,
                total_count: view.page.total_count,
                filtered_count: view.page.filtered_count,
                filter: view.filter.clone(),
            };
            if self.results.as_ref() != Some(&signature) {
                out.push_str(&render_results(view, &self.origin));
                self.results = Some(signature);
            }
        }

        if view.answer.len() > self.answer_printed {
            if self.answer_printed == 0 {
                out.push_str("\nAnswer:\n");
            }
            out.push_str(&view.answer[self.answer_printed..]);
            self.answer_printed = view.answer.len();
        }

        if view.phase.is_terminal() && !self.outcome_printed {
            self.outcome_printed = true;
            out.push_str(&render_outcome(view));
        }

        out
    }
}

pub fn render_results(view: &AppViewModel, origin: &Url) -> String {
    let page = &view.page;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "\nResults: {} of {} | types: {} | page {}/{}",
        page.filtered_count,
        page.total_count,
        filter_label(&view.filter),
        page.page,
        page.total_pages
    );

    if page.items.is_empty() {
        out.push_str("  No matching documents.\n");
        return out;
    }

    let first = (page.page.saturating_sub(1)) * searcher_core::PAGE_SIZE + 1;
    for (offset, doc) in page.items.iter().enumerate() {
        out.push_str(&render_document(first + offset, doc, origin));
    }
    if page.total_pages > 1 {
        let _ = writeln!(out, "  {}", render_pager(&view.pager));
    }
    out
}

fn render_document(position: usize, doc: &CanonicalDocument, origin: &Url) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>3}. [{}] {} (score {})",
        position,
        doc.doc_type,
        display_title(doc),
        score_label(doc)
    );
    let keywords = display_keywords(doc);
    if !keywords.is_empty() {
        let _ = writeln!(out, "     tags: {}", keywords.join(", "));
    }
    if let Some(snippet) = doc.record.snippet_text().map(str::trim) {
        if !snippet.is_empty() {
            let _ = writeln!(out, "     {}", truncate(snippet, SNIPPET_WIDTH));
        }
    }
    if let Some(preview) = preview_target(doc, origin) {
        let _ = writeln!(out, "     preview:  {}", preview.as_str());
    }
    match download_target(doc, origin) {
        Some(DownloadTarget::Open(link)) => {
            let _ = writeln!(out, "     open:     {link}");
        }
        Some(DownloadTarget::Download(link)) => {
            let _ = writeln!(out, "     download: {link}");
        }
        None => {}
    }
    out
}

pub fn render_pager(items: &[PagerItem]) -> String {
    items
        .iter()
        .map(|item| match item {
            PagerItem::Previous { enabled: true, .. } => "<".to_string(),
            PagerItem::Previous { enabled: false, .. } => " ".to_string(),
            PagerItem::Page {
                number,
                current: true,
            } => format!("[{number}]"),
            PagerItem::Page { number, .. } => number.to_string(),
            PagerItem::Ellipsis => "...".to_string(),
            PagerItem::Next { enabled: true, .. } => ">".to_string(),
            PagerItem::Next { enabled: false, .. } => " ".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn render_history(history: &[String]) -> String {
    if history.is_empty() {
        return "No search history yet.\n".to_string();
    }
    let mut out = String::from("Recent searches:\n");
    for (index, query) in history.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", index + 1, query);
    }
    out
}

fn render_outcome(view: &AppViewModel) -> String {
    let mut out = String::new();
    if !view.answer.is_empty() {
        out.push('\n');
    }
    if let Some(failure) = &view.failure {
        let _ = writeln!(out, "\n!! {failure}");
    } else if view.degraded {
        out.push_str("\n(answer incomplete: the connection was lost)\n");
    }
    if view.malformed_dropped > 0 {
        let _ = writeln!(
            out,
            "({} malformed event(s) skipped)",
            view.malformed_dropped
        );
    }
    out
}

fn filter_label(filter: &TypeFilter) -> String {
    match filter {
        TypeFilter::All => "all".to_string(),
        TypeFilter::Only(types) if types.is_empty() => "none".to_string(),
        TypeFilter::Only(types) => types
            .iter()
            .map(|ty| ty.as_str())
            .collect::<Vec<_>>()
            .join(", "),
    }
}

fn truncate(text: &str, width: usize) -> String {
    let flat: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= width {
        return flat;
    }
    let mut cut: String = flat.chars().take(width).collect();
    cut.push_str("...");
    cut
}
