use crate::document::CanonicalDocument;
use crate::filter::{TypeFilter, TypeSelection};
use crate::{SessionId, SessionPhase};

pub const PAGE_SIZE: usize = 10;

/// Filtered, paginated projection of the ranked list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageView {
    pub items: Vec<CanonicalDocument>,
    /// 1-based page the slice was taken from.
    pub page: usize,
    pub total_pages: usize,
    /// Size of the ranked list before filtering.
    pub total_count: usize,
    pub filtered_count: usize,
}

pub fn derive(ranked: &[CanonicalDocument], filter: &TypeFilter, page: usize) -> PageView {
    let filtered: Vec<&CanonicalDocument> = ranked
        .iter()
        .filter(|doc| filter.admits(doc.doc_type))
        .collect();
    let filtered_count = filtered.len();
    let total_pages = filtered_count.div_ceil(PAGE_SIZE).max(1);

    let items = if page == 0 {
        Vec::new()
    } else {
        filtered
            .into_iter()
            .skip((page - 1).saturating_mul(PAGE_SIZE))
            .take(PAGE_SIZE)
            .cloned()
            .collect()
    };

    PageView {
        items,
        page,
        total_pages,
        total_count: ranked.len(),
        filtered_count,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagerItem {
    Previous { target: usize, enabled: bool },
    Page { number: usize, current: bool },
    Ellipsis,
    Next { target: usize, enabled: bool },
}

/// Numbered pager: first, last, current and its direct neighbours are
/// shown; every other run of pages becomes a single ellipsis.
pub fn pager(total_pages: usize, page: usize) -> Vec<PagerItem> {
    let total_pages = total_pages.max(1);
    let mut items = vec![PagerItem::Previous {
        target: page.saturating_sub(1).max(1),
        enabled: page > 1,
    }];

    let mut in_gap = false;
    for number in 1..=total_pages {
        let visible = number == 1 || number == total_pages || number.abs_diff(page) <= 1;
        if visible {
            items.push(PagerItem::Page {
                number,
                current: number == page,
            });
            in_gap = false;
        } else if !in_gap {
            items.push(PagerItem::Ellipsis);
            in_gap = true;
        }
    }

    items.push(PagerItem::Next {
        target: (page + 1).min(total_pages),
        enabled: page < total_pages,
    });
    items
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub session: Option<SessionId>,
    pub phase: SessionPhase,
    /// Query of the active session.
    pub query: String,
    /// Current contents of the query input.
    pub input: String,
    pub page: PageView,
    pub pager: Vec<PagerItem>,
    pub selection: TypeSelection,
    pub filter: TypeFilter,
    pub results_ready: bool,
    /// Bumped by every accepted results batch, across sessions.
    pub results_generation: u64,
    pub answer: String,
    pub answer_fragments: usize,
    /// Hard failure banner; only set when the session produced no answer.
    pub failure: Option<String>,
    /// Session ended with a transport error after a partial answer.
    pub degraded: bool,
    pub search_enabled: bool,
    pub history: Vec<String>,
    pub malformed_dropped: usize,
    pub dirty: bool,
}
