//! Result-batch reducer: identity keys, duplicate replacement and ranking.
//!
//! Identity is a heuristic. Two unrelated documents that happen to share a
//! title collapse into one entry; this mirrors what the backend's result
//! pages have always shown and is kept on purpose.

use std::collections::HashMap;

use crate::document::{CanonicalDocument, DocumentRecord};

/// Titles the backend uses when a page has none.
const UNTITLED_MARKERS: &[&str] = &["无标题", "untitled"];
const CONTENT_KEY_CHARS: usize = 50;

pub fn dedup_key(record: &DocumentRecord) -> String {
    let title = record.title.as_deref().map(str::trim).unwrap_or("");
    if !title.is_empty() && !is_untitled(title) {
        return title.to_string();
    }
    if let Some(id) = non_empty(record.doc_id.as_deref()) {
        return format!("id:{id}");
    }
    if let Some(url) = non_empty(record.url.as_deref()) {
        return format!("url:{}", normalize_url(url));
    }
    let snippet = record.snippet_text().unwrap_or("");
    let prefix: String = snippet.chars().take(CONTENT_KEY_CHARS).collect();
    format!("content:{}", prefix.trim())
}

/// Lowercase, drop the http(s) scheme and a single trailing slash.
pub fn normalize_url(url: &str) -> String {
    let lowered = url.trim().to_lowercase();
    let stripped = lowered
        .strip_prefix("https://")
        .or_else(|| lowered.strip_prefix("http://"))
        .unwrap_or(&lowered);
    stripped.strip_suffix('/').unwrap_or(stripped).to_string()
}

fn is_untitled(title: &str) -> bool {
    UNTITLED_MARKERS
        .iter()
        .any(|marker| marker.eq_ignore_ascii_case(title))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn should_replace(existing: &DocumentRecord, candidate: &DocumentRecord) -> bool {
    match (existing.has_attachable_files(), candidate.has_attachable_files()) {
        (false, true) => true,
        (true, false) => false,
        _ => candidate.effective_score() > existing.effective_score(),
    }
}

/// Folds one `results` batch into a deduplicated list ranked by score.
pub fn reduce(records: Vec<DocumentRecord>) -> Vec<CanonicalDocument> {
    let mut slots: Vec<DocumentRecord> = Vec::with_capacity(records.len());
    let mut index: HashMap<String, usize> = HashMap::with_capacity(records.len());

    for record in records {
        let key = dedup_key(&record);
        match index.get(&key) {
            Some(&slot) => {
                if should_replace(&slots[slot], &record) {
                    slots[slot] = record;
                }
            }
            None => {
                index.insert(key, slots.len());
                slots.push(record);
            }
        }
    }

    let mut ranked: Vec<CanonicalDocument> = slots
        .into_iter()
        .map(CanonicalDocument::from_record)
        .collect();
    // `sort_by` is stable, so equal scores keep their slot order.
    ranked.sort_by(|a, b| b.score().total_cmp(&a.score()));
    ranked
}
