pub const HISTORY_LIMIT: usize = 8;

/// Moves `query` to the front of `history`, dropping duplicates and
/// anything past the limit.
pub fn record_query(history: &[String], query: &str) -> Vec<String> {
    std::iter::once(query.to_string())
        .chain(history.iter().filter(|q| q.as_str() != query).cloned())
        .take(HISTORY_LIMIT)
        .collect()
}

/// Cleans a list read back from storage: blank and repeated entries are
/// dropped and the limit is enforced.
pub fn sanitize_history(entries: Vec<String>) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::with_capacity(HISTORY_LIMIT);
    for entry in entries {
        if entry.trim().is_empty() || cleaned.contains(&entry) {
            continue;
        }
        cleaned.push(entry);
        if cleaned.len() == HISTORY_LIMIT {
            break;
        }
    }
    cleaned
}
