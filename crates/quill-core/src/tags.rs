use std::collections::HashSet;

/// Canonicalize free-text tags: trim whitespace, drop empties, Title-case
/// each tag, and dedupe case-insensitively keeping first-seen order.
/// Idempotent: normalizing an already-normalized list is a no-op.
pub fn normalize(raw: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for tag in raw {
        let trimmed = tag.trim();
        if trimmed.is_empty() {
            continue;
        }
        let folded = title_case(trimmed);
        if seen.insert(folded.to_lowercase()) {
            out.push(folded);
        }
    }

    out
}

/// First char uppercased, remainder lowercased. Char-level so multi-byte
/// characters fold correctly.
fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => {
            let mut out: String = first.to_uppercase().collect();
            out.extend(chars.flat_map(char::to_lowercase));
            out
        }
        None => String::new(),
    }
}
