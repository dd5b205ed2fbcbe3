//! Emphasis of the typed prefix inside a suggestion.

/// A piece of a suggestion, marked if it matches the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightPart<'a> {
    pub text: &'a str,
    pub matched: bool,
}

/// Split `suggestion` into parts, marking every non-overlapping occurrence of
/// `query` (ASCII case-insensitive).
pub fn highlight<'a>(suggestion: &'a str, query: &str) -> Vec<HighlightPart<'a>> {
    if query.is_empty() {
        return vec![HighlightPart {
            text: suggestion,
            matched: false,
        }];
    }

    // ASCII lowercasing keeps byte offsets aligned with `suggestion`.
    let haystack = suggestion.to_ascii_lowercase();
    let needle = query.to_ascii_lowercase();

    let mut parts = Vec::new();
    let mut pos = 0;
    for (start, _) in haystack.match_indices(&needle) {
        if start > pos {
            parts.push(HighlightPart {
                text: &suggestion[pos..start],
                matched: false,
            });
        }
        let end = start + needle.len();
        parts.push(HighlightPart {
            text: &suggestion[start..end],
            matched: true,
        });
        pos = end;
    }
    if pos < suggestion.len() {
        parts.push(HighlightPart {
            text: &suggestion[pos..],
            matched: false,
        });
    }
    parts
}
