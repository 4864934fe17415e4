// SPDX-License-Identifier: MIT OR Apache-2.0

//! Word completion for hand-editing YAML documents.
//!
//! Offsets are byte offsets into the text. A cursor inside a multi-byte character is moved back
//! to the start of that character.
use permtree_core::{ApiResource, Icon};

/// Keys of node, action and resource mappings.
pub const DOCUMENT_KEYS: [&str; 13] = [
    "name:",
    "slug:",
    "icon:",
    "router:",
    "component:",
    "sequence:",
    "actions:",
    "children:",
    "code:",
    "resources:",
    "method:",
    "path:",
    "attribute:",
];

pub const HTTP_METHODS: [&str; 5] = ["GET", "POST", "PUT", "PATCH", "DELETE"];

/// Offset of the first character of the word ending at `cursor`.
///
/// Words are separated by whitespace. Returns `cursor` itself when it directly follows whitespace
/// or sits at the start of the text.
pub fn current_word_start(text: &str, cursor: usize) -> usize {
    let cursor = floor_boundary(text, cursor);
    text[..cursor]
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace())
        .map(|(index, c)| index + c.len_utf8())
        .unwrap_or(0)
}

/// The word ending at `cursor`.
pub fn current_word(text: &str, cursor: usize) -> &str {
    let cursor = floor_boundary(text, cursor);
    &text[current_word_start(text, cursor)..cursor]
}

/// Completions for the word ending at `cursor`.
///
/// Candidates are document keys, icon names, HTTP methods and the paths of `routes`. They match
/// when they start with the current word, ignoring case. The word itself is never suggested.
pub fn suggest(text: &str, cursor: usize, routes: &[ApiResource]) -> Vec<String> {
    let word = current_word(text, cursor);
    if word.is_empty() {
        return Vec::new();
    }

    let prefix = word.to_lowercase();
    let keys: [&str; 13] = DOCUMENT_KEYS;
    let candidates = keys
        .into_iter()
        .chain(Icon::ALL.iter().map(|icon| icon.as_str()))
        .chain(HTTP_METHODS)
        .chain(routes.iter().map(|route| route.path.as_str()));

    let mut suggestions: Vec<String> = Vec::new();
    for candidate in candidates {
        if candidate == word || !candidate.to_lowercase().starts_with(&prefix) {
            continue;
        }

        if !suggestions.iter().any(|existing| existing == candidate) {
            suggestions.push(candidate.to_string());
        }
    }

    suggestions
}

/// Replace the word ending at `cursor` with `completion`.
///
/// Returns the new text and the cursor placed right after the inserted completion.
pub fn apply(text: &str, cursor: usize, completion: &str) -> (String, usize) {
    let cursor = floor_boundary(text, cursor);
    let start = current_word_start(text, cursor);

    let mut completed = String::with_capacity(text.len() + completion.len());
    completed.push_str(&text[..start]);
    completed.push_str(completion);
    completed.push_str(&text[cursor..]);

    (completed, start + completion.len())
}

fn floor_boundary(text: &str, cursor: usize) -> usize {
    let mut cursor = cursor.min(text.len());
    while !text.is_char_boundary(cursor) {
        cursor -= 1;
    }
    cursor
}
