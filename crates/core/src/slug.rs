// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Slugify strings for use as session-name components.

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
    "do", "does", "did", "will", "would", "shall", "should", "may", "might", "must", "can",
    "could", "to", "of", "in", "for", "on", "with", "at", "by", "from", "as", "into", "through",
    "during", "before", "after", "above", "below", "between", "out", "off", "over", "under",
    "again", "further", "then", "once", "that", "this", "these", "those", "and", "but", "or",
    "nor", "not", "so", "yet", "both", "each", "every", "all", "any", "few", "more", "most",
    "other", "some", "such", "no", "only", "own", "same", "than", "too", "very", "just", "about",
    "also", "its", "it", "we", "our",
];

/// Slugify a string for use in a session name.
///
/// Lowercases, replaces non-alphanumeric runs with a single hyphen, drops
/// stop words, collapses consecutive duplicates, and truncates to `max_len`
/// characters at a word boundary.
pub fn slugify(input: &str, max_len: usize) -> String {
    let lower = input.to_lowercase();

    let mut slug = String::with_capacity(lower.len());
    let mut last_was_hyphen = false;
    for ch in lower.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch);
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }

    let mut filtered: Vec<&str> = Vec::new();
    for word in slug.split('-') {
        if word.is_empty() || STOP_WORDS.contains(&word) {
            continue;
        }
        if filtered.last() != Some(&word) {
            filtered.push(word);
        }
    }
    let mut result = filtered.join("-");

    let trimmed = result.trim_matches('-');
    if trimmed.len() != result.len() {
        result = trimmed.to_string();
    }

    if result.len() > max_len {
        if let Some(pos) = result[..max_len].rfind('-') {
            result.truncate(pos);
        } else {
            result.truncate(max_len);
        }
    }

    let trimmed = result.trim_end_matches('-');
    if trimmed.len() != result.len() {
        result = trimmed.to_string();
    }

    result
}

/// Build the team-slug component of a `hive-<role>-<teamSlug>[-n]` session name.
pub fn team_slug(display_name: &str) -> String {
    let slug = slugify(display_name, 24);
    if slug.is_empty() {
        "team".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
#[path = "slug_tests.rs"]
mod tests;
