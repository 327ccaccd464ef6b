// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared lookup helpers for [`super::MaterializedState`].

use std::collections::HashMap;

/// Get a value by exact ID or unique nanoid suffix.
///
/// Matches against the full key first, then against the portion after the
/// id's type prefix (everything after the last `-` run that isn't part of
/// the nanoid itself), so a short id typed without its prefix still
/// resolves — as long as it is unambiguous.
pub(crate) fn find_by_prefix<'a, V>(map: &'a HashMap<String, V>, id: &str) -> Option<&'a V> {
    if let Some(val) = map.get(id) {
        return Some(val);
    }
    let matches: Vec<_> = map.iter().filter(|(k, _)| suffix_matches(k, id)).collect();
    match matches.as_slice() {
        [(_, val)] => Some(val),
        _ => None,
    }
}

fn suffix_matches(key: &str, candidate: &str) -> bool {
    if candidate.is_empty() {
        return false;
    }
    key.rsplit_once('-').map(|(_, suffix)| suffix).is_some_and(|suffix| suffix.starts_with(candidate))
}
