//! Presentation helpers shared by popup implementations: turn match offsets
//! into renderable segments and pick the label/detail text for a row.

use crate::ranker::{MatchKey, RankedSuggestion};

/// A run of characters, either part of the match (rendered emphasized) or
/// plain surrounding text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightSegment {
    pub text: String,
    pub matched: bool,
}

/// Split `target` into alternating plain/matched segments from the char
/// offsets reported by the fuzzy matcher. Offsets outside the target are
/// ignored.
pub fn highlight_segments(target: &str, indices: &[usize]) -> Vec<HighlightSegment> {
    let mut sorted: Vec<usize> = indices.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let mut segments: Vec<HighlightSegment> = Vec::new();
    let mut next = sorted.iter().peekable();
    for (i, ch) in target.chars().enumerate() {
        let matched = next.peek().is_some_and(|idx| **idx == i);
        if matched {
            next.next();
        }
        match segments.last_mut() {
            Some(seg) if seg.matched == matched => seg.text.push(ch),
            _ => segments.push(HighlightSegment {
                text: ch.to_string(),
                matched,
            }),
        }
    }
    segments
}

/// Title text for a suggestion row: the matched key when there is one,
/// otherwise the alias and finally the bare name.
pub fn display_label(suggestion: &RankedSuggestion) -> &str {
    match suggestion.matched_key {
        MatchKey::Alias => suggestion
            .record
            .display_alias
            .as_deref()
            .unwrap_or(&suggestion.record.display_name),
        MatchKey::Name => &suggestion.record.display_name,
        MatchKey::None => suggestion
            .record
            .display_alias
            .as_deref()
            .unwrap_or(&suggestion.record.display_name),
    }
}

/// Secondary row text: the target path without its extension.
pub fn display_path(suggestion: &RankedSuggestion) -> &str {
    let path = suggestion.record.target_path.as_str();
    path.strip_suffix(".md").unwrap_or(path)
}
