use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Strip diacritics from `text` by decomposing to NFD and dropping combining
/// marks. Used to build accent-insensitive match keys; the original spelling
/// is kept alongside for display and insertion.
pub fn strip_accents(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Count the embedded space characters in a query.
pub fn space_count(query: &str) -> usize {
    query.chars().filter(|c| *c == ' ').count()
}
