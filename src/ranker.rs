//! Filter-then-rank-then-augment pipeline over candidate records.

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

use crate::candidates::CandidateRecord;
use crate::settings::{Settings, TriggerScope};

/// Which searchable key of the record the query matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKey {
    Alias,
    Name,
    /// Empty-query listing and create-new entries carry no match.
    None,
}

/// A candidate plus its match score and per-character highlight offsets.
/// Ephemeral, recomputed on every keystroke.
#[derive(Debug, Clone)]
pub struct RankedSuggestion {
    pub record: CandidateRecord,
    pub score: i64,
    /// Char offsets into the matched key, for highlighting.
    pub indices: Vec<usize>,
    pub matched_key: MatchKey,
}

/// Whether and how an unmatched query may become a new link target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreatePolicy {
    Disabled,
    /// Create a new document named after the query, one option per eligible
    /// folder.
    NewDocument {
        folders: Vec<String>,
        /// Keep the trigger symbol as a filename prefix.
        filename_symbol: Option<char>,
    },
    /// Header-scoped mode: append the query as a new heading to each bound
    /// document.
    AppendHeading { paths: Vec<String> },
}

impl CreatePolicy {
    pub fn from_settings(settings: &Settings, scope: &TriggerScope) -> Self {
        match scope {
            TriggerScope::Documents { paths, .. } => {
                if settings.append_as_header {
                    CreatePolicy::AppendHeading {
                        paths: paths.clone(),
                    }
                } else {
                    CreatePolicy::Disabled
                }
            }
            TriggerScope::Folders { symbol, .. } => {
                if settings.show_add_new_note {
                    CreatePolicy::NewDocument {
                        folders: settings.creation_folders(scope),
                        filename_symbol: settings.retain_symbol_in_filename.then_some(*symbol),
                    }
                } else {
                    CreatePolicy::Disabled
                }
            }
        }
    }
}

/// Rank `records` against `query`.
///
/// An empty query lists every record in reverse indexer order, unscored;
/// because stores commonly enumerate alphabetically this gives a
/// recency-biased default view. A non-empty query is fuzzy matched against
/// the alias key first and the name key second, ordered by descending score
/// with matcher-stable ties, then augmented with create-new entries.
pub fn rank(
    records: Vec<CandidateRecord>,
    query: &str,
    policy: &CreatePolicy,
) -> Vec<RankedSuggestion> {
    if query.is_empty() {
        // No create-new entry either: creation needs a proposed name.
        return records
            .into_iter()
            .rev()
            .map(|record| RankedSuggestion {
                record,
                score: 0,
                indices: Vec::new(),
                matched_key: MatchKey::None,
            })
            .collect();
    }

    let matcher = SkimMatcherV2::default();
    let mut results: Vec<RankedSuggestion> = records
        .into_iter()
        .filter_map(|record| score_record(&matcher, record, query))
        .collect();
    // Stable sort keeps the matcher's own order on equal scores.
    results.sort_by(|a, b| b.score.cmp(&a.score));

    augment_create_new(&mut results, query, policy);
    results
}

fn score_record(
    matcher: &SkimMatcherV2,
    record: CandidateRecord,
    query: &str,
) -> Option<RankedSuggestion> {
    if let Some(alias) = &record.match_alias {
        if let Some((score, indices)) = matcher.fuzzy_indices(alias, query) {
            return Some(RankedSuggestion {
                record,
                score,
                indices,
                matched_key: MatchKey::Alias,
            });
        }
    }
    let (score, indices) = matcher.fuzzy_indices(&record.primary_name, query)?;
    Some(RankedSuggestion {
        record,
        score,
        indices,
        matched_key: MatchKey::Name,
    })
}

/// Append create-new entries at the end of `results`, never interleaved.
/// Skipped entirely when an existing record's name equals the query, so the
/// popup never offers to create a document that already exists.
fn augment_create_new(results: &mut Vec<RankedSuggestion>, query: &str, policy: &CreatePolicy) {
    if matches!(policy, CreatePolicy::Disabled) {
        return;
    }
    let query_lower = query.to_lowercase();
    if results
        .iter()
        .any(|r| r.record.primary_name.to_lowercase() == query_lower)
    {
        return;
    }
    // Idempotent recompute: drop any placeholder from a previous pass.
    results.retain(|r| !r.record.is_create_new);

    match policy {
        CreatePolicy::Disabled => {}
        CreatePolicy::NewDocument {
            folders,
            filename_symbol,
        } => {
            for folder in folders {
                let name = query.trim();
                let file_name = match filename_symbol {
                    Some(sym) => format!("{sym}{name}.md"),
                    None => format!("{name}.md"),
                };
                let target_path = if folder.is_empty() {
                    file_name
                } else {
                    format!("{folder}/{file_name}")
                };
                results.push(create_entry(query, target_path, None));
            }
        }
        CreatePolicy::AppendHeading { paths } => {
            for path in paths {
                results.push(create_entry(query, path.clone(), Some(query.trim())));
            }
        }
    }
}

fn create_entry(query: &str, target_path: String, heading: Option<&str>) -> RankedSuggestion {
    RankedSuggestion {
        record: CandidateRecord {
            primary_name: query.trim().to_string(),
            display_name: query.trim().to_string(),
            match_alias: None,
            display_alias: None,
            target_path,
            is_create_new: true,
            creation_query: Some(query.to_string()),
            heading: heading.map(|h| h.to_string()),
        },
        score: 0,
        indices: Vec::new(),
        matched_key: MatchKey::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, path: &str) -> CandidateRecord {
        CandidateRecord {
            primary_name: name.to_string(),
            display_name: name.to_string(),
            match_alias: None,
            display_alias: None,
            target_path: path.to_string(),
            is_create_new: false,
            creation_query: None,
            heading: None,
        }
    }

    fn aliased(name: &str, path: &str, alias: &str) -> CandidateRecord {
        CandidateRecord {
            match_alias: Some(alias.to_string()),
            display_alias: Some(alias.to_string()),
            ..record(name, path)
        }
    }

    #[test]
    fn empty_query_reverses_indexer_order_without_create_entry() {
        let records = vec![record("a", "a.md"), record("b", "b.md"), record("c", "c.md")];
        let policy = CreatePolicy::NewDocument {
            folders: vec!["Notes".into()],
            filename_symbol: None,
        };
        let ranked = rank(records, "", &policy);
        let names: Vec<_> = ranked.iter().map(|r| r.record.primary_name.as_str()).collect();
        assert_eq!(names, vec!["c", "b", "a"]);
        assert!(ranked.iter().all(|r| !r.record.is_create_new));
    }

    #[test]
    fn alias_key_is_preferred_over_name_key() {
        let records = vec![aliased("Evan Smith", "e.md", "Ev")];
        let ranked = rank(records, "ev", &CreatePolicy::Disabled);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].matched_key, MatchKey::Alias);
        assert!(ranked[0].score > 0);
        assert!(!ranked[0].indices.is_empty());
    }

    #[test]
    fn name_key_used_when_alias_does_not_match() {
        let records = vec![aliased("Evan", "e.md", "Boss")];
        let ranked = rank(records, "ev", &CreatePolicy::Disabled);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].matched_key, MatchKey::Name);
    }

    #[test]
    fn non_matching_records_are_dropped() {
        let records = vec![record("Evan", "e.md"), record("Zoe", "z.md")];
        let ranked = rank(records, "ev", &CreatePolicy::Disabled);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].record.primary_name, "Evan");
    }

    #[test]
    fn results_ordered_by_descending_score() {
        let records = vec![record("evaluation", "x.md"), record("Evan", "e.md")];
        let ranked = rank(records, "evan", &CreatePolicy::Disabled);
        assert_eq!(ranked[0].record.primary_name, "Evan");
    }

    #[test]
    fn create_entry_appended_last_per_folder() {
        let records = vec![record("New Ideas Board", "n.md")];
        let policy = CreatePolicy::NewDocument {
            folders: vec!["Notes".into(), "Inbox".into()],
            filename_symbol: None,
        };
        let ranked = rank(records, "New Idea", &policy);
        assert!(ranked.len() >= 2);
        let creates: Vec<_> = ranked.iter().filter(|r| r.record.is_create_new).collect();
        assert_eq!(creates.len(), 2);
        assert_eq!(creates[0].record.target_path, "Notes/New Idea.md");
        assert_eq!(creates[1].record.target_path, "Inbox/New Idea.md");
        // Always at the end, never interleaved.
        assert!(!ranked[0].record.is_create_new);
        assert!(ranked.last().unwrap().record.is_create_new);
    }

    #[test]
    fn no_create_entry_on_case_insensitive_exact_match() {
        let records = vec![record("New Idea", "Notes/New Idea.md")];
        let policy = CreatePolicy::NewDocument {
            folders: vec!["Notes".into()],
            filename_symbol: None,
        };
        let ranked = rank(records, "new idea", &policy);
        assert!(ranked.iter().all(|r| !r.record.is_create_new));
    }

    #[test]
    fn filename_symbol_prefix_and_root_folder() {
        let policy = CreatePolicy::NewDocument {
            folders: vec![String::new()],
            filename_symbol: Some('@'),
        };
        let ranked = rank(Vec::new(), "Evan", &policy);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].record.target_path, "@Evan.md");
        assert_eq!(ranked[0].record.creation_query.as_deref(), Some("Evan"));
    }

    #[test]
    fn append_heading_policy_targets_bound_documents() {
        let policy = CreatePolicy::AppendHeading {
            paths: vec!["People.md".into()],
        };
        let ranked = rank(vec![record("Evan", "People.md")], "Ana", &policy);
        let create = ranked.last().unwrap();
        assert!(create.record.is_create_new);
        assert_eq!(create.record.target_path, "People.md");
        assert_eq!(create.record.heading.as_deref(), Some("Ana"));
    }

    #[test]
    fn augmentation_is_idempotent_over_stale_placeholders() {
        let policy = CreatePolicy::NewDocument {
            folders: vec!["Notes".into()],
            filename_symbol: None,
        };
        let stale = rank(Vec::new(), "Old Query", &policy)
            .into_iter()
            .map(|r| r.record)
            .collect::<Vec<_>>();
        let ranked = rank(stale, "Old Query Longer", &policy);
        let creates: Vec<_> = ranked.iter().filter(|r| r.record.is_create_new).collect();
        assert_eq!(creates.len(), 1);
        assert_eq!(creates[0].record.target_path, "Notes/Old Query Longer.md");
    }
}
