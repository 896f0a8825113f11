//! Candidate record construction.
//!
//! Records are rebuilt from the live document store on every query change;
//! nothing is cached across sessions because the document set can change
//! between keystrokes.

use crate::normalize::strip_accents;
use crate::settings::{Settings, TriggerScope};
use crate::store::{AliasField, DocumentStore};

/// One offerable suggestion. A document with N aliases yields N+1 records
/// sharing the same target path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRecord {
    /// Accent-normalized base name used as the secondary match key.
    pub primary_name: String,
    /// Base name with the author's original spelling, used for insertion.
    pub display_name: String,
    /// Accent-normalized alias used as the primary match key.
    pub match_alias: Option<String>,
    /// Alias with the author's original spelling.
    pub display_alias: Option<String>,
    pub target_path: String,
    pub is_create_new: bool,
    /// Literal query text preserved for naming a new document or heading.
    pub creation_query: Option<String>,
    /// Heading sub-target, set in header-scoped mode.
    pub heading: Option<String>,
}

impl CandidateRecord {
    fn plain(name: &str, path: &str, remove_accents: bool) -> Self {
        Self {
            primary_name: match_key(name, remove_accents),
            display_name: name.to_string(),
            match_alias: None,
            display_alias: None,
            target_path: path.to_string(),
            is_create_new: false,
            creation_query: None,
            heading: None,
        }
    }

    fn with_alias(name: &str, path: &str, alias: &str, remove_accents: bool) -> Self {
        Self {
            match_alias: Some(match_key(alias, remove_accents)),
            display_alias: Some(alias.to_string()),
            ..Self::plain(name, path, remove_accents)
        }
    }

    fn heading(path: &str, heading: &str, remove_accents: bool) -> Self {
        Self {
            heading: Some(heading.to_string()),
            ..Self::plain(heading, path, remove_accents)
        }
    }
}

fn match_key(text: &str, remove_accents: bool) -> String {
    if remove_accents {
        strip_accents(text)
    } else {
        text.to_string()
    }
}

/// Build the candidate set for `scope` from the live document store.
pub fn index(
    store: &dyn DocumentStore,
    scope: &TriggerScope,
    settings: &Settings,
) -> Vec<CandidateRecord> {
    match scope {
        TriggerScope::Folders { folders, .. } => index_folders(store, folders, settings),
        TriggerScope::Documents { paths, .. } => index_headings(store, paths, settings),
    }
}

fn index_folders(
    store: &dyn DocumentStore,
    folders: &[String],
    settings: &Settings,
) -> Vec<CandidateRecord> {
    let mut records = Vec::new();
    for doc in store.list_documents() {
        if !folders.is_empty() {
            let parent = doc.parent_path();
            if !folders.iter().any(|f| parent.starts_with(f.trim_end_matches('/'))) {
                continue;
            }
        }

        // A document with unreadable metadata still yields its bare-name
        // record.
        if let Some(meta) = store.metadata(&doc.path) {
            if let Some(alias) = &meta.alias {
                records.push(CandidateRecord::with_alias(
                    &doc.basename,
                    &doc.path,
                    alias,
                    settings.remove_accents,
                ));
            } else if let Some(aliases) = &meta.aliases {
                for alias in expand_aliases(aliases) {
                    records.push(CandidateRecord::with_alias(
                        &doc.basename,
                        &doc.path,
                        &alias,
                        settings.remove_accents,
                    ));
                }
            }
        }
        records.push(CandidateRecord::plain(
            &doc.basename,
            &doc.path,
            settings.remove_accents,
        ));
    }
    records
}

fn index_headings(
    store: &dyn DocumentStore,
    paths: &[String],
    settings: &Settings,
) -> Vec<CandidateRecord> {
    let mut records = Vec::new();
    for path in paths {
        let Some(meta) = store.metadata(path) else {
            continue;
        };
        for heading in &meta.headings {
            if settings.header_level != 0 && heading.level != settings.header_level {
                continue;
            }
            records.push(CandidateRecord::heading(
                path,
                &heading.text,
                settings.remove_accents,
            ));
        }
    }
    records
}

/// Expand the frontmatter `aliases` field: a string splits on commas, a list
/// is used as-is.
fn expand_aliases(field: &AliasField) -> Vec<String> {
    match field {
        AliasField::Single(raw) => raw
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        AliasField::List(list) => list.clone(),
    }
}
