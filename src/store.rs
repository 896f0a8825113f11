//! Host document-store capability.
//!
//! The store is read-mostly and externally synchronized by the host; the
//! core enumerates it fresh on every query change so newly created documents
//! and frontmatter edits are picked up between keystrokes.

use serde::{Deserialize, Serialize};

/// One enumerable document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentInfo {
    pub path: String,
    pub basename: String,
}

impl DocumentInfo {
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let basename = basename_of(&path);
        Self { path, basename }
    }

    /// Containing folder path, empty for root-level documents.
    pub fn parent_path(&self) -> &str {
        self.path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
    }
}

/// Base name without the containing folders or the `.md` extension.
pub fn basename_of(path: &str) -> String {
    let name = path.rsplit('/').next().unwrap_or(path);
    name.strip_suffix(".md").unwrap_or(name).to_string()
}

/// Frontmatter alias field, either a single string or a list. A single
/// string under `aliases` may itself be comma separated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AliasField {
    Single(String),
    List(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub text: String,
    pub level: u8,
}

/// Document metadata as read from frontmatter and the outline cache.
#[derive(Debug, Clone, Default)]
pub struct DocumentMeta {
    pub alias: Option<String>,
    pub aliases: Option<AliasField>,
    pub headings: Vec<Heading>,
}

#[derive(Debug)]
pub enum CreateError {
    AlreadyExists,
    Other(anyhow::Error),
}

/// The host document store.
pub trait DocumentStore {
    /// Enumerate all documents in the store's stable natural order.
    fn list_documents(&self) -> Vec<DocumentInfo>;
    /// Metadata for the document at `path`. `None` when the document has no
    /// readable metadata; this is not an error condition.
    fn metadata(&self, path: &str) -> Option<DocumentMeta>;
    fn read(&self, path: &str) -> anyhow::Result<String>;
    fn create(&mut self, path: &str, content: &str) -> Result<DocumentInfo, CreateError>;
    fn write(&mut self, path: &str, content: &str) -> anyhow::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basename_strips_folders_and_extension() {
        assert_eq!(basename_of("Contacts/Evan.md"), "Evan");
        assert_eq!(basename_of("Evan.md"), "Evan");
        assert_eq!(basename_of("a/b/c.txt"), "c.txt");
    }

    #[test]
    fn parent_path_is_empty_at_root() {
        assert_eq!(DocumentInfo::new("Evan.md").parent_path(), "");
        assert_eq!(
            DocumentInfo::new("Contacts/Evan.md").parent_path(),
            "Contacts"
        );
        assert_eq!(DocumentInfo::new("a/b/c.md").parent_path(), "a/b");
    }

    #[test]
    fn alias_field_deserializes_both_shapes() {
        let single: AliasField = serde_json::from_str("\"E, Ev\"").unwrap();
        assert_eq!(single, AliasField::Single("E, Ev".into()));
        let list: AliasField = serde_json::from_str("[\"E\", \"Ev\"]").unwrap();
        assert_eq!(list, AliasField::List(vec!["E".into(), "Ev".into()]));
    }
}
