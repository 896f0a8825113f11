#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use symbol_linker::editor::{Editor, EditorEvent, Position, SyntaxContext};
use symbol_linker::ranker::RankedSuggestion;
use symbol_linker::resolver::Notifier;
use symbol_linker::session::{PresentationLayer, SessionController};
use symbol_linker::store::{CreateError, DocumentInfo, DocumentMeta, DocumentStore};

/// In-memory document store with insertion-ordered enumeration.
#[derive(Default)]
pub struct MemoryStore {
    files: Vec<(String, String)>,
    meta: HashMap<String, DocumentMeta>,
    pub fail_create: bool,
}

impl MemoryStore {
    pub fn with_docs(paths: &[&str]) -> Self {
        let mut store = Self::default();
        for path in paths {
            store.insert(path, "");
        }
        store
    }

    pub fn insert(&mut self, path: &str, content: &str) {
        self.files.push((path.to_string(), content.to_string()));
    }

    pub fn set_meta(&mut self, path: &str, meta: DocumentMeta) {
        self.meta.insert(path.to_string(), meta);
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.iter().any(|(p, _)| p == path)
    }

    pub fn content(&self, path: &str) -> Option<&str> {
        self.files
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, c)| c.as_str())
    }
}

impl DocumentStore for MemoryStore {
    fn list_documents(&self) -> Vec<DocumentInfo> {
        self.files
            .iter()
            .map(|(path, _)| DocumentInfo::new(path.clone()))
            .collect()
    }

    fn metadata(&self, path: &str) -> Option<DocumentMeta> {
        self.meta.get(path).cloned()
    }

    fn read(&self, path: &str) -> anyhow::Result<String> {
        self.content(path)
            .map(|c| c.to_string())
            .ok_or_else(|| anyhow::anyhow!("no document at {path}"))
    }

    fn create(&mut self, path: &str, content: &str) -> Result<DocumentInfo, CreateError> {
        if self.contains(path) {
            return Err(CreateError::AlreadyExists);
        }
        if self.fail_create {
            return Err(CreateError::Other(anyhow::anyhow!("store is read-only")));
        }
        self.insert(path, content);
        Ok(DocumentInfo::new(path))
    }

    fn write(&mut self, path: &str, content: &str) -> anyhow::Result<()> {
        match self.files.iter_mut().find(|(p, _)| p == path) {
            Some((_, c)) => *c = content.to_string(),
            None => self.insert(path, content),
        }
        Ok(())
    }
}

/// Single-line buffer with a cursor, enough editor for the controller.
pub struct BufferEditor {
    pub text: String,
    pub cursor: usize,
    pub path: String,
    pub context: Option<SyntaxContext>,
    pub replacements: Vec<(String, Position, Position)>,
}

impl BufferEditor {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            cursor: 0,
            path: "current.md".into(),
            context: Some(SyntaxContext::default()),
            replacements: Vec::new(),
        }
    }
}

impl Editor for BufferEditor {
    fn cursor(&self) -> Position {
        Position::new(0, self.cursor)
    }

    fn get_range(&self, from: Position, to: Position) -> String {
        self.text
            .chars()
            .skip(from.ch)
            .take(to.ch.saturating_sub(from.ch))
            .collect()
    }

    fn replace_range(&mut self, text: &str, from: Position, to: Position) {
        let prefix: String = self.text.chars().take(from.ch).collect();
        let suffix: String = self.text.chars().skip(to.ch).collect();
        self.text = format!("{prefix}{text}{suffix}");
        self.cursor = from.ch + text.chars().count();
        self.replacements
            .push((text.to_string(), from, to));
    }

    fn syntax_context_at(&self, _pos: Position) -> Option<SyntaxContext> {
        self.context.clone()
    }

    fn document_path(&self) -> String {
        self.path.clone()
    }
}

/// Records every popup command for assertions.
#[derive(Clone, Default)]
pub struct PopupLog {
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl PopupLog {
    pub fn last(&self) -> Option<String> {
        self.calls.lock().unwrap().last().cloned()
    }
}

pub struct RecordingPresenter {
    log: PopupLog,
}

impl RecordingPresenter {
    pub fn new(log: PopupLog) -> Self {
        Self { log }
    }
}

impl PresentationLayer for RecordingPresenter {
    fn show(&mut self, results: &[RankedSuggestion], _anchor: Position) {
        self.log
            .calls
            .lock()
            .unwrap()
            .push(format!("show:{}", results.len()));
    }

    fn hide(&mut self) {
        self.log.calls.lock().unwrap().push("hide".into());
    }
}

pub struct NullPresenter;

impl PresentationLayer for NullPresenter {
    fn show(&mut self, _results: &[RankedSuggestion], _anchor: Position) {}
    fn hide(&mut self) {}
}

#[derive(Default)]
pub struct CollectingNotifier {
    pub messages: Mutex<Vec<String>>,
}

impl Notifier for CollectingNotifier {
    fn notify(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

/// Drive the controller one keystroke at a time, keeping the buffer and
/// cursor in sync the way a host would.
pub fn type_str(
    controller: &mut SessionController,
    editor: &mut BufferEditor,
    store: &MemoryStore,
    text: &str,
) {
    for ch in text.chars() {
        editor.text.push(ch);
        editor.cursor += 1;
        controller.handle_event(EditorEvent::CharTyped(ch), editor, store);
    }
}
