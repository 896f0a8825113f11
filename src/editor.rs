//! Host editing-surface capabilities consumed by the session controller.
//!
//! The core never touches a real buffer or syntax tree directly; the host
//! adapter implements [`Editor`] and answers the synchronous queries below.

/// A position in the editing surface, line plus character offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub ch: usize,
}

impl Position {
    pub fn new(line: usize, ch: usize) -> Self {
        Self { line, ch }
    }
}

/// Syntactic classification of the region around the cursor.
///
/// Hosts derive this from their syntax tree. A host that cannot answer
/// returns `None` from [`Editor::syntax_context_at`], which the controller
/// treats as "not in any excluded region".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyntaxContext {
    pub in_inline_code: bool,
    pub in_fenced_code_block: bool,
    /// Declared language tag of the surrounding fenced block, if any.
    pub code_block_language: Option<String>,
    /// Cursor is inside the document title / frontmatter heading region.
    pub in_frontmatter_title: bool,
}

/// The host editing surface.
pub trait Editor {
    fn cursor(&self) -> Position;
    fn get_range(&self, from: Position, to: Position) -> String;
    fn replace_range(&mut self, text: &str, from: Position, to: Position);
    fn syntax_context_at(&self, pos: Position) -> Option<SyntaxContext>;
    /// Path of the document backing this surface, used for relative link
    /// generation.
    fn document_path(&self) -> String;
}

/// One discrete input event fed to the session controller.
///
/// Events arrive after the host has already applied the keystroke to the
/// buffer, so on [`EditorEvent::CharTyped`] the cursor sits immediately
/// after the typed character. Click-away and pane switches are delivered by
/// the host as an explicit dismiss call instead of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorEvent {
    CharTyped(char),
    Backspace,
    Escape,
    CursorMoved,
}

/// Host-defined link syntax.
pub trait LinkFormatter {
    /// Compose link text for `target_path` as seen from `source_path`.
    /// `heading` is a sub-target within the document, set only in
    /// header-scoped mode.
    fn format_link(
        &self,
        target_path: &str,
        source_path: &str,
        heading: Option<&str>,
        alias: &str,
    ) -> String;
}

/// Plain markdown `[alias](target#heading)` links.
pub struct MarkdownLinkFormatter;

impl LinkFormatter for MarkdownLinkFormatter {
    fn format_link(
        &self,
        target_path: &str,
        _source_path: &str,
        heading: Option<&str>,
        alias: &str,
    ) -> String {
        match heading {
            Some(h) => format!("[{alias}]({target_path}#{h})"),
            None => format!("[{alias}]({target_path})"),
        }
    }
}
