//! The trigger-to-selection state machine.
//!
//! Two states, `Idle` and `Open`, cycling forever. Events arrive
//! synchronously on the host's dispatch thread after the keystroke has been
//! applied to the buffer; every update that leaves a session open re-runs
//! the full index/rank pipeline against the live document store.

use tracing::debug;

use crate::candidates;
use crate::editor::{Editor, EditorEvent, LinkFormatter, Position, SyntaxContext};
use crate::normalize::{space_count, strip_accents};
use crate::ranker::{self, CreatePolicy, RankedSuggestion};
use crate::resolver::{self, Notifier, ResolveError};
use crate::settings::Settings;
use crate::store::DocumentStore;

/// Popup surface. Implementations (native widget or floating panel) are
/// host glue selected at startup; the controller only knows this interface.
pub trait PresentationLayer {
    fn show(&mut self, results: &[RankedSuggestion], anchor: Position);
    fn hide(&mut self);
}

/// The live state of one open trigger-to-selection interaction. Owned
/// exclusively by the controller; at most one exists per editing surface.
#[derive(Debug, Clone)]
pub struct SuggestionSession {
    pub trigger_symbol: char,
    /// Position immediately after the trigger character, the left edge of
    /// the typed query.
    pub anchor: Position,
    /// Query exactly as typed. Accent normalization applies only to the
    /// copy handed to the matcher, never to this buffer text.
    pub query: String,
    pub scope: crate::settings::TriggerScope,
}

impl SuggestionSession {
    fn match_query(&self, settings: &Settings) -> String {
        if settings.remove_accents {
            strip_accents(&self.query)
        } else {
            self.query.clone()
        }
    }
}

enum SessionState {
    Idle,
    Open(SuggestionSession),
}

/// Snapshot handed to the host for hotkey routing: next/prev/select/escape
/// commands must only act while a session is open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStateView {
    pub query: String,
    pub trigger_symbol: char,
}

pub struct SessionController {
    settings: Settings,
    state: SessionState,
    presenter: Box<dyn PresentationLayer>,
    last_results: Vec<RankedSuggestion>,
}

impl SessionController {
    /// Configuration is immutable for the controller's lifetime; on a
    /// settings change the host rebuilds the controller with fresh config.
    pub fn new(settings: Settings, presenter: Box<dyn PresentationLayer>) -> Self {
        Self {
            settings,
            state: SessionState::Idle,
            presenter,
            last_results: Vec::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, SessionState::Open(_))
    }

    pub fn session_state(&self) -> Option<SessionStateView> {
        match &self.state {
            SessionState::Idle => None,
            SessionState::Open(session) => Some(SessionStateView {
                query: session.query.clone(),
                trigger_symbol: session.trigger_symbol,
            }),
        }
    }

    /// Ranked list from the most recent refresh, in display order.
    pub fn current_results(&self) -> &[RankedSuggestion] {
        &self.last_results
    }

    /// Feed one keystroke or cursor event.
    pub fn handle_event(
        &mut self,
        event: EditorEvent,
        editor: &dyn Editor,
        store: &dyn DocumentStore,
    ) {
        let cursor = editor.cursor();
        // A host that cannot classify the region fails open: typing is
        // never blocked by a missing syntax tree.
        let ctx = editor.syntax_context_at(cursor).unwrap_or_default();
        if ctx.in_frontmatter_title {
            return;
        }

        match event {
            EditorEvent::CharTyped(ch) => self.on_char(ch, cursor, &ctx, editor, store),
            EditorEvent::Backspace => self.on_backspace(editor, store),
            EditorEvent::Escape => {
                if self.is_open() {
                    self.close();
                }
            }
            EditorEvent::CursorMoved => {
                // Document set may have changed since the last keystroke.
                if self.is_open() {
                    self.refresh(store);
                }
            }
        }
    }

    /// Force-close any open session: click-away, pane switch, or surface
    /// teardown.
    pub fn dismiss(&mut self) {
        self.close();
    }

    /// Resolve the candidate at `index` in the current ranked list and
    /// apply the replacement. Out-of-range indices and idle sessions are
    /// defensive no-ops; a create conflict leaves the session open with the
    /// buffer untouched.
    pub fn select(
        &mut self,
        index: usize,
        editor: &mut dyn Editor,
        store: &mut dyn DocumentStore,
        links: &dyn LinkFormatter,
        notifier: &dyn Notifier,
    ) -> Result<(), ResolveError> {
        let SessionState::Open(session) = &self.state else {
            return Ok(());
        };
        let Some(chosen) = self.last_results.get(index) else {
            return Ok(());
        };
        let cursor = editor.cursor();
        let source_path = editor.document_path();
        let resolved = resolver::resolve(
            chosen,
            session.trigger_symbol,
            session.anchor,
            cursor,
            &source_path,
            &self.settings,
            store,
            links,
            notifier,
        );
        match resolved {
            Ok(replacement) => {
                editor.replace_range(&replacement.text, replacement.from, replacement.to);
                self.close();
                Ok(())
            }
            Err(ResolveError::CreateConflict) | Err(ResolveError::TemplateUnavailable) => {
                // Notice already surfaced; the user may retry or cancel.
                Ok(())
            }
            Err(err) => {
                self.close();
                Err(err)
            }
        }
    }

    fn on_char(
        &mut self,
        ch: char,
        cursor: Position,
        ctx: &SyntaxContext,
        editor: &dyn Editor,
        store: &dyn DocumentStore,
    ) {
        if !self.is_open() {
            // Inline code and disallowed fenced blocks only block opening;
            // an already-open session keeps running so backticks can be
            // typed verbatim into the query.
            if self.code_context_blocked(ctx) {
                return;
            }
            self.try_open(ch, cursor, editor, store);
            return;
        }

        if ch == '\n' || ch == '\t' {
            self.close();
            return;
        }
        if !self.settings.is_valid_query_char(ch) {
            // Close silently and let the keystroke pass through to normal
            // editing.
            self.close();
            return;
        }

        if let SessionState::Open(session) = &mut self.state {
            session.query.push(ch);
            let over_tolerance = session.query.starts_with(' ')
                || space_count(&session.query) > self.settings.leave_popup_open_for_x_spaces;
            if over_tolerance {
                self.close();
                return;
            }
        }
        self.refresh(store);
    }

    fn on_backspace(&mut self, editor: &dyn Editor, store: &dyn DocumentStore) {
        if let SessionState::Open(session) = &mut self.state {
            if session.query.is_empty() {
                self.close();
                return;
            }
            session.query.pop();
            self.refresh(store);
        }
    }

    fn try_open(
        &mut self,
        ch: char,
        cursor: Position,
        editor: &dyn Editor,
        store: &dyn DocumentStore,
    ) {
        // First configured mapping wins when a character is bound twice.
        let Some(scope) = self.settings.resolve_scope(ch) else {
            return;
        };
        // A backslash-escaped trigger stays literal text.
        if cursor.ch >= 2 {
            let before = editor.get_range(
                Position::new(cursor.line, cursor.ch - 2),
                Position::new(cursor.line, cursor.ch - 1),
            );
            if before == "\\" {
                return;
            }
        }

        debug!(symbol = %ch, ?scope, "suggestion session opened");
        self.state = SessionState::Open(SuggestionSession {
            trigger_symbol: ch,
            anchor: cursor,
            query: String::new(),
            scope,
        });
        self.refresh(store);
    }

    fn code_context_blocked(&self, ctx: &SyntaxContext) -> bool {
        if ctx.in_inline_code {
            return true;
        }
        if ctx.in_fenced_code_block {
            let allowed = ctx
                .code_block_language
                .as_deref()
                .is_some_and(|lang| {
                    self.settings
                        .allowed_code_block_types
                        .iter()
                        .any(|t| t == lang)
                });
            return !allowed;
        }
        false
    }

    /// Re-run the index/rank pipeline and forward the result to the popup.
    /// An empty list hides the popup rather than showing an empty state.
    fn refresh(&mut self, store: &dyn DocumentStore) {
        let SessionState::Open(session) = &self.state else {
            return;
        };
        let records = candidates::index(store, &session.scope, &self.settings);
        let policy = CreatePolicy::from_settings(&self.settings, &session.scope);
        let query = session.match_query(&self.settings);
        let results = ranker::rank(records, &query, &policy);
        if results.is_empty() {
            self.presenter.hide();
        } else {
            self.presenter.show(&results, session.anchor);
        }
        self.last_results = results;
    }

    fn close(&mut self) {
        if self.is_open() {
            debug!("suggestion session closed");
        }
        self.state = SessionState::Idle;
        self.last_results.clear();
        self.presenter.hide();
    }
}
