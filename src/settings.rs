use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// Pattern matching characters that close an open suggestion session.
pub const DEFAULT_INVALID_CHAR_REGEX: &str = r"[\[\]^|#]";

static DEFAULT_INVALID_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(DEFAULT_INVALID_CHAR_REGEX).unwrap());

/// Binds a trigger symbol to a folder prefix or to a single document.
/// An absent symbol means the mapping applies to the global trigger.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TriggerBinding {
    pub path: String,
    #[serde(default)]
    pub trigger_symbol: Option<char>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
    /// Character that opens a suggestion session anywhere.
    #[serde(default = "default_trigger_symbol")]
    pub trigger_symbol: char,
    /// Prepend the session's trigger symbol to the inserted alias text.
    #[serde(default = "default_include_symbol")]
    pub include_symbol: bool,
    /// Restrict link candidates to these folder prefixes, optionally with a
    /// dedicated trigger symbol per folder. Empty means unrestricted.
    #[serde(default)]
    pub limit_to_directories: Vec<TriggerBinding>,
    /// Header-scoped mode: bind a trigger symbol to a single document whose
    /// headings become the candidates.
    #[serde(default)]
    pub limit_to_file: Vec<TriggerBinding>,
    /// Heading level offered in header-scoped mode. `0` offers all levels.
    #[serde(default)]
    pub header_level: u8,
    /// In header-scoped mode, allow appending the query as a new heading.
    #[serde(default)]
    pub append_as_header: bool,
    /// Offer a "create new document" entry for unmatched queries.
    #[serde(default)]
    pub show_add_new_note: bool,
    /// Folder new documents are created in. Empty means the store root.
    #[serde(default)]
    pub add_new_note_directory: String,
    /// Template document (without extension) used for new documents.
    #[serde(default)]
    pub add_new_note_template: String,
    /// Keep the trigger symbol as a prefix of new document file names.
    #[serde(default)]
    pub retain_symbol_in_filename: bool,
    /// Number of embedded spaces tolerated in a query before the session
    /// closes. A leading space always closes regardless of this value.
    #[serde(default)]
    pub leave_popup_open_for_x_spaces: usize,
    /// Characters that end a session when typed into the query. Backslash is
    /// always rejected and space always accepted, independent of this.
    #[serde(default = "default_invalid_character_regex")]
    pub invalid_character_regex: String,
    #[serde(default = "default_invalid_character_regex_flags")]
    pub invalid_character_regex_flags: String,
    /// Accept letters outside ASCII as query characters.
    #[serde(default = "default_unicode_letters")]
    pub unicode_letters: bool,
    /// Match accent-insensitively. Inserted text keeps original accents.
    #[serde(default = "default_remove_accents")]
    pub remove_accents: bool,
    /// Fenced code block language tags inside which triggering stays enabled.
    #[serde(default)]
    pub allowed_code_block_types: Vec<String>,
    /// chrono format strings for the `{{date}}` / `{{time}}` template
    /// variables.
    #[serde(default = "default_date_format")]
    pub date_format: String,
    #[serde(default = "default_time_format")]
    pub time_format: String,
    /// When enabled the application initialises the logger at debug level.
    #[serde(default)]
    pub debug_logging: bool,
}

fn default_trigger_symbol() -> char {
    '@'
}

fn default_include_symbol() -> bool {
    true
}

fn default_invalid_character_regex() -> String {
    DEFAULT_INVALID_CHAR_REGEX.to_string()
}

fn default_invalid_character_regex_flags() -> String {
    "i".to_string()
}

fn default_unicode_letters() -> bool {
    true
}

fn default_remove_accents() -> bool {
    true
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_time_format() -> String {
    "%H:%M".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            trigger_symbol: default_trigger_symbol(),
            include_symbol: default_include_symbol(),
            limit_to_directories: Vec::new(),
            limit_to_file: Vec::new(),
            header_level: 0,
            append_as_header: false,
            show_add_new_note: false,
            add_new_note_directory: String::new(),
            add_new_note_template: String::new(),
            retain_symbol_in_filename: false,
            leave_popup_open_for_x_spaces: 0,
            invalid_character_regex: default_invalid_character_regex(),
            invalid_character_regex_flags: default_invalid_character_regex_flags(),
            unicode_letters: default_unicode_letters(),
            remove_accents: default_remove_accents(),
            allowed_code_block_types: Vec::new(),
            date_format: default_date_format(),
            time_format: default_time_format(),
            debug_logging: false,
        }
    }
}

/// The folder restriction bound to the symbol that opened the current
/// session. Resolved once at session open and immutable for the session's
/// lifetime; configuration changes replace the controller wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerScope {
    Folders {
        symbol: char,
        /// Folder path prefixes candidates must live under. Empty means
        /// unrestricted.
        folders: Vec<String>,
        is_global: bool,
    },
    /// Header-scoped mode: candidates are the headings of these documents.
    Documents { symbol: char, paths: Vec<String> },
}

impl TriggerScope {
    pub fn symbol(&self) -> char {
        match self {
            TriggerScope::Folders { symbol, .. } => *symbol,
            TriggerScope::Documents { symbol, .. } => *symbol,
        }
    }
}

impl Settings {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Resolve the scope opened by typing `typed`, or `None` when the
    /// character is not a trigger symbol. Bindings are evaluated in
    /// configured order and the first kind that matches wins, so duplicate
    /// symbols resolve deterministically.
    pub fn resolve_scope(&self, typed: char) -> Option<TriggerScope> {
        // A symbol bound to single documents selects header-scoped mode.
        let doc_paths: Vec<String> = self
            .limit_to_file
            .iter()
            .filter(|b| !b.path.trim().is_empty())
            .filter(|b| b.trigger_symbol.unwrap_or(self.trigger_symbol) == typed)
            .map(|b| b.path.clone())
            .collect();
        if !doc_paths.is_empty() {
            return Some(TriggerScope::Documents {
                symbol: typed,
                paths: doc_paths,
            });
        }

        if typed == self.trigger_symbol {
            // Folders bound to the global symbol, or to no symbol at all,
            // restrict the global trigger. If every folder carries some
            // other symbol the global trigger stays unrestricted.
            let folders: Vec<String> = self
                .limit_to_directories
                .iter()
                .filter(|b| !b.path.trim().is_empty())
                .filter(|b| b.trigger_symbol.is_none() || b.trigger_symbol == Some(typed))
                .map(|b| b.path.clone())
                .collect();
            return Some(TriggerScope::Folders {
                symbol: typed,
                folders,
                is_global: true,
            });
        }

        let folders: Vec<String> = self
            .limit_to_directories
            .iter()
            .filter(|b| !b.path.trim().is_empty())
            .filter(|b| b.trigger_symbol == Some(typed))
            .map(|b| b.path.clone())
            .collect();
        if folders.is_empty() {
            return None;
        }
        Some(TriggerScope::Folders {
            symbol: typed,
            folders,
            is_global: false,
        })
    }

    /// All configured trigger symbols, global first.
    pub fn all_trigger_symbols(&self) -> Vec<char> {
        let mut symbols = vec![self.trigger_symbol];
        for binding in self.limit_to_directories.iter().chain(&self.limit_to_file) {
            if let Some(sym) = binding.trigger_symbol {
                if !symbols.contains(&sym) {
                    symbols.push(sym);
                }
            }
        }
        symbols
    }

    /// Whether `ch` may extend an open query. Space is always accepted and
    /// backslash always rejected; everything else is checked against the
    /// configured invalid-character pattern.
    pub fn is_valid_query_char(&self, ch: char) -> bool {
        if ch == ' ' {
            return true;
        }
        if ch == '\\' || ch.is_control() {
            return false;
        }
        if ch.is_alphabetic() && !ch.is_ascii() && !self.unicode_letters {
            return false;
        }
        let mut buf = [0u8; 4];
        !self.invalid_char_regex().is_match(ch.encode_utf8(&mut buf))
    }

    /// Compiled invalid-character pattern. An unparseable configured pattern
    /// is logged and replaced by the default rather than rejected.
    pub fn invalid_char_regex(&self) -> Regex {
        let case_insensitive = self.invalid_character_regex_flags.contains('i');
        match RegexBuilder::new(&self.invalid_character_regex)
            .case_insensitive(case_insensitive)
            .build()
        {
            Ok(re) => re,
            Err(err) => {
                tracing::warn!(
                    pattern = %self.invalid_character_regex,
                    error = %err,
                    "invalid character regex does not parse; using default"
                );
                DEFAULT_INVALID_CHARS.clone()
            }
        }
    }

    /// Folders eligible as creation targets under `scope`: the configured
    /// new-note directory plus every folder restricting the active scope.
    pub fn creation_folders(&self, scope: &TriggerScope) -> Vec<String> {
        let mut out = Vec::new();
        let configured = self.add_new_note_directory.trim();
        if !configured.is_empty() {
            out.push(configured.trim_end_matches('/').to_string());
        }
        if let TriggerScope::Folders { folders, .. } = scope {
            for folder in folders {
                let folder = folder.trim_end_matches('/').to_string();
                if !out.contains(&folder) {
                    out.push(folder);
                }
            }
        }
        if out.is_empty() {
            // Root of the store.
            out.push(String::new());
        }
        out
    }
}
