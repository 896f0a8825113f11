//! Selection resolution: create the target document when asked, compose the
//! link text, and compute the exact replacement span.
//!
//! Every failure path degrades to "no buffer mutation" plus a notice; the
//! caller decides whether the session survives.

use chrono::format::{Item, StrftimeItems};
use chrono::Local;
use tracing::warn;

use crate::editor::{LinkFormatter, Position};
use crate::ranker::RankedSuggestion;
use crate::settings::Settings;
use crate::store::{basename_of, CreateError, DocumentStore};

/// User-visible notices. Hosts surface these however they like.
pub trait Notifier {
    fn notify(&self, message: &str);
}

/// Logs notices through the tracing subscriber.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str) {
        warn!(message, "user notice");
    }
}

/// The buffer mutation produced by a successful selection: replace the span
/// from the trigger character to the cursor with `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub text: String,
    pub from: Position,
    pub to: Position,
}

#[derive(Debug)]
pub enum ResolveError {
    /// A document already exists at the creation path.
    CreateConflict,
    /// The configured template could not be read.
    TemplateUnavailable,
    CreateFailed(anyhow::Error),
    AppendFailed(anyhow::Error),
}

/// Resolve `chosen` into a replacement. Performs document creation or
/// heading append first when the record is a create-new entry; any failure
/// there aborts the selection before the buffer is touched.
#[allow(clippy::too_many_arguments)]
pub fn resolve(
    chosen: &RankedSuggestion,
    trigger_symbol: char,
    anchor: Position,
    cursor: Position,
    source_path: &str,
    settings: &Settings,
    store: &mut dyn DocumentStore,
    links: &dyn LinkFormatter,
    notifier: &dyn Notifier,
) -> Result<Replacement, ResolveError> {
    let record = &chosen.record;
    let mut created_name: Option<String> = None;

    if record.is_create_new {
        if record.heading.is_some() {
            append_heading(record.creation_query.as_deref().unwrap_or(""), record, settings, store, notifier)?;
        } else {
            create_document(record, settings, store, notifier)?;
            created_name = record.creation_query.clone();
        }
    }

    let mut alias = record
        .display_alias
        .clone()
        .or(created_name)
        .unwrap_or_else(|| record.display_name.clone());
    if settings.include_symbol {
        alias = format!("{trigger_symbol}{alias}");
    }

    let mut text = links.format_link(
        &record.target_path,
        source_path,
        record.heading.as_deref(),
        &alias,
    );
    // Host link generators may emit multi-line output for some path edge
    // cases; the inserted text must stay on one line.
    if text.contains('\n') {
        text = text.replace('\n', "");
    }

    Ok(Replacement {
        text,
        // The span swallows the trigger character; the anchor sits one
        // character past it.
        from: Position::new(anchor.line, anchor.ch.saturating_sub(1)),
        to: cursor,
    })
}

fn create_document(
    record: &crate::candidates::CandidateRecord,
    settings: &Settings,
    store: &mut dyn DocumentStore,
    notifier: &dyn Notifier,
) -> Result<(), ResolveError> {
    let mut content = String::new();
    let template = settings.add_new_note_template.trim();
    if !template.is_empty() {
        match store.read(&format!("{template}.md")) {
            Ok(raw) => content = render_template(&raw, &basename_of(&record.target_path), settings),
            Err(err) => {
                notifier.notify(&format!(
                    "Unable to read template at path: {template}.md"
                ));
                warn!(template, error = %err, "template read failed");
                return Err(ResolveError::TemplateUnavailable);
            }
        }
    }

    match store.create(&record.target_path, &content) {
        Ok(_) => Ok(()),
        Err(CreateError::AlreadyExists) => {
            notifier.notify(&format!(
                "A document already exists at path: {}",
                record.target_path
            ));
            Err(ResolveError::CreateConflict)
        }
        Err(CreateError::Other(err)) => {
            notifier.notify(&format!(
                "Unable to create new document at path: {}",
                record.target_path
            ));
            Err(ResolveError::CreateFailed(err))
        }
    }
}

/// Header-scoped create: append `query` as a new heading to the bound
/// document.
fn append_heading(
    query: &str,
    record: &crate::candidates::CandidateRecord,
    settings: &Settings,
    store: &mut dyn DocumentStore,
    notifier: &dyn Notifier,
) -> Result<(), ResolveError> {
    let content = match store.read(&record.target_path) {
        Ok(content) => content,
        Err(err) => {
            notifier.notify(&format!(
                "Unable to open the document at path: {}",
                record.target_path
            ));
            return Err(ResolveError::AppendFailed(err));
        }
    };
    let level = settings.header_level.max(1) as usize;
    let heading_line = format!("{} {query}\n", "#".repeat(level));
    let updated = if content.is_empty() || content.ends_with('\n') {
        format!("{content}{heading_line}")
    } else {
        format!("{content}\n{heading_line}")
    };
    store.write(&record.target_path, &updated).map_err(|err| {
        notifier.notify(&format!(
            "Unable to update the document at path: {}",
            record.target_path
        ));
        ResolveError::AppendFailed(err)
    })
}

/// Substitute `{{title}}`, `{{date}}` and `{{time}}` in template content.
pub fn render_template(content: &str, title: &str, settings: &Settings) -> String {
    if content.is_empty() {
        return String::new();
    }
    content
        .replace("{{date}}", &format_now(&settings.date_format, "%Y-%m-%d"))
        .replace("{{time}}", &format_now(&settings.time_format, "%H:%M"))
        .replace("{{title}}", title)
}

/// Format the current local time, falling back when the configured format
/// string does not parse.
fn format_now(format: &str, fallback: &str) -> String {
    let invalid = StrftimeItems::new(format).any(|item| matches!(item, Item::Error));
    if invalid {
        warn!(format, "invalid date/time format; using default");
        return Local::now().format(fallback).to_string();
    }
    Local::now().format(format).to_string()
}
