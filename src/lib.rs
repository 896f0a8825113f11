//! Symbol-triggered document linking: typing a configured trigger character
//! opens a suggestion session over the host's document store, fuzzy-matches
//! the typed query against document names and aliases, and on selection
//! replaces the triggered span with generated link text.
//!
//! The host supplies the editing surface, document store, popup rendering
//! and link syntax through the traits in [`editor`], [`store`] and
//! [`session`]; everything else lives here.

pub mod candidates;
pub mod editor;
pub mod highlight;
pub mod logging;
pub mod normalize;
pub mod ranker;
pub mod resolver;
pub mod session;
pub mod settings;
pub mod store;
