//! Turns user intents into repository calls and repository state into
//! something a front end can draw.

use crate::clock::{Clock, RandomSource, SystemClock, ThreadRandom};
use crate::diary_entry::{format_timestamp_in, DiaryEntry};
use crate::diary_state::DiaryState;
use crate::error::{DiaryError, Result};
use crate::storage::KeyValueStore;
use chrono::{Local, TimeZone};
use std::fmt::{Display, Write as _};
use tracing::{error, warn};

pub const EMPTY_PLACEHOLDER: &str = "No entries yet. Write your first one!";
pub const CONFIRM_DELETE: &str = "Delete this entry? This cannot be undone.";
pub const CONFIRM_CLEAR: &str = "Delete ALL entries? This cannot be undone.";

/// Asks the user to approve a destructive action.
///
/// `Ok(false)` covers both an explicit "no" and a dismissed prompt.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> Result<bool>;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        Ok(self(prompt))
    }
}

/// Outcome of a user intent, worded for a transient notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Saved { title: String },
    Deleted,
    NotFound,
    Cleared,
    Cancelled,
    EmptyContent,
    StorageError(String),
}

impl Notice {
    pub fn message(&self) -> String {
        match self {
            Notice::Saved { title } => format!("Saved \"{title}\""),
            Notice::Deleted => "Entry deleted".to_string(),
            Notice::NotFound => "That entry no longer exists".to_string(),
            Notice::Cleared => "All entries cleared".to_string(),
            Notice::Cancelled => "Cancelled".to_string(),
            Notice::EmptyContent => "Write something before saving".to_string(),
            Notice::StorageError(reason) => format!("Storage error: {reason}"),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::EmptyContent | Notice::StorageError(_))
    }
}

impl Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

/// One entry, ready to draw. Every user-written string here is already
/// escaped; `id` is kept verbatim for routing delete requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryView {
    pub id: String,
    pub title: String,
    pub content: String,
    pub timestamp: String,
}

impl EntryView {
    fn from_entry<Tz>(entry: &DiaryEntry, tz: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        EntryView {
            id: entry.id.clone(),
            title: escape_line(entry.display_title()),
            content: escape_display(&entry.content),
            timestamp: format_timestamp_in(entry.timestamp, tz),
        }
    }

    pub fn preview(&self) -> &str {
        self.content.lines().next().unwrap_or("")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiaryView {
    pub entries: Vec<EntryView>,
    pub storage_warning: Option<String>,
}

impl DiaryView {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Message to show in place of the list, if there is nothing to list.
    pub fn placeholder(&self) -> Option<&'static str> {
        self.is_empty().then_some(EMPTY_PLACEHOLDER)
    }
}

pub struct DiaryController<S, C = SystemClock, R = ThreadRandom> {
    state: DiaryState<S, C, R>,
}

impl<S, C, R> DiaryController<S, C, R>
where
    S: KeyValueStore,
    C: Clock,
    R: RandomSource,
{
    pub fn new(state: DiaryState<S, C, R>) -> Self {
        DiaryController { state }
    }

    pub fn state(&self) -> &DiaryState<S, C, R> {
        &self.state
    }

    pub fn view(&self) -> DiaryView {
        self.view_in(&Local)
    }

    /// Builds the view with timestamps rendered in `tz`.
    ///
    /// Unreadable storage shows as an empty list with a warning attached.
    pub fn view_in<Tz>(&self, tz: &Tz) -> DiaryView
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        match self.state.list_all() {
            Ok(entries) => DiaryView {
                entries: entries.iter().map(|e| EntryView::from_entry(e, tz)).collect(),
                storage_warning: None,
            },
            Err(e) => {
                warn!(error = %e, "showing an empty diary because storage could not be read");
                DiaryView {
                    entries: Vec::new(),
                    storage_warning: Some(e.to_string()),
                }
            }
        }
    }

    pub fn save(&mut self, title: &str, content: &str) -> Notice {
        match self.state.add_entry(title, content) {
            Ok(entry) => Notice::Saved {
                title: escape_line(entry.display_title()),
            },
            Err(DiaryError::EmptyContent) => Notice::EmptyContent,
            Err(e) => storage_failure("save", e),
        }
    }

    pub fn delete(&mut self, id: &str, confirm: &mut impl Confirm) -> Result<Notice> {
        if !confirm.confirm(CONFIRM_DELETE)? {
            return Ok(Notice::Cancelled);
        }
        Ok(match self.state.delete_entry(id) {
            Ok(true) => Notice::Deleted,
            Ok(false) => Notice::NotFound,
            Err(e) => storage_failure("delete", e),
        })
    }

    pub fn clear_all(&mut self, confirm: &mut impl Confirm) -> Result<Notice> {
        if !confirm.confirm(CONFIRM_CLEAR)? {
            return Ok(Notice::Cancelled);
        }
        Ok(match self.state.clear_all() {
            Ok(()) => Notice::Cleared,
            Err(e) => storage_failure("clear", e),
        })
    }
}

fn storage_failure(action: &str, e: DiaryError) -> Notice {
    error!(error = %e, action, "diary operation failed");
    Notice::StorageError(e.to_string())
}

/// Makes user text safe to print to a terminal.
///
/// Newlines and tabs survive; every other control character is shown in
/// caret (`^[`) or `<U+XXXX>` form so it cannot start an escape sequence.
pub fn escape_display(text: &str) -> String {
    escape(text, true)
}

/// Like [`escape_display`], but folds line breaks and tabs into spaces.
pub fn escape_line(text: &str) -> String {
    escape(text, false)
}

fn escape(text: &str, multiline: bool) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' if multiline => out.push('\n'),
            '\t' if multiline => out.push('\t'),
            '\n' | '\r' | '\t' => out.push(' '),
            '\u{0}'..='\u{1f}' | '\u{7f}' => {
                out.push('^');
                out.push(char::from((c as u8) ^ 0x40));
            }
            '\u{80}'..='\u{9f}' => {
                let _ = write!(out, "<U+{:04X}>", c as u32);
            }
            _ => out.push(c),
        }
    }
    out
}
