//! A local, single-user diary.
//!
//! Entries are kept as one JSON array under a single storage key
//! ([`storage`]), queried and mutated through [`diary_state::DiaryState`],
//! and presented by [`controller::DiaryController`] to either the terminal
//! UI ([`ui`]) or the command-line handlers ([`cli`]).

pub mod cli;
pub mod clock;
pub mod config;
pub mod controller;
pub mod diary_entry;
pub mod diary_state;
pub mod error;
pub mod storage;
pub mod ui;

pub use controller::{Confirm, DiaryController, DiaryView, EntryView, Notice};
pub use diary_entry::DiaryEntry;
pub use diary_state::DiaryState;
pub use error::{DiaryError, Result};
pub use storage::{DiaryStorage, FileStore, KeyValueStore, MemoryStore};
