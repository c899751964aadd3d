use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub const UNTITLED: &str = "untitled";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

const ID_SUFFIX_LEN: usize = 8;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// One journal record. Immutable once saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiaryEntry {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub content: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl DiaryEntry {
    pub fn new(id: String, title: String, content: String, timestamp: i64) -> Self {
        DiaryEntry {
            id,
            title,
            content,
            timestamp,
        }
    }

    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            UNTITLED
        } else {
            &self.title
        }
    }

    pub fn formatted_timestamp(&self) -> String {
        format_timestamp_in(self.timestamp, &Local)
    }
}

/// Formats epoch milliseconds as `YYYY-MM-DD HH:MM` in the given zone.
pub fn format_timestamp_in<Tz>(timestamp: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match DateTime::from_timestamp_millis(timestamp) {
        Some(utc) => utc.with_timezone(tz).format(TIMESTAMP_FORMAT).to_string(),
        None => "????-??-?? ??:??".to_string(),
    }
}

/// Builds an entry id from the creation time and a random value:
/// `<timestamp base36>-<8 base36 chars>`.
pub fn make_entry_id(timestamp: i64, random: u64) -> String {
    let mut suffix = to_base36(random);
    if suffix.len() < ID_SUFFIX_LEN {
        suffix = format!("{:0>width$}", suffix, width = ID_SUFFIX_LEN);
    }
    suffix.truncate(ID_SUFFIX_LEN);
    format!("{}-{}", to_base36(timestamp.max(0) as u64), suffix)
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}
