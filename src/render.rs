//! Projection of the entry collection into display blocks.
//!
//! Pure and deterministic: the same entries and offset always give the same
//! output. Ordering is newest first; the collection itself stays in creation
//! order.

use std::borrow::Cow;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use time::{macros::format_description, OffsetDateTime, UtcOffset};

use crate::journal::Entry;

pub const EMPTY_PLACEHOLDER: &str = "No logs available. Create a new log to get started.";

// CSI and OSC sequences first so their parameter bytes go with them, then any
// remaining C0/C1 control character except tab and newline.
static TERMINAL_CONTROL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\x1b\[[0-?]*[ -/]*[@-~]|\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)?|[\x00-\x08\x0b-\x1f\x7f\x{80}-\x{9f}]")
        .expect("terminal control pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryBlock {
    pub title: String,
    pub date: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    Placeholder(&'static str),
    Blocks(Vec<EntryBlock>),
}

impl Rendered {
    pub fn blocks(&self) -> &[EntryBlock] {
        match self {
            Rendered::Placeholder(_) => &[],
            Rendered::Blocks(blocks) => blocks,
        }
    }
}

impl fmt::Display for Rendered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rendered::Placeholder(text) => writeln!(f, "{text}"),
            Rendered::Blocks(blocks) => {
                for (idx, block) in blocks.iter().enumerate() {
                    if idx > 0 {
                        writeln!(f)?;
                    }
                    writeln!(f, "{}  [{}]", block.title, block.date)?;
                    writeln!(f, "{}", block.body.trim_end())?;
                }
                Ok(())
            }
        }
    }
}

pub fn render(entries: &[Entry], offset: UtcOffset) -> Rendered {
    if entries.is_empty() {
        return Rendered::Placeholder(EMPTY_PLACEHOLDER);
    }
    let blocks = entries
        .iter()
        .rev()
        .map(|entry| EntryBlock {
            title: sanitize(&entry.title).into_owned(),
            date: format_date(entry.created_at, offset),
            body: sanitize(&entry.body).into_owned(),
        })
        .collect();
    Rendered::Blocks(blocks)
}

/// Day/month/year, zero padded.
pub fn format_date(dt: OffsetDateTime, offset: UtcOffset) -> String {
    let format = format_description!("[day]/[month]/[year]");
    dt.to_offset(offset)
        .format(&format)
        .unwrap_or_else(|_| dt.date().to_string())
}

/// Strips escape sequences and control characters so stored text cannot
/// drive the terminal. Everything else, markup included, is kept verbatim.
pub fn sanitize(text: &str) -> Cow<'_, str> {
    TERMINAL_CONTROL.replace_all(text, "")
}
