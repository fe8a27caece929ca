//! Per-item change history
//!
//! Each item owns at most one history row. The row keeps five parallel
//! columns (names, statuses, comments, dates, users), each a `;`-joined
//! list. Entry `i` is the `i`-th segment of every column, so the five
//! lists must always have the same length.

use crate::{Error, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Separator between entries inside a history column
pub const ENTRY_SEPARATOR: char = ';';

/// Timestamp format used in the `dates` column
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One change, read across the five columns at the same index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub name: String,
    pub status: String,
    pub comment: String,
    pub date: String,
    pub user: String,
}

impl HistoryEntry {
    pub fn new(
        name: impl Into<String>,
        status: impl Into<String>,
        comment: impl Into<String>,
        date: impl Into<String>,
        user: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            status: status.into(),
            comment: comment.into(),
            date: date.into(),
            user: user.into(),
        }
    }

    /// Entry stamped with the given instant
    pub fn at(
        when: DateTime<Utc>,
        name: impl Into<String>,
        status: impl Into<String>,
        comment: impl Into<String>,
        user: impl Into<String>,
    ) -> Self {
        Self::new(name, status, comment, format_date(when), user)
    }

    /// Parse the stored date, if it is in the expected format
    pub fn parsed_date(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.date, DATE_FORMAT).ok()
    }

    /// An entry with every field blank would not survive a round trip
    pub fn check(&self) -> Result<()> {
        let blank = [&self.name, &self.status, &self.comment, &self.date, &self.user]
            .iter()
            .all(|f| f.is_empty());
        if blank {
            return Err(Error::InvalidInput("history entry has no fields".to_string()));
        }
        Ok(())
    }

    /// Copy with separators replaced so every field stays a single segment
    fn sanitized(&self) -> Self {
        Self {
            name: sanitize(&self.name),
            status: sanitize(&self.status),
            comment: sanitize(&self.comment),
            date: sanitize(&self.date),
            user: sanitize(&self.user),
        }
    }
}

pub fn format_date(when: DateTime<Utc>) -> String {
    when.format(DATE_FORMAT).to_string()
}

fn sanitize(field: &str) -> String {
    field.replace(ENTRY_SEPARATOR, ",")
}

/// The stored history row for one item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub item_id: i64,
    pub names: String,
    pub statuses: String,
    pub comments: String,
    pub dates: String,
    pub users: String,
}

impl HistoryRecord {
    /// Empty record for an item
    pub fn empty(item_id: i64) -> Self {
        Self {
            item_id,
            ..Default::default()
        }
    }

    /// Number of entries, checked against all five columns.
    ///
    /// A single entry whose field was empty leaves that column as `""`, so
    /// an empty column next to one-entry columns counts as one entry.
    pub fn len(&self) -> Result<usize> {
        let lens = self.column_lengths();
        let n = lens.iter().copied().max().unwrap_or(0);
        if lens.iter().any(|&l| l != n && !(l == 0 && n == 1)) {
            return Err(Error::CorruptHistory {
                item_id: self.item_id,
                reason: format!(
                    "column lengths differ (names={}, statuses={}, comments={}, dates={}, users={})",
                    lens[0], lens[1], lens[2], lens[3], lens[4]
                ),
            });
        }
        Ok(n)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
            && self.statuses.is_empty()
            && self.comments.is_empty()
            && self.dates.is_empty()
            && self.users.is_empty()
    }

    /// Split the five columns and zip them, oldest first
    pub fn entries(&self) -> Result<Vec<HistoryEntry>> {
        let n = self.len()?;
        let names = split_column(&self.names, n);
        let statuses = split_column(&self.statuses, n);
        let comments = split_column(&self.comments, n);
        let dates = split_column(&self.dates, n);
        let users = split_column(&self.users, n);

        let entries = names
            .into_iter()
            .zip(statuses)
            .zip(comments)
            .zip(dates)
            .zip(users)
            .map(|((((name, status), comment), date), user)| {
                HistoryEntry::new(name, status, comment, date, user)
            })
            .collect();
        Ok(entries)
    }

    /// Append one entry to every column
    pub fn push(&mut self, entry: &HistoryEntry) -> Result<()> {
        entry.check()?;
        let was_empty = self.len()? == 0;
        let entry = entry.sanitized();
        append_segment(&mut self.names, &entry.name, was_empty);
        append_segment(&mut self.statuses, &entry.status, was_empty);
        append_segment(&mut self.comments, &entry.comment, was_empty);
        append_segment(&mut self.dates, &entry.date, was_empty);
        append_segment(&mut self.users, &entry.user, was_empty);
        Ok(())
    }

    /// Most recent entry
    pub fn latest(&self) -> Result<Option<HistoryEntry>> {
        Ok(self.entries()?.pop())
    }

    fn column_lengths(&self) -> [usize; 5] {
        [
            segment_count(&self.names),
            segment_count(&self.statuses),
            segment_count(&self.comments),
            segment_count(&self.dates),
            segment_count(&self.users),
        ]
    }
}

/// Sanitized segments of an entry, in column order, for SQL-side appends
pub(crate) fn entry_segments(entry: &HistoryEntry) -> [String; 5] {
    let e = entry.sanitized();
    [e.name, e.status, e.comment, e.date, e.user]
}

fn segment_count(column: &str) -> usize {
    if column.is_empty() {
        0
    } else {
        column.matches(ENTRY_SEPARATOR).count() + 1
    }
}

fn split_column(column: &str, entries: usize) -> Vec<String> {
    if column.is_empty() {
        vec![String::new(); entries]
    } else {
        column.split(ENTRY_SEPARATOR).map(str::to_string).collect()
    }
}

fn append_segment(column: &mut String, segment: &str, was_empty: bool) {
    if !was_empty {
        column.push(ENTRY_SEPARATOR);
    }
    column.push_str(segment);
}
