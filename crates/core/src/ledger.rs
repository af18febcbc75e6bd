//! # Ledger Module
//!
//! Định nghĩa Ledger - sổ chi tiêu chung có một người tạo và nhiều người tham gia.
//! Creator luôn được tính là participant kể cả khi không có dòng liên kết.

use crate::id::{LedgerId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Storage format for full timestamps (UTC).
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Storage format for calendar dates (UTC).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A shared ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    pub id: LedgerId,
    pub creator_id: UserId,
    pub name: String,
    /// Creation time exactly as stored, normally `YYYY-MM-DD HH:MM:SS`
    pub create_time: String,
}

impl Ledger {
    /// Tên hiển thị dạng "MM-YY" của tháng tạo
    pub fn creation_month(&self) -> String {
        creation_month(&self.create_time)
    }
}

impl fmt::Display for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// Render a stored timestamp as `MM-YY`.
///
/// Looks only at the first seven characters, which must read `YYYY-MM` with
/// the dash at position 5. Anything else renders as an empty string.
pub fn creation_month(stored: &str) -> String {
    let head: Vec<char> = stored.trim().chars().take(7).collect();
    if head.len() != 7 || head[4] != '-' {
        return String::new();
    }

    let month: String = head[5..7].iter().collect();
    let year: String = head[2..4].iter().collect();
    format!("{}-{}", month, year)
}

/// Returns the caller's ledger name unless it is absent or blank.
pub fn requested_name(name: Option<&str>) -> Option<&str> {
    name.filter(|n| !n.trim().is_empty())
}

/// Default name for a ledger created without one.
pub fn default_ledger_name(creator_name: &str, date: NaiveDate) -> String {
    format!("{} 的账本 {}", creator_name, date.format(DATE_FORMAT))
}

/// Creation timestamp text for `now`.
pub fn format_create_time(now: DateTime<Utc>) -> String {
    now.format(DATETIME_FORMAT).to_string()
}
