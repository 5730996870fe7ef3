use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BookStatus {
    WantToRead,
    Reading,
    Finished,
}

impl BookStatus {
    pub const ALL: [BookStatus; 3] = [
        BookStatus::WantToRead,
        BookStatus::Reading,
        BookStatus::Finished,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::WantToRead => "wantToRead",
            BookStatus::Reading => "reading",
            BookStatus::Finished => "finished",
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, BookStatus::Finished)
    }
}

impl Display for BookStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid status: {0}")]
pub struct InvalidStatus(pub String);

impl FromStr for BookStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BookStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| InvalidStatus(s.to_string()))
    }
}

/// Requested status, `Remove` deletes the record altogether
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTarget {
    Set(BookStatus),
    Remove,
}

impl StatusTarget {
    pub const REMOVE: &'static str = "remove";
}

impl FromStr for StatusTarget {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == StatusTarget::REMOVE {
            Ok(StatusTarget::Remove)
        } else {
            s.parse().map(StatusTarget::Set)
        }
    }
}

impl Display for StatusTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusTarget::Set(status) => status.fmt(f),
            StatusTarget::Remove => f.write_str(StatusTarget::REMOVE),
        }
    }
}

/// Month (0-based, as in 0 = January) and year when a book was finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FinishDate {
    pub month: i32,
    pub year: i32,
}

impl FinishDate {
    pub fn new(month: i32, year: i32) -> Self {
        FinishDate { month, year }
    }

    /// Strictly later than given year and month
    pub fn is_after(&self, year: i32, month: i32) -> bool {
        (self.year, self.month) > (year, month)
    }
}
