//! Shape and range checks of incoming change requests.
//!
//! Each request is a garde validated struct, fields declared in the order they are checked.
//! Only the first violation is reported, as [`ValidationError`], and on success a typed
//! change is returned, which is what the reading record manager accepts.

use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::{
    error::ValidationError,
    reading::{BookStatus, FinishDate, StatusTarget},
};

fn is_valid_status(status: &str, _ctx: &()) -> garde::Result {
    status
        .parse::<StatusTarget>()
        .map(|_| ())
        .map_err(|_| garde::Error::new("must be one of finished, wantToRead, reading, remove"))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StatusChangeRequest {
    #[garde(required, length(min = 6, max = 1024))]
    pub book_id: Option<String>,
    #[garde(required, inner(custom(is_valid_status)))]
    pub status: Option<String>,
    // Ranges are not checked here, only the finish date change checks them
    #[garde(skip)]
    pub month: Option<i32>,
    #[garde(skip)]
    pub year: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ScoreChangeRequest {
    #[garde(required, length(min = 6, max = 1024))]
    pub book_id: Option<String>,
    #[garde(required, range(min = 0.0, max = 5.0))]
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FinishDateChangeRequest {
    #[garde(required, length(min = 6, max = 1024))]
    pub book_id: Option<String>,
    #[garde(required, range(min = 0, max = 11))]
    pub month: Option<i32>,
    #[garde(required, range(min = 1900))]
    pub year: Option<i32>,
}

/// Reread carries the same data as finish date change
pub type RereadRequest = FinishDateChangeRequest;

#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange {
    pub book_id: String,
    pub target: StatusTarget,
    pub finish_date: Option<FinishDate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreChange {
    pub book_id: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DateChange {
    pub book_id: String,
    pub date: FinishDate,
}

fn required<T: Clone>(value: &Option<T>, field: &str) -> Result<T, ValidationError> {
    value
        .clone()
        .ok_or_else(|| ValidationError::new(field, "not set"))
}

pub fn validate_status_change(request: &StatusChangeRequest) -> Result<StatusChange, ValidationError> {
    request.validate()?;
    let book_id = required(&request.book_id, "bookId")?;
    let target: StatusTarget = required(&request.status, "status")?
        .parse()
        .map_err(|e: crate::reading::InvalidStatus| ValidationError::new("status", e.to_string()))?;
    // Date is meaningful only for finished, otherwise it is ignored
    if target != StatusTarget::Set(BookStatus::Finished) {
        return Ok(StatusChange {
            book_id,
            target,
            finish_date: None,
        });
    }
    let finish_date = match (request.month, request.year) {
        (Some(month), Some(year)) => Some(FinishDate::new(month, year)),
        (None, None) => None,
        (Some(_), None) => {
            return Err(ValidationError::new(
                "year",
                "month and year must be given together",
            ))
        }
        (None, Some(_)) => {
            return Err(ValidationError::new(
                "month",
                "month and year must be given together",
            ))
        }
    };
    Ok(StatusChange {
        book_id,
        target,
        finish_date,
    })
}

pub fn validate_score_change(request: &ScoreChangeRequest) -> Result<ScoreChange, ValidationError> {
    request.validate()?;
    Ok(ScoreChange {
        book_id: required(&request.book_id, "bookId")?,
        score: required(&request.score, "score")?,
    })
}

pub fn validate_finish_date_change(
    request: &FinishDateChangeRequest,
) -> Result<DateChange, ValidationError> {
    request.validate()?;
    Ok(DateChange {
        book_id: required(&request.book_id, "bookId")?,
        date: FinishDate::new(
            required(&request.month, "month")?,
            required(&request.year, "year")?,
        ),
    })
}

pub fn validate_reread(request: &RereadRequest) -> Result<DateChange, ValidationError> {
    validate_finish_date_change(request)
}
