use futures::TryStreamExt as _;
use readlog_types::reading::{BookStatus, FinishDate};
use serde::{Deserialize, Serialize};
use sqlx::{Pool, QueryBuilder, Row as _};
use tracing::debug;

use crate::{ChosenDB, ChosenRow, Error, error::Result};

const COLUMNS: &str = "user_id, book_id, status, score, month_finished, year_finished, rereads";

/// One additional completion of a book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reread {
    pub month: Option<i32>,
    pub year: Option<i32>,
}

impl From<FinishDate> for Reread {
    fn from(date: FinishDate) -> Self {
        Reread {
            month: Some(date.month),
            year: Some(date.year),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingRecord {
    pub user_id: i64,
    pub book_id: String,
    pub status: BookStatus,
    pub score: f64,
    pub month_finished: Option<i32>,
    pub year_finished: Option<i32>,
    pub rereads: Vec<Reread>,
}

impl ReadingRecord {
    pub fn finish_date(&self) -> Option<FinishDate> {
        match (self.month_finished, self.year_finished) {
            (Some(month), Some(year)) => Some(FinishDate::new(month, year)),
            _ => None,
        }
    }
}

impl sqlx::FromRow<'_, ChosenRow> for ReadingRecord {
    fn from_row(row: &ChosenRow) -> Result<Self, sqlx::Error> {
        let status: String = row.try_get("status")?;
        let status = status
            .parse::<BookStatus>()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        let rereads: String = row.try_get("rereads")?;
        let rereads = serde_json::from_str::<Vec<Reread>>(&rereads)
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        Ok(ReadingRecord {
            user_id: row.try_get("user_id")?,
            book_id: row.try_get("book_id")?,
            status,
            score: row.try_get("score")?,
            month_finished: row.try_get("month_finished")?,
            year_finished: row.try_get("year_finished")?,
            rereads,
        })
    }
}

/// Record as created by first status change, score starts at 0 and there are no rereads
#[derive(Debug, Clone, PartialEq)]
pub struct NewReadingRecord {
    pub user_id: i64,
    pub book_id: String,
    pub status: BookStatus,
    pub finish_date: Option<FinishDate>,
}

/// Partial update of a record, fields left as `None` are not touched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordPatch {
    pub status: Option<BookStatus>,
    pub score: Option<f64>,
    /// `Some(None)` clears the finish date
    pub finish_date: Option<Option<FinishDate>>,
    /// Appended to the end of rereads
    pub reread: Option<Reread>,
}

impl RecordPatch {
    pub fn status(status: BookStatus, finish_date: Option<FinishDate>) -> Self {
        RecordPatch {
            status: Some(status),
            finish_date: Some(finish_date),
            ..Default::default()
        }
    }

    pub fn score(score: f64) -> Self {
        RecordPatch {
            score: Some(score),
            ..Default::default()
        }
    }

    pub fn finish_date(date: FinishDate) -> Self {
        RecordPatch {
            finish_date: Some(Some(date)),
            ..Default::default()
        }
    }

    pub fn reread(reread: Reread) -> Self {
        RecordPatch {
            reread: Some(reread),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &RecordPatch::default()
    }

    /// Same changes as the database update does, for stores kept in memory
    pub fn apply(&self, record: &mut ReadingRecord) {
        if let Some(status) = self.status {
            record.status = status;
        }
        if let Some(score) = self.score {
            record.score = score;
        }
        if let Some(finish_date) = self.finish_date {
            record.month_finished = finish_date.map(|d| d.month);
            record.year_finished = finish_date.map(|d| d.year);
        }
        if let Some(reread) = self.reread {
            record.rereads.push(reread);
        }
    }
}

pub type ReadingRecordRepository = ReadingRecordRepositoryImpl<Pool<ChosenDB>>;

pub struct ReadingRecordRepositoryImpl<E> {
    executor: E,
}

impl<'c, E> ReadingRecordRepositoryImpl<E>
where
    for<'a> &'a E: sqlx::Executor<'c, Database = ChosenDB>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub async fn find(&self, user_id: i64, book_id: &str) -> Result<Option<ReadingRecord>> {
        let sql = format!("SELECT {COLUMNS} FROM reading_record WHERE user_id = ? AND book_id = ?");
        let record = sqlx::query_as::<_, ReadingRecord>(&sql)
            .bind(user_id)
            .bind(book_id)
            .fetch_optional(&self.executor)
            .await?;
        Ok(record)
    }

    /// Concurrent creation of the same record does not fail, later write wins
    pub async fn create(&self, payload: NewReadingRecord) -> Result<ReadingRecord> {
        let sql = format!(
            r#"INSERT INTO reading_record (user_id, book_id, status, score, month_finished, year_finished, rereads)
            VALUES (?, ?, ?, 0.0, ?, ?, '[]')
            ON CONFLICT (user_id, book_id) DO UPDATE SET
            status = excluded.status,
            month_finished = excluded.month_finished,
            year_finished = excluded.year_finished
            RETURNING {COLUMNS}"#
        );
        let record = sqlx::query_as::<_, ReadingRecord>(&sql)
            .bind(payload.user_id)
            .bind(&payload.book_id)
            .bind(payload.status.as_str())
            .bind(payload.finish_date.map(|d| d.month))
            .bind(payload.finish_date.map(|d| d.year))
            .fetch_one(&self.executor)
            .await?;
        debug!(
            "Created reading record {}/{}",
            record.user_id, record.book_id
        );
        Ok(record)
    }

    pub async fn update(
        &self,
        user_id: i64,
        book_id: &str,
        patch: &RecordPatch,
    ) -> Result<ReadingRecord> {
        if patch.is_empty() {
            return self
                .find(user_id, book_id)
                .await?
                .ok_or_else(|| Error::RecordNotFound("Reading record".to_string()));
        }

        let mut query = QueryBuilder::<ChosenDB>::new("UPDATE reading_record SET ");
        let mut fields = query.separated(", ");
        if let Some(status) = patch.status {
            fields.push("status = ");
            fields.push_bind_unseparated(status.as_str());
        }
        if let Some(score) = patch.score {
            fields.push("score = ");
            fields.push_bind_unseparated(score);
        }
        if let Some(finish_date) = patch.finish_date {
            fields.push("month_finished = ");
            fields.push_bind_unseparated(finish_date.map(|d| d.month));
            fields.push("year_finished = ");
            fields.push_bind_unseparated(finish_date.map(|d| d.year));
        }
        if let Some(reread) = patch.reread {
            let reread = serde_json::to_string(&reread)?;
            fields.push("rereads = json_insert(rereads, '$[#]', json(");
            fields.push_bind_unseparated(reread);
            fields.push_unseparated("))");
        }
        query
            .push(" WHERE user_id = ")
            .push_bind(user_id)
            .push(" AND book_id = ")
            .push_bind(book_id.to_string())
            .push(" RETURNING ")
            .push(COLUMNS);

        query
            .build_query_as::<ReadingRecord>()
            .fetch_optional(&self.executor)
            .await?
            .ok_or_else(|| Error::RecordNotFound("Reading record".to_string()))
    }

    /// Returns false if there was nothing to delete
    pub async fn delete(&self, user_id: i64, book_id: &str) -> Result<bool> {
        let res = sqlx::query("DELETE FROM reading_record WHERE user_id = ? AND book_id = ?")
            .bind(user_id)
            .bind(book_id)
            .execute(&self.executor)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    pub async fn list_by_user(&self, user_id: i64) -> Result<Vec<ReadingRecord>> {
        let sql = format!("SELECT {COLUMNS} FROM reading_record WHERE user_id = ? ORDER BY id");
        let records = sqlx::query_as::<_, ReadingRecord>(&sql)
            .bind(user_id)
            .fetch(&self.executor)
            .try_collect::<Vec<_>>()
            .await?;
        Ok(records)
    }
}
