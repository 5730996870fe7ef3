//! Reading progress of users, one record per user and book.
//!
//! [`manager::ReadingRecordManager`] is the only writer of records, it works against
//! the collaborators defined here, so it can run on the SQL repositories as well as
//! on anything else implementing them.

use std::future::Future;

use readlog_dal::reading_record::{NewReadingRecord, ReadingRecord, RecordPatch};

pub mod error;
pub mod manager;
pub mod rest_api;
pub mod sql_store;

pub use manager::{ReadingManager, ReadingRecordManager};
pub use rest_api::reading_router;

pub type StoreResult<T> = std::result::Result<T, readlog_dal::Error>;

pub trait RecordStore {
    fn find(
        &self,
        user_id: i64,
        book_id: &str,
    ) -> impl Future<Output = StoreResult<Option<ReadingRecord>>> + Send;

    fn create(
        &self,
        record: NewReadingRecord,
    ) -> impl Future<Output = StoreResult<ReadingRecord>> + Send;

    fn update(
        &self,
        user_id: i64,
        book_id: &str,
        patch: &RecordPatch,
    ) -> impl Future<Output = StoreResult<ReadingRecord>> + Send;

    fn delete(&self, user_id: i64, book_id: &str) -> impl Future<Output = StoreResult<()>> + Send;

    fn list_by_user(
        &self,
        user_id: i64,
    ) -> impl Future<Output = StoreResult<Vec<ReadingRecord>>> + Send;
}

pub trait UserDirectory {
    fn user_exists(&self, user_id: i64) -> impl Future<Output = StoreResult<bool>> + Send;
}

pub trait Clock {
    /// Current UTC year and month, month is 0-based
    fn current_year_month(&self) -> (i32, i32);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn current_year_month(&self) -> (i32, i32) {
        let now = time::OffsetDateTime::now_utc();
        (now.year(), u8::from(now.month()) as i32 - 1)
    }
}
