use readlog_dal::{
    reading_record::{NewReadingRecord, ReadingRecord, ReadingRecordRepository, RecordPatch},
    user::UserRepository,
};

use super::{RecordStore, StoreResult, UserDirectory};

impl RecordStore for ReadingRecordRepository {
    async fn find(&self, user_id: i64, book_id: &str) -> StoreResult<Option<ReadingRecord>> {
        ReadingRecordRepository::find(self, user_id, book_id).await
    }

    async fn create(&self, record: NewReadingRecord) -> StoreResult<ReadingRecord> {
        ReadingRecordRepository::create(self, record).await
    }

    async fn update(
        &self,
        user_id: i64,
        book_id: &str,
        patch: &RecordPatch,
    ) -> StoreResult<ReadingRecord> {
        ReadingRecordRepository::update(self, user_id, book_id, patch).await
    }

    async fn delete(&self, user_id: i64, book_id: &str) -> StoreResult<()> {
        ReadingRecordRepository::delete(self, user_id, book_id)
            .await
            .map(|_| ())
    }

    async fn list_by_user(&self, user_id: i64) -> StoreResult<Vec<ReadingRecord>> {
        ReadingRecordRepository::list_by_user(self, user_id).await
    }
}

impl UserDirectory for UserRepository {
    async fn user_exists(&self, user_id: i64) -> StoreResult<bool> {
        self.exists(user_id).await
    }
}
