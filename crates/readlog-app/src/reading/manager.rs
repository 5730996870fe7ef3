use readlog_dal::{
    reading_record::{NewReadingRecord, ReadingRecord, ReadingRecordRepository, RecordPatch},
    user::UserRepository,
};
use readlog_types::{
    reading::StatusTarget,
    validation::{DateChange, ScoreChange, StatusChange},
};
use tracing::debug;

use super::{
    error::{
        ReadingError, Result, NOT_FINISHED, NO_RECORD_TO_DATE, NO_RECORD_TO_REREAD,
        NO_RECORD_TO_SCORE, USER_NOT_FOUND,
    },
    Clock, RecordStore, SystemClock, UserDirectory,
};

/// Manager working on the database, as used by the web handlers
pub type ReadingManager = ReadingRecordManager<ReadingRecordRepository, UserRepository, SystemClock>;

impl ReadingManager {
    pub fn from_pool(pool: &readlog_dal::Pool) -> Self {
        ReadingRecordManager::new(
            ReadingRecordRepository::new(pool.clone()),
            UserRepository::new(pool.clone()),
            SystemClock,
        )
    }
}

/// Owns state transitions of reading records.
///
/// Record status moves between absent, `wantToRead`, `reading` and `finished`,
/// `remove` returns it to absent. Finish date is kept only by status change to `finished`,
/// any other status change clears it. Requests are expected to be validated already,
/// see [`readlog_types::validation`].
pub struct ReadingRecordManager<S, U, C = SystemClock> {
    store: S,
    users: U,
    clock: C,
}

impl<S, U, C> ReadingRecordManager<S, U, C>
where
    S: RecordStore,
    U: UserDirectory,
    C: Clock,
{
    pub fn new(store: S, users: U, clock: C) -> Self {
        ReadingRecordManager {
            store,
            users,
            clock,
        }
    }

    async fn ensure_user(&self, user_id: i64) -> Result<()> {
        if self.users.user_exists(user_id).await? {
            Ok(())
        } else {
            debug!("User {user_id} does not exist");
            Err(ReadingError::NotFound(USER_NOT_FOUND))
        }
    }

    async fn existing_record(
        &self,
        user_id: i64,
        book_id: &str,
        missing: &'static str,
    ) -> Result<ReadingRecord> {
        self.ensure_user(user_id).await?;
        self.store
            .find(user_id, book_id)
            .await?
            .ok_or(ReadingError::NotFound(missing))
    }

    fn check_not_future(&self, date: readlog_types::reading::FinishDate) -> Result<()> {
        let (year, month) = self.clock.current_year_month();
        if date.is_after(year, month) {
            debug!(
                "Date {}/{} is after current {}/{}",
                date.month, date.year, month, year
            );
            Err(ReadingError::InvalidDate)
        } else {
            Ok(())
        }
    }

    /// Creates, updates or removes the record, `None` is returned after removal
    pub async fn change_status(
        &self,
        user_id: i64,
        change: StatusChange,
    ) -> Result<Option<ReadingRecord>> {
        self.ensure_user(user_id).await?;
        let StatusChange {
            book_id,
            target,
            finish_date,
        } = change;
        let existing = self.store.find(user_id, &book_id).await?;

        match (existing, target) {
            (Some(_), StatusTarget::Remove) => {
                self.store.delete(user_id, &book_id).await?;
                debug!("Removed reading record {user_id}/{book_id}");
                Ok(None)
            }
            (None, StatusTarget::Remove) => {
                debug!("Nothing to remove for {user_id}/{book_id}");
                Ok(None)
            }
            (Some(_), StatusTarget::Set(status)) => {
                let finish_date = finish_date.filter(|_| status.is_finished());
                let record = self
                    .store
                    .update(user_id, &book_id, &RecordPatch::status(status, finish_date))
                    .await?;
                debug!("Status of {user_id}/{book_id} changed to {status}");
                Ok(Some(record))
            }
            (None, StatusTarget::Set(status)) => {
                let finish_date = finish_date.filter(|_| status.is_finished());
                let record = self
                    .store
                    .create(NewReadingRecord {
                        user_id,
                        book_id,
                        status,
                        finish_date,
                    })
                    .await?;
                debug!(
                    "New reading record {}/{} with status {status}",
                    record.user_id, record.book_id
                );
                Ok(Some(record))
            }
        }
    }

    /// Only score is changed, record must exist
    pub async fn change_score(&self, user_id: i64, change: ScoreChange) -> Result<ReadingRecord> {
        self.existing_record(user_id, &change.book_id, NO_RECORD_TO_SCORE)
            .await?;
        let record = self
            .store
            .update(user_id, &change.book_id, &RecordPatch::score(change.score))
            .await?;
        debug!(
            "Score of {user_id}/{} changed to {}",
            change.book_id, change.score
        );
        Ok(record)
    }

    /// Finish date is set whatever the record status is
    pub async fn change_finish_date(
        &self,
        user_id: i64,
        change: DateChange,
    ) -> Result<ReadingRecord> {
        self.existing_record(user_id, &change.book_id, NO_RECORD_TO_DATE)
            .await?;
        self.check_not_future(change.date)?;
        let record = self
            .store
            .update(
                user_id,
                &change.book_id,
                &RecordPatch::finish_date(change.date),
            )
            .await?;
        debug!(
            "Finish date of {user_id}/{} changed to {}/{}",
            change.book_id, change.date.month, change.date.year
        );
        Ok(record)
    }

    /// Appends reread to a finished record
    pub async fn add_reread(&self, user_id: i64, change: DateChange) -> Result<ReadingRecord> {
        let existing = self
            .existing_record(user_id, &change.book_id, NO_RECORD_TO_REREAD)
            .await?;
        if !existing.status.is_finished() {
            return Err(ReadingError::InvalidState(NOT_FINISHED));
        }
        self.check_not_future(change.date)?;
        let record = self
            .store
            .update(
                user_id,
                &change.book_id,
                &RecordPatch::reread(change.date.into()),
            )
            .await?;
        debug!(
            "Reread of {user_id}/{} at {}/{} added",
            change.book_id, change.date.month, change.date.year
        );
        Ok(record)
    }

    pub async fn list_all(&self, user_id: i64) -> Result<Vec<ReadingRecord>> {
        self.ensure_user(user_id).await?;
        let records = self.store.list_by_user(user_id).await?;
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::{HashMap, HashSet},
        sync::Mutex,
    };

    use quickcheck::{Arbitrary, Gen};
    use quickcheck_macros::quickcheck;
    use readlog_types::reading::{BookStatus, FinishDate};

    use super::*;
    use crate::reading::{error::ErrorKind, StoreResult};

    const USER: i64 = 1;
    const BOOK: &str = "b123456";

    #[derive(Default)]
    struct MemoryStore {
        records: Mutex<HashMap<(i64, String), ReadingRecord>>,
    }

    impl MemoryStore {
        fn get(&self, user_id: i64, book_id: &str) -> Option<ReadingRecord> {
            self.records
                .lock()
                .unwrap()
                .get(&(user_id, book_id.to_string()))
                .cloned()
        }
    }

    impl RecordStore for MemoryStore {
        async fn find(&self, user_id: i64, book_id: &str) -> StoreResult<Option<ReadingRecord>> {
            Ok(self.get(user_id, book_id))
        }

        async fn create(&self, record: NewReadingRecord) -> StoreResult<ReadingRecord> {
            let record = ReadingRecord {
                user_id: record.user_id,
                book_id: record.book_id,
                status: record.status,
                score: 0.0,
                month_finished: record.finish_date.map(|d| d.month),
                year_finished: record.finish_date.map(|d| d.year),
                rereads: vec![],
            };
            self.records
                .lock()
                .unwrap()
                .insert((record.user_id, record.book_id.clone()), record.clone());
            Ok(record)
        }

        async fn update(
            &self,
            user_id: i64,
            book_id: &str,
            patch: &RecordPatch,
        ) -> StoreResult<ReadingRecord> {
            let mut records = self.records.lock().unwrap();
            let record = records
                .get_mut(&(user_id, book_id.to_string()))
                .ok_or_else(|| readlog_dal::Error::RecordNotFound("Reading record".into()))?;
            patch.apply(record);
            Ok(record.clone())
        }

        async fn delete(&self, user_id: i64, book_id: &str) -> StoreResult<()> {
            self.records
                .lock()
                .unwrap()
                .remove(&(user_id, book_id.to_string()));
            Ok(())
        }

        async fn list_by_user(&self, user_id: i64) -> StoreResult<Vec<ReadingRecord>> {
            Ok(self
                .records
                .lock()
                .unwrap()
                .values()
                .filter(|r| r.user_id == user_id)
                .cloned()
                .collect())
        }
    }

    struct MemoryUsers(HashSet<i64>);

    impl UserDirectory for MemoryUsers {
        async fn user_exists(&self, user_id: i64) -> StoreResult<bool> {
            Ok(self.0.contains(&user_id))
        }
    }

    struct FixedClock(i32, i32);

    impl Clock for FixedClock {
        fn current_year_month(&self) -> (i32, i32) {
            (self.0, self.1)
        }
    }

    type TestManager = ReadingRecordManager<MemoryStore, MemoryUsers, FixedClock>;

    fn manager() -> TestManager {
        ReadingRecordManager::new(
            MemoryStore::default(),
            MemoryUsers(HashSet::from([USER, 2])),
            FixedClock(2024, 6),
        )
    }

    fn status(book_id: &str, target: StatusTarget, date: Option<(i32, i32)>) -> StatusChange {
        StatusChange {
            book_id: book_id.to_string(),
            target,
            finish_date: date.map(|(month, year)| FinishDate::new(month, year)),
        }
    }

    fn set(status: BookStatus) -> StatusTarget {
        StatusTarget::Set(status)
    }

    fn date(book_id: &str, month: i32, year: i32) -> DateChange {
        DateChange {
            book_id: book_id.to_string(),
            date: FinishDate::new(month, year),
        }
    }

    fn score(book_id: &str, score: f64) -> ScoreChange {
        ScoreChange {
            book_id: book_id.to_string(),
            score,
        }
    }

    #[tokio::test]
    async fn test_finished_scored_then_want_to_read() {
        let m = manager();
        let record = m
            .change_status(USER, status(BOOK, set(BookStatus::Finished), Some((5, 2020))))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.status, BookStatus::Finished);
        assert_eq!(record.month_finished, Some(5));
        assert_eq!(record.year_finished, Some(2020));
        assert_eq!(record.score, 0.0);

        let scored = m.change_score(USER, score(BOOK, 4.0)).await.unwrap();
        assert_eq!(scored.score, 4.0);
        assert_eq!(
            ReadingRecord {
                score: 0.0,
                ..scored.clone()
            },
            record
        );

        let record = m
            .change_status(USER, status(BOOK, set(BookStatus::WantToRead), None))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.status, BookStatus::WantToRead);
        assert_eq!(record.month_finished, None);
        assert_eq!(record.year_finished, None);
        assert_eq!(record.score, 4.0);
    }

    #[tokio::test]
    async fn test_date_ignored_unless_finished() {
        let m = manager();
        let record = m
            .change_status(USER, status(BOOK, set(BookStatus::Reading), Some((1, 2020))))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.finish_date(), None);

        let record = m
            .change_status(USER, status(BOOK, set(BookStatus::Finished), Some((2, 2021))))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.finish_date(), Some(FinishDate::new(2, 2021)));

        let record = m
            .change_status(USER, status(BOOK, set(BookStatus::Finished), None))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.finish_date(), None);
    }

    #[tokio::test]
    async fn test_status_change_does_not_check_future() {
        let m = manager();
        let record = m
            .change_status(USER, status(BOOK, set(BookStatus::Finished), Some((0, 2030))))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.year_finished, Some(2030));
    }

    #[tokio::test]
    async fn test_remove() {
        let m = manager();
        for target in BookStatus::ALL {
            m.change_status(USER, status(BOOK, set(target), None))
                .await
                .unwrap();
            m.change_score(USER, score(BOOK, 2.0)).await.unwrap();
            let res = m
                .change_status(USER, status(BOOK, StatusTarget::Remove, None))
                .await
                .unwrap();
            assert!(res.is_none());
            assert!(m.store.get(USER, BOOK).is_none());

            // second removal is no-op
            let res = m
                .change_status(USER, status(BOOK, StatusTarget::Remove, None))
                .await
                .unwrap();
            assert!(res.is_none());
        }

        // recreated record starts from scratch
        let record = m
            .change_status(USER, status(BOOK, set(BookStatus::Reading), None))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.score, 0.0);
        assert!(record.rereads.is_empty());
    }

    #[tokio::test]
    async fn test_remove_absent() {
        let m = manager();
        let res = m
            .change_status(USER, status("b000001", StatusTarget::Remove, None))
            .await
            .unwrap();
        assert!(res.is_none());
        assert!(m.list_all(USER).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let m = manager();
        let err = m
            .change_status(99, status(BOOK, set(BookStatus::Reading), None))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), USER_NOT_FOUND);
        assert!(m.store.get(99, BOOK).is_none());

        let err = m
            .change_status(99, status(BOOK, StatusTarget::Remove, None))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = m.list_all(99).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let err = m.change_score(99, score(BOOK, 1.0)).await.unwrap_err();
        assert_eq!(err.to_string(), USER_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_score_without_record() {
        let m = manager();
        let err = m.change_score(USER, score(BOOK, 3.0)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), NO_RECORD_TO_SCORE);
        assert!(m.store.get(USER, BOOK).is_none());
    }

    #[tokio::test]
    async fn test_finish_date() {
        let m = manager();
        let err = m
            .change_finish_date(USER, date(BOOK, 1, 2020))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        m.change_status(USER, status(BOOK, set(BookStatus::Finished), Some((5, 2020))))
            .await
            .unwrap();

        let err = m
            .change_finish_date(USER, date(BOOK, 0, 2025))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDate);
        let err = m
            .change_finish_date(USER, date(BOOK, 7, 2024))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDate);
        assert_eq!(
            m.store.get(USER, BOOK).unwrap().finish_date(),
            Some(FinishDate::new(5, 2020))
        );

        let record = m
            .change_finish_date(USER, date(BOOK, 6, 2024))
            .await
            .unwrap();
        assert_eq!(record.finish_date(), Some(FinishDate::new(6, 2024)));
        assert_eq!(record.status, BookStatus::Finished);
    }

    #[tokio::test]
    async fn test_finish_date_on_unfinished_record() {
        let m = manager();
        m.change_status(USER, status(BOOK, set(BookStatus::Reading), None))
            .await
            .unwrap();
        let record = m
            .change_finish_date(USER, date(BOOK, 3, 2021))
            .await
            .unwrap();
        assert_eq!(record.status, BookStatus::Reading);
        assert_eq!(record.finish_date(), Some(FinishDate::new(3, 2021)));

        // next status change outside finished clears it again
        let record = m
            .change_status(USER, status(BOOK, set(BookStatus::WantToRead), None))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.finish_date(), None);
    }

    #[tokio::test]
    async fn test_rereads() {
        let m = manager();
        let err = m.add_reread(USER, date(BOOK, 1, 2021)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        m.change_status(USER, status(BOOK, set(BookStatus::Reading), None))
            .await
            .unwrap();
        let err = m.add_reread(USER, date(BOOK, 1, 2021)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);

        m.change_status(USER, status(BOOK, set(BookStatus::Finished), Some((5, 2020))))
            .await
            .unwrap();
        m.add_reread(USER, date(BOOK, 1, 2021)).await.unwrap();
        let err = m.add_reread(USER, date(BOOK, 0, 2025)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDate);
        let record = m.add_reread(USER, date(BOOK, 2, 2022)).await.unwrap();
        assert_eq!(record.rereads.len(), 2);
        assert_eq!(record.rereads[0].month, Some(1));
        assert_eq!(record.rereads[1].year, Some(2022));
        assert_eq!(record.finish_date(), Some(FinishDate::new(5, 2020)));

        // rereads survive status changes, but not removal
        let record = m
            .change_status(USER, status(BOOK, set(BookStatus::Reading), None))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.rereads.len(), 2);
        m.change_status(USER, status(BOOK, StatusTarget::Remove, None))
            .await
            .unwrap();
        let record = m
            .change_status(USER, status(BOOK, set(BookStatus::Finished), None))
            .await
            .unwrap()
            .unwrap();
        assert!(record.rereads.is_empty());
    }

    #[tokio::test]
    async fn test_list_all() {
        let m = manager();
        for book in ["b000001", "b000002", "b000003"] {
            m.change_status(USER, status(book, set(BookStatus::WantToRead), None))
                .await
                .unwrap();
        }
        m.change_status(2, status("b000001", set(BookStatus::Reading), None))
            .await
            .unwrap();

        let mut records = m.list_all(USER).await.unwrap();
        records.sort_by(|a, b| a.book_id.cmp(&b.book_id));
        let books: Vec<_> = records.iter().map(|r| r.book_id.as_str()).collect();
        assert_eq!(books, ["b000001", "b000002", "b000003"]);
        assert_eq!(m.list_all(2).await.unwrap().len(), 1);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Status(StatusTarget, Option<(i32, i32)>),
        Score(f64),
        Reread(i32, i32),
    }

    impl Arbitrary for Op {
        fn arbitrary(g: &mut Gen) -> Self {
            let month = *g.choose(&[0, 5, 11]).unwrap();
            let year = *g.choose(&[1999, 2020, 2024]).unwrap();
            match u8::arbitrary(g) % 4 {
                0 => Op::Status(StatusTarget::Remove, None),
                1 => Op::Score(*g.choose(&[0.0, 2.5, 5.0]).unwrap()),
                2 => Op::Reread(month, year),
                _ => {
                    let target = *g.choose(&BookStatus::ALL).unwrap();
                    let date = if bool::arbitrary(g) {
                        Some((month, year))
                    } else {
                        None
                    };
                    Op::Status(StatusTarget::Set(target), date)
                }
            }
        }
    }

    #[quickcheck]
    fn prop_finish_date_only_when_finished(ops: Vec<Op>) -> bool {
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        rt.block_on(async {
            let m = manager();
            for op in ops {
                // errors are fine here, only the stored state is checked
                let _ = match op {
                    Op::Status(target, date) => m
                        .change_status(USER, status(BOOK, target, date))
                        .await
                        .map(|_| ()),
                    Op::Score(value) => m.change_score(USER, score(BOOK, value)).await.map(|_| ()),
                    Op::Reread(month, year) => {
                        m.add_reread(USER, date(BOOK, month, year)).await.map(|_| ())
                    }
                };
                if let Some(record) = m.store.get(USER, BOOK) {
                    if record.status != BookStatus::Finished
                        && (record.month_finished.is_some() || record.year_finished.is_some())
                    {
                        return false;
                    }
                }
            }
            true
        })
    }
}
