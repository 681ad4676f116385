use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use athena_core::model::{Attendance, ClassSession, NewClassSession, SessionId};
use athena_core::time::fixed_clock;
use chrono::{Duration, NaiveTime};
use services::{TimetableBoard, TimetableError};
use storage::repository::{InMemoryRepository, SessionStore, StorageError};

/// Wraps the in-memory store and refuses writes once `fail_writes` is set.
struct FlakyStore {
    inner: InMemoryRepository,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl FlakyStore {
    fn new(inner: InMemoryRepository) -> Self {
        Self {
            inner,
            fail_writes: AtomicBool::new(false),
            fail_reads: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl SessionStore for FlakyStore {
    async fn list_sessions(&self) -> Result<Vec<ClassSession>, StorageError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Connection("offline".into()));
        }
        self.inner.list_sessions().await
    }

    async fn update_attendance(
        &self,
        id: SessionId,
        attendance: Option<Attendance>,
    ) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Connection("offline".into()));
        }
        self.inner.update_attendance(id, attendance).await
    }

    async fn insert_session(&self, session: NewClassSession) -> Result<SessionId, StorageError> {
        self.inner.insert_session(session).await
    }

    async fn clear_sessions(&self) -> Result<u64, StorageError> {
        self.inner.clear_sessions().await
    }
}

async fn seeded_store() -> Arc<FlakyStore> {
    let today = fixed_clock().today();
    let repo = InMemoryRepository::new();
    let rows = [
        ("CS101", -2, Some(Attendance::Present)),
        ("CS101", -1, Some(Attendance::Absent)),
        ("MATH202", -1, Some(Attendance::Present)),
        ("MATH202", 1, None),
        ("PHY101", 2, None),
    ];
    for (module, days, mark) in rows {
        repo.insert_session(
            NewClassSession::new(
                module,
                today + Duration::days(days),
                NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
                "Room 8.20 Roger Stevens Building",
                mark,
            )
            .unwrap(),
        )
        .await
        .unwrap();
    }
    Arc::new(FlakyStore::new(repo))
}

#[tokio::test]
async fn rejected_update_restores_previous_board() {
    let store = seeded_store().await;
    let mut board = TimetableBoard::new(fixed_clock(), store.clone());
    board.load().await;

    let target = board
        .sessions()
        .iter()
        .find(|s| s.attendance.is_none())
        .map(|s| s.id)
        .unwrap();
    let before = board.sessions().to_vec();
    let stats_before = board.stats();

    store.fail_writes.store(true, Ordering::SeqCst);
    let err = board
        .mark(target, Some(Attendance::Present))
        .await
        .unwrap_err();
    assert!(matches!(err, TimetableError::Storage(_)));
    assert_eq!(board.sessions(), before.as_slice());
    assert_eq!(board.stats(), stats_before);

    store.fail_writes.store(false, Ordering::SeqCst);
    board
        .mark(target, Some(Attendance::Present))
        .await
        .unwrap();
    board.load().await;
    assert_eq!(
        board.get(target).unwrap().attendance,
        Some(Attendance::Present)
    );
}

#[tokio::test]
async fn stats_and_module_breakdown() {
    let store = seeded_store().await;
    let mut board = TimetableBoard::new(fixed_clock(), store);
    board.load().await;

    let stats = board.stats();
    assert_eq!(stats.total_held, 3);
    assert_eq!(stats.total_attended, 2);
    assert_eq!(stats.percentage, 67);

    let modules = board.by_module();
    let codes: Vec<_> = modules.iter().map(|m| m.module_code.as_str()).collect();
    assert_eq!(codes, ["CS101", "MATH202"]);
    assert_eq!(modules[0].percentage, 50);
    assert_eq!(modules[1].percentage, 100);
}

#[tokio::test]
async fn failed_fetch_shows_empty_board() {
    let store = seeded_store().await;
    store.fail_reads.store(true, Ordering::SeqCst);
    let mut board = TimetableBoard::new(fixed_clock(), store);
    assert!(board.load().await.is_empty());
    assert_eq!(board.stats().percentage, 0);
}
