use async_trait::async_trait;
use athena_core::model::{Attendance, ClassSession, NewClassSession, SessionId};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Contract for the `classes` row store.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// All scheduled classes, ordered by date then start time.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn list_sessions(&self) -> Result<Vec<ClassSession>, StorageError>;

    /// Set or clear the attendance mark of one class.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no class has that id, or other storage errors.
    async fn update_attendance(
        &self,
        id: SessionId,
        attendance: Option<Attendance>,
    ) -> Result<(), StorageError>;

    /// Insert a class and return its assigned id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the row cannot be stored.
    async fn insert_session(&self, session: NewClassSession) -> Result<SessionId, StorageError>;

    /// Remove every class. Used by seeding only.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the table cannot be cleared.
    async fn clear_sessions(&self) -> Result<u64, StorageError>;
}

#[derive(Default)]
struct SessionTable {
    rows: Vec<ClassSession>,
    next_id: u64,
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    sessions: Arc<Mutex<SessionTable>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemoryRepository {
    async fn list_sessions(&self) -> Result<Vec<ClassSession>, StorageError> {
        let guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut rows = guard.rows.clone();
        rows.sort_by(|a, b| {
            (a.class_date, a.class_start_time, a.id).cmp(&(b.class_date, b.class_start_time, b.id))
        });
        Ok(rows)
    }

    async fn update_attendance(
        &self,
        id: SessionId,
        attendance: Option<Attendance>,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let row = guard
            .rows
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(StorageError::NotFound)?;
        row.attendance = attendance;
        Ok(())
    }

    async fn insert_session(&self, session: NewClassSession) -> Result<SessionId, StorageError> {
        let mut guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.next_id += 1;
        let id = SessionId::new(guard.next_id);
        guard.rows.push(session.assign_id(id));
        Ok(id)
    }

    async fn clear_sessions(&self) -> Result<u64, StorageError> {
        let mut guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let removed = guard.rows.len() as u64;
        guard.rows.clear();
        Ok(removed)
    }
}

/// Repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub sessions: Arc<dyn SessionStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let sessions: Arc<dyn SessionStore> = Arc::new(InMemoryRepository::new());
        Self { sessions }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn new_session(day: u32, hour: u32) -> NewClassSession {
        NewClassSession::new(
            "CS101",
            NaiveDate::from_ymd_opt(2023, 11, day).unwrap(),
            NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(hour + 1, 0, 0).unwrap(),
            "Room 1",
            None,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn lists_by_date_then_start_time() {
        let repo = InMemoryRepository::new();
        repo.insert_session(new_session(14, 11)).await.unwrap();
        repo.insert_session(new_session(13, 9)).await.unwrap();
        repo.insert_session(new_session(14, 9)).await.unwrap();

        let listed = repo.list_sessions().await.unwrap();
        let keys: Vec<_> = listed
            .iter()
            .map(|s| (s.class_date.format("%d").to_string(), s.formatted_time()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("13".to_string(), "09:00 - 10:00".to_string()),
                ("14".to_string(), "09:00 - 10:00".to_string()),
                ("14".to_string(), "11:00 - 12:00".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn update_attendance_sets_and_clears() {
        let repo = InMemoryRepository::new();
        let id = repo.insert_session(new_session(13, 9)).await.unwrap();

        repo.update_attendance(id, Some(Attendance::Present))
            .await
            .unwrap();
        assert_eq!(
            repo.list_sessions().await.unwrap()[0].attendance,
            Some(Attendance::Present)
        );

        repo.update_attendance(id, None).await.unwrap();
        assert_eq!(repo.list_sessions().await.unwrap()[0].attendance, None);
    }

    #[tokio::test]
    async fn update_unknown_session_is_not_found() {
        let repo = InMemoryRepository::new();
        let err = repo
            .update_attendance(SessionId::new(7), Some(Attendance::Absent))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
    }

    #[tokio::test]
    async fn clear_reports_removed_rows() {
        let storage = Storage::in_memory();
        storage.sessions.insert_session(new_session(13, 9)).await.unwrap();
        storage.sessions.insert_session(new_session(13, 11)).await.unwrap();
        assert_eq!(storage.sessions.clear_sessions().await.unwrap(), 2);
        assert!(storage.sessions.list_sessions().await.unwrap().is_empty());
    }
}
