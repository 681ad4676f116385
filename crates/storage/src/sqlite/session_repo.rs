use athena_core::model::{Attendance, ClassSession, NewClassSession, SessionId};

use super::SqliteRepository;
use super::mapping::{map_session_row, session_id_from_i64, session_id_to_i64};
use crate::repository::{SessionStore, StorageError};

#[async_trait::async_trait]
impl SessionStore for SqliteRepository {
    async fn list_sessions(&self) -> Result<Vec<ClassSession>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, module_code, class_date, class_start_time, class_end_time, class_location, attendance
            FROM classes
            ORDER BY class_date ASC, class_start_time ASC, id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut sessions = Vec::with_capacity(rows.len());
        for row in rows {
            sessions.push(map_session_row(&row)?);
        }
        Ok(sessions)
    }

    async fn update_attendance(
        &self,
        id: SessionId,
        attendance: Option<Attendance>,
    ) -> Result<(), StorageError> {
        let res = sqlx::query("UPDATE classes SET attendance = ?1 WHERE id = ?2")
            .bind(Attendance::to_column(attendance))
            .bind(session_id_to_i64(id)?)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn insert_session(&self, session: NewClassSession) -> Result<SessionId, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO classes (module_code, class_date, class_start_time, class_end_time, class_location, attendance)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
        )
        .bind(session.module_code)
        .bind(session.class_date)
        .bind(session.class_start_time)
        .bind(session.class_end_time)
        .bind(session.class_location)
        .bind(Attendance::to_column(session.attendance))
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        session_id_from_i64(res.last_insert_rowid())
    }

    async fn clear_sessions(&self) -> Result<u64, StorageError> {
        let res = sqlx::query("DELETE FROM classes")
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(res.rows_affected())
    }
}
