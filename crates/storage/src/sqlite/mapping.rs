use athena_core::model::{Attendance, ClassSession, SessionId};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::StorageError;

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn session_id_from_i64(v: i64) -> Result<SessionId, StorageError> {
    u64::try_from(v)
        .map(SessionId::new)
        .map_err(|_| StorageError::Serialization("session id sign overflow".into()))
}

pub(crate) fn session_id_to_i64(id: SessionId) -> Result<i64, StorageError> {
    i64::try_from(id.value()).map_err(|_| StorageError::Serialization("session id overflow".into()))
}

pub(crate) fn map_session_row(row: &SqliteRow) -> Result<ClassSession, StorageError> {
    let attendance = Attendance::from_column(row.try_get::<Option<i64>, _>("attendance").map_err(ser)?)
        .map_err(ser)?;

    Ok(ClassSession {
        id: session_id_from_i64(row.try_get("id").map_err(ser)?)?,
        module_code: row.try_get("module_code").map_err(ser)?,
        class_date: row.try_get("class_date").map_err(ser)?,
        class_start_time: row.try_get("class_start_time").map_err(ser)?,
        class_end_time: row.try_get("class_end_time").map_err(ser)?,
        class_location: row.try_get("class_location").map_err(ser)?,
        attendance,
    })
}
