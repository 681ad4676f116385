use std::sync::Arc;

use athena_core::attendance::{self, AttendanceStats, ModuleAttendance};
use athena_core::model::{Attendance, ClassSession, SessionId};
use chrono::{NaiveDate, Weekday};
use storage::repository::SessionStore;

use crate::Clock;
use crate::error::TimetableError;

/// The class list behind the timetable and dashboard views.
///
/// Holds the sessions fetched for one view; attendance edits are applied here
/// first and rolled back if the store refuses them.
pub struct TimetableBoard {
    clock: Clock,
    store: Arc<dyn SessionStore>,
    sessions: Vec<ClassSession>,
}

impl TimetableBoard {
    #[must_use]
    pub fn new(clock: Clock, store: Arc<dyn SessionStore>) -> Self {
        Self {
            clock,
            store,
            sessions: Vec::new(),
        }
    }

    /// Fetch the class list. A failed fetch leaves the board empty.
    pub async fn load(&mut self) -> &[ClassSession] {
        self.sessions = match self.store.list_sessions().await {
            Ok(sessions) => sessions,
            Err(err) => {
                tracing::warn!(error = %err, "failed to fetch classes, showing an empty timetable");
                Vec::new()
            }
        };
        &self.sessions
    }

    #[must_use]
    pub fn sessions(&self) -> &[ClassSession] {
        &self.sessions
    }

    #[must_use]
    pub fn get(&self, id: SessionId) -> Option<&ClassSession> {
        self.sessions.iter().find(|s| s.id == id)
    }

    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    #[must_use]
    pub fn stats(&self) -> AttendanceStats {
        attendance::calculate_stats(&self.sessions, self.today())
    }

    #[must_use]
    pub fn by_module(&self) -> Vec<ModuleAttendance> {
        attendance::group_by_module(&self.sessions)
    }

    /// Day view: every class that falls on `weekday`.
    pub fn day(&self, weekday: Weekday) -> impl Iterator<Item = &ClassSession> {
        self.sessions.iter().filter(move |s| s.weekday() == weekday)
    }

    /// Dashboard calendar strip: classes on one date.
    pub fn on_date(&self, date: NaiveDate) -> impl Iterator<Item = &ClassSession> {
        self.sessions.iter().filter(move |s| s.class_date == date)
    }

    #[must_use]
    pub fn is_editable(&self, id: SessionId) -> Option<bool> {
        let today = self.today();
        self.get(id)
            .map(|s| attendance::is_editable(s.class_date, today))
    }

    /// Set or clear a class's attendance mark.
    ///
    /// The board shows the new mark immediately. If the store rejects the
    /// update the board returns to exactly what it showed before the call.
    ///
    /// # Errors
    ///
    /// Returns `TimetableError::UnknownSession` or `TimetableError::NotEditable`
    /// without touching the board, or `TimetableError::Storage` after rolling back.
    pub async fn mark(
        &mut self,
        id: SessionId,
        value: Option<Attendance>,
    ) -> Result<(), TimetableError> {
        match self.is_editable(id) {
            None => return Err(TimetableError::UnknownSession(id)),
            Some(false) => return Err(TimetableError::NotEditable(id)),
            Some(true) => {}
        }

        let snapshot = self.sessions.clone();
        if let Some(session) = self.sessions.iter_mut().find(|s| s.id == id) {
            session.attendance = value;
        }

        if let Err(err) = self.store.update_attendance(id, value).await {
            tracing::warn!(session = %id, error = %err, "attendance update rejected, reverting");
            self.sessions = snapshot;
            return Err(err.into());
        }
        tracing::debug!(session = %id, ?value, "attendance updated");
        Ok(())
    }
}
