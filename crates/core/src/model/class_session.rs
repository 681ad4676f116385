use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::SessionId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ClassSessionError {
    #[error("module code cannot be empty")]
    EmptyModuleCode,

    #[error("class ends before it starts")]
    InvalidTimeRange,

    #[error("invalid attendance value: {0}")]
    InvalidAttendance(i64),
}

/// Whether the student turned up. A session with no mark is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attendance {
    Absent,
    Present,
}

impl Attendance {
    /// Decode the stored `0 | 1 | NULL` column.
    ///
    /// # Errors
    ///
    /// Returns `ClassSessionError::InvalidAttendance` for anything but 0 or 1.
    pub fn from_column(value: Option<i64>) -> Result<Option<Self>, ClassSessionError> {
        match value {
            None => Ok(None),
            Some(0) => Ok(Some(Attendance::Absent)),
            Some(1) => Ok(Some(Attendance::Present)),
            Some(other) => Err(ClassSessionError::InvalidAttendance(other)),
        }
    }

    #[must_use]
    pub fn to_column(value: Option<Self>) -> Option<i64> {
        value.map(|a| match a {
            Attendance::Absent => 0,
            Attendance::Present => 1,
        })
    }
}

/// Display label used by the timetable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceLabel {
    Present,
    Absent,
    Pending,
}

impl AttendanceLabel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AttendanceLabel::Present => "Present",
            AttendanceLabel::Absent => "Absent",
            AttendanceLabel::Pending => "Pending",
        }
    }
}

/// A scheduled class as stored in the `classes` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSession {
    pub id: SessionId,
    pub module_code: String,
    pub class_date: NaiveDate,
    pub class_start_time: NaiveTime,
    pub class_end_time: NaiveTime,
    pub class_location: String,
    pub attendance: Option<Attendance>,
}

impl ClassSession {
    #[must_use]
    pub fn weekday(&self) -> Weekday {
        self.class_date.weekday()
    }

    /// Full English weekday name, e.g. "Monday".
    #[must_use]
    pub fn day_name(&self) -> &'static str {
        weekday_name(self.weekday())
    }

    /// `"09:00 - 10:30"`
    #[must_use]
    pub fn formatted_time(&self) -> String {
        format!(
            "{} - {}",
            self.class_start_time.format("%H:%M"),
            self.class_end_time.format("%H:%M")
        )
    }

    #[must_use]
    pub fn duration_minutes(&self) -> i64 {
        (self.class_end_time - self.class_start_time).num_minutes()
    }

    /// `"1h 30m"`
    #[must_use]
    pub fn duration_label(&self) -> String {
        let mins = self.duration_minutes();
        format!("{}h {}m", mins.div_euclid(60), mins.rem_euclid(60))
    }

    #[must_use]
    pub fn label(&self) -> AttendanceLabel {
        match self.attendance {
            Some(Attendance::Present) => AttendanceLabel::Present,
            Some(Attendance::Absent) => AttendanceLabel::Absent,
            None => AttendanceLabel::Pending,
        }
    }
}

/// A class waiting to be inserted; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClassSession {
    pub module_code: String,
    pub class_date: NaiveDate,
    pub class_start_time: NaiveTime,
    pub class_end_time: NaiveTime,
    pub class_location: String,
    pub attendance: Option<Attendance>,
}

impl NewClassSession {
    /// # Errors
    ///
    /// Returns `ClassSessionError` for a blank module code or an inverted time range.
    pub fn new(
        module_code: impl Into<String>,
        class_date: NaiveDate,
        class_start_time: NaiveTime,
        class_end_time: NaiveTime,
        class_location: impl Into<String>,
        attendance: Option<Attendance>,
    ) -> Result<Self, ClassSessionError> {
        let module_code = module_code.into();
        if module_code.trim().is_empty() {
            return Err(ClassSessionError::EmptyModuleCode);
        }
        if class_end_time < class_start_time {
            return Err(ClassSessionError::InvalidTimeRange);
        }
        Ok(Self {
            module_code,
            class_date,
            class_start_time,
            class_end_time,
            class_location: class_location.into(),
            attendance,
        })
    }

    #[must_use]
    pub fn assign_id(self, id: SessionId) -> ClassSession {
        ClassSession {
            id,
            module_code: self.module_code,
            class_date: self.class_date,
            class_start_time: self.class_start_time,
            class_end_time: self.class_end_time,
            class_location: self.class_location,
            attendance: self.attendance,
        }
    }
}

#[must_use]
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
