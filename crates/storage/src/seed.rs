//! Demo timetable: two classes per weekday from five days back to five days ahead.

use athena_core::model::{Attendance, ClassSessionError, NewClassSession};
use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use rand::Rng;

use crate::repository::{SessionStore, StorageError};

pub const MODULE_CODES: [&str; 4] = ["CS101", "MATH202", "PHY101", "HIST105"];

pub const LOCATIONS: [&str; 6] = [
    "Room 8.20 Roger Stevens Building",
    "Room 9.01 EC Stoner Building",
    "Room 7.02 Worsley Building",
    "Room 1.05 Maurice Keyworth Building",
    "Room B.02 Parkinson Building",
    "Room 2.10 Clothworkers Building",
];

/// Days on either side of today that get classes.
pub const WINDOW_DAYS: i64 = 5;

/// Chance that a past class is marked present rather than absent.
pub const PRESENT_PROBABILITY: f64 = 0.8;

const SLOTS: [(NaiveTime, NaiveTime, usize); 2] = [
    (hm(9, 0), hm(10, 30), 0),
    (hm(11, 0), hm(12, 30), 1),
];

const fn hm(hour: u32, min: u32) -> NaiveTime {
    match NaiveTime::from_hms_opt(hour, min, 0) {
        Some(t) => t,
        None => panic!("invalid slot time"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub removed: u64,
    pub inserted: usize,
}

/// Build the demo timetable around `today`.
///
/// Past classes get a random present/absent mark; today and later stay unmarked.
///
/// # Errors
///
/// Returns `ClassSessionError` if a generated row fails validation.
pub fn plan_sessions<R: Rng + ?Sized>(
    today: NaiveDate,
    rng: &mut R,
) -> Result<Vec<NewClassSession>, ClassSessionError> {
    let mut planned = Vec::new();
    for offset in -WINDOW_DAYS..=WINDOW_DAYS {
        let date = today + Duration::days(offset);
        if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            continue;
        }
        let base = usize::try_from(offset.unsigned_abs()).unwrap_or(0);
        for (slot, (start, end, location)) in SLOTS.iter().enumerate() {
            let attendance = if offset < 0 {
                if rng.random_bool(PRESENT_PROBABILITY) {
                    Some(Attendance::Present)
                } else {
                    Some(Attendance::Absent)
                }
            } else {
                None
            };
            planned.push(NewClassSession::new(
                MODULE_CODES[(base + slot) % MODULE_CODES.len()],
                date,
                *start,
                *end,
                LOCATIONS[*location],
                attendance,
            )?);
        }
    }
    Ok(planned)
}

/// Replace everything in `store` with `sessions`.
///
/// # Errors
///
/// Returns `StorageError` if clearing or inserting fails.
pub async fn reseed(
    store: &dyn SessionStore,
    sessions: Vec<NewClassSession>,
) -> Result<SeedReport, StorageError> {
    let removed = store.clear_sessions().await?;
    let inserted = sessions.len();
    for session in sessions {
        store.insert_session(session).await?;
    }
    tracing::info!(removed, inserted, "reseeded class timetable");
    Ok(SeedReport { removed, inserted })
}
