//! Attendance aggregation over a fetched class list.

use chrono::NaiveDate;

use crate::model::{Attendance, ClassSession};

/// Headline numbers for the dashboard attendance card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttendanceStats {
    /// Attended share of marked sessions, 0..=100.
    pub percentage: u8,
    pub total_attended: u32,
    /// Sessions dated today or earlier, marked or not.
    pub total_held: u32,
}

/// One bar of the per-module attendance chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleAttendance {
    pub module_code: String,
    pub attended: u32,
    pub marked: u32,
    pub percentage: u8,
}

/// Summarise a session list as of `today`.
///
/// `total_held` is date-filtered; the percentage is taken over every marked
/// session regardless of date.
#[must_use]
pub fn calculate_stats(sessions: &[ClassSession], today: NaiveDate) -> AttendanceStats {
    let mut held = 0_u32;
    let mut marked = 0_u32;
    let mut attended = 0_u32;

    for session in sessions {
        if session.class_date <= today {
            held = held.saturating_add(1);
        }
        match session.attendance {
            Some(Attendance::Present) => {
                marked = marked.saturating_add(1);
                attended = attended.saturating_add(1);
            }
            Some(Attendance::Absent) => marked = marked.saturating_add(1),
            None => {}
        }
    }

    AttendanceStats {
        percentage: rounded_percentage(attended, marked),
        total_attended: attended,
        total_held: held,
    }
}

/// Per-module breakdown over marked sessions, in order of first appearance.
#[must_use]
pub fn group_by_module(sessions: &[ClassSession]) -> Vec<ModuleAttendance> {
    let mut groups: Vec<ModuleAttendance> = Vec::new();

    for session in sessions {
        let Some(mark) = session.attendance else {
            continue;
        };
        let idx = match groups
            .iter()
            .position(|g| g.module_code == session.module_code)
        {
            Some(idx) => idx,
            None => {
                groups.push(ModuleAttendance {
                    module_code: session.module_code.clone(),
                    attended: 0,
                    marked: 0,
                    percentage: 0,
                });
                groups.len() - 1
            }
        };
        let group = &mut groups[idx];
        group.marked = group.marked.saturating_add(1);
        if mark == Attendance::Present {
            group.attended = group.attended.saturating_add(1);
        }
    }

    for group in &mut groups {
        group.percentage = rounded_percentage(group.attended, group.marked);
    }
    groups
}

/// Whether the timetable lets the student change a session's mark.
///
/// Only sessions dated strictly after `today` are editable.
#[must_use]
pub fn is_editable(class_date: NaiveDate, today: NaiveDate) -> bool {
    class_date > today
}

/// `round(part / whole * 100)` with halves rounding up; 0 when `whole` is 0.
#[must_use]
pub fn rounded_percentage(part: u32, whole: u32) -> u8 {
    if whole == 0 {
        return 0;
    }
    let part = u64::from(part.min(whole));
    let whole = u64::from(whole);
    let pct = (part * 200 + whole) / (whole * 2);
    u8::try_from(pct).unwrap_or(100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewClassSession, SessionId};
    use chrono::{Duration, NaiveTime};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 11, 15).unwrap()
    }

    fn session(id: u64, module: &str, days: i64, attendance: Option<Attendance>) -> ClassSession {
        NewClassSession::new(
            module,
            today() + Duration::days(days),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
            "Room 1",
            attendance,
        )
        .unwrap()
        .assign_id(SessionId::new(id))
    }

    #[test]
    fn half_attended_yesterday() {
        let sessions = vec![
            session(1, "CS101", -1, Some(Attendance::Present)),
            session(2, "CS101", -1, Some(Attendance::Absent)),
        ];
        assert_eq!(
            calculate_stats(&sessions, today()),
            AttendanceStats {
                percentage: 50,
                total_attended: 1,
                total_held: 2
            }
        );
    }

    #[test]
    fn nothing_marked_is_zero_percent() {
        let sessions = vec![session(1, "CS101", -2, None), session(2, "CS101", 0, None)];
        let stats = calculate_stats(&sessions, today());
        assert_eq!(stats.percentage, 0);
        assert_eq!(stats.total_held, 2);
        assert_eq!(calculate_stats(&[], today()), AttendanceStats::default());
    }

    #[test]
    fn held_counts_today_but_not_tomorrow() {
        let sessions = vec![
            session(1, "CS101", 0, None),
            session(2, "CS101", 1, Some(Attendance::Present)),
        ];
        let stats = calculate_stats(&sessions, today());
        assert_eq!(stats.total_held, 1);
        // Future marks still count toward the percentage.
        assert_eq!(stats.percentage, 100);
        assert_eq!(stats.total_attended, 1);
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(rounded_percentage(1, 3), 33);
        assert_eq!(rounded_percentage(2, 3), 67);
        assert_eq!(rounded_percentage(1, 8), 13);
        assert_eq!(rounded_percentage(0, 5), 0);
        assert_eq!(rounded_percentage(5, 5), 100);
    }

    #[test]
    fn percentage_stays_in_range() {
        for whole in 0..40 {
            for part in 0..=whole {
                assert!(rounded_percentage(part, whole) <= 100);
            }
        }
    }

    #[test]
    fn groups_follow_first_appearance_and_skip_unmarked() {
        let sessions = vec![
            session(1, "MATH202", -3, Some(Attendance::Present)),
            session(2, "CS101", -3, Some(Attendance::Absent)),
            session(3, "MATH202", -2, Some(Attendance::Absent)),
            session(4, "MATH202", -1, Some(Attendance::Present)),
            session(5, "PHY101", 2, None),
        ];
        let groups = group_by_module(&sessions);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].module_code, "MATH202");
        assert_eq!((groups[0].attended, groups[0].marked), (2, 3));
        assert_eq!(groups[0].percentage, 67);
        assert_eq!(groups[1].module_code, "CS101");
        assert_eq!(groups[1].percentage, 0);
    }

    #[test]
    fn only_future_sessions_are_editable() {
        let t = today();
        assert!(!is_editable(t - Duration::days(1), t));
        assert!(!is_editable(t, t));
        assert!(is_editable(t + Duration::days(1), t));
    }
}
