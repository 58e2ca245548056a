//! Daily task-list rules: entry shape, completed counts, legacy hydration,
//! progressive unlock, and weekly aggregates.
//!
//! Everything here is pure; the SQLite store calls into it so the rules stay
//! testable without a database.

use serde::{Deserialize, Serialize};

use crate::error::CoachError;

/// Each period holds exactly this many task slots.
pub const TASKS_PER_PERIOD: usize = 3;

/// One slot of a period's task list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskEntry {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub done: bool,
}

impl TaskEntry {
    pub fn new(text: impl Into<String>, done: bool) -> Self {
        Self {
            text: text.into(),
            done,
        }
    }

    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// An empty 3-slot list, the shape a fresh tracking record starts with.
pub fn empty_entries() -> Vec<TaskEntry> {
    vec![TaskEntry::default(); TASKS_PER_PERIOD]
}

/// Reject lists that are not exactly 3 entries. Entry field types are already
/// enforced by deserialization into [`TaskEntry`].
pub fn validate_entries(entries: &[TaskEntry]) -> Result<(), CoachError> {
    if entries.len() != TASKS_PER_PERIOD {
        return Err(CoachError::validation(format!(
            "Task list must have exactly {} entries, got {}",
            TASKS_PER_PERIOD,
            entries.len()
        )));
    }
    Ok(())
}

/// Count of entries marked done. Text presence is irrelevant.
pub fn completed_count(entries: &[TaskEntry]) -> u32 {
    entries.iter().filter(|e| e.done).count() as u32
}

/// Flat text list kept in the legacy columns for older dashboard queries.
pub fn legacy_text_list(entries: &[TaskEntry]) -> Vec<String> {
    entries.iter().map(|e| e.text.clone()).collect()
}

/// Hydrate a legacy flat string list into structured entries.
///
/// Legacy rows stored only the texts plus a separate completed counter, so
/// every hydrated entry starts not-done. Always yields exactly 3 slots.
pub fn entries_from_legacy(texts: &[String]) -> Vec<TaskEntry> {
    let mut entries: Vec<TaskEntry> = texts
        .iter()
        .take(TASKS_PER_PERIOD)
        .map(|t| TaskEntry::new(t.clone(), false))
        .collect();
    entries.resize(TASKS_PER_PERIOD, TaskEntry::default());
    entries
}

/// Number of leading slots the user may edit right now.
///
/// Slot `i > 0` unlocks only once slot `i - 1` has non-whitespace text. The
/// UI enforces this; the data needed for the check lives in the ordered list.
pub fn unlocked_slots(entries: &[TaskEntry]) -> usize {
    let mut unlocked = 1;
    for entry in entries.iter().take(TASKS_PER_PERIOD.saturating_sub(1)) {
        if entry.has_text() {
            unlocked += 1;
        } else {
            break;
        }
    }
    unlocked.min(TASKS_PER_PERIOD)
}

pub fn is_slot_editable(entries: &[TaskEntry], index: usize) -> bool {
    index < unlocked_slots(entries)
}

/// Seven-day rollup shown on the dashboard.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeeklyStats {
    pub total_morning: u32,
    pub total_afternoon: u32,
    pub code_days: u32,
    pub morning_mastery_days: u32,
    /// Percentage of the 6 daily slots (3 per period) completed, averaged
    /// over the days that have records.
    pub avg_completion_rate: f64,
}

impl WeeklyStats {
    pub fn from_records(records: &[crate::traits::DailyTrackingRecord]) -> Self {
        if records.is_empty() {
            return Self::default();
        }

        let total_morning: u32 = records.iter().map(|r| r.morning_completed).sum();
        let total_afternoon: u32 = records.iter().map(|r| r.afternoon_completed).sum();
        let code_days = records.iter().filter(|r| r.code_commit_done).count() as u32;
        let morning_mastery_days = records.iter().filter(|r| r.morning_mastery_done).count() as u32;

        let slots = (records.len() * TASKS_PER_PERIOD * 2) as f64;
        let rate = f64::from(total_morning + total_afternoon) / slots * 100.0;

        Self {
            total_morning,
            total_afternoon,
            code_days,
            morning_mastery_days,
            avg_completion_rate: (rate * 100.0).round() / 100.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::DailyTrackingRecord;

    fn entries(specs: &[(&str, bool)]) -> Vec<TaskEntry> {
        specs.iter().map(|(t, d)| TaskEntry::new(*t, *d)).collect()
    }

    #[test]
    fn completed_count_ignores_text_presence() {
        let list = entries(&[("write intro", true), ("call lead", true), ("", false)]);
        assert_eq!(completed_count(&list), 2);

        // A done entry with empty text still counts.
        let odd = entries(&[("", true), ("x", false), ("", false)]);
        assert_eq!(completed_count(&odd), 1);
    }

    #[test]
    fn validate_rejects_wrong_lengths() {
        assert!(validate_entries(&entries(&[("a", false)])).is_err());
        assert!(validate_entries(&entries(&[
            ("a", false),
            ("b", false),
            ("c", false),
            ("d", false)
        ]))
        .is_err());
        assert!(validate_entries(&empty_entries()).is_ok());
    }

    #[test]
    fn legacy_strings_hydrate_as_not_done() {
        let legacy = vec!["a".to_string(), "b".to_string(), String::new()];
        let hydrated = entries_from_legacy(&legacy);
        assert_eq!(
            hydrated,
            vec![
                TaskEntry::new("a", false),
                TaskEntry::new("b", false),
                TaskEntry::default(),
            ]
        );
    }

    #[test]
    fn legacy_hydration_pads_and_truncates_to_three() {
        assert_eq!(entries_from_legacy(&[]).len(), TASKS_PER_PERIOD);
        let long: Vec<String> = (0..5).map(|i| format!("t{i}")).collect();
        let hydrated = entries_from_legacy(&long);
        assert_eq!(hydrated.len(), TASKS_PER_PERIOD);
        assert_eq!(hydrated[2].text, "t2");
    }

    #[test]
    fn unlock_requires_previous_text() {
        let none = empty_entries();
        assert_eq!(unlocked_slots(&none), 1);
        assert!(is_slot_editable(&none, 0));
        assert!(!is_slot_editable(&none, 1));

        let one = entries(&[("first", false), ("", false), ("", false)]);
        assert_eq!(unlocked_slots(&one), 2);
        assert!(is_slot_editable(&one, 1));
        assert!(!is_slot_editable(&one, 2));

        let full = entries(&[("a", false), ("b", true), ("", false)]);
        assert_eq!(unlocked_slots(&full), 3);
    }

    #[test]
    fn whitespace_text_does_not_unlock() {
        let padded = entries(&[("   ", false), ("", false), ("", false)]);
        assert_eq!(unlocked_slots(&padded), 1);
    }

    #[test]
    fn weekly_stats_aggregate_over_records() {
        let mut day1 = DailyTrackingRecord::empty("u1", "2026-05-10", "Sunday");
        day1.morning_completed = 3;
        day1.afternoon_completed = 2;
        day1.code_commit_done = true;
        day1.morning_mastery_done = true;

        let mut day2 = DailyTrackingRecord::empty("u1", "2026-05-11", "Monday");
        day2.morning_completed = 1;
        day2.afternoon_completed = 0;

        let stats = WeeklyStats::from_records(&[day1, day2]);
        assert_eq!(stats.total_morning, 4);
        assert_eq!(stats.total_afternoon, 2);
        assert_eq!(stats.code_days, 1);
        assert_eq!(stats.morning_mastery_days, 1);
        // 6 of 12 slots over two days.
        assert!((stats.avg_completion_rate - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn weekly_stats_of_nothing_is_zeroed() {
        assert_eq!(WeeklyStats::from_records(&[]), WeeklyStats::default());
    }
}
