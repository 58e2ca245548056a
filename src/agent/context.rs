//! Day-context assembly: everything the coach needs to know about "right
//! now", gathered once per turn and rendered into the context block appended
//! to the system prompt.

use std::sync::Arc;

use chrono::Timelike;

use crate::clock::UserClock;
use crate::tracking::TaskEntry;
use crate::traits::{
    DailyTrackingRecord, Habit, HabitStore, Period, SettingsStore, StateStore, TrackingStore,
    UserSettings,
};

/// Local hour at which the afternoon identity takes over.
pub const IDENTITY_SWITCH_HOUR: u32 = 15;

/// Snapshot of the user's day, used to build the coach context block.
#[derive(Debug, Clone)]
pub struct DayContext {
    pub date: String,
    pub day: String,
    pub time: String,
    pub is_weekend: bool,
    /// Active identity name; None on weekends (no strict protocol).
    pub identity: Option<String>,
    pub settings: UserSettings,
    pub tracking: DailyTrackingRecord,
    pub habits: Vec<Habit>,
    /// Consecutive days ending today (or yesterday) with the code habit done.
    pub code_streak: u32,
}

impl DayContext {
    pub async fn assemble(
        store: &Arc<dyn StateStore>,
        clock: &UserClock,
        user_id: &str,
    ) -> anyhow::Result<Self> {
        let settings = store.get_user_settings(user_id).await?;
        let tracking = store.get_or_create_today(user_id).await?;
        let habits = store.get_habits(user_id).await?;
        let recent = store.get_last_n_days_tracking(user_id, 30).await?;
        let code_streak = code_streak_from_records(&recent);

        let is_weekend = clock.is_weekend();
        let identity = active_identity(&settings, is_weekend, clock.now().hour());

        Ok(Self {
            date: clock.today_iso(),
            day: clock.day_of_week(),
            time: clock.current_time_hhmm(),
            is_weekend,
            identity,
            settings,
            tracking,
            habits,
            code_streak,
        })
    }

    /// Identity name used to tag the persisted session.
    pub fn identity_label(&self) -> &str {
        self.identity.as_deref().unwrap_or("Weekend")
    }

    /// The context block appended below the fixed system prompt.
    pub fn render(&self) -> String {
        let identity_line = self
            .identity
            .as_deref()
            .unwrap_or("Weekend - no strict protocol");

        let mut out = format!(
            "CURRENT CONTEXT:\n\
             - Date: {}\n\
             - Day: {}\n\
             - Time: {}\n\
             - Active identity: {}\n\
             \n\
             TODAY'S TRACKING:\n\
             - Morning tasks completed: {}/3\n\
             - Afternoon tasks completed: {}/3\n\
             - Code done: {}\n\
             - Morning Mastery: {}\n",
            self.date,
            self.day,
            self.time,
            identity_line,
            self.tracking.morning_completed,
            self.tracking.afternoon_completed,
            yes_no(self.tracking.code_commit_done),
            yes_no(self.tracking.morning_mastery_done),
        );

        out.push_str(&format!(
            "\nMORNING TASKS ({}):\n{}",
            self.settings.identity_for(Period::Morning),
            task_lines(self.tracking.tasks(Period::Morning), self.tracking.feedback(Period::Morning)),
        ));
        out.push_str(&format!(
            "\nAFTERNOON TASKS ({}):\n{}",
            self.settings.identity_for(Period::Afternoon),
            task_lines(
                self.tracking.tasks(Period::Afternoon),
                self.tracking.feedback(Period::Afternoon)
            ),
        ));

        if !self.habits.is_empty() {
            out.push_str("\nHABITS:\n");
            for habit in &self.habits {
                out.push_str(&format!(
                    "  - {}: streak {} days (best {})\n",
                    habit.name, habit.streak_count, habit.longest_streak
                ));
            }
        }

        out.push_str(&format!("\nCODE STREAK: {} days\n\n---\n", self.code_streak));
        out
    }
}

/// Weekend → none; before the switch hour → identity 1; after → identity 2.
pub fn active_identity(
    settings: &UserSettings,
    is_weekend: bool,
    local_hour: u32,
) -> Option<String> {
    if is_weekend {
        None
    } else if local_hour < IDENTITY_SWITCH_HOUR {
        Some(settings.identity_1_name.clone())
    } else {
        Some(settings.identity_2_name.clone())
    }
}

/// Consecutive `code_commit_done` days counted backwards from the last
/// record. A not-done today does not break a streak that ran through
/// yesterday; the first not-done day before that does.
pub fn code_streak_from_records(records: &[DailyTrackingRecord]) -> u32 {
    let mut streak = 0;
    let mut iter = records.iter().rev().peekable();

    // Skip today if the commit has not happened yet.
    if let Some(last) = iter.peek() {
        if !last.code_commit_done {
            iter.next();
        }
    }

    for record in iter {
        if record.code_commit_done {
            streak += 1;
        } else {
            break;
        }
    }
    streak
}

fn task_lines(tasks: &[TaskEntry], feedback: &[String]) -> String {
    let mut out = String::new();
    for (i, task) in tasks.iter().enumerate() {
        if !task.has_text() {
            continue;
        }
        let check = if task.done { "[x]" } else { "[ ]" };
        out.push_str(&format!("  {} Task {}: {}\n", check, i + 1, task.text));
        if let Some(fb) = feedback.get(i).filter(|fb| !fb.is_empty()) {
            out.push_str(&format!("     Feedback: {}\n", fb));
        }
    }
    if out.is_empty() {
        out.push_str("  No tasks defined\n");
    }
    out
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}
