//! Shared record types and the trait seams between the core and its
//! collaborators (storage, LLM provider).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::DEFAULT_TIMEZONE;
use crate::tracking::{empty_entries, TaskEntry, TASKS_PER_PERIOD};

mod provider;
mod state_store;

pub use provider::ModelProvider;
pub use state_store::{
    HabitStore, SessionStore, SettingsStore, StateStore, TrackingStore,
};

/// Which half of the day a task list belongs to. Each period is owned by one
/// of the user's two identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Morning,
    Afternoon,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Morning => "morning",
            Period::Afternoon => "afternoon",
        }
    }
}

/// One role-tagged message in a coach conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// One row per (user, local date). Created lazily on first read of "today",
/// mutated through the day, never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTrackingRecord {
    pub user_id: String,
    /// ISO date (`YYYY-MM-DD`) in the user's zone.
    pub date: String,
    pub day_of_week: String,
    pub morning_tasks: Vec<TaskEntry>,
    pub afternoon_tasks: Vec<TaskEntry>,
    pub morning_completed: u32,
    pub afternoon_completed: u32,
    pub code_commit_done: bool,
    /// "HH:MM" when the commit habit was marked, if ever.
    pub code_commit_time: Option<String>,
    pub morning_mastery_done: bool,
    pub morning_feedback: Vec<String>,
    pub afternoon_feedback: Vec<String>,
}

impl DailyTrackingRecord {
    /// The shape a day starts with: three empty slots per period, counters
    /// zero, nothing flagged.
    pub fn empty(user_id: &str, date: &str, day_of_week: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            date: date.to_string(),
            day_of_week: day_of_week.to_string(),
            morning_tasks: empty_entries(),
            afternoon_tasks: empty_entries(),
            morning_completed: 0,
            afternoon_completed: 0,
            code_commit_done: false,
            code_commit_time: None,
            morning_mastery_done: false,
            morning_feedback: vec![String::new(); TASKS_PER_PERIOD],
            afternoon_feedback: vec![String::new(); TASKS_PER_PERIOD],
        }
    }

    pub fn tasks(&self, period: Period) -> &[TaskEntry] {
        match period {
            Period::Morning => &self.morning_tasks,
            Period::Afternoon => &self.afternoon_tasks,
        }
    }

    pub fn feedback(&self, period: Period) -> &[String] {
        match period {
            Period::Morning => &self.morning_feedback,
            Period::Afternoon => &self.afternoon_feedback,
        }
    }
}

/// A user-defined recurring action with a streak counter. At most 3 active
/// per user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub streak_count: u32,
    pub longest_streak: u32,
    pub last_completed_at: Option<DateTime<Utc>>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Append-only completion event, used only for heatmap aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitLog {
    pub id: i64,
    pub habit_id: String,
    pub user_id: String,
    pub completed_at: DateTime<Utc>,
    /// Local date the completion counted for.
    pub date_logged: String,
}

/// What `mark_habit_done` reports back to the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitDoneOutcome {
    pub streak: u32,
    /// False when the habit was already done today (nothing was written).
    pub changed: bool,
    pub message: String,
}

/// One persisted chat exchange, tagged with the identity that was active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSession {
    pub id: i64,
    pub user_id: String,
    pub identity_active: String,
    pub messages: Vec<ChatMessage>,
    pub start_time: DateTime<Utc>,
}

/// A completed focus timer, logged once on acknowledgement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusSession {
    pub id: i64,
    pub user_id: String,
    pub task_name: String,
    pub timer_type: String,
    pub duration_minutes: u32,
    pub completed_at: DateTime<Utc>,
    pub date: String,
}

/// Singleton per user; upserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    pub user_id: String,
    pub identity_1_name: String,
    pub identity_2_name: String,
    pub timezone: String,
    pub morning_mastery_text: String,
}

impl UserSettings {
    pub fn defaults_for(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            identity_1_name: "Entrepreneur".to_string(),
            identity_2_name: "MarTech Professional".to_string(),
            timezone: DEFAULT_TIMEZONE.to_string(),
            morning_mastery_text: String::new(),
        }
    }

    /// Display name of the identity owning a period.
    pub fn identity_for(&self, period: Period) -> &str {
        match period {
            Period::Morning => &self.identity_1_name,
            Period::Afternoon => &self.identity_2_name,
        }
    }
}
