use async_trait::async_trait;

use crate::tracking::TaskEntry;

use super::{
    ChatMessage, ConversationSession, DailyTrackingRecord, FocusSession, Habit, HabitDoneOutcome,
    HabitLog, Period, UserSettings,
};

/// Daily tracking rows: one per (user, local date).
#[async_trait]
pub trait TrackingStore: Send + Sync {
    /// Fetch today's record, creating an empty one on first access.
    /// Idempotent: repeated calls within the same day return the same row.
    async fn get_or_create_today(&self, user_id: &str) -> anyhow::Result<DailyTrackingRecord>;

    /// Replace the 3-entry list for a period on today's record and recompute
    /// the derived completed count. Rejects lists whose length is not 3.
    async fn update_task_list(
        &self,
        user_id: &str,
        period: Period,
        entries: &[TaskEntry],
    ) -> anyhow::Result<()>;

    /// Flag the code habit done; `commit_time` defaults to now (user zone).
    async fn mark_code_done(&self, user_id: &str, commit_time: Option<String>)
        -> anyhow::Result<()>;

    async fn mark_morning_mastery_done(&self, user_id: &str) -> anyhow::Result<()>;

    /// Persist per-task feedback for a period (re-displayed until the next
    /// save overwrites it).
    async fn save_task_feedback(
        &self,
        user_id: &str,
        period: Period,
        feedback: &[String],
    ) -> anyhow::Result<()>;

    async fn get_task_feedback(&self, user_id: &str, period: Period)
        -> anyhow::Result<Vec<String>>;

    /// Records for the last `days` local dates, oldest first.
    async fn get_last_n_days_tracking(
        &self,
        user_id: &str,
        days: u32,
    ) -> anyhow::Result<Vec<DailyTrackingRecord>>;
}

/// Habits and their streaks.
#[async_trait]
pub trait HabitStore: Send + Sync {
    /// Create an active habit with streak 0. Rejects empty names and a 4th
    /// active habit.
    async fn create_habit(&self, user_id: &str, name: &str) -> anyhow::Result<Habit>;

    /// Active habits in creation order.
    async fn get_habits(&self, user_id: &str) -> anyhow::Result<Vec<Habit>>;

    /// Rename a habit. A renamed habit is semantically new: streak and
    /// last-completion reset.
    async fn rename_habit(&self, user_id: &str, habit_id: &str, name: &str) -> anyhow::Result<()>;

    async fn delete_habit(&self, user_id: &str, habit_id: &str) -> anyhow::Result<()>;

    /// Mark done today: runs the streak rules, persists the habit and one log
    /// row in a single transaction, or writes nothing on a same-day repeat.
    async fn mark_habit_done(
        &self,
        user_id: &str,
        habit_id: &str,
    ) -> anyhow::Result<HabitDoneOutcome>;

    /// Completion events for the last `days` local dates (heatmap feed).
    async fn get_habit_logs_last_n_days(
        &self,
        user_id: &str,
        days: u32,
    ) -> anyhow::Result<Vec<HabitLog>>;
}

/// Append-only conversation and focus-session logs.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist one chat exchange tagged with the active identity.
    async fn log_conversation(
        &self,
        user_id: &str,
        identity_active: &str,
        messages: &[ChatMessage],
    ) -> anyhow::Result<()>;

    /// Most recent `limit` sessions, oldest first, the replay order the
    /// agent rehydrates with.
    async fn get_recent_conversations(
        &self,
        user_id: &str,
        limit: u32,
    ) -> anyhow::Result<Vec<ConversationSession>>;

    async fn log_focus_session(
        &self,
        user_id: &str,
        task_name: &str,
        timer_type: &str,
        duration_minutes: u32,
    ) -> anyhow::Result<()>;

    /// Today's completed sessions, most recent first.
    async fn get_focus_sessions_today(&self, user_id: &str) -> anyhow::Result<Vec<FocusSession>>;
}

/// Per-user settings singleton.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Stored settings merged over the defaults; plain defaults when no row
    /// exists yet.
    async fn get_user_settings(&self, user_id: &str) -> anyhow::Result<UserSettings>;

    /// Upsert identity names and (optionally) the timezone.
    async fn update_user_settings(
        &self,
        user_id: &str,
        identity_1: &str,
        identity_2: &str,
        timezone: Option<&str>,
    ) -> anyhow::Result<()>;

    async fn get_morning_mastery_text(&self, user_id: &str) -> anyhow::Result<String>;

    async fn update_morning_mastery_text(&self, user_id: &str, text: &str) -> anyhow::Result<()>;
}

/// Facade over all store concerns so call sites can hold one
/// `Arc<dyn StateStore>` while new code depends on the focused traits.
pub trait StateStore:
    Send + Sync + TrackingStore + HabitStore + SessionStore + SettingsStore
{
}

impl<T> StateStore for T where
    T: Send + Sync + TrackingStore + HabitStore + SessionStore + SettingsStore
{
}
