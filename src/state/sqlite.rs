use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};

use crate::clock::UserClock;
use crate::tracking::{empty_entries, entries_from_legacy, TaskEntry, TASKS_PER_PERIOD};
use crate::traits::{ChatMessage, DailyTrackingRecord, Habit};

mod habits;
mod sessions;
mod settings;
mod tracking;


/// Set restrictive file permissions (0600) on the database and WAL files.
#[cfg(unix)]
fn set_db_file_permissions(db_path: &str) {
    use std::os::unix::fs::PermissionsExt;
    let mode = std::fs::Permissions::from_mode(0o600);
    if let Err(e) = std::fs::set_permissions(db_path, mode.clone()) {
        tracing::warn!("Failed to set permissions on {}: {}", db_path, e);
    }
    for suffix in &["-wal", "-shm"] {
        let path = format!("{}{}", db_path, suffix);
        if std::path::Path::new(&path).exists() {
            if let Err(e) = std::fs::set_permissions(&path, mode.clone()) {
                tracing::warn!("Failed to set permissions on {}: {}", path, e);
            }
        }
    }
}

#[cfg(not(unix))]
fn set_db_file_permissions(_db_path: &str) {}

/// SQLite-backed implementation of every store trait.
///
/// Single-user, single-session usage: updates are last-write-wins and nothing
/// wraps multi-field updates in optimistic locking. The one place atomicity
/// matters, the habit streak plus its log row, uses a transaction.
pub struct SqliteStateStore {
    pool: SqlitePool,
    clock: UserClock,
}

impl SqliteStateStore {
    pub async fn new(db_path: &str, clock: UserClock) -> anyhow::Result<Self> {
        let opts = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await?;

        set_db_file_permissions(db_path);
        migrate(&pool).await?;

        Ok(Self { pool, clock })
    }

    pub fn clock(&self) -> &UserClock {
        &self.clock
    }

    #[cfg(test)]
    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Idempotent schema creation plus best-effort column additions for databases
/// created before the structured task columns existed.
async fn migrate(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS daily_tracking (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            date TEXT NOT NULL,
            day_of_week TEXT NOT NULL DEFAULT '',
            morning_tasks TEXT,
            afternoon_tasks TEXT,
            morning_task_list TEXT,
            afternoon_task_list TEXT,
            morning_completed INTEGER NOT NULL DEFAULT 0,
            afternoon_completed INTEGER NOT NULL DEFAULT 0,
            code_commit_done INTEGER NOT NULL DEFAULT 0,
            code_commit_time TEXT,
            morning_mastery_done INTEGER NOT NULL DEFAULT 0,
            morning_feedback TEXT,
            afternoon_feedback TEXT,
            UNIQUE(user_id, date)
        )",
    )
    .execute(pool)
    .await?;

    // Legacy databases predate the structured columns; add them best-effort.
    for column in [
        "morning_tasks TEXT",
        "afternoon_tasks TEXT",
        "morning_feedback TEXT",
        "afternoon_feedback TEXT",
    ] {
        let _ = sqlx::query(&format!("ALTER TABLE daily_tracking ADD COLUMN {}", column))
            .execute(pool)
            .await;
    }

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS habits (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            name TEXT NOT NULL,
            streak_count INTEGER NOT NULL DEFAULT 0,
            longest_streak INTEGER NOT NULL DEFAULT 0,
            last_completed_at TEXT,
            active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS habit_logs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            habit_id TEXT NOT NULL,
            user_id TEXT NOT NULL,
            completed_at TEXT NOT NULL,
            date_logged TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS identity_sessions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            identity_active TEXT NOT NULL,
            conversation_log TEXT NOT NULL,
            start_time TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS focus_sessions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            task_name TEXT NOT NULL,
            timer_type TEXT NOT NULL,
            duration_minutes INTEGER NOT NULL,
            completed_at TEXT NOT NULL,
            date TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS user_settings (
            user_id TEXT PRIMARY KEY,
            identity_1_name TEXT,
            identity_2_name TEXT,
            timezone TEXT,
            morning_mastery_text TEXT NOT NULL DEFAULT '',
            updated_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_habit_logs_user_date
         ON habit_logs(user_id, date_logged)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_sessions_user_time
         ON identity_sessions(user_id, start_time DESC)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_focus_user_date
         ON focus_sessions(user_id, date)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

fn parse_rfc3339(raw: &str) -> anyhow::Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)?.with_timezone(&Utc))
}

/// Structured entries from a row, hydrating the legacy flat-list shape when
/// no structured column is present.
fn entries_from_columns(
    structured: Option<String>,
    legacy: Option<String>,
) -> Vec<TaskEntry> {
    if let Some(json) = structured {
        if let Ok(mut entries) = serde_json::from_str::<Vec<TaskEntry>>(&json) {
            entries.truncate(TASKS_PER_PERIOD);
            entries.resize(TASKS_PER_PERIOD, TaskEntry::default());
            return entries;
        }
    }
    if let Some(json) = legacy {
        if let Ok(texts) = serde_json::from_str::<Vec<String>>(&json) {
            return entries_from_legacy(&texts);
        }
    }
    empty_entries()
}

fn feedback_from_column(raw: Option<String>) -> Vec<String> {
    let mut feedback = raw
        .and_then(|json| serde_json::from_str::<Vec<String>>(&json).ok())
        .unwrap_or_default();
    feedback.truncate(TASKS_PER_PERIOD);
    feedback.resize(TASKS_PER_PERIOD, String::new());
    feedback
}

fn record_from_row(row: &sqlx::sqlite::SqliteRow) -> DailyTrackingRecord {
    DailyTrackingRecord {
        user_id: row.get("user_id"),
        date: row.get("date"),
        day_of_week: row.get("day_of_week"),
        morning_tasks: entries_from_columns(
            row.get::<Option<String>, _>("morning_tasks"),
            row.get::<Option<String>, _>("morning_task_list"),
        ),
        afternoon_tasks: entries_from_columns(
            row.get::<Option<String>, _>("afternoon_tasks"),
            row.get::<Option<String>, _>("afternoon_task_list"),
        ),
        morning_completed: row.get::<i64, _>("morning_completed") as u32,
        afternoon_completed: row.get::<i64, _>("afternoon_completed") as u32,
        code_commit_done: row.get::<i64, _>("code_commit_done") != 0,
        code_commit_time: row.get("code_commit_time"),
        morning_mastery_done: row.get::<i64, _>("morning_mastery_done") != 0,
        morning_feedback: feedback_from_column(row.get::<Option<String>, _>("morning_feedback")),
        afternoon_feedback: feedback_from_column(
            row.get::<Option<String>, _>("afternoon_feedback"),
        ),
    }
}

fn habit_from_row(row: &sqlx::sqlite::SqliteRow) -> anyhow::Result<Habit> {
    let last_completed_at = match row.get::<Option<String>, _>("last_completed_at") {
        Some(raw) => Some(parse_rfc3339(&raw)?),
        None => None,
    };
    Ok(Habit {
        id: row.get("id"),
        user_id: row.get("user_id"),
        name: row.get("name"),
        streak_count: row.get::<i64, _>("streak_count") as u32,
        longest_streak: row.get::<i64, _>("longest_streak") as u32,
        last_completed_at,
        active: row.get::<i64, _>("active") != 0,
        created_at: parse_rfc3339(&row.get::<String, _>("created_at"))?,
    })
}

fn messages_from_json(raw: &str) -> Vec<ChatMessage> {
    serde_json::from_str(raw).unwrap_or_default()
}
