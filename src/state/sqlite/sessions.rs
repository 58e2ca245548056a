use super::*;

use crate::traits::{ConversationSession, FocusSession, SessionStore};

#[async_trait]
impl SessionStore for SqliteStateStore {
    async fn log_conversation(
        &self,
        user_id: &str,
        identity_active: &str,
        messages: &[ChatMessage],
    ) -> anyhow::Result<()> {
        let log = serde_json::to_string(messages)?;
        sqlx::query(
            "INSERT INTO identity_sessions (user_id, identity_active, conversation_log, start_time)
             VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(identity_active)
        .bind(&log)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_recent_conversations(
        &self,
        user_id: &str,
        limit: u32,
    ) -> anyhow::Result<Vec<ConversationSession>> {
        let rows = sqlx::query(
            "SELECT * FROM identity_sessions
             WHERE user_id = ?
             ORDER BY start_time DESC
             LIMIT ?",
        )
        .bind(user_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        let mut sessions = rows
            .iter()
            .map(|row| {
                Ok(ConversationSession {
                    id: row.get("id"),
                    user_id: row.get("user_id"),
                    identity_active: row.get("identity_active"),
                    messages: messages_from_json(&row.get::<String, _>("conversation_log")),
                    start_time: parse_rfc3339(&row.get::<String, _>("start_time"))?,
                })
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        // Replay order: oldest first.
        sessions.reverse();
        Ok(sessions)
    }

    async fn log_focus_session(
        &self,
        user_id: &str,
        task_name: &str,
        timer_type: &str,
        duration_minutes: u32,
    ) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO focus_sessions
                (user_id, task_name, timer_type, duration_minutes, completed_at, date)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(task_name)
        .bind(timer_type)
        .bind(i64::from(duration_minutes))
        .bind(Utc::now().to_rfc3339())
        .bind(self.clock.today_iso())
        .execute(&self.pool)
        .await?;

        tracing::debug!(user_id, timer_type, duration_minutes, "Logged focus session");
        Ok(())
    }

    async fn get_focus_sessions_today(&self, user_id: &str) -> anyhow::Result<Vec<FocusSession>> {
        let rows = sqlx::query(
            "SELECT * FROM focus_sessions
             WHERE user_id = ? AND date = ?
             ORDER BY completed_at DESC",
        )
        .bind(user_id)
        .bind(self.clock.today_iso())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(FocusSession {
                    id: row.get("id"),
                    user_id: row.get("user_id"),
                    task_name: row.get("task_name"),
                    timer_type: row.get("timer_type"),
                    duration_minutes: row.get::<i64, _>("duration_minutes") as u32,
                    completed_at: parse_rfc3339(&row.get::<String, _>("completed_at"))?,
                    date: row.get("date"),
                })
            })
            .collect()
    }
}
