use super::*;

use crate::tracking::{completed_count, legacy_text_list, validate_entries};
use crate::traits::{Period, TrackingStore};

impl SqliteStateStore {
    /// Today's row if it exists, mapped to a record.
    async fn fetch_today(
        &self,
        user_id: &str,
        date: &str,
    ) -> anyhow::Result<Option<DailyTrackingRecord>> {
        let row = sqlx::query("SELECT * FROM daily_tracking WHERE user_id = ? AND date = ?")
            .bind(user_id)
            .bind(date)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(record_from_row))
    }

    /// Ensure today's row exists and return it. The UNIQUE(user_id, date)
    /// index makes the insert race-safe: on conflict we reread.
    async fn ensure_today(&self, user_id: &str) -> anyhow::Result<DailyTrackingRecord> {
        let date = self.clock.today_iso();
        if let Some(record) = self.fetch_today(user_id, &date).await? {
            return Ok(record);
        }

        let day_of_week = self.clock.day_of_week();
        let empty = serde_json::to_string(&empty_entries())?;
        let empty_legacy = serde_json::to_string(&Vec::<String>::new())?;
        let result = sqlx::query(
            "INSERT OR IGNORE INTO daily_tracking
                (user_id, date, day_of_week,
                 morning_tasks, afternoon_tasks,
                 morning_task_list, afternoon_task_list)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(&date)
        .bind(&day_of_week)
        .bind(&empty)
        .bind(&empty)
        .bind(&empty_legacy)
        .bind(&empty_legacy)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            tracing::debug!(user_id, date = %date, "Created tracking record for today");
        }

        self.fetch_today(user_id, &date)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Tracking row vanished after insert"))
    }
}

#[async_trait]
impl TrackingStore for SqliteStateStore {
    async fn get_or_create_today(&self, user_id: &str) -> anyhow::Result<DailyTrackingRecord> {
        self.ensure_today(user_id).await
    }

    async fn update_task_list(
        &self,
        user_id: &str,
        period: Period,
        entries: &[TaskEntry],
    ) -> anyhow::Result<()> {
        validate_entries(entries)?;
        self.ensure_today(user_id).await?;

        let date = self.clock.today_iso();
        let structured = serde_json::to_string(entries)?;
        let legacy = serde_json::to_string(&legacy_text_list(entries))?;
        let completed = completed_count(entries);

        let sql = match period {
            Period::Morning => {
                "UPDATE daily_tracking
                 SET morning_tasks = ?, morning_task_list = ?, morning_completed = ?
                 WHERE user_id = ? AND date = ?"
            }
            Period::Afternoon => {
                "UPDATE daily_tracking
                 SET afternoon_tasks = ?, afternoon_task_list = ?, afternoon_completed = ?
                 WHERE user_id = ? AND date = ?"
            }
        };
        sqlx::query(sql)
            .bind(&structured)
            .bind(&legacy)
            .bind(completed as i64)
            .bind(user_id)
            .bind(&date)
            .execute(&self.pool)
            .await?;

        tracing::debug!(user_id, period = period.as_str(), completed, "Updated task list");
        Ok(())
    }

    async fn mark_code_done(
        &self,
        user_id: &str,
        commit_time: Option<String>,
    ) -> anyhow::Result<()> {
        self.ensure_today(user_id).await?;
        let date = self.clock.today_iso();
        let time = commit_time.unwrap_or_else(|| self.clock.current_time_hhmm());

        sqlx::query(
            "UPDATE daily_tracking
             SET code_commit_done = 1, code_commit_time = ?
             WHERE user_id = ? AND date = ?",
        )
        .bind(&time)
        .bind(user_id)
        .bind(&date)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn mark_morning_mastery_done(&self, user_id: &str) -> anyhow::Result<()> {
        self.ensure_today(user_id).await?;
        let date = self.clock.today_iso();

        sqlx::query(
            "UPDATE daily_tracking SET morning_mastery_done = 1
             WHERE user_id = ? AND date = ?",
        )
        .bind(user_id)
        .bind(&date)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn save_task_feedback(
        &self,
        user_id: &str,
        period: Period,
        feedback: &[String],
    ) -> anyhow::Result<()> {
        self.ensure_today(user_id).await?;
        let date = self.clock.today_iso();
        let json = serde_json::to_string(feedback)?;

        let sql = match period {
            Period::Morning => {
                "UPDATE daily_tracking SET morning_feedback = ?
                 WHERE user_id = ? AND date = ?"
            }
            Period::Afternoon => {
                "UPDATE daily_tracking SET afternoon_feedback = ?
                 WHERE user_id = ? AND date = ?"
            }
        };
        sqlx::query(sql)
            .bind(&json)
            .bind(user_id)
            .bind(&date)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_task_feedback(
        &self,
        user_id: &str,
        period: Period,
    ) -> anyhow::Result<Vec<String>> {
        let record = self.ensure_today(user_id).await?;
        Ok(record.feedback(period).to_vec())
    }

    async fn get_last_n_days_tracking(
        &self,
        user_id: &str,
        days: u32,
    ) -> anyhow::Result<Vec<DailyTrackingRecord>> {
        let since = self.clock.today() - chrono::Duration::days(i64::from(days.saturating_sub(1)));
        let since = since.format("%Y-%m-%d").to_string();

        let rows = sqlx::query(
            "SELECT * FROM daily_tracking
             WHERE user_id = ? AND date >= ?
             ORDER BY date ASC",
        )
        .bind(user_id)
        .bind(&since)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(record_from_row).collect())
    }
}
