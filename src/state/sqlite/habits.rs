use super::*;

use crate::error::CoachError;
use crate::streak::{self, StreakAdvance};
use crate::traits::{HabitDoneOutcome, HabitLog, HabitStore};

/// Cap on simultaneously active habits per user.
const MAX_ACTIVE_HABITS: i64 = 3;

#[async_trait]
impl HabitStore for SqliteStateStore {
    async fn create_habit(&self, user_id: &str, name: &str) -> anyhow::Result<Habit> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoachError::validation("Habit name cannot be empty").into());
        }

        let active: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM habits WHERE user_id = ? AND active = 1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        if active >= MAX_ACTIVE_HABITS {
            return Err(CoachError::validation(format!(
                "You already have {} active habits. Delete one before adding another.",
                MAX_ACTIVE_HABITS
            ))
            .into());
        }

        let habit = Habit {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            name: name.to_string(),
            streak_count: 0,
            longest_streak: 0,
            last_completed_at: None,
            active: true,
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO habits
                (id, user_id, name, streak_count, longest_streak, active, created_at)
             VALUES (?, ?, ?, 0, 0, 1, ?)",
        )
        .bind(&habit.id)
        .bind(&habit.user_id)
        .bind(&habit.name)
        .bind(habit.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        tracing::info!(user_id, habit = %habit.name, "Created habit");
        Ok(habit)
    }

    async fn get_habits(&self, user_id: &str) -> anyhow::Result<Vec<Habit>> {
        let rows = sqlx::query(
            "SELECT * FROM habits
             WHERE user_id = ? AND active = 1
             ORDER BY created_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(habit_from_row).collect()
    }

    async fn rename_habit(&self, user_id: &str, habit_id: &str, name: &str) -> anyhow::Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoachError::validation("Habit name cannot be empty").into());
        }

        // A renamed habit is a new commitment: the streak does not carry over.
        let result = sqlx::query(
            "UPDATE habits
             SET name = ?, streak_count = 0, last_completed_at = NULL
             WHERE id = ? AND user_id = ?",
        )
        .bind(name)
        .bind(habit_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoachError::not_found(format!("Habit {} not found", habit_id)).into());
        }
        Ok(())
    }

    async fn delete_habit(&self, user_id: &str, habit_id: &str) -> anyhow::Result<()> {
        let result = sqlx::query("DELETE FROM habits WHERE id = ? AND user_id = ?")
            .bind(habit_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoachError::not_found(format!("Habit {} not found", habit_id)).into());
        }
        tracing::info!(user_id, habit_id, "Deleted habit");
        Ok(())
    }

    async fn mark_habit_done(
        &self,
        user_id: &str,
        habit_id: &str,
    ) -> anyhow::Result<HabitDoneOutcome> {
        let row = sqlx::query("SELECT * FROM habits WHERE id = ? AND user_id = ?")
            .bind(habit_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| CoachError::not_found(format!("Habit {} not found", habit_id)))?;
        let habit = habit_from_row(&row)?;

        let today = self.clock.today();
        let advance = streak::advance(
            habit.last_completed_at,
            habit.streak_count,
            today,
            self.clock.timezone(),
        )?;
        let streak = advance.streak(habit.streak_count);

        if !advance.mutates() {
            return Ok(HabitDoneOutcome {
                streak,
                changed: false,
                message: "Already completed today".to_string(),
            });
        }

        let longest = streak::new_longest(habit.longest_streak, streak);
        let now = Utc::now();
        let date_logged = today.format("%Y-%m-%d").to_string();

        // Streak update and log row land together or not at all.
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "UPDATE habits
             SET streak_count = ?, longest_streak = ?, last_completed_at = ?
             WHERE id = ?",
        )
        .bind(streak as i64)
        .bind(longest as i64)
        .bind(now.to_rfc3339())
        .bind(habit_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO habit_logs (habit_id, user_id, completed_at, date_logged)
             VALUES (?, ?, ?, ?)",
        )
        .bind(habit_id)
        .bind(user_id)
        .bind(now.to_rfc3339())
        .bind(&date_logged)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        let message = match advance {
            StreakAdvance::Started => "Streak started! Day 1.".to_string(),
            StreakAdvance::Extended { .. } => format!("Streak: {} days!", streak),
            StreakAdvance::Reset => "Streak reset. Back to day 1.".to_string(),
            StreakAdvance::AlreadyDoneToday { .. } => unreachable!("handled above"),
        };

        tracing::info!(user_id, habit = %habit.name, streak, "Marked habit done");
        Ok(HabitDoneOutcome {
            streak,
            changed: true,
            message,
        })
    }

    async fn get_habit_logs_last_n_days(
        &self,
        user_id: &str,
        days: u32,
    ) -> anyhow::Result<Vec<HabitLog>> {
        let since = self.clock.today() - chrono::Duration::days(i64::from(days.saturating_sub(1)));
        let since = since.format("%Y-%m-%d").to_string();

        let rows = sqlx::query(
            "SELECT * FROM habit_logs
             WHERE user_id = ? AND date_logged >= ?
             ORDER BY date_logged ASC",
        )
        .bind(user_id)
        .bind(&since)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(HabitLog {
                    id: row.get("id"),
                    habit_id: row.get("habit_id"),
                    user_id: row.get("user_id"),
                    completed_at: parse_rfc3339(&row.get::<String, _>("completed_at"))?,
                    date_logged: row.get("date_logged"),
                })
            })
            .collect()
    }
}
