use super::*;

use crate::traits::{SettingsStore, UserSettings};

#[async_trait]
impl SettingsStore for SqliteStateStore {
    async fn get_user_settings(&self, user_id: &str) -> anyhow::Result<UserSettings> {
        let row = sqlx::query("SELECT * FROM user_settings WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        let defaults = UserSettings::defaults_for(user_id);
        let Some(row) = row else {
            return Ok(defaults);
        };

        // NULL columns fall through to the defaults.
        Ok(UserSettings {
            user_id: user_id.to_string(),
            identity_1_name: row
                .get::<Option<String>, _>("identity_1_name")
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.identity_1_name),
            identity_2_name: row
                .get::<Option<String>, _>("identity_2_name")
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.identity_2_name),
            timezone: row
                .get::<Option<String>, _>("timezone")
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.timezone),
            morning_mastery_text: row.get("morning_mastery_text"),
        })
    }

    async fn update_user_settings(
        &self,
        user_id: &str,
        identity_1: &str,
        identity_2: &str,
        timezone: Option<&str>,
    ) -> anyhow::Result<()> {
        // COALESCE keeps the stored timezone when none is supplied.
        sqlx::query(
            "INSERT INTO user_settings
                (user_id, identity_1_name, identity_2_name, timezone, updated_at)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(user_id) DO UPDATE SET
                identity_1_name = excluded.identity_1_name,
                identity_2_name = excluded.identity_2_name,
                timezone = COALESCE(excluded.timezone, user_settings.timezone),
                updated_at = excluded.updated_at",
        )
        .bind(user_id)
        .bind(identity_1)
        .bind(identity_2)
        .bind(timezone)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        tracing::info!(user_id, "Updated user settings");
        Ok(())
    }

    async fn get_morning_mastery_text(&self, user_id: &str) -> anyhow::Result<String> {
        let text: Option<String> = sqlx::query_scalar(
            "SELECT morning_mastery_text FROM user_settings WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(text.unwrap_or_default())
    }

    async fn update_morning_mastery_text(&self, user_id: &str, text: &str) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO user_settings (user_id, morning_mastery_text, updated_at)
             VALUES (?, ?, ?)
             ON CONFLICT(user_id) DO UPDATE SET
                morning_mastery_text = excluded.morning_mastery_text,
                updated_at = excluded.updated_at",
        )
        .bind(user_id)
        .bind(text)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
