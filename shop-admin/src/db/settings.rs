//! Settings persisted as one JSONB value per name

use async_trait::async_trait;
use serde_json::Value;
use shared::models::{Setting, SettingKey};
use sqlx::PgPool;
use sqlx::types::Json;

use crate::error::ServiceResult;
use crate::settings::SettingsStore;

#[derive(Debug, Clone)]
pub struct PgSettingsStore {
    pool: PgPool,
}

impl PgSettingsStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsStore for PgSettingsStore {
    async fn get(&self, key: SettingKey) -> ServiceResult<Option<Setting>> {
        let row: Option<(Json<Value>,)> =
            sqlx::query_as("SELECT value FROM settings WHERE name = $1")
                .bind(key.as_str())
                .fetch_optional(&self.pool)
                .await?;
        match row {
            Some((Json(value),)) => Ok(Some(Setting::from_raw(key.as_str(), value)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, setting: Setting) -> ServiceResult<()> {
        let value = setting.to_value()?;
        let now = chrono::Utc::now().timestamp_millis();
        sqlx::query(
            "INSERT INTO settings (name, value, updated_at) VALUES ($1, $2, $3)
             ON CONFLICT (name) DO UPDATE SET value = EXCLUDED.value, updated_at = EXCLUDED.updated_at",
        )
        .bind(setting.key().as_str())
        .bind(Json(value))
        .bind(now)
        .execute(&self.pool)
        .await?;
        tracing::debug!(setting = %setting.key(), "Setting saved");
        Ok(())
    }
}
