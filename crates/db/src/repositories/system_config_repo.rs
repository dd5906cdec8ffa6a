//! Repository for the `system_configs` table.

use onboard_core::types::DbId;
use sqlx::PgPool;

use crate::models::system_config::{SystemConfig, WEBHOOK_URL_PROD_KEY};

const COLUMNS: &str = "id, owner_id, settings, created_at, updated_at";

/// Reads and writes per-user settings.
pub struct SystemConfigRepo;

impl SystemConfigRepo {
    /// Find the settings row for an owner.
    pub async fn find_by_owner(
        pool: &PgPool,
        owner_id: DbId,
    ) -> Result<Option<SystemConfig>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM system_configs WHERE owner_id = $1");
        sqlx::query_as::<_, SystemConfig>(&query)
            .bind(owner_id)
            .fetch_optional(pool)
            .await
    }

    /// The owner's production webhook URL, if one is configured.
    pub async fn find_webhook_override(
        pool: &PgPool,
        owner_id: DbId,
    ) -> Result<Option<String>, sqlx::Error> {
        let config = Self::find_by_owner(pool, owner_id).await?;
        Ok(config
            .as_ref()
            .and_then(SystemConfig::webhook_url_prod)
            .map(str::to_string))
    }

    /// Insert or replace the owner's settings document.
    pub async fn upsert(
        pool: &PgPool,
        owner_id: DbId,
        settings: &serde_json::Value,
    ) -> Result<SystemConfig, sqlx::Error> {
        let query = format!(
            "INSERT INTO system_configs (owner_id, settings) \
             VALUES ($1, $2) \
             ON CONFLICT (owner_id) DO UPDATE \
                 SET settings = EXCLUDED.settings, updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SystemConfig>(&query)
            .bind(owner_id)
            .bind(settings)
            .fetch_one(pool)
            .await
    }

    /// Set only the production webhook URL, keeping other settings.
    pub async fn set_webhook_url_prod(
        pool: &PgPool,
        owner_id: DbId,
        url: &str,
    ) -> Result<SystemConfig, sqlx::Error> {
        let query = format!(
            "INSERT INTO system_configs (owner_id, settings) \
             VALUES ($1, jsonb_build_object($2::text, $3::text)) \
             ON CONFLICT (owner_id) DO UPDATE \
                 SET settings = system_configs.settings \
                         || jsonb_build_object($2::text, $3::text), \
                     updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SystemConfig>(&query)
            .bind(owner_id)
            .bind(WEBHOOK_URL_PROD_KEY)
            .bind(url)
            .fetch_one(pool)
            .await
    }
}
