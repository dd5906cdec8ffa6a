//! Per-user system configuration.

use onboard_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Key inside `settings` holding the production webhook URL.
pub const WEBHOOK_URL_PROD_KEY: &str = "webhook_url_prod";

/// A row from the `system_configs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SystemConfig {
    pub id: DbId,
    pub owner_id: DbId,
    pub settings: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl SystemConfig {
    /// The configured production webhook URL, ignoring blank values.
    pub fn webhook_url_prod(&self) -> Option<&str> {
        self.settings
            .get(WEBHOOK_URL_PROD_KEY)
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}
