//! Collaborator ports used by the submission pipeline, and their
//! production adapters.

use async_trait::async_trait;
use onboard_core::types::{DbId, Timestamp};
use onboard_db::models::registration::NewRegistration;
use onboard_db::repositories::{RegistrationRepo, SystemConfigRepo};
use onboard_db::DbPool;
use onboard_events::{OnboardingNotification, WebhookDelivery, WebhookError};

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

/// The store of record for registrations.
#[async_trait]
pub trait RegistrationStore: Send + Sync {
    /// Durably write a registration and return its ID.
    async fn insert(&self, record: &NewRegistration) -> Result<DbId, sqlx::Error>;

    /// Flag the registration's notification as delivered.
    async fn mark_webhook_sent(&self, id: DbId, sent_at: Timestamp) -> Result<(), sqlx::Error>;
}

/// Per-owner endpoint configuration.
#[async_trait]
pub trait EndpointConfigSource: Send + Sync {
    /// The owner's webhook URL override, if any.
    async fn webhook_override(&self, owner_id: DbId) -> Result<Option<String>, sqlx::Error>;
}

/// Outbound notification channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, url: &str, payload: &OnboardingNotification)
        -> Result<(), WebhookError>;
}

// ---------------------------------------------------------------------------
// Adapters
// ---------------------------------------------------------------------------

/// [`RegistrationStore`] over Postgres.
#[derive(Debug, Clone)]
pub struct PgRegistrationStore {
    pool: DbPool,
}

impl PgRegistrationStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RegistrationStore for PgRegistrationStore {
    async fn insert(&self, record: &NewRegistration) -> Result<DbId, sqlx::Error> {
        let row = RegistrationRepo::create(&self.pool, record).await?;
        Ok(row.id)
    }

    async fn mark_webhook_sent(&self, id: DbId, sent_at: Timestamp) -> Result<(), sqlx::Error> {
        if !RegistrationRepo::mark_webhook_sent(&self.pool, id, sent_at).await? {
            tracing::warn!(registration_id = id, "Registration vanished before webhook flag update");
        }
        Ok(())
    }
}

/// [`EndpointConfigSource`] over the `system_configs` table.
#[derive(Debug, Clone)]
pub struct PgEndpointConfig {
    pool: DbPool,
}

impl PgEndpointConfig {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EndpointConfigSource for PgEndpointConfig {
    async fn webhook_override(&self, owner_id: DbId) -> Result<Option<String>, sqlx::Error> {
        SystemConfigRepo::find_webhook_override(&self.pool, owner_id).await
    }
}

#[async_trait]
impl Notifier for WebhookDelivery {
    async fn notify(
        &self,
        url: &str,
        payload: &OnboardingNotification,
    ) -> Result<(), WebhookError> {
        self.deliver(url, payload).await
    }
}
