//! The two-phase submission: durable insert, then best-effort webhook.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use onboard_core::form::FormData;
use onboard_core::types::DbId;
use onboard_core::wizard::Submitter;
use onboard_db::DbPool;
use onboard_events::{OnboardingNotification, WebhookDelivery, WebhookError};
use tokio::task::JoinHandle;
use validator::ValidateUrl;

use crate::config::PipelineConfig;
use crate::ports::{
    EndpointConfigSource, Notifier, PgEndpointConfig, PgRegistrationStore, RegistrationStore,
};
use crate::record::build_registration;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("Campos obrigatórios não preenchidos: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Failed to save registration: {0}")]
    Persistence(#[from] sqlx::Error),
}

/// How the detached notification task ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationOutcome {
    /// Delivered and flagged on the registration.
    Delivered { url: String },
    /// Delivered, but the delivery flag could not be written.
    DeliveredUnflagged { url: String },
    /// Every delivery attempt failed.
    Failed { url: String },
}

/// A persisted registration plus its in-flight notification.
///
/// Dropping the handle detaches the notification; it still runs to
/// completion.
#[derive(Debug)]
pub struct Submission {
    pub registration_id: DbId,
    pub notification: JoinHandle<NotificationOutcome>,
}

// ---------------------------------------------------------------------------
// SubmissionPipeline
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct SubmissionPipeline {
    store: Arc<dyn RegistrationStore>,
    notifier: Arc<dyn Notifier>,
    config_source: Option<Arc<dyn EndpointConfigSource>>,
    owner_id: Option<DbId>,
    fallback_url: String,
    origin: String,
}

impl SubmissionPipeline {
    pub fn new(
        store: Arc<dyn RegistrationStore>,
        notifier: Arc<dyn Notifier>,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            store,
            notifier,
            config_source: None,
            owner_id: None,
            fallback_url: config.webhook_fallback_url.clone(),
            origin: config.registration_origin.clone(),
        }
    }

    /// Wire the Postgres adapters and the HTTP notifier from `config`.
    pub fn with_postgres(pool: DbPool, config: &PipelineConfig) -> Result<Self, WebhookError> {
        let delivery =
            WebhookDelivery::try_new(config.webhook_timeout())?.with_retry(config.retry_policy());
        Ok(Self::new(
            Arc::new(PgRegistrationStore::new(pool.clone())),
            Arc::new(delivery),
            config,
        )
        .with_config_source(Arc::new(PgEndpointConfig::new(pool))))
    }

    pub fn with_config_source(mut self, source: Arc<dyn EndpointConfigSource>) -> Self {
        self.config_source = Some(source);
        self
    }

    /// Identity whose configuration may override the webhook endpoint.
    pub fn with_owner(mut self, owner_id: DbId) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    /// Persist `form` and start the notification.
    ///
    /// Fails only if required identity fields are blank or the insert
    /// fails; in both cases no notification is attempted.
    pub async fn finalize(&self, form: &FormData) -> Result<Submission, SubmissionError> {
        let missing = missing_required_fields(form);
        if !missing.is_empty() {
            tracing::error!(fields = ?missing, "Registration rejected, required fields missing");
            return Err(SubmissionError::MissingFields(missing));
        }

        let record = build_registration(form, &self.origin);
        let registration_id = self.store.insert(&record).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to save registration");
            SubmissionError::Persistence(e)
        })?;
        tracing::info!(
            registration_id,
            company = %record.company_name,
            "Registration saved"
        );

        let payload = OnboardingNotification::new(Some(registration_id), form, Utc::now());
        let pipeline = self.clone();
        let notification =
            tokio::spawn(async move { pipeline.notify(registration_id, payload).await });

        Ok(Submission {
            registration_id,
            notification,
        })
    }

    async fn notify(
        &self,
        registration_id: DbId,
        payload: OnboardingNotification,
    ) -> NotificationOutcome {
        let url = self.resolve_endpoint().await;

        if let Err(e) = self.notifier.notify(&url, &payload).await {
            tracing::warn!(
                registration_id,
                url = %url,
                error = %e,
                "Webhook notification failed, registration kept"
            );
            return NotificationOutcome::Failed { url };
        }

        match self.store.mark_webhook_sent(registration_id, Utc::now()).await {
            Ok(()) => {
                tracing::info!(registration_id, url = %url, "Webhook notification delivered");
                NotificationOutcome::Delivered { url }
            }
            Err(e) => {
                tracing::warn!(
                    registration_id,
                    error = %e,
                    "Webhook delivered but delivery flag update failed"
                );
                NotificationOutcome::DeliveredUnflagged { url }
            }
        }
    }

    /// The owner's override when it is a valid URL, else the fallback.
    /// Lookup failures fall back.
    pub async fn resolve_endpoint(&self) -> String {
        let (Some(source), Some(owner_id)) = (&self.config_source, self.owner_id) else {
            return self.fallback_url.clone();
        };

        match source.webhook_override(owner_id).await {
            Ok(Some(url)) if url.validate_url() => {
                tracing::debug!(owner_id, url = %url, "Using configured webhook endpoint");
                url
            }
            Ok(Some(url)) => {
                tracing::warn!(owner_id, url = %url, "Ignoring invalid webhook override");
                self.fallback_url.clone()
            }
            Ok(None) => self.fallback_url.clone(),
            Err(e) => {
                tracing::warn!(
                    owner_id,
                    error = %e,
                    "Webhook override lookup failed, using fallback"
                );
                self.fallback_url.clone()
            }
        }
    }
}

#[async_trait]
impl Submitter for SubmissionPipeline {
    type Error = SubmissionError;

    async fn submit(&self, form: &FormData) -> Result<(), SubmissionError> {
        self.finalize(form).await.map(|_submission| ())
    }
}

/// Required identity fields that are blank, by field key.
fn missing_required_fields(form: &FormData) -> Vec<&'static str> {
    let identity = &form.identity;
    [
        ("responsible_name", &identity.responsible_name),
        ("company_name", &identity.company_name),
        ("email", &identity.email),
        ("phone", &identity.phone),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(field, _)| field)
    .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
