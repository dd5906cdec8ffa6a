//! Repository for the `onboarding_registrations` table.

use onboard_core::registration::RegistrationStatus;
use onboard_core::types::{DbId, Timestamp};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::registration::{NewRegistration, Registration};

/// Column list for `onboarding_registrations` queries.
const COLUMNS: &str = "\
    id, responsible_name, company_name, segment, tax_id, email, phone, \
    services, contract_model, setup_value, monthly_value, single_value, \
    payment_methods, recurring_reminder, main_functions, top_questions, \
    communication_tone, existing_solutions, contact_phones, \
    payment_methods_accepted, address, instagram, website, restricted_topics, \
    additional_info, uploaded_files, status, origin, webhook_sent, \
    webhook_sent_at, created_at, updated_at";

/// Provides persistence for finalized onboarding registrations.
pub struct RegistrationRepo;

impl RegistrationRepo {
    /// Insert a new registration.
    pub async fn create(
        pool: &PgPool,
        input: &NewRegistration,
    ) -> Result<Registration, sqlx::Error> {
        let query = format!(
            "INSERT INTO onboarding_registrations (\
                 responsible_name, company_name, segment, tax_id, email, phone, \
                 services, contract_model, setup_value, monthly_value, single_value, \
                 payment_methods, recurring_reminder, main_functions, top_questions, \
                 communication_tone, existing_solutions, contact_phones, \
                 payment_methods_accepted, address, instagram, website, \
                 restricted_topics, additional_info, uploaded_files, status, origin) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, \
                     $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Registration>(&query)
            .bind(&input.responsible_name)
            .bind(&input.company_name)
            .bind(&input.segment)
            .bind(&input.tax_id)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.services)
            .bind(&input.contract_model)
            .bind(input.setup_value)
            .bind(input.monthly_value)
            .bind(input.single_value)
            .bind(&input.payment_methods)
            .bind(input.recurring_reminder)
            .bind(&input.main_functions)
            .bind(&input.top_questions)
            .bind(&input.communication_tone)
            .bind(&input.existing_solutions)
            .bind(&input.contact_phones)
            .bind(&input.payment_methods_accepted)
            .bind(&input.address)
            .bind(&input.instagram)
            .bind(&input.website)
            .bind(&input.restricted_topics)
            .bind(&input.additional_info)
            .bind(Json(&input.uploaded_files))
            .bind(input.status.as_str())
            .bind(&input.origin)
            .fetch_one(pool)
            .await
    }

    /// Find a registration by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Registration>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM onboarding_registrations WHERE id = $1");
        sqlx::query_as::<_, Registration>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List registrations newest first, optionally filtered by status.
    pub async fn list(
        pool: &PgPool,
        status: Option<RegistrationStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Registration>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM onboarding_registrations \
             WHERE ($1::TEXT IS NULL OR status = $1) \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Registration>(&query)
            .bind(status.map(RegistrationStatus::as_str))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Move a registration to a new sales status.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        status: RegistrationStatus,
    ) -> Result<Option<Registration>, sqlx::Error> {
        let query = format!(
            "UPDATE onboarding_registrations SET status = $2, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Registration>(&query)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Record a successful webhook delivery. Returns `false` when the row
    /// no longer exists.
    pub async fn mark_webhook_sent(
        pool: &PgPool,
        id: DbId,
        sent_at: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE onboarding_registrations \
             SET webhook_sent = TRUE, webhook_sent_at = $2, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(sent_at)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a registration by ID.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM onboarding_registrations WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
