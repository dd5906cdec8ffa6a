//! Registration entity model and insert DTO.

use onboard_core::form::FileDescriptor;
use onboard_core::registration::RegistrationStatus;
use onboard_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `onboarding_registrations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Registration {
    pub id: DbId,
    pub responsible_name: String,
    pub company_name: String,
    pub segment: String,
    pub tax_id: String,
    pub email: String,
    pub phone: String,
    pub services: Vec<String>,
    pub contract_model: String,
    pub setup_value: Option<f64>,
    pub monthly_value: Option<f64>,
    pub single_value: Option<f64>,
    pub payment_methods: Vec<String>,
    pub recurring_reminder: Option<bool>,
    pub main_functions: Vec<String>,
    pub top_questions: String,
    pub communication_tone: String,
    pub existing_solutions: Vec<String>,
    pub contact_phones: String,
    pub payment_methods_accepted: String,
    pub address: String,
    pub instagram: String,
    pub website: String,
    pub restricted_topics: String,
    pub additional_info: String,
    pub uploaded_files: Json<Vec<FileDescriptor>>,
    pub status: String,
    pub origin: String,
    pub webhook_sent: bool,
    pub webhook_sent_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Registration {
    /// Parsed status; values written outside the known set read as `novo`.
    pub fn status(&self) -> RegistrationStatus {
        RegistrationStatus::from_str_or_new(&self.status)
    }
}

/// Flattened wizard output ready for insertion. Monetary columns outside
/// the chosen contract model are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewRegistration {
    pub responsible_name: String,
    pub company_name: String,
    pub segment: String,
    pub tax_id: String,
    pub email: String,
    pub phone: String,
    pub services: Vec<String>,
    pub contract_model: String,
    pub setup_value: Option<f64>,
    pub monthly_value: Option<f64>,
    pub single_value: Option<f64>,
    pub payment_methods: Vec<String>,
    pub recurring_reminder: Option<bool>,
    pub main_functions: Vec<String>,
    pub top_questions: String,
    pub communication_tone: String,
    pub existing_solutions: Vec<String>,
    pub contact_phones: String,
    pub payment_methods_accepted: String,
    pub address: String,
    pub instagram: String,
    pub website: String,
    pub restricted_topics: String,
    pub additional_info: String,
    pub uploaded_files: Vec<FileDescriptor>,
    pub status: RegistrationStatus,
    pub origin: String,
}

