//! Notification envelope for a finalized registration.
//!
//! Field names are camelCase because the receiving automation flows key on
//! them. Monetary values are parsed numbers, populated only for the active
//! contract model.

use onboard_core::form::{FileDescriptor, FormData};
use onboard_core::registration::{
    RegistrationStatus, EVENT_REGISTRATION_FINALIZED, NOTIFICATION_SOURCE,
};
use onboard_core::types::{DbId, Timestamp};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OnboardingNotification {
    pub evento: &'static str,
    pub id: Option<DbId>,
    pub company: CompanySection,
    pub agreement: AgreementSection,
    pub assistant: AssistantSection,
    pub digital: DigitalSection,
    pub materials: MaterialsSection,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanySection {
    pub responsible_name: String,
    pub company_name: String,
    pub segment: String,
    pub cpf_cnpj: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgreementSection {
    pub services: Vec<String>,
    pub contract_model: &'static str,
    pub setup_value: Option<f64>,
    pub monthly_value: Option<f64>,
    pub single_value: Option<f64>,
    pub payment_methods: Vec<String>,
    pub recurring_reminder: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantSection {
    pub main_functions: Vec<String>,
    #[serde(rename = "top5Questions")]
    pub top_questions: String,
    pub communication_tone: &'static str,
    pub existing_solutions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DigitalSection {
    pub contact_phones: String,
    pub payment_methods_accepted: String,
    pub address: String,
    pub instagram: String,
    pub website: String,
    pub restricted_topics: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialsSection {
    pub additional_info: String,
    pub uploaded_files: Vec<FileDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metadata {
    pub timestamp: Timestamp,
    pub source: &'static str,
    pub status: RegistrationStatus,
}

impl OnboardingNotification {
    /// Build the envelope for a registration saved as `registration_id`.
    pub fn new(registration_id: Option<DbId>, form: &FormData, timestamp: Timestamp) -> Self {
        let identity = &form.identity;
        let agreement = &form.agreement;
        let assistant = &form.assistant;
        let digital = &form.digital;
        let amounts = agreement.amounts();

        Self {
            evento: EVENT_REGISTRATION_FINALIZED,
            id: registration_id,
            company: CompanySection {
                responsible_name: identity.responsible_name.clone(),
                company_name: identity.company_name.clone(),
                segment: identity.segment.clone(),
                cpf_cnpj: identity.tax_id.clone(),
                email: identity.email.clone(),
                phone: identity.phone.clone(),
            },
            agreement: AgreementSection {
                services: agreement.services.clone(),
                contract_model: agreement.contract_model_str(),
                setup_value: amounts.setup,
                monthly_value: amounts.monthly,
                single_value: amounts.single,
                payment_methods: agreement.payment_methods.clone(),
                recurring_reminder: agreement.effective_reminder(),
            },
            assistant: AssistantSection {
                main_functions: assistant.main_functions.clone(),
                top_questions: assistant.top_questions.clone(),
                communication_tone: assistant.communication_tone_str(),
                existing_solutions: assistant.existing_solutions.clone(),
            },
            digital: DigitalSection {
                contact_phones: digital.contact_phones.clone(),
                payment_methods_accepted: digital.payment_methods_accepted.clone(),
                address: digital.address.clone(),
                instagram: digital.instagram.clone(),
                website: digital.website.clone(),
                restricted_topics: digital.restricted_topics.clone(),
            },
            materials: MaterialsSection {
                additional_info: form.materials.additional_info.clone(),
                uploaded_files: form.materials.uploaded_files.clone(),
            },
            metadata: Metadata {
                timestamp,
                source: NOTIFICATION_SOURCE,
                status: RegistrationStatus::New,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
