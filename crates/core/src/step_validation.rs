//! Per-step validation of the wizard form.
//!
//! Each data-entry step has a pure validator returning field-keyed error
//! messages plus a `can_advance` flag. Errors are data, never `Err`: the
//! orchestrator keeps the user on the step and shows the messages next to
//! their fields. Warnings are advisory and never block.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::form::{Agreement, ContractModel, FormData, Identity};
use crate::masks::unmask;
use crate::onboarding_wizard::OnboardingStep;
use crate::validation::{
    validate_currency, validate_email, validate_phone, validate_url, TaxIdKind,
};

// ---------------------------------------------------------------------------
// Field keys
// ---------------------------------------------------------------------------

pub const FIELD_RESPONSIBLE_NAME: &str = "responsible_name";
pub const FIELD_COMPANY_NAME: &str = "company_name";
pub const FIELD_SEGMENT: &str = "segment";
pub const FIELD_TAX_ID: &str = "tax_id";
pub const FIELD_EMAIL: &str = "email";
pub const FIELD_PHONE: &str = "phone";
pub const FIELD_SERVICES: &str = "services";
pub const FIELD_CONTRACT_MODEL: &str = "contract_model";
pub const FIELD_SETUP_VALUE: &str = "setup_value";
pub const FIELD_MONTHLY_VALUE: &str = "monthly_value";
pub const FIELD_SINGLE_VALUE: &str = "single_value";
pub const FIELD_PAYMENT_METHODS: &str = "payment_methods";
pub const FIELD_MAIN_FUNCTIONS: &str = "main_functions";
pub const FIELD_TOP_QUESTIONS: &str = "top_questions";
pub const FIELD_COMMUNICATION_TONE: &str = "communication_tone";
pub const FIELD_CONTACT_PHONES: &str = "contact_phones";
pub const FIELD_INSTAGRAM: &str = "instagram";
pub const FIELD_WEBSITE: &str = "website";

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

pub const MIN_RESPONSIBLE_NAME_CHARS: usize = 3;
pub const MIN_COMPANY_NAME_CHARS: usize = 2;
pub const MIN_SEGMENT_CHARS: usize = 3;

/// Expected number of entries in the "top questions" field.
pub const TARGET_QUESTION_COUNT: usize = 5;

/// Character thresholds for the materials quality bands.
pub const QUALITY_BASIC_CHARS: usize = 200;
pub const QUALITY_GOOD_CHARS: usize = 500;
pub const QUALITY_EXCELLENT_CHARS: usize = 1000;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Field key to user-facing message.
pub type FieldErrors = BTreeMap<&'static str, String>;

/// Outcome of validating one step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StepValidation {
    pub errors: FieldErrors,
    pub warnings: FieldErrors,
    pub can_advance: bool,
}

impl StepValidation {
    fn from_errors(errors: FieldErrors) -> Self {
        Self {
            can_advance: errors.is_empty(),
            errors,
            warnings: FieldErrors::new(),
        }
    }

    fn passing() -> Self {
        Self::from_errors(FieldErrors::new())
    }
}

/// Advisory indicator for the "top questions" field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "count", rename_all = "snake_case")]
pub enum QuestionCount {
    UnderTarget(usize),
    AtTarget,
    OverTarget(usize),
}

/// Advisory quality band for the materials text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentQuality {
    Insufficient,
    Basic,
    Good,
    Excellent,
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Validate the data owned by `step`. Steps without data always pass.
pub fn validate_step(step: OnboardingStep, form: &FormData) -> StepValidation {
    match step {
        OnboardingStep::Company => validate_company(form),
        OnboardingStep::Personalization => validate_personalization(form),
        OnboardingStep::Digital => validate_digital(form),
        OnboardingStep::Materials => validate_materials(form),
        OnboardingStep::Welcome | OnboardingStep::Review | OnboardingStep::Success => {
            StepValidation::passing()
        }
    }
}

// ---------------------------------------------------------------------------
// Company (identity + agreement)
// ---------------------------------------------------------------------------

/// The company step collects identity and agreement together.
pub fn validate_company(form: &FormData) -> StepValidation {
    let mut errors = validate_identity(&form.identity);
    errors.extend(validate_agreement(&form.agreement));
    StepValidation::from_errors(errors)
}

pub fn validate_identity(identity: &Identity) -> FieldErrors {
    let mut errors = FieldErrors::new();

    require_min_chars(
        &mut errors,
        FIELD_RESPONSIBLE_NAME,
        &identity.responsible_name,
        MIN_RESPONSIBLE_NAME_CHARS,
    );
    require_min_chars(
        &mut errors,
        FIELD_COMPANY_NAME,
        &identity.company_name,
        MIN_COMPANY_NAME_CHARS,
    );
    require_min_chars(&mut errors, FIELD_SEGMENT, &identity.segment, MIN_SEGMENT_CHARS);

    if let Some(message) = tax_id_error(&identity.tax_id) {
        errors.insert(FIELD_TAX_ID, message.to_string());
    }
    if !validate_email(&identity.email) {
        errors.insert(FIELD_EMAIL, "Email inválido".to_string());
    }
    if !validate_phone(&identity.phone) {
        errors.insert(FIELD_PHONE, "Telefone inválido".to_string());
    }

    errors
}

/// Monetary requirements depend on the chosen contract model.
pub fn validate_agreement(agreement: &Agreement) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if agreement.services.is_empty() {
        errors.insert(FIELD_SERVICES, "Selecione ao menos um serviço".to_string());
    }

    match agreement.contract_model {
        None => {
            errors.insert(FIELD_CONTRACT_MODEL, "Selecione um modelo".to_string());
        }
        Some(ContractModel::Monthly) => {
            if !validate_currency(&agreement.setup_value) {
                errors.insert(FIELD_SETUP_VALUE, "Informe o valor do setup".to_string());
            }
            if !validate_currency(&agreement.monthly_value) {
                errors.insert(
                    FIELD_MONTHLY_VALUE,
                    "Informe o valor da mensalidade".to_string(),
                );
            }
        }
        Some(ContractModel::Single) => {
            if !validate_currency(&agreement.single_value) {
                errors.insert(FIELD_SINGLE_VALUE, "Informe o valor".to_string());
            }
        }
    }

    if agreement.payment_methods.is_empty() {
        errors.insert(
            FIELD_PAYMENT_METHODS,
            "Selecione ao menos uma forma".to_string(),
        );
    }

    errors
}

/// Message for an invalid tax ID, `None` when valid.
fn tax_id_error(tax_id: &str) -> Option<&'static str> {
    if unmask(tax_id).is_empty() {
        return Some("CPF ou CNPJ é obrigatório");
    }
    match TaxIdKind::detect(tax_id) {
        Some(kind) if kind.validate(tax_id) => None,
        Some(TaxIdKind::Person) => Some("CPF inválido"),
        Some(TaxIdKind::Organization) => Some("CNPJ inválido"),
        None => Some("CPF deve ter 11 dígitos, CNPJ 14 dígitos"),
    }
}

fn require_min_chars(errors: &mut FieldErrors, field: &'static str, value: &str, min: usize) {
    if value.trim().chars().count() < min {
        errors.insert(field, format!("Mínimo {min} caracteres"));
    }
}

// ---------------------------------------------------------------------------
// Personalization
// ---------------------------------------------------------------------------

pub fn validate_personalization(form: &FormData) -> StepValidation {
    let assistant = &form.assistant;
    let mut errors = FieldErrors::new();

    if assistant.main_functions.is_empty() {
        errors.insert(
            FIELD_MAIN_FUNCTIONS,
            "Selecione ao menos uma função".to_string(),
        );
    }
    if assistant.top_questions.trim().is_empty() {
        errors.insert(
            FIELD_TOP_QUESTIONS,
            "Preencha as perguntas mais comuns".to_string(),
        );
    }
    if assistant.communication_tone.is_none() {
        errors.insert(
            FIELD_COMMUNICATION_TONE,
            "Selecione um tom de comunicação".to_string(),
        );
    }

    let mut result = StepValidation::from_errors(errors);
    if let QuestionCount::OverTarget(_) = question_count(&assistant.top_questions) {
        result.warnings.insert(
            FIELD_TOP_QUESTIONS,
            format!("Máximo {TARGET_QUESTION_COUNT} perguntas"),
        );
    }
    result
}

/// Count the non-blank lines of the "top questions" field against the
/// target of five.
pub fn question_count(top_questions: &str) -> QuestionCount {
    let count = top_questions
        .lines()
        .filter(|line| !line.trim().is_empty())
        .count();
    match count.cmp(&TARGET_QUESTION_COUNT) {
        std::cmp::Ordering::Less => QuestionCount::UnderTarget(count),
        std::cmp::Ordering::Equal => QuestionCount::AtTarget,
        std::cmp::Ordering::Greater => QuestionCount::OverTarget(count),
    }
}

// ---------------------------------------------------------------------------
// Digital presence
// ---------------------------------------------------------------------------

/// Only a contact phone is required; malformed links are flagged as
/// warnings.
pub fn validate_digital(form: &FormData) -> StepValidation {
    let digital = &form.digital;
    let mut errors = FieldErrors::new();

    if digital.contact_phones.trim().is_empty() {
        errors.insert(
            FIELD_CONTACT_PHONES,
            "Informe ao menos um telefone".to_string(),
        );
    }

    let mut result = StepValidation::from_errors(errors);
    if !validate_url(digital.instagram.trim()) {
        result
            .warnings
            .insert(FIELD_INSTAGRAM, "Perfil ou link inválido".to_string());
    }
    if !validate_url(digital.website.trim()) {
        result
            .warnings
            .insert(FIELD_WEBSITE, "Site inválido".to_string());
    }
    result
}

// ---------------------------------------------------------------------------
// Materials
// ---------------------------------------------------------------------------

/// Materials never block; the quality band is feedback only.
pub fn validate_materials(_form: &FormData) -> StepValidation {
    StepValidation::passing()
}

impl ContentQuality {
    /// Band for a text by character count.
    pub fn from_text(text: &str) -> Self {
        match text.chars().count() {
            n if n < QUALITY_BASIC_CHARS => Self::Insufficient,
            n if n < QUALITY_GOOD_CHARS => Self::Basic,
            n if n < QUALITY_EXCELLENT_CHARS => Self::Good,
            _ => Self::Excellent,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Insufficient => "Insuficiente",
            Self::Basic => "Básica",
            Self::Good => "Boa",
            Self::Excellent => "Excelente",
        }
    }
}

/// Whitespace-separated word count.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
