//! The wizard's form data aggregate.
//!
//! [`FormData`] is split into one group per data-entry concern. Steps hand
//! back a whole group as a [`FormUpdate`]; the orchestrator applies it with
//! [`FormData::apply`]. Every collection defaults to empty so callers never
//! deal with absent fields.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::validation::parse_currency;

// ---------------------------------------------------------------------------
// Closed choices
// ---------------------------------------------------------------------------

/// Billing arrangement. Decides which monetary fields apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractModel {
    /// One-time setup fee plus a recurring monthly fee.
    Monthly,
    /// A single total amount.
    Single,
}

impl ContractModel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Single => "single",
        }
    }
}

impl fmt::Display for ContractModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tone the assistant should use with customers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommunicationTone {
    Professional,
    Friendly,
    Technical,
    Consultive,
}

impl CommunicationTone {
    pub const ALL: [Self; 4] = [
        Self::Professional,
        Self::Friendly,
        Self::Technical,
        Self::Consultive,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Professional => "professional",
            Self::Friendly => "friendly",
            Self::Technical => "technical",
            Self::Consultive => "consultive",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Professional => "Profissional e formal",
            Self::Friendly => "Amigável e descontraído",
            Self::Technical => "Técnico e objetivo",
            Self::Consultive => "Consultivo e educativo",
        }
    }

    /// Sample sentence shown next to the option.
    pub fn preview(self) -> &'static str {
        match self {
            Self::Professional => "Prezado cliente, como posso auxiliá-lo hoje?",
            Self::Friendly => "Oi! Tudo bem? Em que posso te ajudar?",
            Self::Technical => "Entendido. Procedimento: verificar configuração X.",
            Self::Consultive => "Boa pergunta! Vou explicar como funciona...",
        }
    }
}

// ---------------------------------------------------------------------------
// Groups
// ---------------------------------------------------------------------------

/// Who the customer is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Identity {
    pub responsible_name: String,
    pub company_name: String,
    pub segment: String,
    /// CPF or CNPJ, raw or masked.
    pub tax_id: String,
    pub email: String,
    /// Masked phone, e.g. `(11) 91234-5678`.
    pub phone: String,
}

/// Commercial terms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Agreement {
    pub services: Vec<String>,
    pub contract_model: Option<ContractModel>,
    /// Display currency, only meaningful for [`ContractModel::Monthly`].
    pub setup_value: String,
    /// Display currency, only meaningful for [`ContractModel::Monthly`].
    pub monthly_value: String,
    /// Display currency, only meaningful for [`ContractModel::Single`].
    pub single_value: String,
    pub payment_methods: Vec<String>,
    /// Only meaningful for [`ContractModel::Monthly`].
    pub recurring_reminder: Option<bool>,
}

/// Parsed monetary amounts. Only the active contract model's fields are
/// `Some`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ContractAmounts {
    pub setup: Option<f64>,
    pub monthly: Option<f64>,
    pub single: Option<f64>,
}

impl Agreement {
    /// Parse the amounts that apply to the chosen contract model.
    pub fn amounts(&self) -> ContractAmounts {
        match self.contract_model {
            Some(ContractModel::Monthly) => ContractAmounts {
                setup: Some(parse_currency(&self.setup_value)),
                monthly: Some(parse_currency(&self.monthly_value)),
                single: None,
            },
            Some(ContractModel::Single) => ContractAmounts {
                single: Some(parse_currency(&self.single_value)),
                ..ContractAmounts::default()
            },
            None => ContractAmounts::default(),
        }
    }

    /// The reminder preference, dropped unless the contract is monthly.
    pub fn effective_reminder(&self) -> Option<bool> {
        match self.contract_model {
            Some(ContractModel::Monthly) => self.recurring_reminder,
            _ => None,
        }
    }

    /// Contract model identifier, empty when unset.
    pub fn contract_model_str(&self) -> &'static str {
        self.contract_model.map_or("", ContractModel::as_str)
    }
}

/// How the assistant should behave.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Assistant {
    pub main_functions: Vec<String>,
    /// Newline-delimited; five entries are expected.
    pub top_questions: String,
    pub communication_tone: Option<CommunicationTone>,
    pub existing_solutions: Vec<String>,
}

impl Assistant {
    pub fn communication_tone_str(&self) -> &'static str {
        self.communication_tone.map_or("", CommunicationTone::as_str)
    }
}

/// Where the business can be found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DigitalPresence {
    /// Free text, may list several numbers.
    pub contact_phones: String,
    pub payment_methods_accepted: String,
    pub address: String,
    pub instagram: String,
    pub website: String,
    /// Topics the assistant must not discuss.
    pub restricted_topics: String,
}

/// Metadata for a user-selected attachment. The binary content stays with
/// the attachment surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub mime_type: String,
}

/// Supporting material.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Materials {
    pub additional_info: String,
    /// Never serialized: attachments do not survive a reload.
    #[serde(skip)]
    pub uploaded_files: Vec<FileDescriptor>,
}

// ---------------------------------------------------------------------------
// FormData
// ---------------------------------------------------------------------------

/// Everything the wizard collects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormData {
    pub identity: Identity,
    pub agreement: Agreement,
    pub assistant: Assistant,
    pub digital: DigitalPresence,
    pub materials: Materials,
}

/// A typed partial update produced by a step: one whole group.
#[derive(Debug, Clone, PartialEq)]
pub enum FormUpdate {
    Identity(Identity),
    Agreement(Agreement),
    Assistant(Assistant),
    Digital(DigitalPresence),
    Materials(Materials),
}

impl FormData {
    /// Replace the group carried by `update`.
    ///
    /// A materials update only replaces the text; attachments change through
    /// the wizard's attachment operations.
    pub fn apply(&mut self, update: FormUpdate) {
        match update {
            FormUpdate::Identity(identity) => self.identity = identity,
            FormUpdate::Agreement(agreement) => self.agreement = agreement,
            FormUpdate::Assistant(assistant) => self.assistant = assistant,
            FormUpdate::Digital(digital) => self.digital = digital,
            FormUpdate::Materials(materials) => {
                self.materials.additional_info = materials.additional_info;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn monthly_agreement() -> Agreement {
        Agreement {
            contract_model: Some(ContractModel::Monthly),
            setup_value: "R$ 500,00".into(),
            monthly_value: "R$ 199,90".into(),
            single_value: "R$ 9.999,00".into(),
            recurring_reminder: Some(true),
            ..Agreement::default()
        }
    }

    // -- amounts --

    #[test]
    fn monthly_amounts_null_the_single_value() {
        let amounts = monthly_agreement().amounts();
        assert_eq!(amounts.setup, Some(500.0));
        assert_eq!(amounts.monthly, Some(199.9));
        assert_eq!(amounts.single, None);
    }

    #[test]
    fn single_amounts_null_the_monthly_pair() {
        let agreement = Agreement {
            contract_model: Some(ContractModel::Single),
            ..monthly_agreement()
        };
        let amounts = agreement.amounts();
        assert_eq!(amounts.single, Some(9999.0));
        assert_eq!(amounts.setup, None);
        assert_eq!(amounts.monthly, None);
        assert_eq!(agreement.effective_reminder(), None);
    }

    #[test]
    fn unset_model_has_no_amounts() {
        let agreement = Agreement {
            contract_model: None,
            ..monthly_agreement()
        };
        assert_eq!(agreement.amounts(), ContractAmounts::default());
        assert_eq!(agreement.contract_model_str(), "");
    }

    // -- apply --

    #[test]
    fn apply_replaces_only_the_given_group() {
        let mut form = FormData::default();
        form.digital.contact_phones = "(11) 3456-7890".into();

        form.apply(FormUpdate::Identity(Identity {
            responsible_name: "Maria Souza".into(),
            ..Identity::default()
        }));

        assert_eq!(form.identity.responsible_name, "Maria Souza");
        assert_eq!(form.digital.contact_phones, "(11) 3456-7890");
    }

    #[test]
    fn materials_update_keeps_attachments() {
        let mut form = FormData::default();
        form.materials.uploaded_files.push(FileDescriptor {
            name: "menu.pdf".into(),
            size: 1024,
            mime_type: "application/pdf".into(),
        });

        form.apply(FormUpdate::Materials(Materials {
            additional_info: "Pizzaria".into(),
            ..Materials::default()
        }));

        assert_eq!(form.materials.additional_info, "Pizzaria");
        assert_eq!(form.materials.uploaded_files.len(), 1);
    }

    // -- serde --

    #[test]
    fn attachments_are_not_serialized() {
        let mut form = FormData::default();
        form.materials.additional_info = "catalogue".into();
        form.materials.uploaded_files.push(FileDescriptor {
            name: "menu.pdf".into(),
            size: 1024,
            mime_type: "application/pdf".into(),
        });

        let json = serde_json::to_value(&form).unwrap();
        assert!(json["materials"].get("uploaded_files").is_none());

        let restored: FormData = serde_json::from_value(json).unwrap();
        assert_eq!(restored.materials.additional_info, "catalogue");
        assert!(restored.materials.uploaded_files.is_empty());
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let form: FormData =
            serde_json::from_str(r#"{"identity":{"email":"maria@acme.com"}}"#).unwrap();
        assert_eq!(form.identity.email, "maria@acme.com");
        assert!(form.agreement.services.is_empty());
        assert_eq!(form.agreement.contract_model, None);
    }

    #[test]
    fn contract_model_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(ContractModel::Monthly).unwrap(),
            serde_json::json!("monthly")
        );
        assert_eq!(CommunicationTone::Consultive.as_str(), "consultive");
    }
}
