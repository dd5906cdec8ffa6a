//! Registration status lifecycle and record constants.
//!
//! A finalized wizard submission becomes a registration row whose `status`
//! moves through the sales pipeline. New rows always start as
//! [`RegistrationStatus::New`].

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Origin tag written on every row created by the wizard.
pub const ORIGIN_ONBOARDING_FORM: &str = "formulario_cadastro";

/// `source` value in the webhook payload metadata.
pub const NOTIFICATION_SOURCE: &str = "onboarding_quiz";

/// Event name carried by the webhook payload.
pub const EVENT_REGISTRATION_FINALIZED: &str = "cadastro_novo_finalizado";

// ---------------------------------------------------------------------------
// Registration status
// ---------------------------------------------------------------------------

/// Sales status of a registration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistrationStatus {
    #[default]
    #[serde(rename = "novo")]
    New,
    #[serde(rename = "em_negociacao")]
    Negotiating,
    #[serde(rename = "aguardando_pagamento")]
    AwaitingPayment,
    #[serde(rename = "ativo")]
    Active,
    #[serde(rename = "pausado")]
    Paused,
    #[serde(rename = "cancelado")]
    Cancelled,
}

impl RegistrationStatus {
    pub const ALL: [Self; 6] = [
        Self::New,
        Self::Negotiating,
        Self::AwaitingPayment,
        Self::Active,
        Self::Paused,
        Self::Cancelled,
    ];

    /// Parse a status string from the database.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid registration status '{s}'. Must be one of: novo, em_negociacao, \
                     aguardando_pagamento, ativo, pausado, cancelado"
                ))
            })
    }

    /// Lenient parse for display: unknown values read as [`Self::New`].
    pub fn from_str_or_new(s: &str) -> Self {
        Self::from_str_db(s).unwrap_or(Self::New)
    }

    /// Convert to a database-compatible string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "novo",
            Self::Negotiating => "em_negociacao",
            Self::AwaitingPayment => "aguardando_pagamento",
            Self::Active => "ativo",
            Self::Paused => "pausado",
            Self::Cancelled => "cancelado",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::New => "Novo",
            Self::Negotiating => "Em Negociação",
            Self::AwaitingPayment => "Aguardando Pagamento",
            Self::Active => "Ativo",
            Self::Paused => "Pausado",
            Self::Cancelled => "Cancelado",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::New => "Lead acabou de preencher o formulário",
            Self::Negotiating => "Em contato, negociando proposta",
            Self::AwaitingPayment => "Proposta aceita, aguardando confirmação de pagamento",
            Self::Active => "Cliente pagou, assistente implementado",
            Self::Paused => "Pausado temporariamente pelo cliente",
            Self::Cancelled => "Cliente desistiu ou não qualificado",
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
