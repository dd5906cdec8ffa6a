//! Option catalogues offered by the wizard's multi-select fields.
//!
//! Selections are stored as the literal option text, so these strings are
//! also what ends up in the store of record and the webhook payload.

/// Services the customer can contract.
pub const SERVICES: &[&str] = &[
    "Assistente IA personalizado",
    "Integrações com plataformas (CRM, WhatsApp, API)",
    "Outros serviços",
];

/// Payment instruments accepted for the contract itself.
pub const PAYMENT_INSTRUMENTS: &[&str] = &["PIX", "Boleto Bancário"];

/// Primary jobs the assistant can take on.
pub const MAIN_FUNCTIONS: &[&str] = &[
    "Responder sobre produtos/serviços",
    "Qualificar e capturar leads",
    "Fornecer suporte técnico",
    "Agendar compromissos",
    "Tirar dúvidas frequentes",
];

/// Tools the customer already uses.
pub const EXISTING_SOLUTIONS: &[&str] = &[
    "Sim, já uso chatbot(s) ou respostas automáticas",
    "Uso apenas respostas automáticas básicas",
    "Tenho ferramenta de CRM (Salesforce, RD Station, HubSpot, etc.)",
    "Não, será minha primeira vez",
];
