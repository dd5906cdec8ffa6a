//! Domain logic for the onboarding wizard.
//!
//! Everything here is synchronous and I/O free except the two ports the
//! orchestrator talks through: [`draft::DraftStore`] for session-scoped
//! drafts and [`wizard::Submitter`] for the final hand-off.

pub mod attachments;
pub mod catalog;
pub mod draft;
pub mod error;
pub mod form;
pub mod masks;
pub mod onboarding_wizard;
pub mod registration;
pub mod step_validation;
pub mod types;
pub mod validation;
pub mod wizard;
