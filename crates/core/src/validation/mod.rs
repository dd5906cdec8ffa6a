//! Field-level validators.
//!
//! Pure predicates over single field values: tax ID checksums, contact
//! details, lenient URL/handle checks, and the canonical currency parser.
//! Step-level rules that combine these live in
//! [`step_validation`](crate::step_validation).

pub mod fields;
pub mod tax_id;

pub use fields::{parse_currency, validate_currency, validate_email, validate_phone, validate_url};
pub use tax_id::{validate_cnpj, validate_cpf, TaxIdKind};
