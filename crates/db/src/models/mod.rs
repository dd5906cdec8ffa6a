//! Row structs and insert DTOs.

pub mod registration;
pub mod system_config;
