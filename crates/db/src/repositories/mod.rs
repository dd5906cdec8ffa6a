//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod registration_repo;
pub mod system_config_repo;

pub use registration_repo::RegistrationRepo;
pub use system_config_repo::SystemConfigRepo;
