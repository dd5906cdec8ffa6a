//! Outbound notifications for finalized onboarding registrations.
//!
//! - [`OnboardingNotification`]: the JSON envelope posted to the external
//!   automation endpoint.
//! - [`delivery`]: HTTP delivery with retry.

pub mod delivery;
pub mod payload;

pub use delivery::webhook::{RetryPolicy, WebhookDelivery, WebhookError};
pub use payload::OnboardingNotification;
