//! Submission pipeline for finalized onboarding forms.
//!
//! [`SubmissionPipeline::finalize`] writes the registration to the store of
//! record and then fires a best-effort webhook notification on a detached
//! task. Only the durable write can fail the submission.

pub mod config;
pub mod ports;
pub mod record;
pub mod submission;

pub use config::{ConfigError, PipelineConfig};
pub use ports::{
    EndpointConfigSource, Notifier, PgEndpointConfig, PgRegistrationStore, RegistrationStore,
};
pub use submission::{NotificationOutcome, Submission, SubmissionError, SubmissionPipeline};
