//! The wizard orchestrator.
//!
//! [`WizardSession`] owns the current step and the accumulated [`FormData`]
//! for one browser session. It drives forward/backward/jump transitions,
//! mirrors every change into the injected [`DraftStore`], and hands the form
//! to a [`Submitter`] at the review step.
//!
//! Draft persistence is best-effort: store failures are logged and the
//! session carries on in memory.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;

use crate::attachments::{accept_files, AttachmentBatch};
use crate::draft::{DraftStore, SavedDraft, DRAFT_KEY, SESSION_MARKER_KEY};
use crate::form::{FileDescriptor, FormData, FormUpdate};
use crate::onboarding_wizard::OnboardingStep;
use crate::step_validation::{validate_step, FieldErrors};

/// User-facing message shown when a submission fails. The draft is kept so
/// the user can retry.
pub const SUBMIT_RETRY_MESSAGE: &str = "Não foi possível enviar seus dados. Tente novamente.";

// ---------------------------------------------------------------------------
// Ports and errors
// ---------------------------------------------------------------------------

/// Finalizes a completed form. Implemented by the submission pipeline.
#[async_trait]
pub trait Submitter: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn submit(&self, form: &FormData) -> Result<(), Self::Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("Cannot {action} from step '{step}'")]
    InvalidTransition {
        step: OnboardingStep,
        action: &'static str,
    },

    #[error("Cannot jump to step '{0}'")]
    InvalidJump(OnboardingStep),

    /// Display text matches [`SUBMIT_RETRY_MESSAGE`].
    #[error("Não foi possível enviar seus dados. Tente novamente.")]
    SubmissionFailed(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Outcome of [`WizardSession::advance`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Advance {
    Moved {
        from: OnboardingStep,
        to: OnboardingStep,
    },
    /// Validation failed; the session stays on the current step.
    Blocked { errors: FieldErrors },
}

// ---------------------------------------------------------------------------
// In-flight flag
// ---------------------------------------------------------------------------

/// Read-only view of the session's "submission in flight" flag, for the view
/// layer to disable the submit control.
#[derive(Debug, Clone)]
pub struct InFlightFlag(Arc<AtomicBool>);

impl InFlightFlag {
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Clears the flag when dropped, including when the submit future is
/// dropped mid-flight.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self(flag)
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

// ---------------------------------------------------------------------------
// WizardSession
// ---------------------------------------------------------------------------

pub struct WizardSession<D, S> {
    store: D,
    submitter: S,
    step: OnboardingStep,
    form: FormData,
    errors: FieldErrors,
    warnings: FieldErrors,
    /// Set when a step was opened from the review screen.
    return_to_review: bool,
    submitting: Arc<AtomicBool>,
    submit_error: Option<String>,
}

impl<D: DraftStore, S: Submitter> WizardSession<D, S> {
    /// Start or resume a session.
    ///
    /// Without a session marker the visit is treated as fresh: any stored
    /// draft is discarded and a new marker is written. With a marker, a
    /// resumable draft restores the step and form data.
    pub fn mount(store: D, submitter: S) -> Self {
        let mut session = Self {
            store,
            submitter,
            step: OnboardingStep::INITIAL,
            form: FormData::default(),
            errors: FieldErrors::new(),
            warnings: FieldErrors::new(),
            return_to_review: false,
            submitting: Arc::new(AtomicBool::new(false)),
            submit_error: None,
        };

        match session.store.get(SESSION_MARKER_KEY) {
            Ok(Some(_)) => session.restore_draft(),
            Ok(None) => session.start_fresh(),
            Err(e) => {
                tracing::warn!(error = %e, "Draft store unreadable, starting fresh session");
            }
        }
        session
    }

    fn start_fresh(&mut self) {
        let marker = uuid::Uuid::new_v4().to_string();
        if let Err(e) = self
            .store
            .remove(DRAFT_KEY)
            .and_then(|()| self.store.set(SESSION_MARKER_KEY, &marker))
        {
            tracing::warn!(error = %e, "Failed to initialise onboarding session marker");
        }
        tracing::info!(session_marker = %marker, "Started fresh onboarding session");
    }

    fn restore_draft(&mut self) {
        let raw = match self.store.get(DRAFT_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read onboarding draft");
                return;
            }
        };

        match SavedDraft::from_json(&raw) {
            Ok(draft) if draft.is_resumable(Utc::now()) => {
                tracing::info!(step = %draft.step, "Restored onboarding draft");
                self.step = draft.step;
                self.form = draft.form_data;
            }
            Ok(draft) => {
                tracing::info!(
                    step = %draft.step,
                    saved_at = %draft.timestamp,
                    "Discarding stale onboarding draft"
                );
                self.discard_draft();
            }
            Err(e) => {
                tracing::warn!(error = %e, "Malformed onboarding draft, starting over");
                self.discard_draft();
            }
        }
    }

    // -- accessors --

    pub fn step(&self) -> OnboardingStep {
        self.step
    }

    pub fn form(&self) -> &FormData {
        &self.form
    }

    /// Errors from the last blocked [`advance`](Self::advance).
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Advisory messages from the last validation run.
    pub fn warnings(&self) -> &FieldErrors {
        &self.warnings
    }

    /// Message from the last failed submission, cleared on the next attempt.
    pub fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }

    pub fn progress(&self) -> u8 {
        self.step.progress()
    }

    pub fn is_returning_to_review(&self) -> bool {
        self.return_to_review
    }

    pub fn in_flight_flag(&self) -> InFlightFlag {
        InFlightFlag(Arc::clone(&self.submitting))
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    // -- form edits --

    /// Merge a partial update without validating.
    pub fn update(&mut self, update: FormUpdate) {
        self.form.apply(update);
        self.persist();
    }

    /// Validate the selection and append the accepted files to the
    /// materials group.
    pub fn add_attachments(
        &mut self,
        files: impl IntoIterator<Item = FileDescriptor>,
    ) -> AttachmentBatch {
        let batch = accept_files(files);
        self.form
            .materials
            .uploaded_files
            .extend(batch.accepted.iter().cloned());
        self.persist();
        batch
    }

    pub fn remove_attachment(&mut self, index: usize) -> Option<FileDescriptor> {
        let files = &mut self.form.materials.uploaded_files;
        if index >= files.len() {
            return None;
        }
        let removed = files.remove(index);
        self.persist();
        Some(removed)
    }

    // -- navigation --

    /// Validate the current step and move on.
    ///
    /// A step opened from the review screen returns to review instead of
    /// proceeding forward.
    pub fn advance(&mut self) -> Result<Advance, WizardError> {
        let from = self.step;
        if matches!(from, OnboardingStep::Review | OnboardingStep::Success) {
            return Err(WizardError::InvalidTransition {
                step: from,
                action: "advance",
            });
        }

        let outcome = validate_step(from, &self.form);
        self.warnings = outcome.warnings;
        if !outcome.can_advance {
            tracing::debug!(step = %from, errors = outcome.errors.len(), "Step validation failed");
            self.errors = outcome.errors.clone();
            return Ok(Advance::Blocked {
                errors: outcome.errors,
            });
        }
        self.errors.clear();

        let to = if self.return_to_review {
            OnboardingStep::Review
        } else {
            from.next().ok_or(WizardError::InvalidTransition {
                step: from,
                action: "advance",
            })?
        };
        self.enter(to);
        Ok(Advance::Moved { from, to })
    }

    /// Merge `update` and then [`advance`](Self::advance).
    pub fn advance_with(&mut self, update: FormUpdate) -> Result<Advance, WizardError> {
        self.form.apply(update);
        let outcome = self.advance();
        if !matches!(outcome, Ok(Advance::Moved { .. })) {
            self.persist();
        }
        outcome
    }

    /// Go back one step without validating. A no-op on the first step.
    pub fn retreat(&mut self) -> Result<OnboardingStep, WizardError> {
        if self.step.is_terminal() {
            return Err(WizardError::InvalidTransition {
                step: self.step,
                action: "go back",
            });
        }
        if let Some(previous) = self.step.previous() {
            self.return_to_review = false;
            self.enter(previous);
        }
        Ok(self.step)
    }

    /// Jump directly to `target` without validating. Jumping from the review
    /// step marks the session to return there on the next advance.
    pub fn jump_to(&mut self, target: OnboardingStep) -> Result<(), WizardError> {
        if self.step.is_terminal() {
            return Err(WizardError::InvalidTransition {
                step: self.step,
                action: "jump",
            });
        }
        if target.is_terminal() {
            return Err(WizardError::InvalidJump(target));
        }

        let from_review = self.step == OnboardingStep::Review;
        self.enter(target);
        self.return_to_review = from_review && target.is_data_entry();
        Ok(())
    }

    fn enter(&mut self, step: OnboardingStep) {
        self.step = step;
        self.errors.clear();
        if step == OnboardingStep::Review {
            self.return_to_review = false;
        }
        self.persist();
    }

    // -- submission --

    /// Hand the form to the submitter. Only allowed from the review step.
    ///
    /// On success the draft is cleared and the session moves to the success
    /// step. On failure the session stays on review with its data intact.
    pub async fn submit(&mut self) -> Result<(), WizardError> {
        if self.step != OnboardingStep::Review {
            return Err(WizardError::InvalidTransition {
                step: self.step,
                action: "submit",
            });
        }

        self.submit_error = None;
        let result = {
            let _in_flight = InFlightGuard::raise(&self.submitting);
            self.submitter.submit(&self.form).await
        };

        match result {
            Ok(()) => {
                tracing::info!(company = %self.form.identity.company_name, "Onboarding submitted");
                self.discard_draft();
                self.step = OnboardingStep::Success;
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Onboarding submission failed");
                self.submit_error = Some(SUBMIT_RETRY_MESSAGE.to_string());
                Err(WizardError::SubmissionFailed(Box::new(e)))
            }
        }
    }

    /// Start over with an empty form, e.g. to register another company
    /// after a successful submission.
    pub fn restart(&mut self) {
        self.form = FormData::default();
        self.errors.clear();
        self.warnings.clear();
        self.submit_error = None;
        self.return_to_review = false;
        self.step = OnboardingStep::INITIAL;
        self.discard_draft();
    }

    // -- persistence --

    fn persist(&self) {
        if self.step.is_terminal() {
            return;
        }
        let draft = SavedDraft::new(self.step, self.form.clone());
        if let Err(e) = draft
            .to_json()
            .and_then(|json| self.store.set(DRAFT_KEY, &json))
        {
            tracing::warn!(step = %self.step, error = %e, "Failed to save onboarding draft");
        }
    }

    fn discard_draft(&self) {
        if let Err(e) = self.store.remove(DRAFT_KEY) {
            tracing::warn!(error = %e, "Failed to clear onboarding draft");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
