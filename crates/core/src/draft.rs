//! Session-scoped draft storage.
//!
//! The wizard keeps its in-progress answers in a key/value store scoped to
//! one browser session. [`DraftStore`] is the port; [`InMemoryDraftStore`]
//! backs tests and non-browser hosts. Exactly two keys are used: the
//! serialized [`SavedDraft`] and a session marker that tells a reload apart
//! from a fresh visit.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::form::FormData;
use crate::onboarding_wizard::OnboardingStep;
use crate::types::Timestamp;

/// Key holding the serialized [`SavedDraft`].
pub const DRAFT_KEY: &str = "onboarding_draft";

/// Key holding the session marker.
pub const SESSION_MARKER_KEY: &str = "onboarding_session_id";

/// Drafts older than this are discarded on mount.
pub const DRAFT_MAX_AGE_HOURS: i64 = 24;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum DraftStoreError {
    /// The backing storage rejected the operation (quota, disabled, ...).
    #[error("Draft storage unavailable: {0}")]
    Unavailable(String),

    #[error("Draft could not be serialized: {0}")]
    Serialize(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Port
// ---------------------------------------------------------------------------

/// String key/value storage scoped to one browser session.
pub trait DraftStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, DraftStoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), DraftStoreError>;
    fn remove(&self, key: &str) -> Result<(), DraftStoreError>;
}

impl<T: DraftStore + ?Sized> DraftStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, DraftStoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), DraftStoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), DraftStoreError> {
        (**self).remove(key)
    }
}

/// Process-local [`DraftStore`].
#[derive(Debug, Default)]
pub struct InMemoryDraftStore {
    entries: Mutex<HashMap<String, String>>,
}

impl InMemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, DraftStoreError> {
        self.entries
            .lock()
            .map_err(|_| DraftStoreError::Unavailable("draft store lock poisoned".to_string()))
    }
}

impl DraftStore for InMemoryDraftStore {
    fn get(&self, key: &str) -> Result<Option<String>, DraftStoreError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), DraftStoreError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), DraftStoreError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SavedDraft
// ---------------------------------------------------------------------------

/// What gets written under [`DRAFT_KEY`]. Attachments are excluded by
/// [`FormData`]'s serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedDraft {
    pub step: OnboardingStep,
    pub form_data: FormData,
    pub timestamp: Timestamp,
}

impl SavedDraft {
    pub fn new(step: OnboardingStep, form_data: FormData) -> Self {
        Self {
            step,
            form_data,
            timestamp: Utc::now(),
        }
    }

    pub fn to_json(&self) -> Result<String, DraftStoreError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Whether the draft is too old to resume at `now`.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now - self.timestamp >= Duration::hours(DRAFT_MAX_AGE_HOURS)
    }

    /// Whether the draft can be resumed at all: not expired and not left
    /// in the terminal step.
    pub fn is_resumable(&self, now: Timestamp) -> bool {
        !self.step.is_terminal() && !self.is_expired(now)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_store_get_set_remove() {
        let store = InMemoryDraftStore::new();
        assert_eq!(store.get(DRAFT_KEY).unwrap(), None);

        store.set(DRAFT_KEY, "{}").unwrap();
        assert_eq!(store.get(DRAFT_KEY).unwrap().as_deref(), Some("{}"));

        store.remove(DRAFT_KEY).unwrap();
        assert_eq!(store.get(DRAFT_KEY).unwrap(), None);
    }

    #[test]
    fn arc_store_shares_entries() {
        let store = Arc::new(InMemoryDraftStore::new());
        let handle = Arc::clone(&store);
        handle.set(SESSION_MARKER_KEY, "abc").unwrap();
        assert_eq!(store.get(SESSION_MARKER_KEY).unwrap().as_deref(), Some("abc"));
    }

    #[test]
    fn draft_json_roundtrip() {
        let mut form = FormData::default();
        form.identity.company_name = "Acme LLC".into();
        let draft = SavedDraft::new(OnboardingStep::Digital, form);

        let restored = SavedDraft::from_json(&draft.to_json().unwrap()).unwrap();
        assert_eq!(restored, draft);
    }

    #[test]
    fn malformed_draft_fails_to_parse() {
        assert!(SavedDraft::from_json("{not json").is_err());
        assert!(SavedDraft::from_json(r#"{"step":"integration"}"#).is_err());
    }

    #[test]
    fn expiry_after_max_age() {
        let draft = SavedDraft::new(OnboardingStep::Company, FormData::default());
        let now = draft.timestamp;
        assert!(!draft.is_expired(now + Duration::hours(DRAFT_MAX_AGE_HOURS - 1)));
        assert!(draft.is_expired(now + Duration::hours(DRAFT_MAX_AGE_HOURS)));
    }

    #[test]
    fn success_drafts_are_not_resumable() {
        let draft = SavedDraft::new(OnboardingStep::Success, FormData::default());
        assert!(!draft.is_resumable(draft.timestamp));
    }
}
