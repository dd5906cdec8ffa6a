//! Submission pipeline behaviour against in-memory ports.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use assert_matches::assert_matches;
use async_trait::async_trait;
use onboard_core::draft::{DraftStore, InMemoryDraftStore, SESSION_MARKER_KEY};
use onboard_core::form::{
    Agreement, Assistant, CommunicationTone, ContractModel, DigitalPresence, FormData, FormUpdate,
    Identity,
};
use onboard_core::onboarding_wizard::OnboardingStep;
use onboard_core::registration::RegistrationStatus;
use onboard_core::types::{DbId, Timestamp};
use onboard_core::wizard::{Advance, WizardError, WizardSession};
use onboard_db::models::registration::NewRegistration;
use onboard_events::{OnboardingNotification, RetryPolicy, WebhookDelivery, WebhookError};
use onboard_pipeline::{
    EndpointConfigSource, NotificationOutcome, Notifier, PipelineConfig, RegistrationStore,
    SubmissionError, SubmissionPipeline,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

#[derive(Default)]
struct FakeStore {
    fail_insert: AtomicBool,
    fail_mark: AtomicBool,
    inserted: Mutex<Vec<NewRegistration>>,
    marked: Mutex<Vec<(DbId, Timestamp)>>,
}

impl FakeStore {
    fn failing() -> Self {
        let store = Self::default();
        store.fail_insert.store(true, Ordering::SeqCst);
        store
    }

    fn inserted(&self) -> Vec<NewRegistration> {
        self.inserted.lock().unwrap().clone()
    }

    fn marked_ids(&self) -> Vec<DbId> {
        self.marked.lock().unwrap().iter().map(|(id, _)| *id).collect()
    }
}

#[async_trait]
impl RegistrationStore for FakeStore {
    async fn insert(&self, record: &NewRegistration) -> Result<DbId, sqlx::Error> {
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(sqlx::Error::Protocol("connection reset".into()));
        }
        let mut inserted = self.inserted.lock().unwrap();
        inserted.push(record.clone());
        Ok(inserted.len() as DbId)
    }

    async fn mark_webhook_sent(&self, id: DbId, sent_at: Timestamp) -> Result<(), sqlx::Error> {
        if self.fail_mark.load(Ordering::SeqCst) {
            return Err(sqlx::Error::Protocol("connection reset".into()));
        }
        self.marked.lock().unwrap().push((id, sent_at));
        Ok(())
    }
}

#[derive(Default)]
struct FakeNotifier {
    fail: AtomicBool,
    calls: AtomicUsize,
    sent: Mutex<Vec<(String, OnboardingNotification)>>,
}

impl FakeNotifier {
    fn failing() -> Self {
        let notifier = Self::default();
        notifier.fail.store(true, Ordering::SeqCst);
        notifier
    }
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn notify(
        &self,
        url: &str,
        payload: &OnboardingNotification,
    ) -> Result<(), WebhookError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.sent
            .lock()
            .unwrap()
            .push((url.to_string(), payload.clone()));
        if self.fail.load(Ordering::SeqCst) {
            Err(WebhookError::HttpStatus(503))
        } else {
            Ok(())
        }
    }
}

enum FakeConfig {
    Override(&'static str),
    Unset,
    Broken,
}

#[async_trait]
impl EndpointConfigSource for FakeConfig {
    async fn webhook_override(&self, _owner_id: DbId) -> Result<Option<String>, sqlx::Error> {
        match self {
            Self::Override(url) => Ok(Some(url.to_string())),
            Self::Unset => Ok(None),
            Self::Broken => Err(sqlx::Error::PoolTimedOut),
        }
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn maria_form() -> FormData {
    let mut form = FormData::default();
    form.apply(FormUpdate::Identity(Identity {
        responsible_name: "Maria Souza".into(),
        company_name: "Acme LLC".into(),
        segment: "Varejo".into(),
        tax_id: "529.982.247-25".into(),
        email: "maria@acme.com".into(),
        phone: "(11) 91234-5678".into(),
    }));
    form.apply(FormUpdate::Agreement(Agreement {
        services: vec!["Assistente IA personalizado".into()],
        contract_model: Some(ContractModel::Single),
        single_value: "R$ 1.000,00".into(),
        payment_methods: vec!["PIX".into()],
        ..Agreement::default()
    }));
    form
}

fn pipeline(store: &Arc<FakeStore>, notifier: &Arc<FakeNotifier>) -> SubmissionPipeline {
    SubmissionPipeline::new(
        store.clone(),
        notifier.clone(),
        &PipelineConfig::default(),
    )
}

// -- finalize --

#[tokio::test]
async fn delivered_notification_marks_registration() {
    init_tracing();
    let store = Arc::new(FakeStore::default());
    let notifier = Arc::new(FakeNotifier::default());

    let submission = pipeline(&store, &notifier)
        .finalize(&maria_form())
        .await
        .unwrap();
    let outcome = submission.notification.await.unwrap();

    assert_matches!(outcome, NotificationOutcome::Delivered { .. });
    assert_eq!(store.marked_ids(), vec![submission.registration_id]);

    let sent = notifier.sent.lock().unwrap();
    assert_eq!(sent[0].1.id, Some(submission.registration_id));
    assert_eq!(sent[0].1.agreement.single_value, Some(1000.0));
}

#[tokio::test]
async fn failing_notifier_still_succeeds() {
    init_tracing();
    let store = Arc::new(FakeStore::default());
    let notifier = Arc::new(FakeNotifier::failing());

    let submission = pipeline(&store, &notifier)
        .finalize(&maria_form())
        .await
        .unwrap();

    assert_matches!(
        submission.notification.await.unwrap(),
        NotificationOutcome::Failed { .. }
    );
    assert_eq!(store.inserted().len(), 1);
    assert!(store.marked_ids().is_empty());
}

#[tokio::test]
async fn failing_insert_never_notifies() {
    init_tracing();
    let store = Arc::new(FakeStore::failing());
    let notifier = Arc::new(FakeNotifier::default());

    let err = pipeline(&store, &notifier)
        .finalize(&maria_form())
        .await
        .unwrap_err();

    assert_matches!(err, SubmissionError::Persistence(_));
    // Give any stray task a chance to run before asserting it never did.
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(notifier.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_identity_fields_are_rejected_before_insert() {
    let store = Arc::new(FakeStore::default());
    let notifier = Arc::new(FakeNotifier::default());
    let mut form = maria_form();
    form.identity.email.clear();
    form.identity.phone = " ".into();

    let err = pipeline(&store, &notifier).finalize(&form).await.unwrap_err();

    assert_matches!(err, SubmissionError::MissingFields(ref fields) if fields == &["email", "phone"]);
    assert!(store.inserted().is_empty());
}

#[tokio::test]
async fn flag_update_failure_is_not_fatal() {
    let store = Arc::new(FakeStore::default());
    store.fail_mark.store(true, Ordering::SeqCst);
    let notifier = Arc::new(FakeNotifier::default());

    let submission = pipeline(&store, &notifier)
        .finalize(&maria_form())
        .await
        .unwrap();

    assert_matches!(
        submission.notification.await.unwrap(),
        NotificationOutcome::DeliveredUnflagged { .. }
    );
}

// -- endpoint resolution --

#[tokio::test]
async fn endpoint_resolution_prefers_valid_override() {
    let store = Arc::new(FakeStore::default());
    let notifier = Arc::new(FakeNotifier::default());
    let fallback = PipelineConfig::default().webhook_fallback_url;

    let resolve = |config: FakeConfig, owner: Option<DbId>| {
        let mut pipeline =
            pipeline(&store, &notifier).with_config_source(Arc::new(config));
        if let Some(owner) = owner {
            pipeline = pipeline.with_owner(owner);
        }
        async move { pipeline.resolve_endpoint().await }
    };

    assert_eq!(
        resolve(FakeConfig::Override("https://hooks.example.com/prod"), Some(1)).await,
        "https://hooks.example.com/prod"
    );
    assert_eq!(
        resolve(FakeConfig::Override("https://hooks.example.com/prod"), None).await,
        fallback
    );
    assert_eq!(resolve(FakeConfig::Override("not a url"), Some(1)).await, fallback);
    assert_eq!(resolve(FakeConfig::Unset, Some(1)).await, fallback);
    assert_eq!(resolve(FakeConfig::Broken, Some(1)).await, fallback);
}

#[tokio::test]
async fn notification_goes_to_override_endpoint() {
    let store = Arc::new(FakeStore::default());
    let notifier = Arc::new(FakeNotifier::default());

    let submission = pipeline(&store, &notifier)
        .with_config_source(Arc::new(FakeConfig::Override("https://hooks.example.com/prod")))
        .with_owner(9)
        .finalize(&maria_form())
        .await
        .unwrap();

    assert_eq!(
        submission.notification.await.unwrap(),
        NotificationOutcome::Delivered {
            url: "https://hooks.example.com/prod".into()
        }
    );
}

// -- end to end --

#[tokio::test]
async fn unreachable_endpoint_end_to_end() {
    init_tracing();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let unreachable = format!("http://{}/webhook", listener.local_addr().unwrap());
    drop(listener);

    let config = PipelineConfig {
        webhook_fallback_url: unreachable,
        ..PipelineConfig::default()
    };
    let store = Arc::new(FakeStore::default());
    let delivery = WebhookDelivery::try_new(Duration::from_secs(2))
        .unwrap()
        .with_retry(RetryPolicy::none());
    let pipeline = SubmissionPipeline::new(store.clone(), Arc::new(delivery), &config);

    let submission = pipeline.finalize(&maria_form()).await.unwrap();
    assert_matches!(
        submission.notification.await.unwrap(),
        NotificationOutcome::Failed { .. }
    );

    let records = store.inserted();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.responsible_name, "Maria Souza");
    assert_eq!(record.company_name, "Acme LLC");
    assert_eq!(record.contract_model, "single");
    assert_eq!(record.single_value, Some(1000.0));
    assert_eq!(record.setup_value, None);
    assert_eq!(record.monthly_value, None);
    assert_eq!(record.status, RegistrationStatus::New);
    assert_eq!(record.origin, "formulario_cadastro");
}

#[tokio::test]
async fn wizard_submits_through_pipeline() {
    init_tracing();
    let drafts = Arc::new(InMemoryDraftStore::new());
    drafts.set(SESSION_MARKER_KEY, "tab-1").unwrap();
    let store = Arc::new(FakeStore::default());
    let notifier = Arc::new(FakeNotifier::failing());
    let mut session = WizardSession::mount(Arc::clone(&drafts), pipeline(&store, &notifier));

    let form = maria_form();
    assert_matches!(session.advance(), Ok(Advance::Moved { .. }));
    session.update(FormUpdate::Identity(form.identity.clone()));
    assert_matches!(
        session.advance_with(FormUpdate::Agreement(form.agreement.clone())),
        Ok(Advance::Moved { .. })
    );
    assert_matches!(
        session.advance_with(FormUpdate::Assistant(Assistant {
            main_functions: vec!["Tirar dúvidas frequentes".into()],
            top_questions: "Horário?\nPreço?".into(),
            communication_tone: Some(CommunicationTone::Professional),
            ..Assistant::default()
        })),
        Ok(Advance::Moved { .. })
    );
    assert_matches!(
        session.advance_with(FormUpdate::Digital(DigitalPresence {
            contact_phones: "(11) 3456-7890".into(),
            ..DigitalPresence::default()
        })),
        Ok(Advance::Moved { .. })
    );
    assert_matches!(session.advance(), Ok(Advance::Moved { to: OnboardingStep::Review, .. }));

    session.submit().await.unwrap();

    assert_eq!(session.step(), OnboardingStep::Success);
    assert_eq!(store.inserted().len(), 1);
}

#[tokio::test]
async fn wizard_keeps_draft_when_insert_fails() {
    let drafts = Arc::new(InMemoryDraftStore::new());
    drafts.set(SESSION_MARKER_KEY, "tab-1").unwrap();
    let store = Arc::new(FakeStore::failing());
    let notifier = Arc::new(FakeNotifier::default());
    let mut session = WizardSession::mount(Arc::clone(&drafts), pipeline(&store, &notifier));
    session.update(FormUpdate::Identity(maria_form().identity));
    session.jump_to(OnboardingStep::Review).unwrap();

    let err = session.submit().await.unwrap_err();

    assert_matches!(err, WizardError::SubmissionFailed(_));
    assert_eq!(session.step(), OnboardingStep::Review);
    assert_eq!(session.form().identity.company_name, "Acme LLC");
    assert_eq!(notifier.calls.load(Ordering::SeqCst), 0);
}
